// Item numbering: locating the ITEM NO. column, finding where a continued
// table's data starts, and renumbering the finished output.

use crate::cell::CellValue;
use crate::error::{SplitError, SplitWarning};
use crate::grid::Grid;
use crate::options::{ContinuationPolicy, Keywords};
use crate::segment::TableSegment;

fn cell_contains(grid: &Grid, row: u32, col: u32, needle: &str) -> bool {
    let value = grid.value(row, col);
    value.is_truthy() && value.display().contains(needle)
}

/// First column holding `marker`, scanning rows top to bottom and each row left to right.
pub fn find_item_column(grid: &Grid, rows: std::ops::RangeInclusive<u32>, marker: &str) -> Option<u32> {
    rows.into_iter()
        .find_map(|row| (1..=grid.max_col()).find(|&col| cell_contains(grid, row, col, marker)))
}

/// Last integer item number of a segment's data region (above its footer).
pub fn last_item_number(grid: &Grid, segment: &TableSegment, item_col: u32, footer_marker: &str) -> Option<i64> {
    let data_start = segment.header_end_row + 1;
    if data_start > segment.end_row {
        return None;
    }
    let footer = (data_start..=segment.end_row).find(|&row| grid.row_text(row).contains(footer_marker));
    let data_end = footer.map(|f| f - 1).unwrap_or(segment.end_row);
    (data_start..=data_end)
        .rev()
        .filter(|&row| !grid.value(row, item_col).is_empty())
        .find_map(|row| grid.value(row, item_col).as_integer())
}

/// Where a continued segment's data begins: the row whose item number is
/// `previous_last + 1`, or the policy's fallback row.
pub fn continuation_start(
    grid: &Grid,
    index: usize,
    segment: &TableSegment,
    item_col: Option<u32>,
    previous_last: Option<i64>,
    policy: ContinuationPolicy,
    warnings: &mut Vec<SplitWarning>,
) -> Result<u32, SplitError> {
    // An item number at i64::MAX has no successor to look for.
    let expected = previous_last.and_then(|n| n.checked_add(1));
    if let (Some(col), Some(next)) = (item_col, expected) {
        let target = next as f64;
        let hit = (segment.header_start_row..=segment.end_row)
            .find(|&row| matches!(grid.value(row, col), CellValue::Number(n) if *n == target));
        if let Some(row) = hit {
            return Ok(row);
        }
    }

    let fallback_row = match policy {
        ContinuationPolicy::HeaderStart => segment.header_start_row + 1,
        ContinuationPolicy::HeaderEnd => segment.header_end_row + 1,
        ContinuationPolicy::Strict => {
            return Err(SplitError::MalformedHeader {
                segment: index,
                header_start: segment.header_start_row,
            });
        }
    };
    log::warn!(
        "table {}: continuation item {:?} not found, falling back to row {}",
        index + 1,
        expected,
        fallback_row
    );
    warnings.push(SplitWarning::ContinuationNotFound { segment: index, expected, fallback_row });
    Ok(fallback_row)
}

/// Overwrite every non-empty item cell of an output's data region with 1, 2, 3, ...
/// Returns the number of items, or None when the output has no ITEM NO row.
pub fn renumber_items(grid: &mut Grid, keywords: &Keywords) -> Option<usize> {
    let marker = keywords.item_marker.as_str();
    let header_row = (1..=grid.max_row()).find(|&row| grid.row_text(row).contains(marker))?;
    let item_col = find_item_column(grid, 1..=header_row, marker)?;
    let data_start = header_row + 1;

    let footer = (data_start + 1..=grid.max_row())
        .rev()
        .find(|&row| grid.row_text_joined(row).contains(keywords.footer_marker.as_str()));
    let data_end = footer.map(|f| f - 1).unwrap_or(grid.max_row());

    let mut next = 1usize;
    for row in data_start..=data_end {
        if !grid.value(row, item_col).is_empty() {
            grid.set_value(row, item_col, CellValue::Number(next as f64));
            next += 1;
        }
    }
    Some(next - 1)
}
