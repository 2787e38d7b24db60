use serde::{Deserialize, Serialize};

use crate::error::SplitWarning;
use crate::grid::Grid;
use crate::scan::Boundaries;

/// One logical table inside the source grid (all rows inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSegment {
    pub start_row: u32,
    pub end_row: u32,
    pub header_start_row: u32,
    pub header_end_row: u32,
}

/// Widen a header end row to the bottom of any merge crossing it.
pub fn widen_header_end(grid: &Grid, header_end: u32) -> u32 {
    grid.merged_regions()
        .iter()
        .filter(|m| m.spans_row(header_end))
        .map(|m| m.max_row)
        .fold(header_end, u32::max)
}

/// Build one segment per header start. Header ends pair with header starts by
/// position. Every segment keeps `header_start < header_end <= end_row`: an
/// end outside that range is replaced by the first end inside it, and a start
/// with no usable end gets `header_start + 1` and a `MalformedHeader` warning.
pub fn build_segments(
    grid: &Grid,
    boundaries: &Boundaries,
    warnings: &mut Vec<SplitWarning>,
) -> Vec<TableSegment> {
    let starts = &boundaries.header_starts;
    let mut ends = boundaries.header_ends.clone();
    if let Some(first) = ends.first_mut() {
        *first = widen_header_end(grid, *first);
    }
    let last_row = grid.max_row();

    starts
        .iter()
        .enumerate()
        .map(|(i, &header_start)| {
            let start_row = if i == 0 { 1 } else { header_start };
            let end_row = match starts.get(i + 1) {
                Some(&next) => next.saturating_sub(2).max(start_row),
                None => last_row,
            };
            let inside = |end: u32| end > header_start && end <= end_row;

            let header_end = match ends.get(i).copied() {
                Some(end) if inside(end) => end,
                paired => match ends.iter().copied().find(|&end| inside(end)) {
                    Some(end) => {
                        log::warn!("table {}: header end {:?} outside rows {}..={}", i + 1, paired, header_start, end_row);
                        warnings.push(SplitWarning::HeaderEndRepaired { segment: i, header_end: end });
                        end
                    }
                    None => {
                        log::warn!("table {} has no ITEM NO. header row", i + 1);
                        warnings.push(SplitWarning::MalformedHeader { segment: i, header_start });
                        header_start + 1
                    }
                },
            };
            TableSegment { start_row, end_row, header_start_row: header_start, header_end_row: header_end }
        })
        .collect()
}
