// Row/cell copier and layout finalizer: builds one output grid from the
// compressed header plus a segment's data rows.

use std::collections::BTreeMap;

use crate::cell::{Alignment, CellStyle, CellValue, HorizontalAlignment, VerticalAlignment};
use crate::error::SplitWarning;
use crate::grid::{Grid, MergeError, MergedRegion};
use crate::header::CompressedHeader;
use crate::options::LayoutOptions;

/// Columns 1..=COMPANY_COLS hold the company block in output row 1.
pub const COMPANY_COLS: u32 = 3;
/// Spacer column inserted for the merged title.
pub const TITLE_COL: u32 = COMPANY_COLS + 1;

/// Source column -> output column (a spacer is inserted after column 3).
pub fn remap_col(col: u32) -> u32 {
    if col <= COMPANY_COLS {
        col
    } else {
        col + 1
    }
}

/// Output grid plus the source -> output row map used to build it.
#[derive(Debug, Clone)]
pub struct AssembledGrid {
    pub grid: Grid,
    pub row_map: BTreeMap<u32, u32>,
}

/// Copy `header.rows` followed by `data_rows` into a fresh grid and apply the
/// row-1 title layout, source merges, fonts and page setup.
pub fn assemble(
    source: &Grid,
    header: &CompressedHeader,
    data_rows: std::ops::RangeInclusive<u32>,
    layout: &LayoutOptions,
    segment: usize,
    warnings: &mut Vec<SplitWarning>,
) -> AssembledGrid {
    let mut out = Grid::new();
    let mut row_map = BTreeMap::new();
    let source_cols = source.max_col();

    for (old_row, new_row) in header.rows.iter().copied().chain(data_rows).zip(1u32..) {
        if let Some(height) = source.row_height(old_row) {
            out.set_row_height(new_row, height);
        }
        for col in 1..=source_cols {
            let new_col = remap_col(col);
            let mut src_row = old_row;
            if new_row == 1 && new_col <= COMPANY_COLS && !source.value(old_row, col).is_truthy() {
                if let Some(alt) = header.alternate_row {
                    if source.value(alt, col).is_truthy() {
                        src_row = alt;
                    }
                }
            }
            match source.cell(src_row, col) {
                Some(cell) => out.set_cell(new_row, new_col, cell.clone()),
                None => out.touch(new_row, new_col),
            }
            if let Some(width) = source.col_width(col) {
                out.set_col_width(new_col, width);
            }
        }
        if let Some(width) = source.col_width(COMPANY_COLS) {
            out.set_col_width(TITLE_COL, width);
        }
        if new_row == 1 {
            lay_out_title_row(&mut out, segment, warnings);
        }
        row_map.insert(old_row, new_row);
    }

    copy_merges(source, &mut out, &row_map, segment, warnings);
    enlarge_title_fonts(&mut out, layout);
    out.set_row_height(1, layout.title_row_height);
    out.sheet_name = source.sheet_name.clone();
    out.page_setup = layout.page.clone();

    AssembledGrid { grid: out, row_map }
}

/// Merge the company block, then join the row-1 texts right of it into one
/// right-aligned title merged across the remaining columns.
fn lay_out_title_row(out: &mut Grid, segment: usize, warnings: &mut Vec<SplitWarning>) {
    try_merge(out, MergedRegion::new(1, 1, 1, COMPANY_COLS), segment, warnings);

    let last_col = out.max_col();
    if last_col < TITLE_COL {
        return;
    }
    let valued: Vec<u32> = (TITLE_COL..=last_col).filter(|&c| out.value(1, c).is_truthy()).collect();
    if let Some(&style_col) = valued.first() {
        let title = valued
            .iter()
            .map(|&c| out.value(1, c).display().trim().to_string())
            .collect::<Vec<_>>()
            .join("  ");
        let mut style: CellStyle = out.style(1, style_col).cloned().unwrap_or_default();
        style.alignment = Alignment {
            horizontal: HorizontalAlignment::Right,
            vertical: VerticalAlignment::Center,
            ..Alignment::default()
        };
        let cell = out.cell_mut(1, TITLE_COL);
        cell.value = CellValue::Text(title);
        cell.style = style;
    }
    for col in TITLE_COL + 1..=last_col {
        out.clear_value(1, col);
    }
    if last_col > TITLE_COL {
        try_merge(out, MergedRegion::new(1, TITLE_COL, 1, last_col), segment, warnings);
    }
}

/// Re-create source merges that lie entirely inside the row map and don't start on row 1.
fn copy_merges(
    source: &Grid,
    out: &mut Grid,
    row_map: &BTreeMap<u32, u32>,
    segment: usize,
    warnings: &mut Vec<SplitWarning>,
) {
    for merge in source.merged_regions() {
        let (Some(&min_row), Some(&max_row)) = (row_map.get(&merge.min_row), row_map.get(&merge.max_row)) else {
            continue;
        };
        if min_row == 1 {
            continue;
        }
        let min_col = remap_col(merge.min_col);
        let max_col = if merge.min_col == 2 && merge.max_col == 3 { TITLE_COL } else { remap_col(merge.max_col) };
        try_merge(out, MergedRegion::new(min_row, min_col, max_row, max_col), segment, warnings);
    }
}

fn try_merge(out: &mut Grid, region: MergedRegion, segment: usize, warnings: &mut Vec<SplitWarning>) {
    match out.add_merge(region) {
        Ok(()) => {}
        Err(MergeError::SingleCell) => log::debug!("skipping single-cell merge {}", region.a1()),
        Err(err) => {
            log::warn!("table {}: dropping merge {}: {err}", segment + 1, region.a1());
            warnings.push(SplitWarning::MergeDropped { segment, region, reason: err.to_string() });
        }
    }
}

/// Every valued row-1 cell gets `size + delta` and bold; other font attributes stay.
fn enlarge_title_fonts(out: &mut Grid, layout: &LayoutOptions) {
    for col in 1..=out.max_col() {
        if out.value(1, col).is_truthy() {
            let font = &mut out.cell_mut(1, col).style.font;
            font.size = Some(font.size_or(layout.default_font_size) + layout.title_font_delta);
            font.bold = true;
        }
    }
}
