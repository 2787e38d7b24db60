// Single-sheet grid model: the in-memory form of both the source document and
// every output document. Rows and columns are 1-based, as in Excel addresses.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::cell::{Cell, CellStyle, CellValue};

/// A rectangular merged range, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergedRegion {
    pub min_row: u32,
    pub min_col: u32,
    pub max_row: u32,
    pub max_col: u32,
}

impl MergedRegion {
    pub fn new(min_row: u32, min_col: u32, max_row: u32, max_col: u32) -> Self {
        Self {
            min_row: min_row.min(max_row),
            min_col: min_col.min(max_col),
            max_row: min_row.max(max_row),
            max_col: min_col.max(max_col),
        }
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.min_row && row <= self.max_row && col >= self.min_col && col <= self.max_col
    }

    pub fn spans_row(&self, row: u32) -> bool {
        row >= self.min_row && row <= self.max_row
    }

    pub fn overlaps(&self, other: &MergedRegion) -> bool {
        self.min_row <= other.max_row
            && other.min_row <= self.max_row
            && self.min_col <= other.max_col
            && other.min_col <= self.max_col
    }

    pub fn is_single_cell(&self) -> bool {
        self.min_row == self.max_row && self.min_col == self.max_col
    }

    /// A1-style reference, e.g. "A1:C3"
    pub fn a1(&self) -> String {
        format!(
            "{}{}:{}{}",
            col_to_letter(self.min_col),
            self.min_row,
            col_to_letter(self.max_col),
            self.max_row
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MergeError {
    /// The new region overlaps a merge already in the grid
    Overlap { existing: MergedRegion },
    /// A one-cell merge is meaningless and rejected by Excel
    SingleCell,
}

impl std::fmt::Display for MergeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeError::Overlap { existing } => {
                write!(f, "overlaps existing merge {}", existing.a1())
            }
            MergeError::SingleCell => write!(f, "single-cell merge"),
        }
    }
}

impl std::error::Error for MergeError {}

/// Page margins in inches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageMargins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub header: f64,
    pub footer: f64,
}

impl Default for PageMargins {
    fn default() -> Self {
        // Excel's "Normal" margins
        Self { left: 0.7, right: 0.7, top: 0.75, bottom: 0.75, header: 0.3, footer: 0.3 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSetup {
    /// OOXML paper size code; 0 = printer default, 9 = A4
    pub paper_size: u8,
    pub landscape: bool,
    /// Fit to (pages wide, pages tall); 0 means "unconstrained" in that direction
    pub fit_to_pages: Option<(u16, u16)>,
    pub center_horizontally: bool,
    pub center_vertically: bool,
    pub margins: PageMargins,
}

/// A picture anchored at a cell's top-left corner, scaled to a pixel size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePlacement {
    pub path: PathBuf,
    pub row: u32,
    pub col: u32,
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Grid {
    cells: HashMap<(u32, u32), Cell>,
    merged_regions: Vec<MergedRegion>,
    row_heights: HashMap<u32, f64>,
    col_widths: HashMap<u32, f64>,
    max_row: u32,
    max_col: u32,
    /// Worksheet name; None lets the writer pick its default
    pub sheet_name: Option<String>,
    pub page_setup: PageSetup,
    /// Rows repeated at the top of every printed page (inclusive)
    pub print_title_rows: Option<(u32, u32)>,
    pub images: Vec<ImagePlacement>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last row that holds a cell (valued or styled). 0 for an empty grid.
    pub fn max_row(&self) -> u32 {
        self.max_row
    }

    pub fn max_col(&self) -> u32 {
        self.max_col
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    pub fn value(&self, row: u32, col: u32) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cells.get(&(row, col)).map(|c| &c.value).unwrap_or(&EMPTY)
    }

    pub fn style(&self, row: u32, col: u32) -> Option<&CellStyle> {
        self.cells.get(&(row, col)).map(|c| &c.style)
    }

    /// Mutable access, creating an empty cell if needed.
    pub fn cell_mut(&mut self, row: u32, col: u32) -> &mut Cell {
        self.touch(row, col);
        self.cells.entry((row, col)).or_default()
    }

    pub fn set_cell(&mut self, row: u32, col: u32, cell: Cell) {
        self.touch(row, col);
        self.cells.insert((row, col), cell);
    }

    /// Replace the value, keeping whatever style the cell already has.
    pub fn set_value(&mut self, row: u32, col: u32, value: CellValue) {
        self.cell_mut(row, col).value = value;
    }

    pub fn set_style(&mut self, row: u32, col: u32, style: CellStyle) {
        self.cell_mut(row, col).style = style;
    }

    pub fn clear_value(&mut self, row: u32, col: u32) {
        if let Some(cell) = self.cells.get_mut(&(row, col)) {
            cell.value = CellValue::Empty;
        }
    }

    /// Extend the sheet dimensions to include (row, col) without storing anything.
    pub fn touch(&mut self, row: u32, col: u32) {
        self.max_row = self.max_row.max(row);
        self.max_col = self.max_col.max(col);
    }

    pub fn cells_iter(&self) -> impl Iterator<Item = (&(u32, u32), &Cell)> {
        self.cells.iter()
    }

    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.row_heights.get(&row).copied()
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.row_heights.insert(row, height);
    }

    pub fn row_heights(&self) -> &HashMap<u32, f64> {
        &self.row_heights
    }

    /// Column width in raw Excel character units, as stored in the file
    pub fn col_width(&self, col: u32) -> Option<f64> {
        self.col_widths.get(&col).copied()
    }

    pub fn set_col_width(&mut self, col: u32, width: f64) {
        self.col_widths.insert(col, width);
    }

    pub fn col_widths(&self) -> &HashMap<u32, f64> {
        &self.col_widths
    }

    pub fn merged_regions(&self) -> &[MergedRegion] {
        &self.merged_regions
    }

    /// Add a merged region. Values of every non-anchor cell are cleared (styles
    /// stay, so borders keep drawing around the merge).
    pub fn add_merge(&mut self, region: MergedRegion) -> Result<(), MergeError> {
        if region.is_single_cell() {
            return Err(MergeError::SingleCell);
        }
        if let Some(existing) = self.merged_regions.iter().find(|m| m.overlaps(&region)) {
            return Err(MergeError::Overlap { existing: *existing });
        }
        for row in region.min_row..=region.max_row {
            for col in region.min_col..=region.max_col {
                if (row, col) != (region.min_row, region.min_col) {
                    self.clear_value(row, col);
                }
            }
        }
        self.touch(region.max_row, region.max_col);
        self.merged_regions.push(region);
        Ok(())
    }

    /// Space-joined trimmed text of every non-empty cell in the row, in column order.
    pub fn row_text(&self, row: u32) -> String {
        (1..=self.max_col)
            .map(|col| self.value(row, col))
            .filter(|v| !v.is_empty())
            .map(|v| v.display().trim().to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Concatenated text of the row with no separator.
    pub fn row_text_joined(&self, row: u32) -> String {
        (1..=self.max_col).map(|col| self.value(row, col).display()).collect()
    }

    /// True when every cell up to the last column is empty.
    pub fn is_blank_row(&self, row: u32) -> bool {
        (1..=self.max_col).all(|col| match self.value(row, col) {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        })
    }

    /// Last row holding any value, or None for a grid without values.
    pub fn last_value_row(&self) -> Option<u32> {
        (1..=self.max_row).rev().find(|&row| (1..=self.max_col).any(|col| !self.value(row, col).is_empty()))
    }
}

/// Convert a 1-based column index to its Excel letter (1 = A, 27 = AA).
pub fn col_to_letter(col: u32) -> String {
    let mut result = String::new();
    let mut n = col;
    while n > 0 {
        let rem = (n - 1) % 26;
        result.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    result
}

/// Convert an Excel column name to its 1-based index ("A" = 1, "AA" = 27).
pub fn letter_to_col(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + (ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    Some(col)
}
