//! Fixture builder for purchase-order style grids.
//!
//! Lays tables out the way the real documents do: a company marker row, the
//! full company name on the next row, a few blank rows, the ITEM NO. /
//! DESCRIPTION row, item rows, then TOTAL and TOTAL DAP footers. Tables are
//! separated by a single gap row so that each segment ends on its TOTAL DAP row.

use crate::cell::{Border, BorderSide, Cell, CellStyle, CellValue};
use crate::grid::{Grid, MergedRegion};

pub const COMPANY_NAME: &str = "PROCTER & GAMBLE (GUANGZHOU) LTD.";

pub fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

pub fn num(n: f64) -> CellValue {
    CellValue::Number(n)
}

pub fn styled(value: CellValue, style: CellStyle) -> Cell {
    Cell { value, style }
}

pub fn bordered() -> CellStyle {
    CellStyle { border: Border::all(BorderSide::thin()), ..CellStyle::default() }
}

/// Row numbers of one table written by [`PoBuilder::table`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableRows {
    pub header_start: u32,
    pub header_end: u32,
    pub first_item: u32,
    pub total: u32,
    pub total_dap: u32,
}

pub struct PoBuilder {
    grid: Grid,
    next_row: u32,
    header_blank_rows: u32,
    tables: Vec<TableRows>,
}

impl PoBuilder {
    /// Row 1 carries the document title in columns E and F.
    pub fn new() -> Self {
        let mut grid = Grid::new();
        grid.set_value(1, 5, text("PURCHASE ORDER"));
        grid.set_value(1, 6, text("No. 4500123"));
        for (col, width) in [(1, 8.0), (2, 30.0), (3, 12.0), (4, 9.0), (5, 10.0), (6, 14.0)] {
            grid.set_col_width(col, width);
        }
        Self { grid, next_row: 2, header_blank_rows: 2, tables: Vec::new() }
    }

    /// Blank rows between the company name row and the ITEM NO. row.
    pub fn header_blank_rows(mut self, n: u32) -> Self {
        self.header_blank_rows = n;
        self
    }

    /// Append a table whose items are numbered `first_item..first_item + items`.
    pub fn table(mut self, first_item: i64, items: u32) -> Self {
        let start = self.next_row;
        let g = &mut self.grid;
        g.set_value(start, 1, text("P&G"));
        g.set_value(start + 1, 1, text(COMPANY_NAME));
        let header_end = start + 2 + self.header_blank_rows;
        for col in 1..=6 {
            g.touch(header_end, col);
        }
        g.set_value(header_end, 1, text("ITEM NO."));
        g.set_value(header_end, 2, text("DESCRIPTION"));
        g.set_value(header_end, 5, text("QTY"));
        g.set_value(header_end, 6, text("AMOUNT"));

        let mut total = 0.0;
        for i in 0..items {
            let row = header_end + 1 + i;
            let amount = 10.0 * f64::from(i + 1);
            total += amount;
            g.set_cell(row, 1, styled(num((first_item + i64::from(i)) as f64), bordered()));
            g.set_cell(row, 2, styled(text(&format!("Part {}", i + 1)), bordered()));
            g.set_cell(row, 5, styled(num(1.0), bordered()));
            g.set_cell(row, 6, styled(num(amount), bordered()));
        }
        let total_row = header_end + 1 + items;
        g.set_value(total_row, 2, text("TOTAL"));
        g.set_value(total_row, 6, num(total));
        g.set_value(total_row + 1, 2, text("TOTAL DAP"));
        g.set_value(total_row + 1, 6, num(total));

        self.tables.push(TableRows {
            header_start: start,
            header_end,
            first_item: header_end + 1,
            total: total_row,
            total_dap: total_row + 1,
        });
        self.next_row = total_row + 3;
        self
    }

    pub fn cell(mut self, row: u32, col: u32, value: CellValue) -> Self {
        self.grid.set_value(row, col, value);
        self
    }

    pub fn merge(mut self, region: MergedRegion) -> Self {
        self.grid.add_merge(region).unwrap();
        self
    }

    pub fn tables(&self) -> &[TableRows] {
        &self.tables
    }

    pub fn build(self) -> Grid {
        self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_layout() {
        let b = PoBuilder::new().table(1, 3).table(4, 2);
        let t = b.tables().to_vec();
        assert_eq!(t[0].header_start, 2);
        assert_eq!(t[0].header_end, 6);
        assert_eq!(t[0].total_dap, 11);
        // one gap row between tables
        assert_eq!(t[1].header_start, 13);
        let grid = b.build();
        assert_eq!(grid.value(t[1].first_item, 1), &num(4.0));
        assert_eq!(grid.max_col(), 6);
    }
}
