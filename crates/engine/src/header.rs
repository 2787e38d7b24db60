use crate::grid::Grid;

/// The header rows (source row numbers) written at the top of every output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedHeader {
    pub rows: Vec<u32>,
    /// The dropped second header row; fills empty cells of output columns 1-3 in row 1.
    pub alternate_row: Option<u32>,
}

/// Compress `start..=header_end` of the first table: drop the second row
/// (remembered as the alternate source) and collapse runs of blank rows to one.
pub fn compress_header(grid: &Grid, start: u32, header_end: u32) -> CompressedHeader {
    let raw: Vec<u32> = (start..=header_end).collect();
    let (candidates, alternate_row) = if raw.len() >= 2 {
        let mut rows = vec![raw[0]];
        rows.extend_from_slice(&raw[2..]);
        (rows, Some(raw[1]))
    } else {
        (raw, None)
    };

    let mut rows = Vec::with_capacity(candidates.len());
    let mut prev_blank = false;
    for row in candidates {
        let blank = grid.is_blank_row(row);
        if !(blank && prev_blank) {
            rows.push(row);
        }
        prev_blank = blank;
    }
    CompressedHeader { rows, alternate_row }
}
