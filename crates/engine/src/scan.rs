// Boundary detection: a read-only pass that collects header start and header
// end candidates before any layout work happens.

use crate::error::SplitError;
use crate::grid::Grid;
use crate::options::Keywords;

/// Candidate rows found by [`scan_boundaries`], both ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Boundaries {
    pub header_starts: Vec<u32>,
    pub header_ends: Vec<u32>,
}

pub fn is_header_end(text: &str, keywords: &Keywords) -> bool {
    keywords.header_end.iter().all(|k| text.contains(k.as_str()))
}

pub fn is_header_start(text: &str, next_text: &str, keywords: &Keywords) -> bool {
    text.contains(keywords.company_marker.as_str())
        && next_text.contains(keywords.company_name.as_str())
}

/// Scan rows 2..=last for header boundaries. Row 1 is never a candidate.
pub fn scan_boundaries(grid: &Grid, keywords: &Keywords) -> Result<Boundaries, SplitError> {
    let last = grid.max_row();
    let mut found = Boundaries::default();

    let mut next_text = if last >= 2 { grid.row_text(2) } else { String::new() };
    for row in 2..=last {
        let text = std::mem::take(&mut next_text);
        if row < last {
            next_text = grid.row_text(row + 1);
        }
        if is_header_end(&text, keywords) {
            found.header_ends.push(row);
        }
        if row < last && is_header_start(&text, &next_text, keywords) {
            found.header_starts.push(row);
        }
    }

    if found.header_starts.is_empty() || found.header_ends.is_empty() {
        return Err(SplitError::BoundaryNotFound {
            missing_start: found.header_starts.is_empty(),
            missing_end: found.header_ends.is_empty(),
        });
    }
    log::debug!(
        "boundaries: starts={:?} ends={:?}",
        found.header_starts,
        found.header_ends
    );
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::{text, PoBuilder, COMPANY_NAME};

    #[test]
    fn test_single_table() {
        let grid = PoBuilder::new().table(1, 3).build();
        let b = scan_boundaries(&grid, &Keywords::default()).unwrap();
        assert_eq!(b.header_starts, vec![2]);
        assert_eq!(b.header_ends, vec![6]);
    }

    #[test]
    fn test_stacked_tables() {
        let grid = PoBuilder::new().table(1, 3).table(4, 3).table(7, 1).build();
        let b = scan_boundaries(&grid, &Keywords::default()).unwrap();
        assert_eq!(b.header_starts.len(), 3);
        assert_eq!(b.header_ends.len(), 3);
    }

    #[test]
    fn test_row_one_is_reserved() {
        let grid = PoBuilder::new()
            .cell(1, 1, text("ITEM NO. DESCRIPTION"))
            .table(1, 2)
            .build();
        let b = scan_boundaries(&grid, &Keywords::default()).unwrap();
        assert_eq!(b.header_ends, vec![6]);
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        let grid = PoBuilder::new()
            .cell(2, 1, text("P&G"))
            .cell(3, 1, text(COMPANY_NAME))
            .cell(5, 1, text("item no."))
            .cell(5, 2, text("description"))
            .build();
        let err = scan_boundaries(&grid, &Keywords::default()).unwrap_err();
        assert_eq!(err, SplitError::BoundaryNotFound { missing_start: false, missing_end: true });
    }

    #[test]
    fn test_marker_on_last_row_is_not_a_start() {
        let grid = PoBuilder::new()
            .cell(2, 1, text("ITEM NO."))
            .cell(2, 2, text("DESCRIPTION"))
            .cell(3, 1, text("P&G"))
            .build();
        let err = scan_boundaries(&grid, &Keywords::default()).unwrap_err();
        assert_eq!(err, SplitError::BoundaryNotFound { missing_start: true, missing_end: false });
    }

    #[test]
    fn test_keywords_spread_across_cells() {
        let mut grid = PoBuilder::new().build();
        grid.set_value(4, 3, text("P&G"));
        grid.set_value(5, 2, text("Buyer:"));
        grid.set_value(5, 3, text(COMPANY_NAME));
        grid.set_value(6, 1, text("ITEM NO."));
        grid.set_value(6, 4, text("DESCRIPTION"));
        let b = scan_boundaries(&grid, &Keywords::default()).unwrap();
        assert_eq!(b.header_starts, vec![4]);
        assert_eq!(b.header_ends, vec![6]);
    }
}
