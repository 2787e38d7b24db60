use std::fmt;
use std::path::PathBuf;

use crate::grid::MergedRegion;

#[derive(Debug, Clone, PartialEq)]
pub enum SplitError {
    /// No company header start and/or no ITEM NO./DESCRIPTION row was found.
    BoundaryNotFound { missing_start: bool, missing_end: bool },
    /// A segment has no header end of its own (fatal only under the strict policy).
    MalformedHeader { segment: usize, header_start: u32 },
    /// A required external file (e.g. the stamp image) does not exist.
    MissingResource(PathBuf),
    /// Read/parse/write failure of a spreadsheet.
    Io(String),
    /// The writer rejected the produced layout.
    Layout(String),
}

impl fmt::Display for SplitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoundaryNotFound { missing_start, missing_end } => {
                let what = match (missing_start, missing_end) {
                    (true, true) => "company header and ITEM NO. header row",
                    (true, false) => "company header",
                    _ => "ITEM NO. header row",
                };
                write!(f, "no valid table header found (missing {what})")
            }
            Self::MalformedHeader { segment, header_start } => {
                write!(
                    f,
                    "table {} (header at row {header_start}) has no ITEM NO. header row",
                    segment + 1
                )
            }
            Self::MissingResource(path) => write!(f, "stamp image not found: {}", path.display()),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Layout(msg) => write!(f, "layout error: {msg}"),
        }
    }
}

impl std::error::Error for SplitError {}

/// Soft problems found while splitting. The split still produces output.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitWarning {
    /// Segment had no header end; header_start + 1 was used instead.
    MalformedHeader { segment: usize, header_start: u32 },
    /// The header end paired by position fell outside the segment; a later
    /// header end inside it was used.
    HeaderEndRepaired { segment: usize, header_end: u32 },
    /// The next item number was not found; data starts at `fallback_row`.
    ContinuationNotFound { segment: usize, expected: Option<i64>, fallback_row: u32 },
    /// A source merge could not be re-created in the output.
    MergeDropped { segment: usize, region: MergedRegion, reason: String },
    /// Output has no ITEM NO row, so items were left as copied.
    RenumberSkipped { segment: usize },
}

impl fmt::Display for SplitWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedHeader { segment, header_start } => write!(
                f,
                "table {}: no ITEM NO. header row, using row {} as header end",
                segment + 1,
                header_start + 1
            ),
            Self::HeaderEndRepaired { segment, header_end } => write!(
                f,
                "table {}: header rows out of order, using row {header_end} as header end",
                segment + 1
            ),
            Self::ContinuationNotFound { segment, expected: Some(n), fallback_row } => write!(
                f,
                "table {}: item {n} not found, data starts at row {fallback_row}",
                segment + 1
            ),
            Self::ContinuationNotFound { segment, expected: None, fallback_row } => write!(
                f,
                "table {}: previous table has no item numbers, data starts at row {fallback_row}",
                segment + 1
            ),
            Self::MergeDropped { segment, region, reason } => {
                write!(f, "table {}: merge {} dropped ({reason})", segment + 1, region.a1())
            }
            Self::RenumberSkipped { segment } => {
                write!(f, "table {}: no ITEM NO row in output, items not renumbered", segment + 1)
            }
        }
    }
}
