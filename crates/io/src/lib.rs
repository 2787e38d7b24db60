// File I/O: xlsx load/save plus the file-level workflow steps
// (split, print titles, stamp).

pub mod split;
pub mod stamp;
pub mod titles;
pub mod xlsx;
pub mod xlsx_styles;

use serde::Serialize;

pub use split::{split, split_with_report, SplitReport};
pub use stamp::{stamp, stamp_with, StampOptions};
pub use titles::{set_print_titles, set_print_titles_with, TitleOptions};

/// Result of a post-processing step on one output file. Steps report failure
/// here instead of returning `Err`, so a batch can log it and keep going.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub ok: bool,
    pub message: String,
}

impl StepOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { ok: true, message: message.into() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { ok: false, message: message.into() }
    }
}
