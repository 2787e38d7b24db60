//! Print-title setter: marks the company header through the ITEM NO. row as
//! rows repeated at the top of every printed page.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sheetcut_engine::Grid;

use crate::{xlsx, StepOutcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleOptions {
    /// Only the first `scan_rows` rows are searched
    pub scan_rows: u32,
    /// Any of these (case-insensitive) marks the first title row
    pub start_markers: Vec<String>,
    /// A cell containing this marks the last title row
    pub end_marker: String,
    /// Rows added below the end row
    pub extra_rows: u32,
}

impl Default for TitleOptions {
    fn default() -> Self {
        Self {
            scan_rows: 20,
            start_markers: vec!["P&G".into(), "PROCTER & GAMBLE".into()],
            end_marker: "ITEM NO".into(),
            extra_rows: 0,
        }
    }
}

pub fn set_print_titles(path: &Path) -> StepOutcome {
    set_print_titles_with(path, &TitleOptions::default())
}

pub fn set_print_titles_with(path: &Path, options: &TitleOptions) -> StepOutcome {
    let (mut grid, _) = match xlsx::import(path) {
        Ok(loaded) => loaded,
        Err(e) => return StepOutcome::failed(e.to_string()),
    };

    let (start, end) = match find_title_rows(&grid, options) {
        Ok(rows) => rows,
        Err(msg) => return StepOutcome::failed(msg),
    };

    grid.print_title_rows = Some((start, end));
    match xlsx::export(&grid, path) {
        Ok(_) => StepOutcome::ok(format!("print titles set to ${}:${}", start, end)),
        Err(e) => StepOutcome::failed(e.to_string()),
    }
}

/// Locate the title rows; the error names whichever boundary is missing.
pub fn find_title_rows(grid: &Grid, options: &TitleOptions) -> Result<(u32, u32), String> {
    let markers: Vec<String> = options.start_markers.iter().map(|m| m.to_uppercase()).collect();
    let end_marker = options.end_marker.to_uppercase();
    let last = options.scan_rows.min(grid.max_row());

    let mut start = None;
    let mut end = None;
    for row in 1..=last {
        if start.is_none() {
            let text = grid.row_text(row).to_uppercase();
            if markers.iter().any(|m| text.contains(m.as_str())) {
                start = Some(row);
            }
        }
        if end.is_none() {
            let hit = (1..=grid.max_col())
                .any(|col| grid.value(row, col).display().to_uppercase().contains(&end_marker));
            if hit {
                end = Some(row);
            }
        }
        if start.is_some() && end.is_some() {
            break;
        }
    }

    match (start, end) {
        (Some(start), Some(end)) => {
            let end = end + options.extra_rows;
            Ok((start.min(end), start.max(end)))
        }
        (None, Some(_)) => Err("no print title start row (company header) found".into()),
        (Some(_), None) => Err(format!("no print title end row ({}) found", options.end_marker)),
        (None, None) => Err(format!(
            "no print title start row (company header) or end row ({}) found",
            options.end_marker
        )),
    }
}
