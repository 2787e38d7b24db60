//! Image stamper: anchors a stamp picture a few rows above the last used row.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sheetcut_engine::grid::{col_to_letter, ImagePlacement};
use sheetcut_engine::{Grid, SplitError};

use crate::{xlsx, StepOutcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StampOptions {
    pub width_px: u32,
    pub height_px: u32,
    /// Anchor row = last used row minus this (never above row 1)
    pub rows_above_last: u32,
    /// 1-based anchor column (5 = E)
    pub column: u32,
}

impl Default for StampOptions {
    fn default() -> Self {
        Self { width_px: 180, height_px: 126, rows_above_last: 4, column: 5 }
    }
}

pub fn stamp(path: &Path, image: &Path) -> StepOutcome {
    stamp_with(path, image, &StampOptions::default())
}

pub fn stamp_with(path: &Path, image: &Path, options: &StampOptions) -> StepOutcome {
    if !image.exists() {
        return StepOutcome::failed(SplitError::MissingResource(image.to_path_buf()).to_string());
    }

    let (mut grid, _) = match xlsx::import(path) {
        Ok(loaded) => loaded,
        Err(e) => return StepOutcome::failed(e.to_string()),
    };

    let placement = place_stamp(&grid, image, options);
    let anchor = format!("{}{}", col_to_letter(placement.col), placement.row);
    grid.images.push(placement);

    match xlsx::export(&grid, path) {
        Ok(_) => StepOutcome::ok(format!("stamped at {}", anchor)),
        Err(e) => StepOutcome::failed(e.to_string()),
    }
}

/// Anchor for the stamp: `rows_above_last` rows above the last row holding a value.
pub fn place_stamp(grid: &Grid, image: &Path, options: &StampOptions) -> ImagePlacement {
    let last = grid.last_value_row().unwrap_or(1);
    ImagePlacement {
        path: image.to_path_buf(),
        row: last.saturating_sub(options.rows_above_last).max(1),
        col: options.column.max(1),
        width_px: options.width_px,
        height_px: options.height_px,
    }
}
