//! File-level splitting: load, plan, save one xlsx per table.

use std::path::{Path, PathBuf};

use sheetcut_engine::naming::output_path;
use sheetcut_engine::{split_grid, SplitError, SplitOptions, SplitWarning};

use crate::xlsx;

/// Paths written by a split plus the soft problems met along the way.
#[derive(Debug, Clone, Default)]
pub struct SplitReport {
    pub paths: Vec<PathBuf>,
    pub warnings: Vec<SplitWarning>,
    /// Renumbered item count per output (None when an output had no ITEM NO row)
    pub item_counts: Vec<Option<usize>>,
}

/// Split `input` into one file per table, named from `output_prefix`
/// (A, B, C, ... inserted per the naming rule). `split_size` is accepted for
/// compatibility with older callers and ignored.
pub fn split(input: &Path, output_prefix: &Path, split_size: usize) -> Result<Vec<PathBuf>, SplitError> {
    log::trace!("split_size {} ignored", split_size);
    split_with_report(input, output_prefix, &SplitOptions::default()).map(|report| report.paths)
}

pub fn split_with_report(
    input: &Path,
    output_prefix: &Path,
    options: &SplitOptions,
) -> Result<SplitReport, SplitError> {
    let (source, import) = xlsx::import(input)?;
    log::info!("loaded {}: {}", input.display(), import.summary());
    for feature in &import.unsupported {
        log::debug!("{}: {}", input.display(), feature);
    }

    let plan = split_grid(&source, options)?;
    for warning in &plan.warnings {
        log::warn!("{}: {}", input.display(), warning);
    }

    let mut report = SplitReport { warnings: plan.warnings, ..Default::default() };
    for (index, output) in plan.outputs.iter().enumerate() {
        let path = output_path(output_prefix, index);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .map_err(|e| SplitError::Io(format!("Failed to create {}: {}", dir.display(), e)))?;
        }
        let written = xlsx::export(&output.grid, &path)?;
        log::info!(
            "table {} ({} rows {}-{}) -> {} [{} cells, {} merges]",
            output.letter,
            output.grid.max_row(),
            output.data_start_row,
            output.segment.end_row,
            path.display(),
            written.cells_exported,
            written.merges_exported,
        );
        report.paths.push(path);
        report.item_counts.push(output.item_count);
    }

    Ok(report)
}
