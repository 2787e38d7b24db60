//! `--export-dir`: copy every produced file into one directory.

use std::path::{Path, PathBuf};

use crate::batch::ProcessLog;
use crate::exit_codes;
use crate::CliError;

pub fn export_files(files: &[PathBuf], dir: &Path, log: &mut ProcessLog) -> Result<Vec<PathBuf>, CliError> {
    if files.is_empty() {
        log.line("Nothing to export");
        return Ok(Vec::new());
    }

    std::fs::create_dir_all(dir)
        .map_err(|e| CliError::io(format!("cannot create {}: {}", dir.display(), e)))?;

    log.line(format!("Exporting to {}", dir.display()));
    let mut exported = Vec::with_capacity(files.len());
    for (n, source) in files.iter().enumerate() {
        let Some(name) = source.file_name() else {
            continue;
        };
        let dest = dir.join(name);
        if dest == *source {
            // Already in place
            exported.push(dest);
            continue;
        }
        std::fs::copy(source, &dest).map_err(|e| CliError {
            code: exit_codes::EXIT_IO,
            message: format!("export of {} failed: {}", source.display(), e),
            hint: Some("files copied before the failure were kept".into()),
        })?;
        log.line(format!("  {}. {}", n + 1, name.to_string_lossy()));
        exported.push(dest);
    }
    log.line(format!("Exported {} file(s)", exported.len()));
    Ok(exported)
}
