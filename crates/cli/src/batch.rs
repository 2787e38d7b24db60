//! Batch orchestration: split each input, then set print titles and stamp
//! every produced file. Inputs run one after another; a failed input is
//! recorded and the batch moves on.

use std::path::{Path, PathBuf};

use serde::Serialize;
use sheetcut_engine::SplitOptions;
use sheetcut_io::{set_print_titles_with, split_with_report, stamp_with, StampOptions, StepOutcome, TitleOptions};

const RULE: &str = "==================================================";
const THIN_RULE: &str = "----------------------------------------";

/// The visible processing log. Lines go to stdout as they are produced
/// (unless muted) and are kept for the end-of-run report.
#[derive(Debug, Default)]
pub struct ProcessLog {
    echo: bool,
    lines: Vec<String>,
}

impl ProcessLog {
    pub fn new(echo: bool) -> Self {
        Self { echo, lines: Vec::new() }
    }

    pub fn line(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.echo {
            println!("{}", text);
        }
        self.lines.push(text);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

pub struct BatchOptions {
    /// Where split outputs go; None = next to each input
    pub out_dir: Option<PathBuf>,
    pub split: SplitOptions,
    /// None skips the print-title step
    pub titles: Option<TitleOptions>,
    /// None skips the stamp step
    pub stamp: Option<(PathBuf, StampOptions)>,
}

#[derive(Debug, Serialize)]
pub struct OutputReport {
    pub path: PathBuf,
    pub items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titles: Option<StepOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamp: Option<StepOutcome>,
}

#[derive(Debug, Serialize)]
pub struct InputReport {
    pub input: PathBuf,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub warnings: Vec<String>,
    pub outputs: Vec<OutputReport>,
}

#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub inputs: Vec<InputReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exported: Vec<PathBuf>,
    /// The processing log, for --json consumers
    pub log: Vec<String>,
}

impl BatchReport {
    pub fn failed_inputs(&self) -> usize {
        self.inputs.iter().filter(|i| !i.ok).count()
    }

    pub fn output_paths(&self) -> Vec<PathBuf> {
        self.inputs
            .iter()
            .flat_map(|i| i.outputs.iter().map(|o| o.path.clone()))
            .collect()
    }

    pub fn failed_steps(&self) -> usize {
        self.inputs
            .iter()
            .flat_map(|i| &i.outputs)
            .flat_map(|o| [&o.titles, &o.stamp])
            .filter(|step| matches!(step, Some(s) if !s.ok))
            .count()
    }

    pub fn summary(&self) -> String {
        let outputs = self.output_paths().len();
        let mut text = format!(
            "Done: {} input(s), {} output file(s)",
            self.inputs.len(),
            outputs
        );
        let failed = self.failed_inputs();
        if failed > 0 {
            text.push_str(&format!(", {} input(s) failed", failed));
        }
        let steps = self.failed_steps();
        if steps > 0 {
            text.push_str(&format!(", {} step(s) failed", steps));
        }
        text
    }
}

/// Output prefix for one input: `<out_dir or input dir>/<input stem>`.
pub fn output_prefix(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let stem = input.file_stem().map(|s| s.to_os_string()).unwrap_or_default();
    match out_dir {
        Some(dir) => dir.join(stem),
        None => input.with_file_name(stem),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn mark(outcome: &StepOutcome) -> &'static str {
    if outcome.ok {
        "ok"
    } else {
        "FAILED"
    }
}

pub fn run_batch(inputs: &[PathBuf], options: &BatchOptions, log: &mut ProcessLog) -> BatchReport {
    let mut report = BatchReport::default();
    log.line(RULE);
    log.line(format!("Batch: {} input file(s)", inputs.len()));

    for (n, input) in inputs.iter().enumerate() {
        log.line("");
        log.line(format!("[{}/{}] {}", n + 1, inputs.len(), file_name(input)));
        log.line(THIN_RULE);
        report.inputs.push(process_input(input, options, log));
    }

    log.line(RULE);
    log.line(report.summary());
    report
}

fn process_input(input: &Path, options: &BatchOptions, log: &mut ProcessLog) -> InputReport {
    let prefix = output_prefix(input, options.out_dir.as_deref());
    log::info!("splitting {} -> {}", input.display(), prefix.display());

    let split = match split_with_report(input, &prefix, &options.split) {
        Ok(split) => split,
        Err(e) => {
            log.line(format!("  split: FAILED {}", e));
            return InputReport {
                input: input.to_path_buf(),
                ok: false,
                error: Some(e.to_string()),
                warnings: Vec::new(),
                outputs: Vec::new(),
            };
        }
    };

    log.line(format!("  split: {} table(s)", split.paths.len()));
    let warnings: Vec<String> = split.warnings.iter().map(|w| w.to_string()).collect();
    for warning in &warnings {
        log.line(format!("  warning: {}", warning));
    }

    let mut outputs = Vec::with_capacity(split.paths.len());
    for (i, (path, items)) in split.paths.into_iter().zip(split.item_counts).enumerate() {
        let items_text = items.map(|n| format!("{} item(s)", n)).unwrap_or_else(|| "no items".into());
        log.line(format!("  [{}] {}  {}", i + 1, file_name(&path), items_text));

        let titles = options.titles.as_ref().map(|opts| set_print_titles_with(&path, opts));
        if let Some(outcome) = &titles {
            log.line(format!("      titles: {} {}", mark(outcome), outcome.message));
        }
        let stamp = options
            .stamp
            .as_ref()
            .map(|(image, opts)| stamp_with(&path, image, opts));
        if let Some(outcome) = &stamp {
            log.line(format!("      stamp:  {} {}", mark(outcome), outcome.message));
        }

        outputs.push(OutputReport { path, items, titles, stamp });
    }

    InputReport { input: input.to_path_buf(), ok: true, error: None, warnings, outputs }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_prefix() {
        assert_eq!(output_prefix(Path::new("in/PO 123.xlsx"), None), PathBuf::from("in/PO 123"));
        assert_eq!(
            output_prefix(Path::new("in/PO 123.xlsx"), Some(Path::new("out"))),
            PathBuf::from("out/PO 123")
        );
    }

    #[test]
    fn test_missing_input_recorded_and_batch_continues() {
        let temp_dir = tempfile::tempdir().unwrap();
        let inputs = vec![temp_dir.path().join("a.xlsx"), temp_dir.path().join("b.xlsx")];
        let options = BatchOptions {
            out_dir: None,
            split: SplitOptions::default(),
            titles: Some(TitleOptions::default()),
            stamp: None,
        };
        let mut log = ProcessLog::new(false);
        let report = run_batch(&inputs, &options, &mut log);

        assert_eq!(report.inputs.len(), 2);
        assert_eq!(report.failed_inputs(), 2);
        assert!(report.summary().contains("2 input(s) failed"));
        assert!(log.lines().iter().any(|l| l.contains("[2/2] b.xlsx")));
    }

    #[test]
    fn test_failed_steps_counted() {
        let report = BatchReport {
            inputs: vec![InputReport {
                input: "po.xlsx".into(),
                ok: true,
                error: None,
                warnings: Vec::new(),
                outputs: vec![OutputReport {
                    path: "POA.xlsx".into(),
                    items: Some(3),
                    titles: Some(StepOutcome::ok("print titles set to $1:$4")),
                    stamp: Some(StepOutcome::failed("stamp image not found: s.png")),
                }],
            }],
            exported: Vec::new(),
            log: Vec::new(),
        };
        assert_eq!(report.failed_steps(), 1);
        assert_eq!(report.summary(), "Done: 1 input(s), 1 output file(s), 1 step(s) failed");
    }
}
