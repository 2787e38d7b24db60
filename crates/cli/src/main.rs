// sheetcut CLI - split multi-table purchase-order workbooks, set print titles, stamp

mod batch;
mod exit_codes;
mod export;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

use sheetcut_config::Settings;
use sheetcut_io::{set_print_titles_with, stamp_with, StepOutcome};

use batch::{BatchOptions, ProcessLog};
use exit_codes::{EXIT_CONFIG, EXIT_IO, EXIT_STEP_FAILED, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "sheetcut")]
#[command(about = "Split multi-table purchase-order workbooks into one file per table")]
#[command(version)]
struct Cli {
    /// More diagnostics on stderr (-v info, -vv debug)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split each input into one workbook per table, then set print titles and stamp
    #[command(after_help = "\
Output files are named from the input: the table letter goes before the last
space of the name, or at the end when there is none.

Examples:
  sheetcut split 'PO 4500123.xlsx'                 # -> 'POA 4500123.xlsx', 'POB 4500123.xlsx'
  sheetcut split *.xlsx --out-dir split/ --stamp pic/stamp.png
  sheetcut split po.xlsx --no-titles --no-stamp --json")]
    Split {
        /// Input .xlsx files, processed in order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory for split outputs (default: next to each input)
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Stamp image (overrides [stamp].image from settings)
        #[arg(long, value_name = "IMG", conflicts_with = "no_stamp")]
        stamp: Option<PathBuf>,

        /// Skip the stamp step
        #[arg(long)]
        no_stamp: bool,

        /// Skip the print-title step
        #[arg(long)]
        no_titles: bool,

        /// Copy every produced file into this directory when done
        #[arg(long, value_name = "DIR")]
        export_dir: Option<PathBuf>,

        /// Settings file (default: the user settings.toml)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Print a JSON report instead of the processing log
        #[arg(long)]
        json: bool,

        /// No processing log on stdout
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Mark the company header through the ITEM NO. row as print titles
    Titles {
        file: PathBuf,

        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Anchor a stamp image near the bottom of a workbook
    Stamp {
        file: PathBuf,

        /// Stamp image (default: [stamp].image from settings)
        #[arg(long, value_name = "IMG")]
        image: Option<PathBuf>,

        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Print the effective settings as TOML and the settings file path
    Config {
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Split {
            inputs,
            out_dir,
            stamp,
            no_stamp,
            no_titles,
            export_dir,
            config,
            json,
            quiet,
        } => cmd_split(inputs, out_dir, stamp, no_stamp, no_titles, export_dir, config, json, quiet),
        Commands::Titles { file, config } => cmd_titles(file, config),
        Commands::Stamp { file, image, config } => cmd_stamp(file, image, config),
        Commands::Config { config } => cmd_config(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Library `log` records are routed to stderr through the fmt subscriber.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    // Best-effort: a subscriber may already be installed
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Explicit --config files must parse; the implicit user file falls back to defaults.
fn load_settings(config: Option<&Path>) -> Result<Settings, CliError> {
    match config {
        Some(path) => Settings::load_from(path)
            .map_err(|e| CliError::config(e).with_hint("run `sheetcut config` to see the expected layout")),
        None => Ok(Settings::load()),
    }
}

fn require_file(path: &Path) -> Result<(), CliError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::args(format!("file not found: {}", path.display())))
    }
}

// ============================================================================
// split
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn cmd_split(
    inputs: Vec<PathBuf>,
    out_dir: Option<PathBuf>,
    stamp: Option<PathBuf>,
    no_stamp: bool,
    no_titles: bool,
    export_dir: Option<PathBuf>,
    config: Option<PathBuf>,
    json: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let settings = load_settings(config.as_deref())?;

    let stamp_image = if no_stamp { None } else { stamp.or(settings.stamp.image) };
    let options = BatchOptions {
        out_dir,
        split: settings.split,
        titles: (!no_titles).then_some(settings.titles),
        stamp: stamp_image.map(|image| (image, settings.stamp.placement)),
    };

    let mut log = ProcessLog::new(!json && !quiet);
    if options.stamp.is_none() && !no_stamp {
        log.line("No stamp image configured; stamping skipped");
    }
    let mut report = batch::run_batch(&inputs, &options, &mut log);

    if let Some(dir) = export_dir {
        report.exported = export::export_files(&report.output_paths(), &dir, &mut log)?;
    }

    if json {
        report.log = log.lines().to_vec();
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::io(format!("cannot serialize report: {}", e)))?;
        println!("{}", out);
    }

    if report.failed_inputs() > 0 {
        return Err(CliError {
            code: exit_codes::EXIT_SPLIT_FAILED,
            message: format!("{} of {} input(s) failed to split", report.failed_inputs(), report.inputs.len()),
            hint: None,
        });
    }
    Ok(())
}

// ============================================================================
// titles / stamp
// ============================================================================

fn step_result(outcome: StepOutcome) -> Result<(), CliError> {
    if outcome.ok {
        println!("{}", outcome.message);
        Ok(())
    } else {
        Err(CliError { code: EXIT_STEP_FAILED, message: outcome.message, hint: None })
    }
}

fn cmd_titles(file: PathBuf, config: Option<PathBuf>) -> Result<(), CliError> {
    require_file(&file)?;
    let settings = load_settings(config.as_deref())?;
    step_result(set_print_titles_with(&file, &settings.titles))
}

fn cmd_stamp(file: PathBuf, image: Option<PathBuf>, config: Option<PathBuf>) -> Result<(), CliError> {
    require_file(&file)?;
    let settings = load_settings(config.as_deref())?;
    let Some(image) = image.or(settings.stamp.image) else {
        return Err(CliError::args("no stamp image given")
            .with_hint("pass --image or set [stamp].image in settings.toml"));
    };
    let outcome = stamp_with(&file, &image, &settings.stamp.placement);
    if !outcome.ok && !image.exists() {
        return Err(CliError {
            code: exit_codes::EXIT_MISSING_RESOURCE,
            message: outcome.message,
            hint: None,
        });
    }
    step_result(outcome)
}

// ============================================================================
// config
// ============================================================================

fn cmd_config(config: Option<PathBuf>) -> Result<(), CliError> {
    let settings = load_settings(config.as_deref())?;
    let text = settings.to_toml().map_err(CliError::config)?;
    let path = config
        .map(|p| p.display().to_string())
        .unwrap_or_else(Settings::config_path_display);
    println!("# {}", path);
    print!("{}", text);
    Ok(())
}
