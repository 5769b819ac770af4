//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the analysis window (fixed or prompted)
//! - runs the fetch/analysis pipeline
//! - prints previews, the summary and the output locations

use std::io;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::prompt::InteractiveWindow;
use crate::cli::{Command, OutputArgs, RunArgs};
use crate::data::TransparencyClient;
use crate::error::AppError;
use crate::report::{format_series_preview, format_summary, format_title, format_window};

use self::pipeline::{PipelineConfig, RunReport, run_pipeline};
use self::window::{FixedWindow, WindowSource};

pub mod pipeline;
pub mod window;

/// Entry point for the `baltic-regulation` binary.
pub fn run() -> Result<(), AppError> {
    // A local `.env` may set `RUST_LOG`; a missing file is fine.
    dotenvy::dotenv().ok();
    init_tracing();

    // Bare `baltic-regulation` (or flags only) means the interactive loop.
    // Clap requires a subcommand name, so argv is rewritten before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Interactive(args) => handle_interactive(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("baltic_regulation=info"));

    // A second init (e.g. from tests) is harmless; keep the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.output);
    let mut source = FixedWindow::from_flags(args.start.as_deref(), args.end.as_deref())?;
    let client = TransparencyClient::new(config.base_url.clone())?;

    let window = source.resolve()?;
    println!("{}", format_title());
    println!("{}", format_window(&window));

    match run_pipeline(&client, &config, &window) {
        Ok(report) => {
            print_report(&report, &config);
            Ok(())
        }
        Err(e) => {
            println!("{e}");
            Err(AppError::new(4, e.to_string()))
        }
    }
}

fn handle_interactive(args: OutputArgs) -> Result<(), AppError> {
    let config = config_from_args(&args);
    let client = TransparencyClient::new(config.base_url.clone())?;
    let mut prompt = InteractiveWindow::new(io::stdin().lock(), io::stdout());

    loop {
        println!("{}", format_title());
        let window = prompt.resolve()?;
        println!("{}", format_window(&window));

        // A failed run is reported and the operator may try another window.
        match run_pipeline(&client, &config, &window) {
            Ok(report) => print_report(&report, &config),
            Err(e) => println!("{e}"),
        }

        if !prompt.ask_again()? {
            debug!("interactive session finished");
            return Ok(());
        }
    }
}

fn print_report(report: &RunReport, config: &PipelineConfig) {
    println!("{}", format_series_preview(&report.imbalance, config.preview_rows));
    println!("{}", format_series_preview(&report.activation, config.preview_rows));

    if let Ok(summary) = &report.summary {
        println!("{}", format_summary(summary));
    }

    match &report.export {
        Some(Ok(path)) => println!("Detailed analysis saved to {}", path.display()),
        Some(Err(e)) => println!("Error in regulation analysis: {e}"),
        None => println!("No overlapping timestamps; analysis CSV was not written."),
    }
    match &report.chart {
        Ok(path) => println!("Visualization saved to {}", path.display()),
        Err(e) => println!("Error creating visualization: {e}"),
    }
}

pub fn config_from_args(args: &OutputArgs) -> PipelineConfig {
    PipelineConfig {
        base_url: args.base_url.clone(),
        csv_path: args.csv.clone(),
        chart_path: args.chart.clone(),
        dpi: args.dpi,
        preview_rows: args.preview,
    }
}

/// Rewrite argv so the binary defaults to `interactive`.
///
/// Rules:
/// - `baltic-regulation`                  -> `baltic-regulation interactive`
/// - `baltic-regulation --csv out.csv`    -> `baltic-regulation interactive --csv out.csv`
/// - `--help/--version/-h/-V/help`        -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("interactive".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if matches!(arg1.as_str(), "run" | "interactive") {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "interactive".to_string());
        return argv;
    }

    argv
}
