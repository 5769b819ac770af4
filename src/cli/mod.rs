//! Command-line parsing for the Baltic regulation analysis tool.
//!
//! The goal of this module is to keep **argument parsing** and **prompting**
//! separate from fetching and analysis.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::data::DEFAULT_BASE_URL;
use crate::io::DEFAULT_CSV_PATH;
use crate::plot::{DEFAULT_CHART_PATH, DEFAULT_DPI};

pub mod prompt;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "baltic-regulation",
    version,
    about = "Baltic imbalance vs. regulation activation analysis"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyse one fixed window and exit.
    ///
    /// Without `--start`/`--end` the window is 2024-09-23 00:00 to 2024-09-29 00:00 CET.
    Run(RunArgs),
    /// Prompt for a window, analyse it, and offer to analyse another.
    Interactive(OutputArgs),
}

/// Options for a single fixed-window run.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Window start in CET (YYYY-MM-DD HH:MM).
    #[arg(long, value_name = "DATETIME")]
    pub start: Option<String>,

    /// Window end in CET (YYYY-MM-DD HH:MM), exclusive.
    #[arg(long, value_name = "DATETIME")]
    pub end: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Options shared by every command.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Export endpoint of the transparency dashboard API.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Where to write the joined analysis table.
    #[arg(long, default_value = DEFAULT_CSV_PATH)]
    pub csv: PathBuf,

    /// Where to write the chart (PNG).
    #[arg(long, default_value = DEFAULT_CHART_PATH)]
    pub chart: PathBuf,

    /// Chart resolution (dots per inch) for the fixed 38x20 cm figure.
    #[arg(long, default_value_t = DEFAULT_DPI)]
    pub dpi: u32,

    /// Number of first/last records shown for each normalized series.
    #[arg(long, default_value_t = 5)]
    pub preview: usize,
}
