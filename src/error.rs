//! Error types.
//!
//! `AppError` is the process-level error: it carries the exit code `main` returns.
//! Pipeline stages use their own typed errors so the caller can decide which
//! failures abort a run and which only skip an output.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::WindowError;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<WindowError> for AppError {
    fn from(e: WindowError) -> Self {
        AppError::new(2, e.to_string())
    }
}

/// Failure to obtain a series payload from the export API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for '{series}' failed: {source}")]
    Request {
        series: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("request for '{series}' failed with status {status}")]
    Status {
        series: &'static str,
        status: reqwest::StatusCode,
    },
    #[error("response for '{series}' is not valid JSON: {source}")]
    Decode {
        series: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("response for '{series}' has no top-level 'data' object")]
    MissingData { series: &'static str },
}

/// Structural problem in a raw timeseries payload.
#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("{series} payload is malformed: {message}")]
    Malformed { series: &'static str, message: String },
    #[error("{series} payload contains no timeseries points")]
    EmptyPayload { series: &'static str },
    #[error("{series} point {index} has an unreadable timestamp '{raw}'")]
    Timestamp {
        series: &'static str,
        index: usize,
        raw: String,
    },
    #[error("{series} point {index} has {found} value(s), expected at least {expected}")]
    Shape {
        series: &'static str,
        index: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("no timestamps are shared by the imbalance and activation series")]
    EmptyJoin,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to create '{}': {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to flush '{}': {source}", path.display())]
    Flush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("nothing to plot: all series are empty")]
    NoData,
    #[error("failed to draw chart '{}': {message}", path.display())]
    Draw { path: PathBuf, message: String },
}

/// Reasons a single run stops before producing any output.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to fetch data from one or both APIs: {0}")]
    Fetch(#[from] FetchError),
    #[error("No data available for processing: {0}")]
    Normalize(#[from] NormalizeError),
    #[error("No data available for processing: {series} series is empty in the requested window")]
    NoData { series: &'static str },
}
