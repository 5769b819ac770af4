//! Export the joined analysis table to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! the CET timestamp leads, followed by the raw readings, the derived metrics and
//! two calendar columns for grouping by hour or day.

use std::path::Path;

use serde::Serialize;

use crate::domain::AnalysisRow;
use crate::error::ExportError;

pub const DEFAULT_CSV_PATH: &str = "regulation_analysis.csv";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

#[derive(Debug, Serialize)]
struct CsvRow {
    timestamp: String,
    baltic_imbalance: f64,
    up_regulation: f64,
    down_regulation: f64,
    imbalance_magnitude: f64,
    regulation_magnitude: f64,
    appropriate_regulation: bool,
    hour: u32,
    day: String,
}

impl From<&AnalysisRow> for CsvRow {
    fn from(row: &AnalysisRow) -> Self {
        Self {
            timestamp: row.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            baltic_imbalance: row.baltic_imbalance,
            up_regulation: row.up_regulation,
            down_regulation: row.down_regulation,
            imbalance_magnitude: row.imbalance_magnitude,
            regulation_magnitude: row.regulation_magnitude,
            appropriate_regulation: row.appropriate_regulation,
            hour: row.hour(),
            day: row.day().to_string(),
        }
    }
}

/// Write the joined table to `path`, overwriting any existing file.
pub fn write_analysis_csv(path: &Path, rows: &[AnalysisRow]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;

    for row in rows {
        writer
            .serialize(CsvRow::from(row))
            .map_err(|source| ExportError::Write {
                path: path.to_path_buf(),
                source,
            })?;
    }

    writer.flush().map_err(|source| ExportError::Flush {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
