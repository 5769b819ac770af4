//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fetch/analysis code stays free of presentation details
//! - output changes are localized (important for snapshot-style tests)

use crate::domain::{NormalizedSeries, RegulationSummary, SeriesRow, TimeWindow};

const BANNER_FORMAT: &str = "%Y-%m-%d %H:%M %Z";
const ROW_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// Tool title shown before each run.
pub fn format_title() -> String {
    "\nBaltic Regulation Analysis Tool\n===============================".to_string()
}

/// The requested window in CET.
pub fn format_window(window: &TimeWindow) -> String {
    format!(
        "\nAnalysis period (CET):\nFrom: {}\nTo: {}",
        window.start().format(BANNER_FORMAT),
        window.end().format(BANNER_FORMAT)
    )
}

/// Bounds plus the first and last `n` rows of a normalized series.
pub fn format_series_preview<R: SeriesRow>(series: &NormalizedSeries<R>, n: usize) -> String {
    let mut out = String::new();
    let name = R::KIND.display_name();

    out.push_str(&format!("\n{name} series processed:\n"));
    match (series.first_timestamp(), series.last_timestamp()) {
        (Some(first), Some(last)) => {
            out.push_str(&format!("Start time: {}\n", first.format(ROW_TIME_FORMAT)));
            out.push_str(&format!("End time: {}\n", last.format(ROW_TIME_FORMAT)));
        }
        _ => out.push_str("Start time: -\nEnd time: -\n"),
    }

    let head_len = n.min(series.rows.len());
    let tail_start = series.rows.len().saturating_sub(n);

    out.push_str("\nFirst records:\n");
    out.push_str(&format_rows(&series.rows[..head_len]));
    out.push_str("\nLast records:\n");
    out.push_str(&format_rows(&series.rows[tail_start..]));

    out
}

fn format_rows<R: SeriesRow>(rows: &[R]) -> String {
    let mut out = String::new();

    let names: Vec<&str> = match rows.first() {
        Some(row) => row.columns().iter().map(|(name, _)| *name).collect(),
        None => return "(empty)\n".to_string(),
    };

    out.push_str(&format!("{:<25}", "timestamp"));
    for name in &names {
        out.push_str(&format!(" {name:>16}"));
    }
    out.push('\n');

    for row in rows {
        let ts = row.timestamp().format(ROW_TIME_FORMAT).to_string();
        out.push_str(&format!("{ts:<25}"));
        for (_, value) in row.columns() {
            out.push_str(&format!(" {value:>16.2}"));
        }
        out.push('\n');
    }

    out
}

/// Regulation, power and energy metrics.
pub fn format_summary(summary: &RegulationSummary) -> String {
    let mut out = String::new();

    out.push_str("\nRegulation Analysis:\n");
    out.push_str(&format!(
        "Analysis period: {} to {}\n",
        summary.period_start.format(ROW_TIME_FORMAT),
        summary.period_end.format(ROW_TIME_FORMAT)
    ));
    out.push_str(&format!("Time period analyzed: {} hours\n", summary.total_periods));
    out.push_str(&format!(
        "Effective regulation periods: {} hours\n",
        summary.effective_periods
    ));
    out.push_str(&format!(
        "Regulation effectiveness: {:.2}%\n",
        summary.effectiveness_pct
    ));

    out.push_str("\nPower Metrics (MW):\n");
    out.push_str(&format!(
        "Average imbalance: {:.2} MW\n",
        summary.mean_imbalance
    ));
    out.push_str(&format!(
        "Average imbalance magnitude: {:.2} MW\n",
        summary.mean_imbalance_magnitude
    ));
    out.push_str(&format!("Maximum imbalance: {:.2} MW\n", summary.max_imbalance));
    out.push_str(&format!("Minimum imbalance: {:.2} MW\n", summary.min_imbalance));
    out.push_str(&format!(
        "Average regulation magnitude: {:.2} MW\n",
        summary.mean_regulation_magnitude
    ));

    out.push_str("\nEnergy Metrics (MWh):\n");
    out.push_str(&format!(
        "Total imbalance energy: {:.2} MWh\n",
        summary.total_imbalance_energy
    ));
    out.push_str(&format!(
        "Total regulation energy: {:.2} MWh\n",
        summary.total_regulation_energy
    ));

    out
}
