//! Join the two normalized series and aggregate regulation metrics.

use std::collections::BTreeMap;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::domain::{ActivationRow, AnalysisRow, ImbalanceRow, NormalizedSeries, RegulationSummary};
use crate::error::AnalysisError;

/// Inner join on timestamp.
///
/// Only hours present in both series survive, so the result never has more rows
/// than the shorter input. Output is ascending by timestamp.
pub fn merge(
    imbalance: &NormalizedSeries<ImbalanceRow>,
    activation: &NormalizedSeries<ActivationRow>,
) -> Vec<AnalysisRow> {
    let by_time: BTreeMap<DateTime<Tz>, &ActivationRow> =
        activation.rows.iter().map(|row| (row.timestamp, row)).collect();

    let mut rows: Vec<AnalysisRow> = imbalance
        .rows
        .iter()
        .filter_map(|imb| {
            by_time
                .get(&imb.timestamp)
                .map(|act| AnalysisRow::from_pair(imb, act))
        })
        .collect();
    rows.sort_by_key(|row| row.timestamp);
    rows
}

/// Summary statistics over the joined table.
///
/// An empty table has no effectiveness percentage; it is reported as
/// `AnalysisError::EmptyJoin` instead of dividing by zero.
pub fn summarize(rows: &[AnalysisRow]) -> Result<RegulationSummary, AnalysisError> {
    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return Err(AnalysisError::EmptyJoin);
    };

    let total_periods = rows.len();
    let n = total_periods as f64;
    let effective_periods = rows.iter().filter(|r| r.appropriate_regulation).count();

    let total_imbalance_energy: f64 = rows.iter().map(|r| r.imbalance_magnitude).sum();
    let total_regulation_energy: f64 = rows.iter().map(|r| r.regulation_magnitude).sum();
    let imbalance_sum: f64 = rows.iter().map(|r| r.baltic_imbalance).sum();

    let max_imbalance = rows
        .iter()
        .map(|r| r.baltic_imbalance)
        .fold(f64::NEG_INFINITY, f64::max);
    let min_imbalance = rows
        .iter()
        .map(|r| r.baltic_imbalance)
        .fold(f64::INFINITY, f64::min);

    Ok(RegulationSummary {
        period_start: first.timestamp,
        period_end: last.timestamp,
        total_periods,
        effective_periods,
        effectiveness_pct: effective_periods as f64 / n * 100.0,
        mean_imbalance: imbalance_sum / n,
        max_imbalance,
        min_imbalance,
        mean_imbalance_magnitude: total_imbalance_energy / n,
        mean_regulation_magnitude: total_regulation_energy / n,
        total_imbalance_energy,
        total_regulation_energy,
    })
}
