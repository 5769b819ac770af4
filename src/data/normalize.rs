//! Turn a raw `data.timeseries` payload into a CET-indexed table.
//!
//! The table is clipped to the exact requested window (the fetch padding is
//! dropped here), sorted ascending and carries one row per timestamp.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::{CIVIL_TZ, NormalizedSeries, RawPayload, SeriesRow, TimeWindow};
use crate::error::NormalizeError;

/// Offset-aware layouts accepted besides RFC 3339. A trailing `Z` is rewritten
/// to `+00:00` before these are tried.
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Normalize one series payload for `window`.
///
/// Pure: the output depends only on `data` and `window`.
pub fn normalize<R: SeriesRow>(
    data: &Value,
    window: &TimeWindow,
) -> Result<NormalizedSeries<R>, NormalizeError> {
    let series = R::KIND.display_name();
    let needed = R::KIND.value_count();

    let payload = RawPayload::deserialize(data).map_err(|e| NormalizeError::Malformed {
        series,
        message: e.to_string(),
    })?;

    if payload.timeseries.is_empty() {
        return Err(NormalizeError::EmptyPayload { series });
    }

    let mut rows = Vec::with_capacity(payload.timeseries.len());
    let mut skipped_null = 0usize;

    for (index, point) in payload.timeseries.iter().enumerate() {
        let timestamp = parse_timestamp(&point.from)
            .ok_or_else(|| NormalizeError::Timestamp {
                series,
                index,
                raw: point.from.clone(),
            })?
            .with_timezone(&CIVIL_TZ);

        if !window.contains(&timestamp) {
            continue;
        }

        if point.values.len() < needed {
            return Err(NormalizeError::Shape {
                series,
                index,
                expected: needed,
                found: point.values.len(),
            });
        }

        match R::from_values(timestamp, &point.values) {
            Some(row) => rows.push(row),
            None => skipped_null += 1,
        }
    }

    if skipped_null > 0 {
        debug!(series, skipped_null, "skipped points without a reading");
    }

    // Stable sort, so dedup keeps the first occurrence of a timestamp.
    rows.sort_by_key(R::timestamp);
    let before = rows.len();
    rows.dedup_by_key(|row| row.timestamp());
    if rows.len() < before {
        debug!(series, dropped = before - rows.len(), "dropped duplicate timestamps");
    }

    Ok(NormalizedSeries { rows })
}

/// Parse an offset-aware `from` timestamp. Timestamps without an offset are rejected.
fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }

    let normalized = match raw.strip_suffix('Z').or_else(|| raw.strip_suffix('z')) {
        Some(head) => format!("{head}+00:00"),
        None => raw.to_string(),
    };

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(&normalized, fmt).ok())
}
