//! Shared domain types.
//!
//! Everything here is request-scoped: built at the start of a run, kept in memory
//! while the run lasts and dropped once the CSV and chart are written.

use chrono::{DateTime, NaiveDate, Timelike};
use chrono_tz::Tz;
use serde::Deserialize;

/// The two upstream datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    Imbalance,
    Activation,
}

impl SeriesKind {
    /// Export API `id` parameter.
    pub fn api_id(self) -> &'static str {
        match self {
            SeriesKind::Imbalance => "imbalance_volumes",
            SeriesKind::Activation => "normal_activations_total",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SeriesKind::Imbalance => "Imbalance",
            SeriesKind::Activation => "Activation",
        }
    }

    /// Number of leading `values` entries a point must carry.
    pub fn value_count(self) -> usize {
        match self {
            SeriesKind::Imbalance => 1,
            SeriesKind::Activation => 2,
        }
    }
}

/// One `{from, to, values}` record from `data.timeseries`.
///
/// Timestamps stay as strings until normalization so that a bad value can be
/// reported with its index. `null` readings deserialize as `None`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawSeriesPoint {
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    pub values: Vec<Option<f64>>,
}

/// The `data` object of an export response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPayload {
    pub timeseries: Vec<RawSeriesPoint>,
}

/// A normalized row: a CET timestamp plus the series' value columns.
pub trait SeriesRow: Sized {
    const KIND: SeriesKind;

    fn timestamp(&self) -> DateTime<Tz>;

    /// Build a row from the leading `values` entries.
    ///
    /// `values` is guaranteed to hold at least `KIND.value_count()` entries.
    /// Returns `None` when a required reading is missing.
    fn from_values(timestamp: DateTime<Tz>, values: &[Option<f64>]) -> Option<Self>;

    /// Value columns as `(name, value)` pairs, for previews.
    fn columns(&self) -> Vec<(&'static str, f64)>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImbalanceRow {
    pub timestamp: DateTime<Tz>,
    pub baltic_imbalance: f64,
}

impl SeriesRow for ImbalanceRow {
    const KIND: SeriesKind = SeriesKind::Imbalance;

    fn timestamp(&self) -> DateTime<Tz> {
        self.timestamp
    }

    fn from_values(timestamp: DateTime<Tz>, values: &[Option<f64>]) -> Option<Self> {
        Some(Self {
            timestamp,
            baltic_imbalance: values.first().copied().flatten()?,
        })
    }

    fn columns(&self) -> Vec<(&'static str, f64)> {
        vec![("baltic_imbalance", self.baltic_imbalance)]
    }
}

/// Activation volumes: index 0 is upward, index 1 downward regulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivationRow {
    pub timestamp: DateTime<Tz>,
    pub up_regulation: f64,
    pub down_regulation: f64,
}

impl SeriesRow for ActivationRow {
    const KIND: SeriesKind = SeriesKind::Activation;

    fn timestamp(&self) -> DateTime<Tz> {
        self.timestamp
    }

    fn from_values(timestamp: DateTime<Tz>, values: &[Option<f64>]) -> Option<Self> {
        Some(Self {
            timestamp,
            up_regulation: values.first().copied().flatten()?,
            down_regulation: values.get(1).copied().flatten()?,
        })
    }

    fn columns(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("up_regulation", self.up_regulation),
            ("down_regulation", self.down_regulation),
        ]
    }
}

/// Rows sorted ascending by timestamp, unique timestamps, all inside one window.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries<R> {
    pub rows: Vec<R>,
}

impl<R: SeriesRow> NormalizedSeries<R> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Tz>> {
        self.rows.first().map(R::timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Tz>> {
        self.rows.last().map(R::timestamp)
    }
}

/// One joined hour: imbalance and activation sharing a timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisRow {
    pub timestamp: DateTime<Tz>,
    pub baltic_imbalance: f64,
    pub up_regulation: f64,
    pub down_regulation: f64,
    pub imbalance_magnitude: f64,
    pub regulation_magnitude: f64,
    pub appropriate_regulation: bool,
}

impl AnalysisRow {
    /// Join one imbalance and one activation reading and derive the metrics.
    pub fn from_pair(imbalance: &ImbalanceRow, activation: &ActivationRow) -> Self {
        let baltic_imbalance = imbalance.baltic_imbalance;
        let up_regulation = activation.up_regulation;
        let down_regulation = activation.down_regulation;

        // A surplus should be met with downward regulation and a deficit with
        // upward regulation. Zero imbalance never counts.
        let appropriate_regulation = (baltic_imbalance > 0.0 && down_regulation > 0.0)
            || (baltic_imbalance < 0.0 && up_regulation > 0.0);

        Self {
            timestamp: imbalance.timestamp,
            baltic_imbalance,
            up_regulation,
            down_regulation,
            imbalance_magnitude: baltic_imbalance.abs(),
            regulation_magnitude: up_regulation + down_regulation,
            appropriate_regulation,
        }
    }

    /// CET hour of day.
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    /// CET calendar date.
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Aggregates over the joined table.
///
/// Energy totals treat each row as one hour, so MW sums read as MWh.
#[derive(Debug, Clone, PartialEq)]
pub struct RegulationSummary {
    pub period_start: DateTime<Tz>,
    pub period_end: DateTime<Tz>,
    pub total_periods: usize,
    pub effective_periods: usize,
    pub effectiveness_pct: f64,
    pub mean_imbalance: f64,
    pub max_imbalance: f64,
    pub min_imbalance: f64,
    pub mean_imbalance_magnitude: f64,
    pub mean_regulation_magnitude: f64,
    pub total_imbalance_energy: f64,
    pub total_regulation_energy: f64,
}
