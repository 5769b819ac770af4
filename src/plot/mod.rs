//! Regulation chart: data preparation and PNG rendering.
//!
//! The chart is data-driven: `RegulationChart::build` computes every series,
//! bound and tick up front, and `chart::render_png` only draws. This keeps the
//! math testable without a font stack or a bitmap on disk.
//!
//! X values are hours since the window start; tick labels map them back to CET.
//! Down-regulation is always drawn negated (a deviation below zero), while the
//! CSV and summary keep the raw positive volume.

use std::path::Path;

use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;

use crate::domain::{ActivationRow, ImbalanceRow, NormalizedSeries, TimeWindow};
use crate::error::RenderError;

pub mod chart;

/// Physical figure size.
pub const FIGURE_WIDTH_CM: f64 = 38.0;
pub const FIGURE_HEIGHT_CM: f64 = 20.0;
pub const DEFAULT_DPI: u32 = 300;
pub const DEFAULT_CHART_PATH: &str = "baltic_regulation_analysis.png";

const TICK_FORMAT: &str = "%Y-%m-%d %H:%M";
const Y_PADDING: f64 = 0.05;

/// Everything needed to draw one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct RegulationChart {
    /// Window start; x = 0.
    pub origin: DateTime<Tz>,
    pub imbalance: Vec<(f64, f64)>,
    pub up_regulation: Vec<(f64, f64)>,
    /// Negated down-regulation.
    pub down_regulation: Vec<(f64, f64)>,
    /// `[0, window length in hours]`.
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    /// One major tick per CET day.
    pub x_ticks: Vec<f64>,
}

impl RegulationChart {
    pub fn build(
        window: &TimeWindow,
        imbalance: &NormalizedSeries<ImbalanceRow>,
        activation: &NormalizedSeries<ActivationRow>,
    ) -> Result<Self, RenderError> {
        let origin = window.start();

        let imbalance_line: Vec<(f64, f64)> = imbalance
            .rows
            .iter()
            .map(|r| (hours_since(origin, r.timestamp), r.baltic_imbalance))
            .collect();
        let up_line: Vec<(f64, f64)> = activation
            .rows
            .iter()
            .map(|r| (hours_since(origin, r.timestamp), r.up_regulation))
            .collect();
        let down_line: Vec<(f64, f64)> = activation
            .rows
            .iter()
            .map(|r| (hours_since(origin, r.timestamp), -r.down_regulation))
            .collect();

        let (y_min, y_max) = y_range(&[
            imbalance_line.as_slice(),
            up_line.as_slice(),
            down_line.as_slice(),
        ])
        .ok_or(RenderError::NoData)?;
        let (y_min, y_max) = pad_range(y_min.min(0.0), y_max.max(0.0), Y_PADDING);

        let x_ticks = window
            .day_ticks()
            .into_iter()
            .map(|tick| hours_since(origin, tick))
            .collect();

        Ok(Self {
            origin,
            imbalance: imbalance_line,
            up_regulation: up_line,
            down_regulation: down_line,
            x_bounds: [0.0, hours_since(origin, window.end())],
            y_bounds: [y_min, y_max],
            x_ticks,
        })
    }

    /// CET label for an x value.
    pub fn tick_label(&self, hours: f64) -> String {
        let minutes = (hours * 60.0).round() as i64;
        (self.origin + TimeDelta::minutes(minutes))
            .format(TICK_FORMAT)
            .to_string()
    }
}

/// Build and draw the chart to `path`.
pub fn render_regulation_chart(
    path: &Path,
    dpi: u32,
    window: &TimeWindow,
    imbalance: &NormalizedSeries<ImbalanceRow>,
    activation: &NormalizedSeries<ActivationRow>,
) -> Result<(), RenderError> {
    let chart = RegulationChart::build(window, imbalance, activation)?;
    chart::render_png(&chart, path, dpi)
}

/// Pixel size of the figure at `dpi`.
pub fn figure_pixels(dpi: u32) -> (u32, u32) {
    let px = |cm: f64| (cm / 2.54 * f64::from(dpi)).round() as u32;
    (px(FIGURE_WIDTH_CM), px(FIGURE_HEIGHT_CM))
}

fn hours_since(origin: DateTime<Tz>, ts: DateTime<Tz>) -> f64 {
    (ts - origin).num_seconds() as f64 / 3600.0
}

fn y_range(series: &[&[(f64, f64)]]) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &(_, y) in series.iter().flat_map(|s| s.iter()) {
        if y.is_finite() {
            min = min.min(y);
            max = max.max(y);
        }
    }
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = max - min;
    if span.abs() < 1e-12 {
        return (min - 1.0, max + 1.0);
    }
    (min - span * frac, max + span * frac)
}
