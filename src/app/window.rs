//! How a run gets its time window.
//!
//! The pipeline only ever sees a `TimeWindow`; the strategy that produced it is
//! chosen once in `app` (fixed for `run`, prompted for `interactive`).

use crate::domain::{TimeWindow, parse_civil};
use crate::error::AppError;

pub trait WindowSource {
    /// Produce the window for the next run.
    fn resolve(&mut self) -> Result<TimeWindow, AppError>;
}

/// A constant window.
#[derive(Debug, Clone, Copy)]
pub struct FixedWindow {
    window: TimeWindow,
}

impl FixedWindow {
    pub fn new(window: TimeWindow) -> Self {
        Self { window }
    }

    /// Default window with optional `--start`/`--end` overrides.
    ///
    /// Flags only need `start < end`; the 30-day limit applies to prompted input.
    pub fn from_flags(start: Option<&str>, end: Option<&str>) -> Result<Self, AppError> {
        let default = TimeWindow::default_fixed()?;
        let start = start.map(parse_civil).transpose()?.unwrap_or(default.start());
        let end = end.map(parse_civil).transpose()?.unwrap_or(default.end());
        Ok(Self::new(TimeWindow::new(start, end)?))
    }
}

impl WindowSource for FixedWindow {
    fn resolve(&mut self) -> Result<TimeWindow, AppError> {
        Ok(self.window)
    }
}
