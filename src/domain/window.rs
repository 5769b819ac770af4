//! The requested analysis window.
//!
//! All windowing happens in the CET civil zone (`chrono_tz::CET`, which follows
//! CEST in summer). The upstream API is queried in UTC with a few hours of
//! padding on each side; the padding never leaks into the analysed data because
//! normalization clips back to the exact window.

use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Civil zone for windowing, normalized timestamps and every output.
pub const CIVIL_TZ: Tz = chrono_tz::CET;

/// Operator-facing date-time pattern (`YYYY-MM-DD HH:MM`).
pub const INPUT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Wire format of `start_date` / `end_date` query parameters.
pub const API_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Hours added on each side of the window when querying the API.
pub const FETCH_PADDING_HOURS: i64 = 3;

/// Longest window accepted from interactive input.
pub const MAX_INTERACTIVE_SPAN_DAYS: i64 = 30;

/// Window used by `run` when no `--start`/`--end` is given.
pub const DEFAULT_FIXED_START: &str = "2024-09-23 00:00";
pub const DEFAULT_FIXED_END: &str = "2024-09-29 00:00";

/// Why an operator-supplied window was rejected.
///
/// The display strings are shown verbatim as re-prompt messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("Invalid date format. Please use YYYY-MM-DD HH:MM format.")]
    Format,
    #[error("{0} does not exist in CET (daylight saving change). Please try again.")]
    NonExistent(NaiveDateTime),
    #[error("End date must be after start date. Please try again.")]
    EndNotAfterStart,
    #[error("Time range cannot exceed 30 days. Please enter a closer date.")]
    SpanTooLong,
}

/// Half-open analysis window `[start, end)` in CET.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl TimeWindow {
    /// Build a window, requiring `start < end`.
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Result<Self, WindowError> {
        if end <= start {
            return Err(WindowError::EndNotAfterStart);
        }
        Ok(Self { start, end })
    }

    /// Build a window with the interactive-mode span limit applied.
    ///
    /// The span is elapsed time between the two instants, so a daylight saving
    /// change inside the window counts with its real length.
    pub fn bounded(start: DateTime<Tz>, end: DateTime<Tz>) -> Result<Self, WindowError> {
        let window = Self::new(start, end)?;
        if end - start > TimeDelta::days(MAX_INTERACTIVE_SPAN_DAYS) {
            return Err(WindowError::SpanTooLong);
        }
        Ok(window)
    }

    /// The window `run` uses when no flags are given.
    pub fn default_fixed() -> Result<Self, WindowError> {
        Self::new(parse_civil(DEFAULT_FIXED_START)?, parse_civil(DEFAULT_FIXED_END)?)
    }

    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.end
    }

    /// `start <= ts < end`, compared as instants.
    pub fn contains<Z: TimeZone>(&self, ts: &DateTime<Z>) -> bool {
        *ts >= self.start && *ts < self.end
    }

    /// `start_date` query value: window start minus padding, in UTC.
    pub fn fetch_start_utc(&self) -> String {
        (self.start - TimeDelta::hours(FETCH_PADDING_HOURS))
            .with_timezone(&Utc)
            .format(API_FORMAT)
            .to_string()
    }

    /// `end_date` query value: window end plus padding, in UTC.
    pub fn fetch_end_utc(&self) -> String {
        (self.end + TimeDelta::hours(FETCH_PADDING_HOURS))
            .with_timezone(&Utc)
            .format(API_FORMAT)
            .to_string()
    }

    /// CET midnights strictly inside `(start, end)`, preceded by `start` itself.
    ///
    /// Used as the chart's major ticks (one per day).
    pub fn day_ticks(&self) -> Vec<DateTime<Tz>> {
        let mut ticks = vec![self.start];
        let mut day = self.start.date_naive();
        loop {
            let Some(next) = day.succ_opt() else { break };
            day = next;
            let Some(midnight) = day
                .and_hms_opt(0, 0, 0)
                .and_then(|naive| CIVIL_TZ.from_local_datetime(&naive).earliest())
            else {
                continue;
            };
            if midnight >= self.end {
                break;
            }
            if midnight > self.start {
                ticks.push(midnight);
            }
        }
        ticks
    }
}

/// Parse `YYYY-MM-DD HH:MM` as a CET wall-clock time.
///
/// Ambiguous times (autumn fall-back) resolve to the earlier instant; times
/// skipped by the spring-forward gap are rejected.
pub fn parse_civil(input: &str) -> Result<DateTime<Tz>, WindowError> {
    let naive =
        NaiveDateTime::parse_from_str(input.trim(), INPUT_FORMAT).map_err(|_| WindowError::Format)?;
    CIVIL_TZ
        .from_local_datetime(&naive)
        .earliest()
        .ok_or(WindowError::NonExistent(naive))
}
