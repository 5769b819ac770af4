//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the requested analysis window (`TimeWindow`) in the CET civil zone
//! - the two upstream series (`SeriesKind`) and their normalized rows
//! - joined analysis rows and the run summary

pub mod types;
pub mod window;

pub use types::*;
pub use window::*;
