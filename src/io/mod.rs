//! Output files.
//!
//! - joined analysis table to CSV (`export`)

pub mod export;

pub use export::*;
