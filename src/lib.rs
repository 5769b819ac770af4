//! `baltic-regulation` library crate.
//!
//! The binary is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes
//! - fetch, normalization, analysis and rendering can be reused on their own
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
