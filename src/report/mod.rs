//! Console reporting: window banner, series previews and the analysis summary.

pub mod format;

pub use format::*;
