//! Upstream data: the transparency dashboard export API and payload normalization.

pub mod normalize;
pub mod transparency;

pub use normalize::normalize;
pub use transparency::{DEFAULT_BASE_URL, TransparencyClient};
