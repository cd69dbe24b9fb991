//! Sampling

mod cdf;

// Re-export
pub use cdf::*;
