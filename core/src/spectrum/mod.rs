//! Spectrum

mod rgb_spectrum;

// Re-export
pub use rgb_spectrum::*;

/// Closure weights are carried as RGB triples.
pub type Spectrum = RGBSpectrum;
