//! Core

#[macro_use]
extern crate hexf;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

// Re-export.
pub mod app;
pub mod geometry;
pub mod pbrt;
pub mod rng;
pub mod sampler;
pub mod sampling;
pub mod spectrum;
pub mod stats;
