//! Shading closures
//!
//! Flattens closure trees produced by a shading network into fixed-capacity
//! composites that a light transport integrator samples per shading point.

#[macro_use]
extern crate log;

mod builtin;
mod closure_id;
mod composite;
mod error;
mod flatten;
mod input_values;
mod params;
mod process;
mod registry;
mod tree;

// Re-export
pub use builtin::*;
pub use closure_id::*;
pub use composite::*;
pub use error::*;
pub use input_values::*;
pub use params::*;
pub use process::*;
pub use registry::*;
pub use tree::*;
