//! Data acquisition.
//!
//! - FRED observations client + the `SeriesSource` seam (`fred`)
//! - built-in registry of tracked series (`registry`)

pub mod fred;
pub mod registry;

pub use fred::*;
pub use registry::*;
