//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - canonical records (`SeriesMetadata`, `ObservationRecord`)
//! - per-series run bookkeeping (`SeriesState`, `SeriesOutcome`)
//! - run-level aggregates (`RunSummary`, `UpsertCounts`, `TransformStats`)

pub mod types;

pub use types::*;
