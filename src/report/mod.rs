//! End-of-run reporting.
//!
//! Formatting lives in one place so output changes stay localized and the
//! pipeline code never builds strings for humans.

pub mod format;

pub use format::*;
