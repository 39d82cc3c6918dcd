//! Shared domain types: datasets, fit quality, and the exported calibration file.

pub mod types;

pub use types::*;
