//! Calibration model representation and evaluation.

pub mod model;

pub use model::*;
