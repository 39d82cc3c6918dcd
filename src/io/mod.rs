//! Output files.
//!
//! - fitted-model JSON (`export`)
//! - piecewise `coefficients.txt`

pub mod export;

pub use export::*;
