//! Terminal report formatting.
//!
//! Formatting lives in one place so the fitting code stays clean and the
//! output strings are easy to golden-test.

pub mod format;

pub use format::*;
