//! Data loading and splitting.
//!
//! - env-variable series ingest + validation (`env`)
//! - seeded train/test splitting (`split`)

pub mod env;
pub mod split;

pub use env::*;
pub use split::*;
