//! `soil-calib` library crate.
//!
//! The binary (`soilcal`) is a thin wrapper around this library so that:
//!
//! - every fitting routine is testable without spawning processes
//! - modules are reusable (e.g., future logging daemon on the datalogger side)
//! - code stays easy to navigate as more sensor models get calibrated

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
