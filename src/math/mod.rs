//! Mathematical utilities: least squares, grids, summary stats, spline basis.

pub mod basis;
pub mod grid;
pub mod ols;
pub mod stats;

pub use basis::*;
pub use grid::*;
pub use ols::*;
pub use stats::*;
