//! Fitting routines, one module per calibration model family.
//!
//! Shared shape: each `fit_*` function takes a `Dataset` (plus options),
//! validates it, solves the underlying least-squares problem(s), and returns a
//! fitted model together with `FitQuality` computed on the data it was fit on.
//! Nonlinear parameters are handled by deterministic grid search, never by an
//! iterative optimizer.

pub mod compare;
pub mod dielectric;
pub mod forest;
pub mod gam;
pub mod logarithmic;
pub mod piecewise;
pub mod polynomial;
pub mod power;
pub mod spline;

pub use compare::*;
pub use dielectric::*;
pub use forest::*;
pub use gam::*;
pub use logarithmic::*;
pub use piecewise::*;
pub use polynomial::*;
pub use power::*;
pub use spline::*;
