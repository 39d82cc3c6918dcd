//! Least squares solvers.
//!
//! Every fitting routine in this crate reduces, at some point, to an ordinary
//! least squares problem on a small dense design matrix:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - We solve via SVD so tall systems (many more rows than columns) work
//!   directly, and near-collinear columns degrade gracefully. Vandermonde
//!   designs for higher polynomial degrees are the main offenders here.
//! - Nalgebra's `QR::solve` targets square systems and will panic on tall
//!   matrices, so it is not an option.
//! - Parameter dimensions are tiny (2–25 columns), so SVD cost is irrelevant.

use nalgebra::{DMatrix, DVector};

use crate::domain::LinearSegment;
use crate::error::AppError;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances before giving up; high-degree
    // polynomial columns on narrow x-ranges are nearly collinear.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit a straight line `y = slope * x + intercept` by OLS.
///
/// Needs at least 2 points (with at least 2 distinct x values to be
/// well-posed; a degenerate x column surfaces as a numeric error).
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<LinearSegment, AppError> {
    if x.len() != y.len() {
        return Err(AppError::numeric("fit_line called with mismatched lengths."));
    }
    if x.len() < 2 {
        return Err(AppError::insufficient(format!(
            "Need at least 2 points for a linear fit, got {}.",
            x.len()
        )));
    }

    let n = x.len();
    let mut design = DMatrix::<f64>::zeros(n, 2);
    for (i, &xi) in x.iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = xi;
    }
    let rhs = DVector::from_column_slice(y);

    let beta = solve_least_squares(&design, &rhs)
        .ok_or_else(|| AppError::numeric("Linear fit is singular (degenerate x values?)."))?;

    Ok(LinearSegment {
        intercept: beta[0],
        slope: beta[1],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn fit_line_exact_on_two_points() {
        let seg = fit_line(&[1.0, 3.0], &[2.0, 8.0]).unwrap();
        assert!((seg.slope - 3.0).abs() < 1e-10);
        assert!((seg.intercept + 1.0).abs() < 1e-10);
    }

    #[test]
    fn fit_line_rejects_single_point() {
        let err = fit_line(&[1.0], &[2.0]).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
