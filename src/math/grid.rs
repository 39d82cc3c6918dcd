//! Candidate grid generation.
//!
//! Nonlinear parameters (the power-law exponent, the GAM smoothing parameter)
//! are searched over deterministic grids instead of running an iterative
//! optimizer:
//!
//! - no local-minima surprises on small noisy calibration sets
//! - identical output for identical inputs/flags
//! - with one nonlinear parameter, a modest grid is plenty

use crate::error::AppError;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(AppError::input(format!(
            "Invalid grid range: min={min}, max={max} (must be finite, >0, and max>min)."
        )));
    }
    if steps < 2 {
        return Err(AppError::input("Grid steps must be >= 2."));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
pub fn lin_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(AppError::input(format!(
            "Invalid grid range: min={min}, max={max} (must be finite and max>min)."
        )));
    }
    if steps < 2 {
        return Err(AppError::input("Grid steps must be >= 2."));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    Ok((0..steps).map(|i| min + step * i as f64).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(0.1, 10.0, 5).unwrap();
        assert!((v[0] - 0.1).abs() < 1e-12);
        assert!((v[v.len() - 1] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn lin_space_is_even() {
        let v = lin_space(0.0, 1.0, 5).unwrap();
        assert_eq!(v.len(), 5);
        assert!((v[1] - 0.25).abs() < 1e-12);
        assert!((v[4] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn log_space_rejects_nonpositive_min() {
        let err = log_space(0.0, 1.0, 5).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
