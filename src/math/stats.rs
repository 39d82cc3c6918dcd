//! Summary statistics and error metrics shared by the fitting routines.

use crate::domain::FitQuality;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (matches the curvature-threshold convention
/// used by the auto-knot spline).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Mean squared error between observations and predictions.
pub fn mse(y_obs: &[f64], y_fit: &[f64]) -> f64 {
    debug_assert_eq!(y_obs.len(), y_fit.len());
    if y_obs.is_empty() {
        return 0.0;
    }
    y_obs
        .iter()
        .zip(y_fit.iter())
        .map(|(o, f)| (o - f) * (o - f))
        .sum::<f64>()
        / y_obs.len() as f64
}

/// Bayesian Information Criterion for a Gaussian least-squares fit.
///
/// `BIC = n * ln(SSE/n) + k * ln(n)`, with the variance floored to keep
/// perfect fits from producing `-inf`.
pub fn bic(n: usize, sse: f64, k: usize) -> f64 {
    let n_f = n as f64;
    let sse_per = (sse / n_f).max(1e-12);
    n_f * sse_per.ln() + (k as f64) * n_f.ln()
}

/// Compute SSE / RMSE / R² for a set of predictions.
pub fn quality(y_obs: &[f64], y_fit: &[f64]) -> FitQuality {
    debug_assert_eq!(y_obs.len(), y_fit.len());
    let n = y_obs.len();
    let sse: f64 = y_obs
        .iter()
        .zip(y_fit.iter())
        .map(|(o, f)| (o - f) * (o - f))
        .sum();
    let rmse = if n > 0 { (sse / n as f64).sqrt() } else { 0.0 };

    let y_bar = mean(y_obs);
    let sst: f64 = y_obs.iter().map(|o| (o - y_bar) * (o - y_bar)).sum();
    // R² is undefined for a constant response; report 1.0 when the fit is
    // also exact, 0.0 otherwise.
    let r2 = if sst > 1e-300 {
        1.0 - sse / sst
    } else if sse < 1e-300 {
        1.0
    } else {
        0.0
    };

    FitQuality { sse, rmse, r2, n }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_std_basic() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&v) - 5.0).abs() < 1e-12);
        assert!((std_dev(&v) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn quality_perfect_fit() {
        let y = [1.0, 2.0, 3.0];
        let q = quality(&y, &y);
        assert!(q.sse.abs() < 1e-30);
        assert!((q.r2 - 1.0).abs() < 1e-12);
        assert_eq!(q.n, 3);
    }

    #[test]
    fn bic_penalizes_parameters() {
        // Same SSE, more parameters -> larger BIC.
        let b2 = bic(50, 10.0, 2);
        let b4 = bic(50, 10.0, 4);
        assert!(b4 > b2);
    }
}
