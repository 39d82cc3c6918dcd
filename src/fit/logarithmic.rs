//! Logarithmic regression `y = a + b ln(x)`.
//!
//! Linear in `(a, b)` with the basis `[1, ln x]`. Non-positive sensor readings
//! are incompatible with the model and get filtered out before fitting; the
//! caller is told how many were dropped so it can warn.

use nalgebra::{DMatrix, DVector};

use crate::domain::{Dataset, FitQuality};
use crate::error::AppError;
use crate::math::{quality, solve_least_squares};
use crate::models::{CalibModel, Predictor};

#[derive(Debug, Clone)]
pub struct LogFit {
    pub model: CalibModel,
    pub a: f64,
    pub b: f64,
    /// Number of non-positive predictor values excluded from the fit.
    pub dropped: usize,
    pub quality: FitQuality,
}

/// Fit `y = a + b ln(x)` by least squares on the positive-x subset.
pub fn fit_logarithmic(data: &Dataset) -> Result<LogFit, AppError> {
    let mut x = Vec::with_capacity(data.len());
    let mut y = Vec::with_capacity(data.len());
    for (&xi, &yi) in data.x.iter().zip(data.y.iter()) {
        if xi > 0.0 {
            x.push(xi);
            y.push(yi);
        }
    }
    let dropped = data.len() - x.len();

    if x.len() < 2 {
        return Err(AppError::insufficient(format!(
            "Need at least 2 positive '{}' values for a logarithmic fit, got {} ({} dropped).",
            data.x_name,
            x.len(),
            dropped
        )));
    }

    let n = x.len();
    let mut design = DMatrix::<f64>::zeros(n, 2);
    for (i, &xi) in x.iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = xi.ln();
    }
    let rhs = DVector::from_column_slice(&y);

    let beta = solve_least_squares(&design, &rhs).ok_or_else(|| {
        AppError::numeric("Logarithmic fit is singular (all readings equal?).")
    })?;

    let (a, b) = (beta[0], beta[1]);
    let model = CalibModel::Logarithmic { a, b };
    let y_fit: Vec<f64> = x.iter().map(|&xi| model.predict(xi)).collect();
    let quality = quality(&y, &y_fit);

    Ok(LogFit {
        model,
        a,
        b,
        dropped,
        quality,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_planted_parameters() {
        let x: Vec<f64> = (1..=30).map(|i| i as f64 * 10.0).collect();
        let y: Vec<f64> = x.iter().map(|&v| 0.4 - 0.07 * v.ln()).collect();
        let data = Dataset::new("H", "V", x, y);
        let fit = fit_logarithmic(&data).unwrap();
        assert!((fit.a - 0.4).abs() < 1e-9);
        assert!((fit.b + 0.07).abs() < 1e-9);
        assert_eq!(fit.dropped, 0);
    }

    #[test]
    fn filters_non_positive_readings() {
        let data = Dataset::new(
            "H",
            "V",
            vec![-1.0, 0.0, 1.0, std::f64::consts::E],
            vec![9.0, 9.0, 2.0, 3.0],
        );
        let fit = fit_logarithmic(&data).unwrap();
        assert_eq!(fit.dropped, 2);
        // y = 2 + ln(x) through the two surviving points.
        assert!((fit.a - 2.0).abs() < 1e-9);
        assert!((fit.b - 1.0).abs() < 1e-9);
    }

    #[test]
    fn errors_when_too_few_positive_values() {
        let data = Dataset::new("H", "V", vec![-1.0, 5.0], vec![0.0, 1.0]);
        let err = fit_logarithmic(&data).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
