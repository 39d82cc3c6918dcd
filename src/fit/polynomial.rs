//! Polynomial regression of user-specified degree.
//!
//! The design matrix is a plain Vandermonde matrix in ascending powers; the
//! SVD solver absorbs the conditioning problems that show up for higher
//! degrees on narrow x-ranges.

use nalgebra::{DMatrix, DVector};

use crate::domain::{Dataset, FitQuality};
use crate::error::AppError;
use crate::math::{quality, solve_least_squares};
use crate::models::{CalibModel, predict_all};

/// Result of a polynomial fit.
#[derive(Debug, Clone)]
pub struct PolyFit {
    pub model: CalibModel,
    /// Ascending coefficients `a0..a_degree` (duplicated from the model for
    /// convenient reporting).
    pub coeffs: Vec<f64>,
    pub quality: FitQuality,
}

/// Fit a polynomial of the given degree by least squares.
pub fn fit_polynomial(data: &Dataset, degree: usize) -> Result<PolyFit, AppError> {
    if degree == 0 {
        return Err(AppError::input("Polynomial degree must be at least 1."));
    }
    if degree > 10 {
        return Err(AppError::input(format!(
            "Polynomial degree {degree} is unreasonably high for calibration data (max 10)."
        )));
    }

    let n = data.len();
    let p = degree + 1;
    if n < p {
        return Err(AppError::insufficient(format!(
            "A degree-{degree} polynomial needs at least {p} points, got {n}."
        )));
    }

    let mut design = DMatrix::<f64>::zeros(n, p);
    for (i, &xi) in data.x.iter().enumerate() {
        let mut pow = 1.0;
        for j in 0..p {
            design[(i, j)] = pow;
            pow *= xi;
        }
    }
    let rhs = DVector::from_column_slice(&data.y);

    let beta = solve_least_squares(&design, &rhs).ok_or_else(|| {
        AppError::numeric(format!(
            "Degree-{degree} polynomial fit is too ill-conditioned to solve; try a lower degree."
        ))
    })?;

    let coeffs: Vec<f64> = beta.iter().copied().collect();
    let model = CalibModel::Polynomial {
        coeffs: coeffs.clone(),
    };
    let y_fit = predict_all(&model, &data.x);
    let quality = quality(&data.y, &y_fit);

    Ok(PolyFit {
        model,
        coeffs,
        quality,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(x: Vec<f64>, y: Vec<f64>) -> Dataset {
        Dataset::new("HUMIDITY_VALS", "VWC_VALS", x, y)
    }

    #[test]
    fn degree_one_on_two_points_is_the_line_through_them() {
        let data = dataset(vec![1.0, 3.0], vec![5.0, 11.0]);
        let fit = fit_polynomial(&data, 1).unwrap();
        assert!((fit.coeffs[0] - 2.0).abs() < 1e-9);
        assert!((fit.coeffs[1] - 3.0).abs() < 1e-9);
        assert!(fit.quality.sse < 1e-18);
    }

    #[test]
    fn recovers_planted_quadratic() {
        let x: Vec<f64> = (0..20).map(|i| 0.5 + i as f64 * 0.3).collect();
        let y: Vec<f64> = x.iter().map(|&v| 1.5 - 0.8 * v + 0.25 * v * v).collect();
        let fit = fit_polynomial(&dataset(x, y), 2).unwrap();
        assert!((fit.coeffs[0] - 1.5).abs() < 1e-8);
        assert!((fit.coeffs[1] + 0.8).abs() < 1e-8);
        assert!((fit.coeffs[2] - 0.25).abs() < 1e-8);
        assert!((fit.quality.r2 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn tolerates_measurement_noise() {
        use rand::SeedableRng;
        use rand_distr::{Distribution, Normal};

        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let noise = Normal::new(0.0, 0.005).unwrap();
        let x: Vec<f64> = (0..200).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|&v| 0.3 + 0.02 * v + noise.sample(&mut rng))
            .collect();

        let fit = fit_polynomial(&dataset(x, y), 1).unwrap();
        assert!((fit.coeffs[0] - 0.3).abs() < 5e-3);
        assert!((fit.coeffs[1] - 0.02).abs() < 1e-3);
        assert!(fit.quality.rmse < 0.01);
    }

    #[test]
    fn rejects_underdetermined_fit() {
        let data = dataset(vec![1.0, 2.0], vec![1.0, 2.0]);
        let err = fit_polynomial(&data, 3).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn rejects_degree_zero() {
        let data = dataset(vec![1.0, 2.0], vec![1.0, 2.0]);
        let err = fit_polynomial(&data, 0).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
