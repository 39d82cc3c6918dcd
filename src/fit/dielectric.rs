//! Dielectric-permittivity calibrations.
//!
//! - `fit_alpha`: linear fit `DP = alpha * VWC + beta`, producing the alpha
//!   parameter used in the mixing-model equation
//!   `VWC = theta_s * ((eps - eps_s) / (eps_w - eps_s))^(1/alpha)`
//! - `fit_zero_ec`: one-parameter through-origin fit `BULK_EC = eps * VWC`,
//!   estimating the permittivity at zero bulk electrical conductivity
//!
//! The Topp-equation fit is just a cubic polynomial of DP against VWC and
//! reuses `fit::polynomial`.

use crate::domain::{Dataset, FitQuality, LinearSegment};
use crate::error::AppError;
use crate::math::{fit_line, quality};

#[derive(Debug, Clone)]
pub struct AlphaFit {
    pub alpha: f64,
    pub beta: f64,
    pub line: LinearSegment,
    pub quality: FitQuality,
}

/// Fit `DP = alpha * VWC + beta` (x = VWC, y = DP).
pub fn fit_alpha(data: &Dataset) -> Result<AlphaFit, AppError> {
    let line = fit_line(&data.x, &data.y)?;
    let y_fit: Vec<f64> = data.x.iter().map(|&x| line.eval(x)).collect();
    let quality = quality(&data.y, &y_fit);

    Ok(AlphaFit {
        alpha: line.slope,
        beta: line.intercept,
        line,
        quality,
    })
}

#[derive(Debug, Clone)]
pub struct ZeroEcFit {
    /// Estimated dielectric permittivity at zero bulk EC.
    pub epsilon: f64,
    pub quality: FitQuality,
}

/// Fit `bulk_ec = epsilon * vwc` through the origin.
///
/// Closed form: `epsilon = sum(vwc * ec) / sum(vwc^2)`.
pub fn fit_zero_ec(vwc: &[f64], bulk_ec: &[f64]) -> Result<ZeroEcFit, AppError> {
    if vwc.len() != bulk_ec.len() {
        return Err(AppError::input("VWC and bulk-EC series must be paired."));
    }
    if vwc.len() < 2 {
        return Err(AppError::insufficient(format!(
            "Need at least 2 points for the zero-EC calibration, got {}.",
            vwc.len()
        )));
    }

    let sxy: f64 = vwc.iter().zip(bulk_ec.iter()).map(|(&x, &y)| x * y).sum();
    let sxx: f64 = vwc.iter().map(|&x| x * x).sum();
    if sxx <= 0.0 || !sxx.is_finite() {
        return Err(AppError::numeric(
            "All VWC values are zero; the through-origin fit is undefined.",
        ));
    }

    let epsilon = sxy / sxx;
    if !epsilon.is_finite() {
        return Err(AppError::numeric("Zero-EC fit produced a non-finite estimate."));
    }

    let y_fit: Vec<f64> = vwc.iter().map(|&x| epsilon * x).collect();
    let quality = quality(bulk_ec, &y_fit);

    Ok(ZeroEcFit { epsilon, quality })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_is_the_slope() {
        let vwc: Vec<f64> = (1..=10).map(|i| i as f64 * 0.05).collect();
        let dp: Vec<f64> = vwc.iter().map(|&v| 55.0 * v + 3.2).collect();
        let data = Dataset::new("VWC_VALS", "DP_VALS", vwc, dp);

        let fit = fit_alpha(&data).unwrap();
        assert!((fit.alpha - 55.0).abs() < 1e-8);
        assert!((fit.beta - 3.2).abs() < 1e-8);
    }

    #[test]
    fn zero_ec_closed_form() {
        let vwc = [0.1, 0.2, 0.3, 0.4];
        let ec: Vec<f64> = vwc.iter().map(|&v| 7.5 * v).collect();
        let fit = fit_zero_ec(&vwc, &ec).unwrap();
        assert!((fit.epsilon - 7.5).abs() < 1e-12);
        assert!(fit.quality.sse < 1e-24);
    }

    #[test]
    fn zero_ec_rejects_all_zero_vwc() {
        let err = fit_zero_ec(&[0.0, 0.0], &[1.0, 2.0]).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
