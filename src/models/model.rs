//! Closed-form calibration models.
//!
//! `CalibModel` covers every model whose parameters are worth printing and
//! exporting as-is (polynomial, logarithmic, power, piecewise, spline). The
//! non-parametric regressors (GAM, random forest, k-NN) keep their own model
//! structs in `fit::*` and plug into the rest of the tool through the
//! `Predictor` trait.

use serde::{Deserialize, Serialize};

use crate::domain::LinearSegment;
use crate::math::interp_linear;

/// Anything that maps a sensor reading to a predicted response.
///
/// This is the seam between fitting, plotting, and the multi-model
/// comparison: the plotter samples a `Predictor` along the x-range, and
/// `compare` scores arbitrary predictors on a held-out test split.
pub trait Predictor {
    fn predict(&self, x: f64) -> f64;
}

/// A fitted closed-form calibration model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalibModel {
    /// `y = coeffs[0] + coeffs[1] x + coeffs[2] x^2 + ...` (ascending powers).
    Polynomial { coeffs: Vec<f64> },
    /// `y = a + b ln(x)`.
    Logarithmic { a: f64, b: f64 },
    /// `y = a x^b + c`.
    Power { a: f64, b: f64, c: f64 },
    /// Two independent line segments split at `breakpoint`
    /// (left applies for `x < breakpoint`).
    PiecewiseLinear {
        breakpoint: f64,
        left: LinearSegment,
        right: LinearSegment,
    },
    /// Continuous piecewise-linear spline: `values[j]` is the spline value at
    /// `knots[j]`. Knots include the data boundaries.
    LinearSpline { knots: Vec<f64>, values: Vec<f64> },
}

impl Predictor for CalibModel {
    fn predict(&self, x: f64) -> f64 {
        match self {
            CalibModel::Polynomial { coeffs } => {
                // Horner evaluation, coefficients stored ascending.
                let mut acc = 0.0;
                for &c in coeffs.iter().rev() {
                    acc = acc * x + c;
                }
                acc
            }
            CalibModel::Logarithmic { a, b } => a + b * x.ln(),
            CalibModel::Power { a, b, c } => a * x.powf(*b) + c,
            CalibModel::PiecewiseLinear {
                breakpoint,
                left,
                right,
            } => {
                if x < *breakpoint {
                    left.eval(x)
                } else {
                    right.eval(x)
                }
            }
            CalibModel::LinearSpline { knots, values } => interp_linear(knots, values, x),
        }
    }
}

impl Predictor for LinearSegment {
    fn predict(&self, x: f64) -> f64 {
        self.eval(x)
    }
}

impl<P: Predictor + ?Sized> Predictor for &P {
    fn predict(&self, x: f64) -> f64 {
        (**self).predict(x)
    }
}

impl<P: Predictor + ?Sized> Predictor for Box<P> {
    fn predict(&self, x: f64) -> f64 {
        (**self).predict(x)
    }
}

/// Predict over a slice of readings.
pub fn predict_all<P: Predictor + ?Sized>(model: &P, xs: &[f64]) -> Vec<f64> {
    xs.iter().map(|&x| model.predict(x)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polynomial_horner_matches_direct() {
        let model = CalibModel::Polynomial {
            coeffs: vec![1.0, -2.0, 0.5],
        };
        let x = 3.0;
        let expected = 1.0 - 2.0 * x + 0.5 * x * x;
        assert!((model.predict(x) - expected).abs() < 1e-12);
    }

    #[test]
    fn piecewise_switches_at_breakpoint() {
        let model = CalibModel::PiecewiseLinear {
            breakpoint: 2.0,
            left: LinearSegment { slope: 1.0, intercept: 0.0 },
            right: LinearSegment { slope: -1.0, intercept: 10.0 },
        };
        assert!((model.predict(1.0) - 1.0).abs() < 1e-12);
        // Breakpoint itself belongs to the right segment.
        assert!((model.predict(2.0) - 8.0).abs() < 1e-12);
    }

    #[test]
    fn model_json_round_trip() {
        let model = CalibModel::Power { a: 2.0, b: 0.5, c: -1.0 };
        let json = serde_json::to_string(&model).unwrap();
        let back: CalibModel = serde_json::from_str(&json).unwrap();
        match back {
            CalibModel::Power { a, b, c } => {
                assert_eq!(a, 2.0);
                assert_eq!(b, 0.5);
                assert_eq!(c, -1.0);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
