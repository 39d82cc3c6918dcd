//! Shared domain types.
//!
//! These types are intentionally lightweight and (where exported) serializable:
//!
//! - `Dataset` holds the paired samples during fitting
//! - `FitQuality` carries the standard error metrics for terminal output
//! - `CalibrationFile` is the portable JSON representation of a fitted model

use serde::{Deserialize, Serialize};

use crate::models::CalibModel;

/// A paired calibration dataset: sensor readings `x` against a target `y`
/// (VWC, dielectric permittivity, ...).
///
/// `x` and `y` always have the same length; the loader enforces this.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Environment variable the predictor came from (e.g. `HUMIDITY_VALS`).
    pub x_name: String,
    /// Environment variable the response came from (e.g. `VWC_VALS`).
    pub y_name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Dataset {
    pub fn new(x_name: impl Into<String>, y_name: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Self {
        debug_assert_eq!(x.len(), y.len());
        Self {
            x_name: x_name.into(),
            y_name: y_name.into(),
            x,
            y,
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Return a copy sorted by ascending predictor value.
    ///
    /// Breakpoint scans and spline fits require ordered data.
    pub fn sorted_by_x(&self) -> Dataset {
        let mut pairs: Vec<(f64, f64)> = self.x.iter().copied().zip(self.y.iter().copied()).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        Dataset {
            x_name: self.x_name.clone(),
            y_name: self.y_name.clone(),
            x: pairs.iter().map(|p| p.0).collect(),
            y: pairs.iter().map(|p| p.1).collect(),
        }
    }

    /// Min/max of the predictor values.
    pub fn x_range(&self) -> Option<(f64, f64)> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in &self.x {
            if !v.is_finite() {
                continue;
            }
            min = min.min(v);
            max = max.max(v);
        }
        if min <= max { Some((min, max)) } else { None }
    }

    /// Min/max of the response values.
    pub fn y_range(&self) -> Option<(f64, f64)> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in &self.y {
            if !v.is_finite() {
                continue;
            }
            min = min.min(v);
            max = max.max(v);
        }
        if min <= max { Some((min, max)) } else { None }
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub r2: f64,
    pub n: usize,
}

/// One linear segment `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearSegment {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearSegment {
    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// A sampled fitted curve, precomputed for quick plotting of exported models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// A saved calibration file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationFile {
    pub tool: String,
    pub fitted_at: String,
    pub predictor_var: String,
    pub response_var: String,
    pub model: CalibModel,
    pub quality: FitQuality,
    pub grid: CurveGrid,
}
