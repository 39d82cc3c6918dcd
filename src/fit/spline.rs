//! Least-squares linear spline fitting.
//!
//! Two knot sources:
//!
//! - **user knots**: supplied on the command line, validated to be strictly
//!   inside the data range and to leave no empty interval
//! - **auto knots**: placed where the estimated curvature (second divided
//!   difference of the sorted data) exceeds `curvature_sigma` standard
//!   deviations, i.e. where the response visibly bends
//!
//! The spline itself is a global least-squares fit over the hat basis
//! (`math::basis`), so it is continuous across knots; per-segment slopes and
//! intercepts are derived exactly from the fitted knot values.

use nalgebra::DVector;

use crate::domain::{Dataset, FitQuality, LinearSegment};
use crate::error::AppError;
use crate::math::{linear_spline_design, quality, solve_least_squares, std_dev};
use crate::models::{CalibModel, predict_all};

#[derive(Debug, Clone)]
pub struct SplineFitOptions {
    /// Interior knots; `None` enables automatic placement.
    pub knots: Option<Vec<f64>>,
    /// Curvature threshold in standard deviations (auto mode).
    pub curvature_sigma: f64,
}

impl Default for SplineFitOptions {
    fn default() -> Self {
        Self {
            knots: None,
            curvature_sigma: 2.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SplineFit {
    pub model: CalibModel,
    /// Interior knots actually used (excluding the data boundaries).
    pub interior_knots: Vec<f64>,
    /// Whether the knots were placed automatically.
    pub auto_knots: bool,
    /// One linear segment per knot interval, derived from the spline.
    pub segments: Vec<LinearSegment>,
    pub quality: FitQuality,
}

/// Fit an LSQ linear spline to the dataset.
pub fn fit_spline(data: &Dataset, opts: &SplineFitOptions) -> Result<SplineFit, AppError> {
    let sorted = data.sorted_by_x();
    let n = sorted.len();
    if n < 4 {
        return Err(AppError::insufficient(format!(
            "Need at least 4 points for a spline fit, got {n}."
        )));
    }
    let (x_min, x_max) = sorted
        .x_range()
        .ok_or_else(|| AppError::insufficient("No finite predictor values."))?;
    if x_max <= x_min {
        return Err(AppError::insufficient(
            "All predictor values are identical; a spline fit is not possible.",
        ));
    }

    let (interior, auto) = match &opts.knots {
        Some(user_knots) => {
            let valid = validate_knots(&sorted.x, user_knots);
            if valid.is_empty() {
                return Err(AppError::input(
                    "No valid knots provided. Knots must lie strictly inside the data range, \
                     in increasing order, with data on both sides.",
                ));
            }
            (valid, false)
        }
        None => {
            let mut found = auto_knots(&sorted, opts.curvature_sigma);
            if found.is_empty() {
                // No pronounced curvature anywhere; keep one knot at the
                // median x so the spline still has an interior degree of
                // freedom.
                found = validate_knots(&sorted.x, &[sorted.x[n / 2]]);
            }
            (found, true)
        }
    };

    // Full knot vector includes the data boundaries.
    let mut knots = Vec::with_capacity(interior.len() + 2);
    knots.push(x_min);
    knots.extend(interior.iter().copied());
    knots.push(x_max);

    let design = linear_spline_design(&sorted.x, &knots);
    let rhs = DVector::from_column_slice(&sorted.y);
    let values_vec = solve_least_squares(&design, &rhs)
        .ok_or_else(|| AppError::numeric("Spline system is singular; try fewer knots."))?;
    let values: Vec<f64> = values_vec.iter().copied().collect();

    let segments: Vec<LinearSegment> = knots
        .windows(2)
        .zip(values.windows(2))
        .map(|(t, v)| {
            let slope = (v[1] - v[0]) / (t[1] - t[0]);
            LinearSegment {
                slope,
                intercept: v[0] - slope * t[0],
            }
        })
        .collect();

    let model = CalibModel::LinearSpline {
        knots,
        values,
    };
    let y_fit = predict_all(&model, &sorted.x);
    let quality = quality(&sorted.y, &y_fit);

    Ok(SplineFit {
        model,
        interior_knots: interior,
        auto_knots: auto,
        segments,
        quality,
    })
}

/// Keep knots that are strictly interior, strictly increasing, and have at
/// least one data point in every resulting interval.
fn validate_knots(x_sorted: &[f64], knots: &[f64]) -> Vec<f64> {
    let n = x_sorted.len();
    let (lo, hi) = (x_sorted[0], x_sorted[n - 1]);

    let mut candidates: Vec<f64> = knots
        .iter()
        .copied()
        .filter(|k| k.is_finite() && *k > lo && *k < hi)
        .collect();
    candidates.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    candidates.dedup();

    // Greedily keep knots whose interval back to the previous boundary
    // contains at least one observation.
    let mut kept: Vec<f64> = Vec::new();
    for k in candidates {
        let prev = kept.last().copied().unwrap_or(lo);
        let occupied = x_sorted.iter().any(|&xi| xi > prev && xi <= k);
        let tail_occupied = x_sorted.iter().any(|&xi| xi > k);
        if occupied && tail_occupied {
            kept.push(k);
        }
    }
    kept
}

/// Place knots where the second divided difference exceeds
/// `sigma` standard deviations of the curvature estimate.
fn auto_knots(sorted: &Dataset, sigma: f64) -> Vec<f64> {
    let x = &sorted.x;
    let y = &sorted.y;
    let n = x.len();
    if n < 3 {
        return Vec::new();
    }

    // First derivative on midpoints, then second derivative.
    let mut dy = Vec::with_capacity(n - 1);
    for i in 0..n - 1 {
        let dx = x[i + 1] - x[i];
        // Duplicate x values give an infinite slope estimate; skip by carrying
        // the previous value so the curvature scan stays finite.
        if dx.abs() < 1e-300 {
            dy.push(*dy.last().unwrap_or(&0.0));
        } else {
            dy.push((y[i + 1] - y[i]) / dx);
        }
    }
    let mut ddy = Vec::with_capacity(n - 2);
    for i in 0..n - 2 {
        let dx = x[i + 1] - x[i];
        if dx.abs() < 1e-300 {
            ddy.push(0.0);
        } else {
            ddy.push((dy[i + 1] - dy[i]) / dx);
        }
    }

    let threshold = std_dev(&ddy) * sigma.max(0.0);
    if threshold <= 0.0 {
        return Vec::new();
    }

    // The +1 offset undoes the index shift from differencing.
    let raw: Vec<f64> = ddy
        .iter()
        .enumerate()
        .filter(|(_, c)| c.abs() > threshold)
        .map(|(i, _)| x[i + 1])
        .collect();

    validate_knots(x, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Piecewise linear data with a kink at x = 5 (continuous).
    fn kinked() -> Dataset {
        let x: Vec<f64> = (0..=20).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|&v| if v <= 5.0 { 2.0 * v } else { 10.0 - 3.0 * (v - 5.0) })
            .collect();
        Dataset::new("HUMIDITY_VALS", "VWC_VALS", x, y)
    }

    #[test]
    fn user_knot_recovers_segment_coefficients() {
        let opts = SplineFitOptions {
            knots: Some(vec![5.0]),
            curvature_sigma: 2.0,
        };
        let fit = fit_spline(&kinked(), &opts).unwrap();
        assert_eq!(fit.segments.len(), 2);
        assert!((fit.segments[0].slope - 2.0).abs() < 1e-8);
        assert!((fit.segments[0].intercept).abs() < 1e-8);
        assert!((fit.segments[1].slope + 3.0).abs() < 1e-8);
        assert!(fit.quality.sse < 1e-12);
    }

    #[test]
    fn auto_knots_find_the_kink() {
        let fit = fit_spline(&kinked(), &SplineFitOptions::default()).unwrap();
        assert!(fit.auto_knots);
        assert!(
            fit.interior_knots.iter().any(|k| (k - 5.0).abs() <= 0.51),
            "knots {:?} should include one near 5.0",
            fit.interior_knots
        );
    }

    #[test]
    fn flat_data_falls_back_to_median_knot() {
        let x: Vec<f64> = (0..=10).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|&v| 0.5 * v + 1.0).collect();
        let data = Dataset::new("HUMIDITY_VALS", "VWC_VALS", x, y);

        let fit = fit_spline(&data, &SplineFitOptions::default()).unwrap();
        assert!(fit.auto_knots);
        assert_eq!(fit.interior_knots, vec![5.0]);
        assert!(fit.quality.sse < 1e-12);
    }

    #[test]
    fn out_of_range_knots_are_rejected() {
        let opts = SplineFitOptions {
            knots: Some(vec![-3.0, 100.0]),
            curvature_sigma: 2.0,
        };
        let err = fit_spline(&kinked(), &opts).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn spline_is_continuous_at_knots() {
        let opts = SplineFitOptions {
            knots: Some(vec![3.0, 7.0]),
            curvature_sigma: 2.0,
        };
        let fit = fit_spline(&kinked(), &opts).unwrap();
        let CalibModel::LinearSpline { knots, .. } = &fit.model else {
            panic!("expected a linear spline model");
        };
        // Adjacent segments must agree at their shared (interior) knot.
        for (i, pair) in fit.segments.windows(2).enumerate() {
            let knot = knots[i + 1];
            let gap = pair[0].eval(knot) - pair[1].eval(knot);
            assert!(gap.abs() < 1e-8, "discontinuity {gap} at knot {knot}");
        }
    }
}
