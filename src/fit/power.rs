//! Power-law regression `y = a x^b + c`.
//!
//! The model is nonlinear only in the exponent `b`; for a fixed `b` it is an
//! OLS problem in `(a, c)` with the basis `[x^b, 1]`. So instead of a general
//! nonlinear optimizer we run a deterministic search:
//!
//! 1. coarse log-spaced grid over `b`, solving `(a, c)` in closed form for
//!    each candidate (in parallel) and scoring by SSE
//! 2. one linear refinement pass around the best coarse candidate
//!
//! Selection is by minimum SSE, ties broken by the lowest grid index.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::domain::{Dataset, FitQuality};
use crate::error::AppError;
use crate::math::{lin_space, log_space, quality, solve_least_squares};
use crate::models::{CalibModel, predict_all};

#[derive(Debug, Clone)]
pub struct PowerFitOptions {
    /// Lower bound of the exponent grid (must be > 0).
    pub exp_min: f64,
    /// Upper bound of the exponent grid.
    pub exp_max: f64,
    /// Number of coarse grid candidates.
    pub exp_steps: usize,
}

impl Default for PowerFitOptions {
    fn default() -> Self {
        Self {
            exp_min: 0.05,
            exp_max: 5.0,
            exp_steps: 120,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PowerFit {
    pub model: CalibModel,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub quality: FitQuality,
}

#[derive(Debug, Clone)]
struct Candidate {
    idx: usize,
    a: f64,
    b: f64,
    c: f64,
    sse: f64,
}

/// Fit `y = a x^b + c` over an exponent grid.
pub fn fit_power(data: &Dataset, opts: &PowerFitOptions) -> Result<PowerFit, AppError> {
    let n = data.len();
    if n < 3 {
        return Err(AppError::insufficient(format!(
            "Need at least 3 points for a power fit, got {n}."
        )));
    }
    if data.x.iter().any(|&x| x <= 0.0) {
        return Err(AppError::input(format!(
            "Power fits require strictly positive '{}' values (x^b is ill-defined otherwise).",
            data.x_name
        )));
    }

    // Coarse pass.
    let coarse = log_space(opts.exp_min, opts.exp_max, opts.exp_steps)?;
    let best = search_grid(data, &coarse)
        .ok_or_else(|| AppError::numeric("No valid power-fit candidate on the exponent grid."))?;

    // Refinement: linear grid spanning the neighbors of the coarse winner.
    let lo = if best.idx > 0 { coarse[best.idx - 1] } else { coarse[0] };
    let hi = if best.idx + 1 < coarse.len() {
        coarse[best.idx + 1]
    } else {
        coarse[coarse.len() - 1]
    };
    // The coarse winner's exponent need not lie on the fine grid, so only
    // accept the refined candidate when it actually lowers the SSE.
    let best = if hi > lo {
        let fine = lin_space(lo, hi, 25)?;
        match search_grid(data, &fine) {
            Some(fine_best) if fine_best.sse < best.sse => fine_best,
            _ => best,
        }
    } else {
        best
    };

    let model = CalibModel::Power {
        a: best.a,
        b: best.b,
        c: best.c,
    };
    let y_fit = predict_all(&model, &data.x);
    let quality = quality(&data.y, &y_fit);

    Ok(PowerFit {
        model,
        a: best.a,
        b: best.b,
        c: best.c,
        quality,
    })
}

fn search_grid(data: &Dataset, exponents: &[f64]) -> Option<Candidate> {
    let candidates: Vec<Candidate> = exponents
        .par_iter()
        .enumerate()
        .filter_map(|(idx, &b)| evaluate_candidate(data, idx, b))
        .collect();

    // Deterministic selection: minimum SSE, ties by original grid index.
    let mut best: Option<&Candidate> = None;
    for c in &candidates {
        match best {
            None => best = Some(c),
            Some(b) if c.sse < b.sse || (c.sse == b.sse && c.idx < b.idx) => best = Some(c),
            _ => {}
        }
    }
    best.cloned()
}

fn evaluate_candidate(data: &Dataset, idx: usize, b: f64) -> Option<Candidate> {
    let n = data.len();
    let mut design = DMatrix::<f64>::zeros(n, 2);
    for (i, &xi) in data.x.iter().enumerate() {
        let xb = xi.powf(b);
        if !xb.is_finite() {
            return None;
        }
        design[(i, 0)] = xb;
        design[(i, 1)] = 1.0;
    }
    let rhs = DVector::from_column_slice(&data.y);

    let beta = solve_least_squares(&design, &rhs)?;
    let (a, c) = (beta[0], beta[1]);

    let mut sse = 0.0;
    for (&xi, &yi) in data.x.iter().zip(data.y.iter()) {
        let r = yi - (a * xi.powf(b) + c);
        sse += r * r;
    }

    if sse.is_finite() {
        Some(Candidate { idx, a, b, c, sse })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_planted_power_law() {
        let x: Vec<f64> = (1..=40).map(|i| i as f64 * 25.0).collect();
        let y: Vec<f64> = x.iter().map(|&v| 0.02 * v.powf(0.5) + 0.01).collect();
        let data = Dataset::new("H", "V", x, y);

        let fit = fit_power(&data, &PowerFitOptions::default()).unwrap();
        assert!((fit.b - 0.5).abs() < 2e-3, "b={}", fit.b);
        assert!((fit.a - 0.02).abs() < 1e-3, "a={}", fit.a);
        assert!((fit.c - 0.01).abs() < 5e-2, "c={}", fit.c);
        assert!(fit.quality.rmse < 1e-2);
    }

    #[test]
    fn refinement_never_loses_to_the_coarse_grid() {
        // Off-grid exponent: the fine pass should only replace the coarse
        // winner when it is strictly better.
        let x: Vec<f64> = (1..=50).map(|i| i as f64 * 3.0).collect();
        let y: Vec<f64> = x.iter().map(|&v| 1.3 * v.powf(0.37) - 0.2).collect();
        let data = Dataset::new("H", "V", x, y);

        let opts = PowerFitOptions::default();
        let coarse = crate::math::log_space(opts.exp_min, opts.exp_max, opts.exp_steps).unwrap();
        let coarse_best = search_grid(&data, &coarse).unwrap();

        let fit = fit_power(&data, &opts).unwrap();
        assert!(
            fit.quality.sse <= coarse_best.sse + 1e-12,
            "refined SSE {} worse than coarse SSE {}",
            fit.quality.sse,
            coarse_best.sse
        );
    }

    #[test]
    fn rejects_non_positive_readings() {
        let data = Dataset::new("H", "V", vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0]);
        let err = fit_power(&data, &PowerFitOptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn rejects_too_few_points() {
        let data = Dataset::new("H", "V", vec![1.0, 2.0], vec![1.0, 2.0]);
        let err = fit_power(&data, &PowerFitOptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
