//! Two-segment piecewise-linear regression with BIC breakpoint search.
//!
//! Capacitive soil sensors often respond with two distinct linear regimes
//! (dry vs. wet soil). The breakpoint is located by an O(n) scan over the
//! sorted data: every split index with `min_segment` points on each side gets
//! two independent OLS line fits, scored by the sum of the segments' BICs;
//! the split with the lowest combined BIC wins.
//!
//! Ties are broken by the earliest split index, and the breakpoint value is
//! the first x of the right segment, so results are deterministic.

use crate::domain::{Dataset, FitQuality, LinearSegment};
use crate::error::AppError;
use crate::math::{bic, fit_line, quality};
use crate::models::{CalibModel, predict_all};

#[derive(Debug, Clone)]
pub struct PiecewiseFit {
    pub model: CalibModel,
    pub breakpoint: f64,
    pub left: LinearSegment,
    pub right: LinearSegment,
    /// Combined BIC of the winning split.
    pub bic: f64,
    pub quality: FitQuality,
}

/// Fit a two-segment piecewise-linear model.
///
/// `min_segment` is the minimum number of observations per segment.
pub fn fit_piecewise(data: &Dataset, min_segment: usize) -> Result<PiecewiseFit, AppError> {
    if min_segment < 2 {
        return Err(AppError::input("Minimum segment size must be at least 2."));
    }

    let sorted = data.sorted_by_x();
    let n = sorted.len();
    if n < 2 * min_segment {
        return Err(AppError::insufficient(format!(
            "Need at least {} points for a piecewise fit with min segment size {min_segment}, got {n}.",
            2 * min_segment
        )));
    }

    // Scan split indices; left = [0, i), right = [i, n).
    let mut best: Option<(usize, f64)> = None;
    for i in min_segment..=(n - min_segment) {
        let (sse_left, _) = segment_fit(&sorted, 0, i)?;
        let (sse_right, _) = segment_fit(&sorted, i, n)?;
        let combined = bic(i, sse_left, 2) + bic(n - i, sse_right, 2);

        let improves = match best {
            None => true,
            Some((_, b)) => combined < b,
        };
        if improves {
            best = Some((i, combined));
        }
    }

    let (split, combined_bic) = best
        .ok_or_else(|| AppError::numeric("Breakpoint scan produced no valid candidate."))?;

    let (_, left) = segment_fit(&sorted, 0, split)?;
    let (_, right) = segment_fit(&sorted, split, n)?;
    let breakpoint = sorted.x[split];

    let model = CalibModel::PiecewiseLinear {
        breakpoint,
        left,
        right,
    };
    let y_fit = predict_all(&model, &sorted.x);
    let quality = quality(&sorted.y, &y_fit);

    Ok(PiecewiseFit {
        model,
        breakpoint,
        left,
        right,
        bic: combined_bic,
        quality,
    })
}

/// OLS line on `[from, to)` of the sorted data; returns (SSE, segment).
fn segment_fit(sorted: &Dataset, from: usize, to: usize) -> Result<(f64, LinearSegment), AppError> {
    let x = &sorted.x[from..to];
    let y = &sorted.y[from..to];
    let seg = fit_line(x, y)?;
    let sse: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| {
            let r = yi - seg.eval(xi);
            r * r
        })
        .sum();
    Ok((sse, seg))
}
