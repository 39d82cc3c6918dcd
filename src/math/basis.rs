//! Linear spline ("hat" / tent function) basis.
//!
//! A continuous piecewise-linear least-squares spline over a knot vector
//! `t_0 < t_1 < ... < t_m` is exactly a linear combination of hat functions:
//! basis `j` is 1 at `t_j`, 0 at the neighboring knots, and 0 elsewhere. A nice
//! consequence is that the solved coefficients *are* the spline values at the
//! knots, which makes segment slopes/intercepts trivial to report.
//!
//! Both the LSQ spline fit and the GAM smoother build their design matrices
//! here; `interp_linear` is the matching evaluator (with linear extrapolation
//! beyond the boundary knots).

use nalgebra::DMatrix;

/// Build the hat-basis design matrix for samples `x` over `knots`.
///
/// `knots` must be strictly increasing with at least 2 entries. Samples
/// outside `[knots[0], knots[m-1]]` are clamped into the boundary segments,
/// consistent with `interp_linear`'s extrapolation.
pub fn linear_spline_design(x: &[f64], knots: &[f64]) -> DMatrix<f64> {
    debug_assert!(knots.len() >= 2);
    let n = x.len();
    let m = knots.len();
    let mut design = DMatrix::<f64>::zeros(n, m);

    for (i, &xi) in x.iter().enumerate() {
        let s = segment_index(knots, xi);
        let (t0, t1) = (knots[s], knots[s + 1]);
        let h = t1 - t0;
        // Outside the knot range the weights extrapolate linearly (one of them
        // exceeds 1, the other goes negative), matching `interp_linear`.
        let u = (xi - t0) / h;
        design[(i, s)] = 1.0 - u;
        design[(i, s + 1)] = u;
    }

    design
}

/// Evaluate the linear spline given by `values` at the `knots`.
///
/// Extrapolates with the boundary segments outside the knot range.
pub fn interp_linear(knots: &[f64], values: &[f64], x: f64) -> f64 {
    debug_assert_eq!(knots.len(), values.len());
    debug_assert!(knots.len() >= 2);
    let s = segment_index(knots, x);
    let (t0, t1) = (knots[s], knots[s + 1]);
    let u = (x - t0) / (t1 - t0);
    values[s] * (1.0 - u) + values[s + 1] * u
}

/// Index `s` of the segment `[knots[s], knots[s+1]]` containing `x`
/// (boundary segments for out-of-range `x`).
fn segment_index(knots: &[f64], x: f64) -> usize {
    let m = knots.len();
    if x <= knots[0] {
        return 0;
    }
    if x >= knots[m - 1] {
        return m - 2;
    }
    // partition_point: first knot strictly greater than x.
    let upper = knots.partition_point(|&t| t <= x);
    upper.clamp(1, m - 1) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn design_rows_sum_to_one_inside_range() {
        let knots = [0.0, 1.0, 3.0, 6.0];
        let x = [0.0, 0.5, 1.0, 2.0, 5.9, 6.0];
        let design = linear_spline_design(&x, &knots);
        for i in 0..x.len() {
            let row_sum: f64 = (0..knots.len()).map(|j| design[(i, j)]).sum();
            assert!((row_sum - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn interp_hits_knot_values() {
        let knots = [0.0, 2.0, 5.0];
        let values = [1.0, 3.0, -1.0];
        for (t, v) in knots.iter().zip(values.iter()) {
            assert!((interp_linear(&knots, &values, *t) - v).abs() < 1e-12);
        }
        // Midpoint of first segment.
        assert!((interp_linear(&knots, &values, 1.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn interp_extrapolates_with_boundary_segments() {
        let knots = [0.0, 1.0];
        let values = [0.0, 2.0];
        assert!((interp_linear(&knots, &values, 2.0) - 4.0).abs() < 1e-12);
        assert!((interp_linear(&knots, &values, -1.0) + 2.0).abs() < 1e-12);
    }
}
