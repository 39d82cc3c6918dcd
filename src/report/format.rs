//! Formatted terminal output for each fitting routine.
//!
//! The coefficient blocks deliberately keep the layouts field crews already
//! paste into sensor firmware configs: `a{i} = ...` lines for polynomials,
//! `Segment N Coefficients: ...` for piecewise/spline fits, and so on.

use crate::domain::{Dataset, FitQuality, LinearSegment};
use crate::fit::{Comparison, GamFit, PiecewiseFit, SplineFit};

/// Dataset banner shared by all subcommands.
pub fn format_header(title: &str, data: &Dataset) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== soilcal - {title} ===\n"));
    let (x_lo, x_hi) = data.x_range().unwrap_or((f64::NAN, f64::NAN));
    let (y_lo, y_hi) = data.y_range().unwrap_or((f64::NAN, f64::NAN));
    out.push_str(&format!(
        "Data: {} -> {} | n={} | x=[{:.4}, {:.4}] | y=[{:.4}, {:.4}]\n",
        data.x_name,
        data.y_name,
        data.len(),
        x_lo,
        x_hi,
        y_lo,
        y_hi
    ));
    out
}

pub fn format_quality(q: &FitQuality) -> String {
    format!(
        "Fit quality: SSE={:.6} RMSE={:.6} R^2={:.6} (n={})\n",
        q.sse, q.rmse, q.r2, q.n
    )
}

/// Polynomial coefficient block: compact descending list plus one line per
/// coefficient.
pub fn format_polynomial(coeffs: &[f64], quality: &FitQuality) -> String {
    let degree = coeffs.len() - 1;
    let mut out = String::new();

    let derived: Vec<String> = (0..=degree)
        .rev()
        .map(|i| format!("a{i} = {:.14}", coeffs[i]))
        .collect();
    out.push_str(&format!("Derived coefficients: {}\n", derived.join(", ")));
    out.push('\n');

    out.push_str("Fitted Polynomial Model Coefficients:\n");
    for i in (0..=degree).rev() {
        out.push_str(&format!("a{i} = {:.8}\n", coeffs[i]));
    }
    out.push('\n');
    out.push_str(&format_quality(quality));
    out
}

pub fn format_logarithmic(a: f64, b: f64, dropped: usize, quality: &FitQuality) -> String {
    let mut out = String::new();
    if dropped > 0 {
        out.push_str(&format!(
            "Note: {dropped} non-positive reading(s) excluded (ln is undefined there).\n"
        ));
    }
    out.push_str("The fitted parameters for the logarithmic regression are:\n");
    out.push_str(&format!("a (intercept):       {a:.8}\n"));
    out.push_str(&format!("b (log coefficient): {b:.8}\n"));
    out.push('\n');
    out.push_str(&format_quality(quality));
    out
}

pub fn format_power(a: f64, b: f64, c: f64, quality: &FitQuality) -> String {
    let mut out = String::new();
    out.push_str("The fitted parameters for the power regression are:\n");
    out.push_str(&format!("a (pre-exponential factor): {a:.8}\n"));
    out.push_str(&format!("b (exponent):               {b:.8}\n"));
    out.push_str(&format!("c (vertical offset):        {c:.8}\n"));
    out.push('\n');
    out.push_str(&format_quality(quality));
    out
}

pub fn format_piecewise(fit: &PiecewiseFit) -> String {
    let mut out = String::new();
    out.push_str(&format!("Optimal Breakpoint: {}\n", fit.breakpoint));
    out.push_str(&format!(
        "Segment 1 Coefficients: Intercept = {}, Slope = {}\n",
        fit.left.intercept, fit.left.slope
    ));
    out.push_str(&format!(
        "Segment 2 Coefficients: Intercept = {}, Slope = {}\n",
        fit.right.intercept, fit.right.slope
    ));
    out.push_str(&format!("Combined BIC: {:.4}\n", fit.bic));
    out.push('\n');
    out.push_str(&format_quality(&fit.quality));
    out
}

pub fn format_spline(fit: &SplineFit) -> String {
    let mut out = String::new();
    if fit.auto_knots {
        out.push_str("Knot placement: automatic (curvature threshold)\n");
    } else {
        out.push_str("Knot placement: user-specified\n");
    }
    let knots: Vec<String> = fit.interior_knots.iter().map(|k| k.to_string()).collect();
    if knots.is_empty() {
        out.push_str("Knots: (none; single linear segment)\n");
    } else {
        out.push_str(&format!("Knots: {}\n", knots.join(",")));
    }
    for (i, seg) in fit.segments.iter().enumerate() {
        out.push_str(&format!(
            "Segment {} Coefficients: Slope = {}, Intercept = {}\n",
            i + 1,
            seg.slope,
            seg.intercept
        ));
    }
    out.push('\n');
    out.push_str(&format_quality(&fit.quality));
    out
}

pub fn format_gam(fit: &GamFit, test_mse: Option<f64>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Linear GAM: lambda={:.6} (GCV-selected), edf={:.2}\n",
        fit.lambda, fit.edf
    ));
    out.push_str(&format_quality(&fit.quality));
    if let Some(mse) = test_mse {
        out.push_str(&format!("Test MSE: {mse:.8}\n"));
    }
    out
}

pub fn format_forest(n_trees: usize, train_quality: &FitQuality, test_mse: Option<f64>) -> String {
    let mut out = String::new();
    out.push_str(&format!("Random forest: {n_trees} trees\n"));
    out.push_str(&format_quality(train_quality));
    if let Some(mse) = test_mse {
        out.push_str(&format!("Test MSE: {mse:.8}\n"));
    }
    out
}

/// One-off prediction line for `--predict`.
pub fn format_prediction(data: &Dataset, reading: f64, predicted: f64) -> String {
    format!(
        "The predicted {} for a {} reading of {} is {:.8}\n",
        data.y_name, data.x_name, reading, predicted
    )
}

pub fn format_comparison(cmp: &Comparison) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Train/test split: {} train, {} test\n\n",
        cmp.n_train, cmp.n_test
    ));
    out.push_str("Model performance sorted from best to worst (by Test MSE):\n");
    for score in &cmp.scores {
        out.push_str(&format!("{} Test MSE: {:.10}\n", score.name, score.test_mse));
    }
    for (name, reason) in &cmp.skipped {
        out.push_str(&format!("  (skipped {name}) {reason}\n"));
    }
    out
}

pub fn format_topp(coeffs: &[f64], quality: &FitQuality) -> String {
    debug_assert_eq!(coeffs.len(), 4);
    let mut out = String::new();
    out.push_str(&format!(
        "Fitted Topp Equation Coefficients: a0 = {}, a1 = {}, a2 = {}, a3 = {}\n",
        coeffs[0], coeffs[1], coeffs[2], coeffs[3]
    ));
    for (i, c) in coeffs.iter().enumerate() {
        out.push_str(&format!("a{i}={c}\n"));
    }
    out.push('\n');
    out.push_str(&format_quality(quality));
    out
}

pub fn format_alpha(alpha: f64, beta: f64, quality: &FitQuality) -> String {
    let mut out = String::new();
    out.push_str(&format!("The fitted alpha value is: {alpha}\n"));
    out.push_str(&format!("beta (offset): {beta}\n"));
    out.push('\n');
    out.push_str(&format_quality(quality));
    out
}

pub fn format_zero_ec(epsilon: f64, quality: &FitQuality) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Estimated dielectric permittivity when bulk EC is zero: {epsilon}\n"
    ));
    out.push('\n');
    out.push_str(&format_quality(quality));
    out
}

/// Text written to `coefficients.txt` by the piecewise fit.
pub fn piecewise_coefficients_text(breakpoint: f64, left: &LinearSegment, right: &LinearSegment) -> String {
    format!(
        "Optimal Breakpoint: {breakpoint}\n\
         Segment 1 Coefficients: Intercept = {}, Slope = {}\n\
         Segment 2 Coefficients: Intercept = {}, Slope = {}\n",
        left.intercept, left.slope, right.intercept, right.slope
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polynomial_block_lists_descending() {
        let q = FitQuality { sse: 0.0, rmse: 0.0, r2: 1.0, n: 2 };
        let text = format_polynomial(&[1.0, 2.0, 3.0], &q);
        let a2 = text.find("a2 = ").unwrap();
        let a0 = text.find("a0 = ").unwrap();
        assert!(a2 < a0);
        assert!(text.contains("Derived coefficients:"));
    }

    #[test]
    fn piecewise_text_matches_script_shape() {
        let left = LinearSegment { slope: 0.5, intercept: 1.0 };
        let right = LinearSegment { slope: 2.0, intercept: -3.0 };
        let text = piecewise_coefficients_text(10.0, &left, &right);
        assert!(text.starts_with("Optimal Breakpoint: 10\n"));
        assert!(text.contains("Segment 1 Coefficients: Intercept = 1, Slope = 0.5"));
        assert!(text.contains("Segment 2 Coefficients: Intercept = -3, Slope = 2"));
    }

    #[test]
    fn header_names_both_variables() {
        let data = Dataset::new("HUMIDITY_VALS", "VWC_VALS", vec![1.0, 2.0], vec![3.0, 4.0]);
        let text = format_header("polynomial regression", &data);
        assert!(text.contains("HUMIDITY_VALS"));
        assert!(text.contains("VWC_VALS"));
        assert!(text.contains("n=2"));
    }
}
