//! ASCII plotting for terminal output.
//!
//! Intentionally "dumb" (fixed-size character grid), optimized for:
//! - quick visual sanity checks of a calibration fit
//! - deterministic output (handy for golden tests)
//!
//! Plot elements:
//! - observed points: `o`
//! - fitted curve: `-`

use crate::domain::Dataset;
use crate::models::Predictor;

/// Render the observed data and (optionally) a fitted curve.
pub fn render_ascii_plot(
    data: &Dataset,
    model: Option<&dyn Predictor>,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(20);
    let height = height.max(5);

    let (x_min, x_max) = match data.x_range() {
        Some(r) if r.1 > r.0 => r,
        Some((v, _)) => (v - 0.5, v + 0.5),
        None => (0.0, 1.0),
    };

    // Sample the curve at one value per column.
    let curve: Vec<(f64, f64)> = match model {
        Some(m) => (0..width)
            .map(|col| {
                let u = col as f64 / (width as f64 - 1.0);
                let x = x_min + u * (x_max - x_min);
                (x, m.predict(x))
            })
            .filter(|(_, y)| y.is_finite())
            .collect(),
        None => Vec::new(),
    };

    // Y range covers both observations and the curve, with a little headroom.
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for &y in data.y.iter().chain(curve.iter().map(|(_, y)| y)) {
        if y.is_finite() {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    if y_min > y_max {
        y_min = 0.0;
        y_max = 1.0;
    }
    if (y_max - y_min).abs() < 1e-12 {
        y_min -= 0.5;
        y_max += 0.5;
    }
    let pad = (y_max - y_min) * 0.05;
    y_min -= pad;
    y_max += pad;

    let mut grid = vec![vec![' '; width]; height];

    let to_col = |x: f64| -> Option<usize> {
        let u = (x - x_min) / (x_max - x_min);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        Some(((u * (width as f64 - 1.0)).round() as usize).min(width - 1))
    };
    let to_row = |y: f64| -> Option<usize> {
        let u = (y - y_min) / (y_max - y_min);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        // Row 0 at the top.
        Some(height - 1 - ((u * (height as f64 - 1.0)).round() as usize).min(height - 1))
    };

    for &(x, y) in &curve {
        if let (Some(col), Some(row)) = (to_col(x), to_row(y)) {
            grid[row][col] = '-';
        }
    }

    // Observations drawn last so they sit on top of the curve.
    for (&x, &y) in data.x.iter().zip(data.y.iter()) {
        if let (Some(col), Some(row)) = (to_col(x), to_row(y)) {
            grid[row][col] = 'o';
        }
    }

    let mut out = String::new();
    for (row_idx, row) in grid.iter().enumerate() {
        let frac = 1.0 - row_idx as f64 / (height as f64 - 1.0);
        let y_label = y_min + frac * (y_max - y_min);
        out.push_str(&format!("{y_label:>10.4} |"));
        out.extend(row.iter());
        out.push('\n');
    }

    out.push_str(&format!("{:>10} +{}\n", "", "-".repeat(width)));
    let left = format!("{x_min:.4}");
    let right = format!("{x_max:.4}");
    let gap = width.saturating_sub(left.len() + right.len());
    out.push_str(&format!("{:>10}  {left}{}{right}\n", "", " ".repeat(gap)));
    out.push_str(&format!(
        "{:>10}  x: {} | y: {} | o=observed, -=fitted\n",
        "", data.x_name, data.y_name
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CalibModel;

    #[test]
    fn plot_contains_points_and_curve() {
        let data = Dataset::new(
            "HUMIDITY_VALS",
            "VWC_VALS",
            vec![1.0, 2.0, 3.0, 4.0],
            vec![1.0, 2.0, 3.0, 4.0],
        );
        let model = CalibModel::Polynomial { coeffs: vec![0.0, 1.0] };
        let plot = render_ascii_plot(&data, Some(&model), 40, 12);
        assert!(plot.contains('o'));
        assert!(plot.contains('-'));
        assert!(plot.contains("HUMIDITY_VALS"));
    }

    #[test]
    fn plot_is_deterministic() {
        let data = Dataset::new("H", "V", vec![1.0, 5.0, 9.0], vec![0.2, 0.6, 0.3]);
        let a = render_ascii_plot(&data, None, 60, 15);
        let b = render_ascii_plot(&data, None, 60, 15);
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_x_range_does_not_panic() {
        let data = Dataset::new("H", "V", vec![2.0, 2.0], vec![1.0, 1.0]);
        let plot = render_ascii_plot(&data, None, 40, 10);
        assert!(plot.contains('o'));
    }
}
