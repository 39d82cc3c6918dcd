//! Write fitted models to disk.
//!
//! The JSON file is the portable representation of a calibration:
//! - model kind + parameters
//! - fit quality
//! - a precomputed curve grid for quick external plotting
//!
//! The schema is defined by `domain::CalibrationFile`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{CalibrationFile, CurveGrid, Dataset, FitQuality, LinearSegment};
use crate::error::AppError;
use crate::models::{CalibModel, Predictor};

/// Assemble the exportable calibration record for a fitted model.
pub fn build_calibration_file(
    data: &Dataset,
    model: &CalibModel,
    quality: &FitQuality,
) -> CalibrationFile {
    let (x_min, x_max) = data.x_range().unwrap_or((0.0, 1.0));
    let grid = sample_grid(model, x_min, x_max, 101);

    CalibrationFile {
        tool: "soilcal".to_string(),
        fitted_at: chrono::Local::now().to_rfc3339(),
        predictor_var: data.x_name.clone(),
        response_var: data.y_name.clone(),
        model: model.clone(),
        quality: quality.clone(),
        grid,
    }
}

/// Write a calibration JSON file.
pub fn write_model_json(path: &Path, calibration: &CalibrationFile) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::input(format!(
            "Failed to create model JSON '{}': {e}",
            path.display()
        ))
    })?;

    serde_json::to_writer_pretty(file, calibration)
        .map_err(|e| AppError::input(format!("Failed to write model JSON: {e}")))?;

    Ok(())
}

/// Read a calibration JSON file back (round-trip support for downstream
/// tooling and tests).
pub fn read_model_json(path: &Path) -> Result<CalibrationFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::input(format!("Failed to open model JSON '{}': {e}", path.display()))
    })?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::input(format!("Invalid model JSON: {e}")))
}

/// Write the piecewise coefficients text file.
pub fn write_coefficients_txt(
    path: &Path,
    breakpoint: f64,
    left: &LinearSegment,
    right: &LinearSegment,
) -> Result<(), AppError> {
    let text = crate::report::piecewise_coefficients_text(breakpoint, left, right);
    let mut file = File::create(path).map_err(|e| {
        AppError::input(format!(
            "Failed to create coefficients file '{}': {e}",
            path.display()
        ))
    })?;
    file.write_all(text.as_bytes())
        .map_err(|e| AppError::input(format!("Failed to write coefficients file: {e}")))?;
    Ok(())
}

fn sample_grid(model: &CalibModel, x_min: f64, x_max: f64, n: usize) -> CurveGrid {
    let n = n.max(2);
    let (mut lo, mut hi) = (x_min, x_max);
    if !(lo.is_finite() && hi.is_finite()) || hi <= lo {
        lo = 0.0;
        hi = 1.0;
    }

    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let xi = lo + u * (hi - lo);
        x.push(xi);
        y.push(model.predict(xi));
    }
    CurveGrid { x, y }
}
