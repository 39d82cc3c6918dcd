//! Environment-variable series ingest.
//!
//! Calibration datasets arrive as comma-separated numeric lists in named
//! environment variables, typically populated from a local `.env` file:
//!
//! ```text
//! HUMIDITY_VALS=512, 478, 430, 395, 221
//! VWC_VALS=0.05, 0.11, 0.19, 0.25, 0.41
//! ```
//!
//! Design goals:
//! - clear errors naming the offending variable and token (exit code 2)
//! - both `", "` and `","` separators accepted (tokens are trimmed)
//! - no fitting logic here

use crate::domain::Dataset;
use crate::error::AppError;

/// Load a `.env` file from the working directory into the process
/// environment, if one exists. Missing files are not an error; the variables
/// may already be set in the environment.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Read and parse one comma-separated numeric series.
pub fn read_series(name: &str) -> Result<Vec<f64>, AppError> {
    let raw = std::env::var(name).map_err(|_| {
        AppError::input(format!(
            "Environment variable '{name}' is not set. Add it to your .env file as a comma-separated list."
        ))
    })?;

    parse_series(name, &raw)
}

/// Parse a comma-separated list of floats.
pub fn parse_series(name: &str, raw: &str) -> Result<Vec<f64>, AppError> {
    if raw.trim().is_empty() {
        return Err(AppError::input(format!("Environment variable '{name}' is empty.")));
    }

    let mut out = Vec::new();
    for (i, token) in raw.split(',').enumerate() {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::input(format!(
                "Empty value at position {} in '{name}'.",
                i + 1
            )));
        }
        let value: f64 = token.parse().map_err(|_| {
            AppError::input(format!(
                "Cannot parse '{token}' (position {}) in '{name}' as a number.",
                i + 1
            ))
        })?;
        if !value.is_finite() {
            return Err(AppError::input(format!(
                "Non-finite value '{token}' (position {}) in '{name}'.",
                i + 1
            )));
        }
        out.push(value);
    }

    Ok(out)
}

/// Load a paired predictor/response dataset and validate lengths.
pub fn load_pair(x_name: &str, y_name: &str) -> Result<Dataset, AppError> {
    let x = read_series(x_name)?;
    let y = read_series(y_name)?;

    if x.len() != y.len() {
        return Err(AppError::input(format!(
            "'{x_name}' has {} values but '{y_name}' has {}; the series must be paired.",
            x.len(),
            y.len()
        )));
    }

    Ok(Dataset::new(x_name, y_name, x, y))
}

/// Inputs for the zero-EC permittivity calibration; four series of equal length.
#[derive(Debug, Clone)]
pub struct ZeroEcInputs {
    pub humidity: Vec<f64>,
    pub vwc: Vec<f64>,
    pub bulk_ec: Vec<f64>,
    pub temperature: Vec<f64>,
}

/// Load the four zero-EC calibration series and validate that they are all
/// the same length.
pub fn load_zero_ec_inputs() -> Result<ZeroEcInputs, AppError> {
    let humidity = read_series("HUMIDITY_VALS")?;
    let vwc = read_series("VWC_VALS")?;
    let bulk_ec = read_series("BULK_EC")?;
    let temperature = read_series("TEMPERATURE")?;

    let n = humidity.len();
    if vwc.len() != n || bulk_ec.len() != n || temperature.len() != n {
        return Err(AppError::input(format!(
            "All input series must have the same length (HUMIDITY_VALS={}, VWC_VALS={}, BULK_EC={}, TEMPERATURE={}).",
            n,
            vwc.len(),
            bulk_ec.len(),
            temperature.len()
        )));
    }

    Ok(ZeroEcInputs {
        humidity,
        vwc,
        bulk_ec,
        temperature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_series_accepts_both_separators() {
        let v = parse_series("T", "1.0, 2.5,3").unwrap();
        assert_eq!(v, vec![1.0, 2.5, 3.0]);
    }

    #[test]
    fn parse_series_rejects_bad_token() {
        let err = parse_series("T", "1.0, abc, 3").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn parse_series_rejects_empty_and_trailing() {
        assert_eq!(parse_series("T", "  ").unwrap_err().exit_code(), 2);
        assert_eq!(parse_series("T", "1.0, 2.0,").unwrap_err().exit_code(), 2);
    }

    #[test]
    fn parse_series_rejects_non_finite() {
        let err = parse_series("T", "1.0, inf").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    // SAFETY (both tests below): tests run multi-threaded, so each env-mutating
    // test uses variable names no other test reads.

    #[test]
    fn load_pair_rejects_length_mismatch() {
        unsafe {
            std::env::set_var("PAIR_MISMATCH_X", "1.0, 2.0, 3.0");
            std::env::set_var("PAIR_MISMATCH_Y", "0.1, 0.2");
        }
        let err = load_pair("PAIR_MISMATCH_X", "PAIR_MISMATCH_Y").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("paired"), "message: {err}");
        assert!(err.to_string().contains("PAIR_MISMATCH_X"));
    }

    #[test]
    fn zero_ec_inputs_must_all_have_the_same_length() {
        unsafe {
            std::env::set_var("HUMIDITY_VALS", "500, 480, 450");
            std::env::set_var("VWC_VALS", "0.10, 0.15, 0.22");
            std::env::set_var("BULK_EC", "0.5, 0.6");
            std::env::set_var("TEMPERATURE", "20.0, 21.0, 22.0");
        }
        let err = load_zero_ec_inputs().unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("BULK_EC=2"), "message: {err}");
    }
}
