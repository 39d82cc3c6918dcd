//! Multi-model comparison on a shared train/test split.
//!
//! Fits a suite of regressors on the training subset, scores each by MSE on
//! the held-out test subset, and ranks them best-first. Models that cannot be
//! fit on the given data (e.g. logarithmic with non-positive readings) are
//! skipped with the reason recorded, not treated as a hard failure.

use crate::data::{TrainTest, train_test_split};
use crate::domain::Dataset;
use crate::error::AppError;
use crate::fit::forest::{ForestOptions, fit_forest};
use crate::fit::gam::{GamOptions, fit_gam};
use crate::fit::logarithmic::fit_logarithmic;
use crate::fit::polynomial::fit_polynomial;
use crate::fit::power::{PowerFitOptions, fit_power};
use crate::math::mse;
use crate::models::{Predictor, predict_all};

#[derive(Debug, Clone)]
pub struct CompareOptions {
    pub test_frac: f64,
    pub seed: u64,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            test_frac: 0.2,
            seed: 42,
        }
    }
}

/// Test score for one regressor.
#[derive(Debug, Clone)]
pub struct ModelScore {
    pub name: String,
    pub test_mse: f64,
}

/// Output of the comparison run.
#[derive(Debug, Clone)]
pub struct Comparison {
    /// Scores sorted ascending by test MSE (best first).
    pub scores: Vec<ModelScore>,
    /// Models that could not be fit, and why.
    pub skipped: Vec<(String, String)>,
    pub n_train: usize,
    pub n_test: usize,
}

/// Ridge regression on a single standardized predictor.
struct RidgePredictor {
    slope: f64,
    intercept: f64,
}

impl Predictor for RidgePredictor {
    fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

fn fit_ridge(train: &Dataset, alpha: f64) -> Result<RidgePredictor, AppError> {
    let n = train.len() as f64;
    if train.len() < 2 {
        return Err(AppError::insufficient("Ridge needs at least 2 points."));
    }
    let x_bar = train.x.iter().sum::<f64>() / n;
    let y_bar = train.y.iter().sum::<f64>() / n;
    let sxy: f64 = train
        .x
        .iter()
        .zip(train.y.iter())
        .map(|(&x, &y)| (x - x_bar) * (y - y_bar))
        .sum();
    let sxx: f64 = train.x.iter().map(|&x| (x - x_bar) * (x - x_bar)).sum();

    // Penalizing only the slope; the intercept stays unshrunk as usual.
    let slope = sxy / (sxx + alpha);
    if !slope.is_finite() {
        return Err(AppError::numeric("Ridge fit produced a non-finite slope."));
    }
    Ok(RidgePredictor {
        slope,
        intercept: y_bar - slope * x_bar,
    })
}

/// k-nearest-neighbor regression by predictor distance.
struct KnnPredictor {
    x: Vec<f64>,
    y: Vec<f64>,
    k: usize,
}

impl Predictor for KnnPredictor {
    fn predict(&self, x: f64) -> f64 {
        let mut dist: Vec<(f64, f64)> = self
            .x
            .iter()
            .zip(self.y.iter())
            .map(|(&xi, &yi)| ((xi - x).abs(), yi))
            .collect();
        dist.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        let k = self.k.min(dist.len()).max(1);
        dist[..k].iter().map(|(_, y)| y).sum::<f64>() / k as f64
    }
}

/// Fit every regressor in the suite and rank by held-out MSE.
pub fn compare_models(data: &Dataset, opts: &CompareOptions) -> Result<Comparison, AppError> {
    if data.len() < 10 {
        return Err(AppError::insufficient(format!(
            "Need at least 10 points for a meaningful model comparison, got {}.",
            data.len()
        )));
    }

    let TrainTest { train, test } = train_test_split(data, opts.test_frac, opts.seed)?;

    let mut scores = Vec::new();
    let mut skipped = Vec::new();

    for (name, result) in candidate_fits(&train, opts.seed) {
        match result {
            Ok(model) => {
                let y_fit = predict_all(model.as_ref(), &test.x);
                let test_mse = mse(&test.y, &y_fit);
                if test_mse.is_finite() {
                    scores.push(ModelScore { name, test_mse });
                } else {
                    skipped.push((name, "non-finite test predictions".to_string()));
                }
            }
            Err(err) => skipped.push((name, err.to_string())),
        }
    }

    if scores.is_empty() {
        return Err(AppError::insufficient(
            "No model in the comparison suite could be fit to this dataset.",
        ));
    }

    scores.sort_by(|a, b| {
        a.test_mse
            .partial_cmp(&b.test_mse)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(Comparison {
        scores,
        skipped,
        n_train: train.len(),
        n_test: test.len(),
    })
}

type NamedFit = (String, Result<Box<dyn Predictor>, AppError>);

fn candidate_fits(train: &Dataset, seed: u64) -> Vec<NamedFit> {
    let mut out: Vec<NamedFit> = Vec::new();

    out.push((
        "Linear Regression".to_string(),
        fit_polynomial(train, 1).map(|f| Box::new(f.model) as Box<dyn Predictor>),
    ));
    out.push((
        "Ridge Regression".to_string(),
        fit_ridge(train, 1.0).map(|m| Box::new(m) as Box<dyn Predictor>),
    ));
    for degree in 2..=4usize {
        out.push((
            format!("Polynomial (degree {degree})"),
            fit_polynomial(train, degree).map(|f| Box::new(f.model) as Box<dyn Predictor>),
        ));
    }
    out.push((
        "Logarithmic".to_string(),
        fit_logarithmic(train).map(|f| Box::new(f.model) as Box<dyn Predictor>),
    ));
    out.push((
        "Power".to_string(),
        fit_power(train, &PowerFitOptions::default()).map(|f| Box::new(f.model) as Box<dyn Predictor>),
    ));
    out.push((
        "Linear GAM".to_string(),
        fit_gam(train, &GamOptions::default()).map(|f| Box::new(f.model) as Box<dyn Predictor>),
    ));
    out.push((
        "Random Forest".to_string(),
        fit_forest(train, &ForestOptions { seed, ..ForestOptions::default() })
            .map(|m| Box::new(m) as Box<dyn Predictor>),
    ));
    out.push((
        "KNN (k=5)".to_string(),
        Ok(Box::new(KnnPredictor {
            x: train.x.clone(),
            y: train.y.clone(),
            k: 5,
        }) as Box<dyn Predictor>),
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_data_ranks_a_linear_family_first() {
        let x: Vec<f64> = (0..50).map(|i| 1.0 + i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|&v| 0.01 * v + 0.05).collect();
        let data = Dataset::new("H", "V", x, y);

        let cmp = compare_models(&data, &CompareOptions::default()).unwrap();
        // Linear, ridge, and the polynomial family all nail noise-free linear
        // data; the winner must be one of the exact-fit families.
        let winner = &cmp.scores[0];
        assert!(winner.test_mse < 1e-10, "winner {} mse {}", winner.name, winner.test_mse);
        assert!(
            winner.name.contains("Linear") || winner.name.contains("Polynomial"),
            "unexpected winner {}",
            winner.name
        );
    }

    #[test]
    fn logarithmic_skipped_on_negative_readings() {
        // Mostly negative readings: log and power cannot fit.
        let x: Vec<f64> = (0..20).map(|i| i as f64 - 19.0).collect();
        let y: Vec<f64> = x.iter().map(|&v| 2.0 * v).collect();
        let data = Dataset::new("H", "V", x, y);

        let cmp = compare_models(&data, &CompareOptions::default()).unwrap();
        assert!(cmp.skipped.iter().any(|(name, _)| name == "Power"));
        assert!(!cmp.scores.iter().any(|s| s.name == "Power"));
    }

    #[test]
    fn scores_are_sorted_ascending() {
        let x: Vec<f64> = (0..40).map(|i| 1.0 + i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&v| (v * 0.3).sin() + 0.02 * v).collect();
        let data = Dataset::new("H", "V", x, y);

        let cmp = compare_models(&data, &CompareOptions::default()).unwrap();
        for pair in cmp.scores.windows(2) {
            assert!(pair[0].test_mse <= pair[1].test_mse);
        }
    }
}
