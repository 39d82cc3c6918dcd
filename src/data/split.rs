//! Seeded train/test splitting.
//!
//! The ML-style regressors (GAM, random forest, multi-model comparison) hold
//! out a test fraction to report an out-of-sample MSE. The split is a seeded
//! shuffle so runs are reproducible.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::domain::Dataset;
use crate::error::AppError;

/// A train/test partition of a dataset.
#[derive(Debug, Clone)]
pub struct TrainTest {
    pub train: Dataset,
    pub test: Dataset,
}

/// Split `data` into train/test subsets by a seeded shuffle.
///
/// `test_frac` must be in (0, 1). The test set gets `round(n * test_frac)`
/// points, clamped so both sides are non-empty; the training side must retain
/// at least 2 points.
pub fn train_test_split(data: &Dataset, test_frac: f64, seed: u64) -> Result<TrainTest, AppError> {
    if !(test_frac.is_finite() && test_frac > 0.0 && test_frac < 1.0) {
        return Err(AppError::input(format!(
            "Test fraction must be in (0, 1), got {test_frac}."
        )));
    }

    let n = data.len();
    if n < 3 {
        return Err(AppError::insufficient(format!(
            "Need at least 3 points for a train/test split, got {n}."
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64 * test_frac).round() as usize).clamp(1, n - 2);
    let (test_idx, train_idx) = indices.split_at(n_test);

    Ok(TrainTest {
        train: subset(data, train_idx),
        test: subset(data, test_idx),
    })
}

fn subset(data: &Dataset, indices: &[usize]) -> Dataset {
    Dataset {
        x_name: data.x_name.clone(),
        y_name: data.y_name.clone(),
        x: indices.iter().map(|&i| data.x[i]).collect(),
        y: indices.iter().map(|&i| data.y[i]).collect(),
    }
}
