//! Random forest regression on a single predictor.
//!
//! Each tree is grown on a bootstrap resample with a deterministic,
//! exhaustive split search: candidate thresholds are midpoints between
//! consecutive distinct sorted x values, scored by the SSE reduction of the
//! resulting partition. The only randomness is the bootstrap, driven by a
//! per-tree RNG derived from the run seed, so the whole forest is
//! reproducible. Trees are grown in parallel.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::domain::Dataset;
use crate::error::AppError;
use crate::models::Predictor;

#[derive(Debug, Clone)]
pub struct ForestOptions {
    pub n_trees: usize,
    /// Minimum number of samples in a leaf.
    pub min_leaf: usize,
    /// Optional depth cap; `None` grows until leaves are pure or too small.
    pub max_depth: Option<usize>,
    pub seed: u64,
}

impl Default for ForestOptions {
    fn default() -> Self {
        Self {
            n_trees: 100,
            min_leaf: 1,
            max_depth: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, x: f64) -> f64 {
        match self {
            Node::Leaf(v) => *v,
            Node::Split {
                threshold,
                left,
                right,
            } => {
                if x <= *threshold {
                    left.predict(x)
                } else {
                    right.predict(x)
                }
            }
        }
    }
}

/// A fitted forest: predictions are the mean over the trees.
#[derive(Debug, Clone)]
pub struct ForestModel {
    trees: Vec<Node>,
}

impl ForestModel {
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Predictor for ForestModel {
    fn predict(&self, x: f64) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict(x)).sum();
        sum / self.trees.len() as f64
    }
}

/// Fit a random forest on (training) data.
pub fn fit_forest(data: &Dataset, opts: &ForestOptions) -> Result<ForestModel, AppError> {
    if opts.n_trees == 0 {
        return Err(AppError::input("Forest needs at least 1 tree."));
    }
    if opts.min_leaf == 0 {
        return Err(AppError::input("Minimum leaf size must be at least 1."));
    }
    let n = data.len();
    if n < 2 {
        return Err(AppError::insufficient(format!(
            "Need at least 2 points to fit a forest, got {n}."
        )));
    }

    let trees: Vec<Node> = (0..opts.n_trees)
        .into_par_iter()
        .map(|tree_idx| {
            let mut rng = StdRng::seed_from_u64(opts.seed.wrapping_add(tree_idx as u64));
            let mut x = Vec::with_capacity(n);
            let mut y = Vec::with_capacity(n);
            for _ in 0..n {
                let i = rng.gen_range(0..n);
                x.push(data.x[i]);
                y.push(data.y[i]);
            }
            grow(&x, &y, opts, 0)
        })
        .collect();

    Ok(ForestModel { trees })
}

fn grow(x: &[f64], y: &[f64], opts: &ForestOptions, depth: usize) -> Node {
    let n = x.len();
    let mean = y.iter().sum::<f64>() / n as f64;

    if n < 2 * opts.min_leaf || n < 2 {
        return Node::Leaf(mean);
    }
    if let Some(max_depth) = opts.max_depth {
        if depth >= max_depth {
            return Node::Leaf(mean);
        }
    }
    if y.iter().all(|&v| v == y[0]) {
        return Node::Leaf(mean);
    }

    let Some(threshold) = best_split(x, y, opts.min_leaf) else {
        return Node::Leaf(mean);
    };

    let (mut lx, mut ly, mut rx, mut ry) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        if xi <= threshold {
            lx.push(xi);
            ly.push(yi);
        } else {
            rx.push(xi);
            ry.push(yi);
        }
    }

    Node::Split {
        threshold,
        left: Box::new(grow(&lx, &ly, opts, depth + 1)),
        right: Box::new(grow(&rx, &ry, opts, depth + 1)),
    }
}

/// Exhaustive 1-D split search: thresholds are midpoints between consecutive
/// distinct x values; pick the one minimizing left SSE + right SSE.
fn best_split(x: &[f64], y: &[f64], min_leaf: usize) -> Option<f64> {
    let n = x.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| x[a].partial_cmp(&x[b]).unwrap_or(std::cmp::Ordering::Equal));

    // Prefix sums over the sorted order for O(1) segment SSE:
    // SSE = sum(y^2) - (sum(y))^2 / n
    let mut sum = vec![0.0; n + 1];
    let mut sum_sq = vec![0.0; n + 1];
    for (rank, &i) in order.iter().enumerate() {
        sum[rank + 1] = sum[rank] + y[i];
        sum_sq[rank + 1] = sum_sq[rank] + y[i] * y[i];
    }

    let seg_sse = |from: usize, to: usize| -> f64 {
        let cnt = (to - from) as f64;
        let s = sum[to] - sum[from];
        let sq = sum_sq[to] - sum_sq[from];
        (sq - s * s / cnt).max(0.0)
    };

    let mut best: Option<(f64, f64)> = None; // (threshold, score)
    for rank in 1..n {
        let (lo, hi) = (x[order[rank - 1]], x[order[rank]]);
        if lo == hi {
            continue;
        }
        if rank < min_leaf || n - rank < min_leaf {
            continue;
        }
        let score = seg_sse(0, rank) + seg_sse(rank, n);
        let threshold = 0.5 * (lo + hi);
        let improves = match best {
            None => true,
            Some((_, s)) => score < s,
        };
        if improves {
            best = Some((threshold, score));
        }
    }

    best.map(|(t, _)| t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_response_predicts_the_constant() {
        let data = Dataset::new(
            "H",
            "V",
            (0..20).map(|i| i as f64).collect(),
            vec![0.37; 20],
        );
        let forest = fit_forest(&data, &ForestOptions::default()).unwrap();
        assert!((forest.predict(4.5) - 0.37).abs() < 1e-12);
        assert!((forest.predict(100.0) - 0.37).abs() < 1e-12);
    }

    #[test]
    fn forest_is_deterministic_per_seed() {
        let x: Vec<f64> = (0..30).map(|i| i as f64 * 0.3).collect();
        let y: Vec<f64> = x.iter().map(|&v| v * v * 0.1).collect();
        let data = Dataset::new("H", "V", x, y);

        let opts = ForestOptions { n_trees: 25, ..ForestOptions::default() };
        let a = fit_forest(&data, &opts).unwrap();
        let b = fit_forest(&data, &opts).unwrap();
        for xi in [0.5, 3.1, 7.7] {
            assert_eq!(a.predict(xi), b.predict(xi));
        }
    }

    #[test]
    fn step_function_is_learned() {
        // y jumps from 0 to 1 at x = 10; the forest should separate the
        // regimes away from the boundary.
        let x: Vec<f64> = (0..40).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|&v| if v < 10.0 { 0.0 } else { 1.0 }).collect();
        let data = Dataset::new("H", "V", x, y);

        let forest = fit_forest(&data, &ForestOptions::default()).unwrap();
        assert!(forest.predict(2.0) < 0.2);
        assert!(forest.predict(18.0) > 0.8);
    }

    #[test]
    fn rejects_zero_trees() {
        let data = Dataset::new("H", "V", vec![1.0, 2.0], vec![1.0, 2.0]);
        let opts = ForestOptions { n_trees: 0, ..ForestOptions::default() };
        assert_eq!(fit_forest(&data, &opts).unwrap_err().exit_code(), 2);
    }
}
