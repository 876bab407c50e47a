//! One-vs-rest perceptron.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::error::{ClassifyError, ClassifyResult};
use super::vectorizer::{SparseVector, dot};
use super::{Classifier, encode_labels, feature_count};

/// Linear perceptron with one weight row per class.
///
/// Each epoch visits the training rows in a seeded shuffled order and, for
/// every class, applies the update `w += t·x, b += t` whenever the row's
/// signed margin `t·(w·x + b)` is not positive (`t = +1` for the row's own
/// class, `-1` otherwise). Training stops after `max_iter` epochs, after an
/// epoch with no mistakes, or once the mistake rate has failed to improve by
/// more than `tol` for `n_iter_no_change` consecutive epochs.
#[derive(Debug, Clone)]
pub struct Perceptron {
    pub max_iter: usize,
    pub tol: f64,
    pub n_iter_no_change: usize,
    pub seed: u64,
    classes: Vec<String>,
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
    epochs: usize,
}

impl Default for Perceptron {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tol: 1e-3,
            n_iter_no_change: 5,
            seed: 0,
            classes: Vec::new(),
            weights: Vec::new(),
            bias: Vec::new(),
            epochs: 0,
        }
    }
}

impl Perceptron {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Epochs run by the last `fit`.
    pub fn epochs(&self) -> usize {
        self.epochs
    }
}

impl Classifier for Perceptron {
    fn name(&self) -> &str {
        "perceptron"
    }

    fn fit(&mut self, x: &[SparseVector], y: &[String]) -> ClassifyResult<()> {
        let (classes, targets) = encode_labels(x.len(), y)?;
        let n_features = feature_count(x);
        let k = classes.len();

        let mut weights = vec![vec![0.0; n_features]; k];
        let mut bias = vec![0.0; k];
        let mut order: Vec<usize> = (0..x.len()).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut best = f64::INFINITY;
        let mut stale = 0;
        let mut epochs = 0;
        for _ in 0..self.max_iter {
            epochs += 1;
            order.shuffle(&mut rng);
            let mut mistakes = 0usize;
            for &i in &order {
                for c in 0..k {
                    let t = if targets[i] == c { 1.0 } else { -1.0 };
                    if t * (dot(&weights[c], &x[i]) + bias[c]) <= 0.0 {
                        for &(j, v) in &x[i] {
                            weights[c][j] += t * v;
                        }
                        bias[c] += t;
                        mistakes += 1;
                    }
                }
            }

            let rate = mistakes as f64 / (x.len() * k) as f64;
            if mistakes == 0 {
                break;
            }
            if rate > best - self.tol {
                stale += 1;
                if stale >= self.n_iter_no_change {
                    break;
                }
            } else {
                stale = 0;
            }
            best = best.min(rate);
        }

        tracing::debug!(classes = k, features = n_features, epochs, "perceptron fitted");
        self.classes = classes;
        self.weights = weights;
        self.bias = bias;
        self.epochs = epochs;
        Ok(())
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn decision(&self, x: &SparseVector) -> ClassifyResult<Vec<f64>> {
        if self.classes.is_empty() {
            return Err(ClassifyError::NotFitted);
        }
        Ok(self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(w, b)| dot(w, x) + b)
            .collect())
    }
}
