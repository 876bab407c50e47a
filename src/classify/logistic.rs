//! Multinomial logistic regression with optional class weighting.

use std::collections::{BTreeMap, HashMap};

use super::error::{ClassifyError, ClassifyResult};
use super::vectorizer::{SparseVector, dot};
use super::{Classifier, encode_labels, feature_count};

/// Per-class sample weighting.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ClassWeight {
    /// Every sample weighs 1.
    #[default]
    None,
    /// `n_samples / (n_classes * count(class))`, computed at fit time.
    Balanced,
    /// Explicit weights. Classes missing from the map weigh 1.
    Manual(HashMap<String, f64>),
}

impl ClassWeight {
    /// Inverse-frequency weights for a label list, as an explicit map.
    pub fn inverse_frequency(y: &[String]) -> Self {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for label in y {
            *counts.entry(label.as_str()).or_insert(0) += 1;
        }
        let total = y.len() as f64;
        let n_classes = counts.len() as f64;
        Self::Manual(
            counts
                .into_iter()
                .map(|(label, count)| (label.to_string(), total / (n_classes * count as f64)))
                .collect(),
        )
    }

    fn per_class(&self, classes: &[String], targets: &[usize]) -> Vec<f64> {
        match self {
            Self::None => vec![1.0; classes.len()],
            Self::Balanced => {
                let mut counts = vec![0usize; classes.len()];
                for &t in targets {
                    counts[t] += 1;
                }
                let total = targets.len() as f64;
                let k = classes.len() as f64;
                counts
                    .into_iter()
                    .map(|c| if c == 0 { 1.0 } else { total / (k * c as f64) })
                    .collect()
            }
            Self::Manual(map) => classes
                .iter()
                .map(|c| map.get(c).copied().unwrap_or(1.0))
                .collect(),
        }
    }
}

impl std::fmt::Display for ClassWeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Balanced => write!(f, "balanced"),
            Self::Manual(map) => write!(f, "manual({} classes)", map.len()),
        }
    }
}

/// Softmax regression trained by full-batch gradient descent.
///
/// Minimizes the class-weighted mean cross-entropy plus an L2 penalty
/// `‖W‖² / (2·c·n)` on the weights (not the intercepts). Stops after
/// `max_iter` steps or once the largest gradient component drops below `tol`.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    /// Inverse regularization strength.
    pub c: f64,
    pub max_iter: usize,
    pub learning_rate: f64,
    pub tol: f64,
    pub class_weight: ClassWeight,
    classes: Vec<String>,
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
    iterations: usize,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            learning_rate: 0.5,
            tol: 1e-4,
            class_weight: ClassWeight::None,
            classes: Vec::new(),
            weights: Vec::new(),
            bias: Vec::new(),
            iterations: 0,
        }
    }
}

impl LogisticRegression {
    pub fn new(class_weight: ClassWeight) -> Self {
        Self {
            class_weight,
            ..Self::default()
        }
    }

    /// Gradient steps run by the last `fit`.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Class probabilities for one row, in [`Classifier::classes`] order.
    pub fn predict_proba(&self, x: &SparseVector) -> ClassifyResult<Vec<f64>> {
        Ok(softmax(&self.decision(x)?))
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &str {
        "logistic"
    }

    fn fit(&mut self, x: &[SparseVector], y: &[String]) -> ClassifyResult<()> {
        let (classes, targets) = encode_labels(x.len(), y)?;
        let n_features = feature_count(x);
        let k = classes.len();
        let n = x.len() as f64;
        let sample_weight = self.class_weight.per_class(&classes, &targets);
        let penalty = 1.0 / (self.c * n);

        let mut weights = vec![vec![0.0; n_features]; k];
        let mut bias = vec![0.0; k];
        let mut iterations = 0;
        for _ in 0..self.max_iter {
            iterations += 1;
            let mut grad_w = vec![vec![0.0; n_features]; k];
            let mut grad_b = vec![0.0; k];

            for (row, &target) in x.iter().zip(&targets) {
                let scores: Vec<f64> = weights
                    .iter()
                    .zip(&bias)
                    .map(|(w, b)| dot(w, row) + b)
                    .collect();
                let probs = softmax(&scores);
                let sw = sample_weight[target];
                for c in 0..k {
                    let indicator = if c == target { 1.0 } else { 0.0 };
                    let g = sw * (probs[c] - indicator) / n;
                    for &(j, v) in row {
                        grad_w[c][j] += g * v;
                    }
                    grad_b[c] += g;
                }
            }

            let mut largest: f64 = 0.0;
            for c in 0..k {
                for j in 0..n_features {
                    let g = grad_w[c][j] + penalty * weights[c][j];
                    weights[c][j] -= self.learning_rate * g;
                    largest = largest.max(g.abs());
                }
                bias[c] -= self.learning_rate * grad_b[c];
                largest = largest.max(grad_b[c].abs());
            }
            if largest < self.tol {
                break;
            }
        }

        tracing::debug!(
            classes = k,
            features = n_features,
            iterations,
            class_weight = %self.class_weight,
            "logistic regression fitted"
        );
        self.classes = classes;
        self.weights = weights;
        self.bias = bias;
        self.iterations = iterations;
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

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn toy() -> (Vec<SparseVector>, Vec<String>) {
        // feature 0 marks "a", feature 1 marks "b"; feature 2 is shared noise
        let x = vec![
            vec![(0, 1.0), (2, 1.0)],
            vec![(0, 2.0)],
            vec![(0, 1.0)],
            vec![(1, 1.0), (2, 1.0)],
        ];
        (x, labels(&["a", "a", "a", "b"]))
    }

    #[test]
    fn fits_separable_data() {
        let (x, y) = toy();
        let mut model = LogisticRegression {
            c: 100.0,
            ..LogisticRegression::default()
        };
        model.fit(&x, &y).unwrap();
        assert!(model.iterations() >= 1);
        assert_eq!(model.predict(&x).unwrap(), y);

        let probs = model.predict_proba(&vec![(1, 1.0)]).unwrap();
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(probs[1] > probs[0]);
    }

    #[test]
    fn balanced_weights_favor_the_minority() {
        let (x, y) = toy();
        let mut plain = LogisticRegression::new(ClassWeight::None);
        let mut balanced = LogisticRegression::new(ClassWeight::Balanced);
        plain.fit(&x, &y).unwrap();
        balanced.fit(&x, &y).unwrap();

        let noise = vec![(2, 1.0)];
        let p_plain = plain.predict_proba(&noise).unwrap()[1];
        let p_balanced = balanced.predict_proba(&noise).unwrap()[1];
        assert!(p_balanced > p_plain);
    }

    #[test]
    fn inverse_frequency_matches_balanced_formula() {
        let y = labels(&["a", "a", "a", "b"]);
        let ClassWeight::Manual(map) = ClassWeight::inverse_frequency(&y) else {
            panic!("expected manual weights");
        };
        assert!((map["a"] - 4.0 / 6.0).abs() < 1e-12);
        assert!((map["b"] - 2.0).abs() < 1e-12);

        let classes = labels(&["a", "b"]);
        let targets = [0, 0, 0, 1];
        let balanced = ClassWeight::Balanced.per_class(&classes, &targets);
        let manual = ClassWeight::inverse_frequency(&y).per_class(&classes, &targets);
        assert_eq!(balanced, manual);
    }

    #[test]
    fn manual_weights_default_to_one() {
        let weights = ClassWeight::Manual(HashMap::from([("b".to_string(), 3.0)]))
            .per_class(&labels(&["a", "b"]), &[0, 1]);
        assert_eq!(weights, vec![1.0, 3.0]);
    }

    #[test]
    fn unfitted_model() {
        assert!(matches!(
            LogisticRegression::default().predict_proba(&vec![]),
            Err(ClassifyError::NotFitted)
        ));
    }
}
