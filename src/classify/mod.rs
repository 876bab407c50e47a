//! Statistical intent classifiers trained on the labelled dataset.
//!
//! Two independent classifiers run over bag-of-words counts of the French
//! question: one predicts the `select=[...]` label, the other the
//! `where='...'` label. [`evaluate`] mirrors the experiment protocol: fit the
//! vectorizer on every question, split with a fixed seed, train on the train
//! side, and report accuracy, a confusion matrix and per-class
//! precision/recall on the test side.

pub mod error;
pub mod logistic;
pub mod metrics;
pub mod perceptron;
pub mod split;
pub mod vectorizer;

use std::collections::BTreeSet;
use std::fmt;

pub use error::{ClassifyError, ClassifyResult};
pub use logistic::{ClassWeight, LogisticRegression};
pub use metrics::{ClassificationReport, ConfusionMatrix, accuracy, confusion_matrix};
pub use perceptron::Perceptron;
pub use split::{Split, train_test_split};
pub use vectorizer::{CountVectorizer, SparseVector};

use crate::dataset::TrainingRow;

/// A multi-class linear text classifier over sparse count features.
pub trait Classifier {
    /// Short model name for logs and reports.
    fn name(&self) -> &str;

    fn fit(&mut self, x: &[SparseVector], y: &[String]) -> ClassifyResult<()>;

    /// Known labels in index order (sorted).
    fn classes(&self) -> &[String];

    /// One score per class.
    fn decision(&self, x: &SparseVector) -> ClassifyResult<Vec<f64>>;

    /// Highest-scoring label; ties go to the earlier class.
    fn predict_one(&self, x: &SparseVector) -> ClassifyResult<String> {
        let scores = self.decision(x)?;
        let best = scores
            .iter()
            .enumerate()
            .fold(None::<(usize, f64)>, |best, (i, &s)| match best {
                Some((_, top)) if top >= s => best,
                _ => Some((i, s)),
            })
            .map(|(i, _)| i)
            .ok_or(ClassifyError::NotFitted)?;
        Ok(self.classes()[best].clone())
    }

    fn predict(&self, xs: &[SparseVector]) -> ClassifyResult<Vec<String>> {
        xs.iter().map(|x| self.predict_one(x)).collect()
    }
}

/// Sorted distinct labels and each row's index into them.
pub(crate) fn encode_labels(
    n_rows: usize,
    y: &[String],
) -> ClassifyResult<(Vec<String>, Vec<usize>)> {
    if n_rows != y.len() {
        return Err(ClassifyError::LengthMismatch {
            features: n_rows,
            labels: y.len(),
        });
    }
    if y.is_empty() {
        return Err(ClassifyError::EmptyTrainingSet);
    }
    let classes: Vec<String> = y
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if classes.len() < 2 {
        return Err(ClassifyError::SingleClass {
            label: classes[0].clone(),
        });
    }
    let targets = y
        .iter()
        .filter_map(|label| classes.binary_search(label).ok())
        .collect();
    Ok((classes, targets))
}

/// One past the largest feature index used by any row.
pub(crate) fn feature_count(x: &[SparseVector]) -> usize {
    x.iter()
        .flat_map(|row| row.iter().map(|&(j, _)| j + 1))
        .max()
        .unwrap_or(0)
}

/// Which label column a classifier learns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Select,
    Where,
}

impl Target {
    pub fn label<'r>(&self, row: &'r TrainingRow) -> &'r str {
        match self {
            Self::Select => &row.select_label,
            Self::Where => &row.where_label,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => write!(f, "SELECT"),
            Self::Where => write!(f, "WHERE"),
        }
    }
}

impl std::str::FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "select" => Ok(Self::Select),
            "where" => Ok(Self::Where),
            other => Err(format!("unknown target \"{other}\" (expected select or where)")),
        }
    }
}

/// Held-out results for one classifier on one target.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub target: Target,
    pub model: String,
    pub train_size: usize,
    pub test_size: usize,
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
    pub report: ClassificationReport,
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} classifier ({}), {} train / {} test",
            self.target, self.model, self.train_size, self.test_size
        )?;
        writeln!(f)?;
        write!(f, "{}", self.report)?;
        writeln!(f)?;
        writeln!(f, "Confusion matrix:")?;
        write!(f, "{}", self.confusion)?;
        writeln!(f, "Accuracy: {:.4}", self.accuracy)
    }
}

/// Vectorize, split, fit and score `model` on one label column of `rows`.
pub fn evaluate(
    rows: &[TrainingRow],
    target: Target,
    model: &mut dyn Classifier,
    test_size: f64,
    seed: u64,
) -> ClassifyResult<Evaluation> {
    let questions: Vec<&str> = rows.iter().map(|r| r.query_french.as_str()).collect();
    let labels: Vec<String> = rows.iter().map(|r| target.label(r).to_string()).collect();

    let mut vectorizer = CountVectorizer::new();
    let features = vectorizer.fit_transform(&questions);
    let split = train_test_split(rows.len(), test_size, seed)?;

    let pick = |idx: &[usize]| -> (Vec<SparseVector>, Vec<String>) {
        idx.iter()
            .map(|&i| (features[i].clone(), labels[i].clone()))
            .unzip()
    };
    let (x_train, y_train) = pick(&split.train);
    let (x_test, y_test) = pick(&split.test);

    model.fit(&x_train, &y_train)?;
    let predicted = model.predict(&x_test)?;

    let evaluation = Evaluation {
        target,
        model: model.name().to_string(),
        train_size: x_train.len(),
        test_size: x_test.len(),
        accuracy: accuracy(&y_test, &predicted),
        confusion: confusion_matrix(&y_test, &predicted),
        report: ClassificationReport::new(&y_test, &predicted),
    };
    tracing::info!(
        column = %target,
        model = %evaluation.model,
        features = vectorizer.len(),
        accuracy = evaluation.accuracy,
        "classifier evaluated"
    );
    Ok(evaluation)
}
