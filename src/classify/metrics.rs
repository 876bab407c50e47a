//! Evaluation metrics: accuracy, confusion matrix, per-class report.

use std::collections::BTreeSet;
use std::fmt;

/// Fraction of positions where prediction equals truth. `0.0` when empty.
pub fn accuracy(y_true: &[String], y_pred: &[String]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let hits = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    hits as f64 / y_true.len() as f64
}

/// Sorted union of the labels seen on either side.
fn label_union(y_true: &[String], y_pred: &[String]) -> Vec<String> {
    y_true
        .iter()
        .chain(y_pred)
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Confusion matrix over the sorted union of labels.
pub fn confusion_matrix(y_true: &[String], y_pred: &[String]) -> ConfusionMatrix {
    ConfusionMatrix::new(y_true, y_pred)
}

/// `counts[i][j]`: rows whose true label is `labels[i]` and predicted label is
/// `labels[j]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub labels: Vec<String>,
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn new(y_true: &[String], y_pred: &[String]) -> Self {
        let labels = label_union(y_true, y_pred);
        let mut counts = vec![vec![0; labels.len()]; labels.len()];
        for (t, p) in y_true.iter().zip(y_pred) {
            if let (Ok(i), Ok(j)) = (labels.binary_search(t), labels.binary_search(p)) {
                counts[i][j] += 1;
            }
        }
        Self { labels, counts }
    }

    pub fn get(&self, truth: &str, predicted: &str) -> usize {
        let find = |label: &str| self.labels.iter().position(|l| l == label);
        match (find(truth), find(predicted)) {
            (Some(i), Some(j)) => self.counts[i][j],
            _ => 0,
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .counts
            .iter()
            .flatten()
            .map(|c| c.to_string().len())
            .max()
            .unwrap_or(1);
        for (i, row) in self.counts.iter().enumerate() {
            let cells: Vec<String> = row.iter().map(|c| format!("{c:>width$}")).collect();
            let open = if i == 0 { "[[" } else { " [" };
            let close = if i + 1 == self.counts.len() { "]]" } else { "]" };
            writeln!(f, "{open}{}{close}", cells.join(" "))?;
        }
        Ok(())
    }
}

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// True occurrences of the class.
    pub support: usize,
}

/// Averaged precision/recall/F1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Averages {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Per-class metrics plus accuracy, macro and support-weighted averages.
///
/// Undefined ratios (no predictions or no support for a class) count as 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: Averages,
    pub weighted_avg: Averages,
    pub support: usize,
}

impl ClassificationReport {
    pub fn new(y_true: &[String], y_pred: &[String]) -> Self {
        let matrix = ConfusionMatrix::new(y_true, y_pred);
        let k = matrix.labels.len();

        let classes: Vec<ClassMetrics> = (0..k)
            .map(|i| {
                let tp = matrix.counts[i][i] as f64;
                let support: usize = matrix.counts[i].iter().sum();
                let predicted: usize = matrix.counts.iter().map(|row| row[i]).sum();
                let precision = ratio(tp, predicted as f64);
                let recall = ratio(tp, support as f64);
                ClassMetrics {
                    label: matrix.labels[i].clone(),
                    precision,
                    recall,
                    f1: ratio(2.0 * precision * recall, precision + recall),
                    support,
                }
            })
            .collect();

        let support: usize = classes.iter().map(|c| c.support).sum();
        let macro_avg = average(&classes, |_| 1.0, k as f64);
        let weighted_avg = average(&classes, |c| c.support as f64, support as f64);

        Self {
            classes,
            accuracy: accuracy(y_true, y_pred),
            macro_avg,
            weighted_avg,
            support,
        }
    }

    pub fn class(&self, label: &str) -> Option<&ClassMetrics> {
        self.classes.iter().find(|c| c.label == label)
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 { 0.0 } else { num / den }
}

fn average(classes: &[ClassMetrics], weight: impl Fn(&ClassMetrics) -> f64, total: f64) -> Averages {
    let sum = |metric: fn(&ClassMetrics) -> f64| {
        ratio(classes.iter().map(|c| weight(c) * metric(c)).sum(), total)
    };
    Averages {
        precision: sum(|c| c.precision),
        recall: sum(|c| c.recall),
        f1: sum(|c| c.f1),
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name_width = self
            .classes
            .iter()
            .map(|c| c.label.chars().count())
            .chain(["weighted avg".len()])
            .max()
            .unwrap_or(0);

        writeln!(
            f,
            "{:>name_width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>name_width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>name_width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.support
        )?;
        for (name, avg) in [("macro avg", self.macro_avg), ("weighted avg", self.weighted_avg)] {
            writeln!(
                f,
                "{:>name_width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1, self.support
            )?;
        }
        Ok(())
    }
}
