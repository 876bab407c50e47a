//! Rich diagnostic error types for the text classifiers.

use miette::Diagnostic;
use thiserror::Error;

/// Errors from fitting or evaluating a classifier.
#[derive(Debug, Error, Diagnostic)]
pub enum ClassifyError {
    #[error("cannot fit a classifier on an empty training set")]
    #[diagnostic(
        code(intent::classify::empty),
        help("The training split has no rows. Check the dataset or lower --test-size.")
    )]
    EmptyTrainingSet,

    #[error("training set has a single class \"{label}\"")]
    #[diagnostic(
        code(intent::classify::single_class),
        help(
            "A linear classifier needs at least two distinct labels. \
             Add questions with other SELECT/WHERE labels to the dataset."
        )
    )]
    SingleClass { label: String },

    #[error("{features} feature rows but {labels} labels")]
    #[diagnostic(
        code(intent::classify::length_mismatch),
        help("Every feature row needs exactly one label.")
    )]
    LengthMismatch { features: usize, labels: usize },

    #[error("test size {value} is outside (0, 1)")]
    #[diagnostic(
        code(intent::classify::test_size),
        help("Use a fraction such as 0.2 for an 80/20 train/test split.")
    )]
    InvalidTestSize { value: f64 },

    #[error("need at least 2 rows to split, got {count}")]
    #[diagnostic(
        code(intent::classify::too_few_rows),
        help("A train/test split needs one row on each side.")
    )]
    NotEnoughSamples { count: usize },

    #[error("classifier used before fit")]
    #[diagnostic(
        code(intent::classify::not_fitted),
        help("Call `fit` with training data before `predict`.")
    )]
    NotFitted,
}

/// Convenience alias for classifier results.
pub type ClassifyResult<T> = std::result::Result<T, ClassifyError>;
