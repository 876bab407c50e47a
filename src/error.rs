//! Rich diagnostic error types for film-intent.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it. [`IntentError`] wraps them all for callers that
//! drive more than one subsystem (the CLI, the dataset builder).

use miette::Diagnostic;
use thiserror::Error;

pub use crate::catalog::error::CatalogError;
pub use crate::classify::error::ClassifyError;
pub use crate::config::ConfigError;
pub use crate::dataset::DatasetError;
pub use crate::sql::LabelError;

/// Top-level error type.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source spans) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum IntentError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Label(#[from] LabelError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Classify(#[from] ClassifyError),
}

/// Convenience alias for results that may carry any subsystem error.
pub type IntentResult<T> = std::result::Result<T, IntentError>;
