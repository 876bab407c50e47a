//! Extractor vocabulary configuration.
//!
//! Every word list the extractor reacts to (trigger verbs, determiners, WHERE
//! markers, year vocabulary, comparator phrases) lives here so a deployment
//! can adjust phrasing without touching code. The [`Default`] vocabulary
//! covers French questions plus the common English forms.
//!
//! ## Example TOML
//!
//! ```toml
//! select_verbs = ["montrer", "afficher", "donner", "voir", "liste"]
//! where_markers = ["où"]
//! year_concepts = ["annee"]
//!
//! [[comparators]]
//! phrase = "après"
//! op = ">"
//! ```
//!
//! Keys that are absent take their default value; unknown keys are rejected.

use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extract::intent::Comparator;

/// Errors from loading or validating an [`ExtractorConfig`].
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("cannot read config \"{path}\": {source}")]
    #[diagnostic(
        code(intent::config::read),
        help("Check that the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config \"{path}\": {message}")]
    #[diagnostic(
        code(intent::config::parse),
        help(
            "The config must be TOML with the keys select_verbs, determiners, \
             where_markers, year_concepts, year_words and [[comparators]]. \
             Any key may be omitted to keep its default."
        )
    )]
    Parse { path: String, message: String },

    #[error("comparator \"{phrase}\" maps to unknown operator \"{op}\"")]
    #[diagnostic(
        code(intent::config::comparator),
        help("Comparator operators must be one of: >, <, >=, <=.")
    )]
    InvalidComparator { phrase: String, op: String },

    #[error("config field \"{field}\" must not be empty")]
    #[diagnostic(
        code(intent::config::empty),
        help(
            "An empty word list would match everywhere. Remove the key to fall \
             back to the default vocabulary instead."
        )
    )]
    EmptyVocabulary { field: &'static str },
}

/// Convenience alias for config results.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// A natural-language phrase standing for a comparison operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparatorSynonym {
    /// Surface phrase, matched case-insensitively (`"après"`, `"à partir de"`).
    pub phrase: String,
    /// Symbolic operator: `>`, `<`, `>=` or `<=`.
    pub op: String,
}

impl ComparatorSynonym {
    fn new(phrase: &str, op: &str) -> Self {
        Self {
            phrase: phrase.into(),
            op: op.into(),
        }
    }
}

/// Vocabulary driving SELECT detection, WHERE partitioning and year parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractorConfig {
    /// Verbs that introduce the SELECT target.
    pub select_verbs: Vec<String>,
    /// Articles allowed between the verb and the target noun.
    pub determiners: Vec<String>,
    /// Words that open the WHERE part of a question.
    pub where_markers: Vec<String>,
    /// Concept names that receive comparative year expressions.
    pub year_concepts: Vec<String>,
    /// Words for "year" that may precede a comparator.
    pub year_words: Vec<String>,
    /// Comparator phrases and their symbolic operators.
    pub comparators: Vec<ComparatorSynonym>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        let words = |ws: &[&str]| ws.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        Self {
            select_verbs: words(&[
                "montrer", "montrez", "montre", "afficher", "affichez", "affiche", "donner",
                "donnez", "donne", "voir", "lister", "listez", "liste", "show", "display",
                "give", "see", "list",
            ]),
            determiners: words(&["les", "le", "la", "l'", "l’", "des", "du", "the"]),
            where_markers: words(&["où", "where"]),
            year_concepts: words(&["year", "annee", "année", "an"]),
            year_words: words(&["années", "année", "annees", "annee", "ans", "an", "years", "year"]),
            comparators: vec![
                ComparatorSynonym::new("plus tard que", ">"),
                ComparatorSynonym::new("après", ">"),
                ComparatorSynonym::new("apres", ">"),
                ComparatorSynonym::new("after", ">"),
                ComparatorSynonym::new("avant", "<"),
                ComparatorSynonym::new("before", "<"),
                ComparatorSynonym::new("à partir de", ">="),
                ComparatorSynonym::new("a partir de", ">="),
                ComparatorSynonym::new("depuis", ">="),
                ComparatorSynonym::new("au moins", ">="),
                ComparatorSynonym::new("since", ">="),
                ComparatorSynonym::new("jusqu'à", "<="),
                ComparatorSynonym::new("jusqu’à", "<="),
                ComparatorSynonym::new("jusqu'en", "<="),
                ComparatorSynonym::new("au plus", "<="),
                ComparatorSynonym::new("until", "<="),
            ],
        }
    }
}

impl ExtractorConfig {
    /// Parse and validate a config from a TOML string.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Self::parse_named(content, "<inline>")
    }

    /// Load and validate a config from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse_named(&content, &path.display().to_string())
    }

    fn parse_named(content: &str, path: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject vocabularies the extractor cannot compile safely.
    pub fn validate(&self) -> ConfigResult<()> {
        let non_empty = |field: &'static str, words: &[String]| {
            if words.iter().all(|w| w.trim().is_empty()) {
                Err(ConfigError::EmptyVocabulary { field })
            } else {
                Ok(())
            }
        };
        non_empty("select_verbs", &self.select_verbs)?;
        non_empty("where_markers", &self.where_markers)?;

        for synonym in &self.comparators {
            if synonym.phrase.trim().is_empty() || Comparator::from_symbol(&synonym.op).is_none() {
                return Err(ConfigError::InvalidComparator {
                    phrase: synonym.phrase.clone(),
                    op: synonym.op.clone(),
                });
            }
        }
        Ok(())
    }

    /// Whether `concept` receives comparative year expressions.
    pub fn is_year_concept(&self, concept: &str) -> bool {
        let lower = concept.to_lowercase();
        self.year_concepts.iter().any(|y| y.to_lowercase() == lower)
    }

    /// Resolve a comparator phrase (or symbol) to its operator.
    pub fn comparator_for(&self, phrase: &str) -> Option<Comparator> {
        let normalized = phrase.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        if let Some(op) = Comparator::from_symbol(&normalized) {
            return Some(op);
        }
        self.comparators
            .iter()
            .find(|s| s.phrase.to_lowercase() == normalized)
            .and_then(|s| Comparator::from_symbol(&s.op))
    }

    /// Serialize to TOML, e.g. to dump the defaults as a starting point.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: "<inline>".into(),
            message: e.to_string(),
        })
    }
}
