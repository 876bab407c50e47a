//! SELECT target detection.
//!
//! Looks for the first trigger verb ("montrer", "afficher", "donner", ...),
//! an optional determiner, then a single word. That word is the SELECT target
//! if it names a concept of the catalog.

use regex::Regex;

use crate::catalog::ConceptCatalog;
use crate::config::{ConfigError, ConfigResult, ExtractorConfig};

/// Compiled trigger-verb pattern.
#[derive(Debug, Clone)]
pub struct SelectDetector {
    pattern: Regex,
}

impl SelectDetector {
    pub fn new(config: &ExtractorConfig) -> ConfigResult<Self> {
        let verbs = escaped_longest_first(&config.select_verbs);
        if verbs.is_empty() {
            return Err(ConfigError::EmptyVocabulary {
                field: "select_verbs",
            });
        }

        // Elided articles ("l'") glue to the noun, the others need a space.
        let (elided, spaced): (Vec<String>, Vec<String>) = config
            .determiners
            .iter()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .partition(|d| d.ends_with('\'') || d.ends_with('’'));
        let mut determiner = Vec::new();
        if !spaced.is_empty() {
            determiner.push(format!(r"(?:{})\s+", escaped_longest_first(&spaced).join("|")));
        }
        if !elided.is_empty() {
            determiner.push(format!(r"(?:{})\s*", escaped_longest_first(&elided).join("|")));
        }
        let determiner = if determiner.is_empty() {
            String::new()
        } else {
            format!("(?:{})?", determiner.join("|"))
        };

        let pattern = format!(r"(?i)\b(?:{})\s+{determiner}(?P<noun>\w+)", verbs.join("|"));
        let pattern = Regex::new(&pattern).map_err(|e| ConfigError::Parse {
            path: "<select vocabulary>".into(),
            message: e.to_string(),
        })?;
        Ok(Self { pattern })
    }

    /// The candidate noun following the first trigger verb, lowercased.
    pub fn candidate(&self, text: &str) -> Option<String> {
        self.pattern
            .captures(text)
            .map(|caps| caps["noun"].to_lowercase())
    }

    /// Resolve the candidate noun against the catalog's concept names.
    pub fn detect<'c>(&self, text: &str, catalog: &'c ConceptCatalog) -> Option<&'c str> {
        let candidate = self.candidate(text)?;
        let target = catalog
            .concept_names()
            .find(|name| name.to_lowercase() == candidate);
        tracing::debug!(%candidate, target = ?target, "select candidate");
        target
    }
}

fn escaped_longest_first(words: &[String]) -> Vec<String> {
    let mut words: Vec<&str> = words.iter().map(|w| w.trim()).filter(|w| !w.is_empty()).collect();
    words.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    words.dedup();
    words.into_iter().map(regex::escape).collect()
}
