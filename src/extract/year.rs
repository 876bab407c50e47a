//! Comparative year extraction.
//!
//! Years show up in questions both as plain catalog values ("sorti en 2005")
//! and as comparisons that no catalog cell contains ("après 2005",
//! "l'année >= 1999"). This extractor handles the second form: an optional
//! year word, a required comparator phrase from the configured synonym set,
//! then a 4-digit year.

use regex::Regex;

use crate::catalog::word_bounded;
use crate::config::{ConfigError, ConfigResult, ExtractorConfig};

use super::intent::{Comparator, YearExpression};

/// Compiled year-comparison patterns for one vocabulary.
#[derive(Debug, Clone)]
pub struct YearExtractor {
    scan: Regex,
    exact: Regex,
    synonyms: Vec<(String, Comparator)>,
}

impl YearExtractor {
    pub fn new(config: &ExtractorConfig) -> ConfigResult<Self> {
        let mut synonyms = Vec::with_capacity(config.comparators.len());
        for synonym in &config.comparators {
            let op = Comparator::from_symbol(&synonym.op).ok_or_else(|| {
                ConfigError::InvalidComparator {
                    phrase: synonym.phrase.clone(),
                    op: synonym.op.clone(),
                }
            })?;
            synonyms.push((squash(&synonym.phrase), op));
        }

        let mut phrases: Vec<String> = synonyms.iter().map(|(p, _)| p.clone()).collect();
        phrases.extend([">=", "<=", ">", "<"].map(String::from));
        let comparators = alternation(&phrases);

        let year_words: Vec<String> = config.year_words.iter().map(|w| squash(w)).collect();
        let year_prefix = if year_words.iter().any(|w| !w.is_empty()) {
            format!(r"(?:\b(?:l['’]\s*)?(?:{})\s*)?", alternation(&year_words))
        } else {
            String::new()
        };

        let scan = format!(r"(?i){year_prefix}(?P<op>{comparators})\s*\b(?P<year>[0-9]{{4}})\b");
        let exact = format!(r"(?i)^\s*(?P<op>{comparators})\s*(?P<year>[0-9]{{4}})\s*$");
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| ConfigError::Parse {
                path: "<year vocabulary>".into(),
                message: e.to_string(),
            })
        };

        Ok(Self {
            scan: compile(&scan)?,
            exact: compile(&exact)?,
            synonyms,
        })
    }

    /// Every comparative year expression in `text`, in order of appearance.
    pub fn extract(&self, text: &str) -> Vec<YearExpression> {
        self.scan
            .captures_iter(text)
            .filter_map(|caps| {
                let op = self.resolve(&caps["op"])?;
                Some(YearExpression::new(op, &caps["year"]))
            })
            .collect()
    }

    /// Parse a standalone expression such as `"après 2005"` or `">= 1999"`.
    pub fn parse(&self, expression: &str) -> Option<YearExpression> {
        let caps = self.exact.captures(expression)?;
        let op = self.resolve(&caps["op"])?;
        Some(YearExpression::new(op, &caps["year"]))
    }

    fn resolve(&self, phrase: &str) -> Option<Comparator> {
        if let Some(op) = Comparator::from_symbol(phrase) {
            return Some(op);
        }
        let phrase = squash(phrase).to_lowercase();
        self.synonyms
            .iter()
            .find(|(p, _)| p.to_lowercase() == phrase)
            .map(|(_, op)| *op)
    }
}

/// Trim and collapse internal whitespace runs to one space.
fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Longest-first regex alternation of escaped phrases, with word boundaries
/// on sides that start or end with a word character.
fn alternation(phrases: &[String]) -> String {
    let mut sorted: Vec<&String> = phrases.iter().filter(|p| !p.is_empty()).collect();
    sorted.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    sorted.dedup();
    sorted
        .into_iter()
        .map(|phrase| {
            let body = regex::escape(phrase).replace(' ', r"\s+");
            word_bounded(phrase, &body)
        })
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> YearExtractor {
        YearExtractor::new(&ExtractorConfig::default()).unwrap()
    }

    fn rendered(text: &str) -> Vec<String> {
        extractor().extract(text).iter().map(ToString::to_string).collect()
    }

    #[test]
    fn symbolic_operator_after_year_word() {
        assert_eq!(rendered("années où l'année > 2005"), vec!["> 2005"]);
        assert_eq!(rendered("l'année >= 1999"), vec![">= 1999"]);
        assert_eq!(rendered("annee<2010"), vec!["< 2010"]);
    }

    #[test]
    fn natural_language_comparators() {
        assert_eq!(rendered("Hugh Jackman joue après 2005."), vec!["> 2005"]);
        assert_eq!(rendered("sortis AVANT 1990"), vec!["< 1990"]);
        assert_eq!(rendered("à partir de 2001"), vec![">= 2001"]);
        assert_eq!(rendered("jusqu'à 1980"), vec!["<= 1980"]);
        assert_eq!(rendered("films released after 2012"), vec!["> 2012"]);
    }

    #[test]
    fn multiple_expressions_keep_order() {
        assert_eq!(rendered("après 1990 et avant 2000"), vec!["> 1990", "< 2000"]);
    }

    #[test]
    fn bare_year_is_not_an_expression() {
        assert!(rendered("sorti en 2005").is_empty());
        assert!(rendered("l'année 2005").is_empty());
    }

    #[test]
    fn requires_exactly_four_digits() {
        assert!(rendered("après 20055").is_empty());
        assert!(rendered("après 205").is_empty());
    }

    #[test]
    fn comparator_inside_word_is_ignored() {
        assert!(rendered("auparavant 2005").is_empty());
    }

    #[test]
    fn parse_standalone_expression() {
        let years = extractor();
        assert_eq!(years.parse("Après 2005"), Some(YearExpression::new(Comparator::Gt, "2005")));
        assert_eq!(years.parse("  >=   1999 "), Some(YearExpression::new(Comparator::Ge, "1999")));
        assert_eq!(years.parse("2005"), None);
        assert_eq!(years.parse("après 2005 et avant 2010"), None);
    }
}
