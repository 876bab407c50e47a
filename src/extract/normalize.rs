//! WHERE clause normalization.
//!
//! Turns a raw WHERE map into its canonical form so that two phrasings of the
//! same conditions compare equal and render to the same label:
//!
//! - year buckets: literal comparative phrases ("Après 2005") become
//!   [`YearExpression`]s; symbolic expressions and bare years are kept;
//! - every bucket: duplicates removed, values sorted by rendered form;
//! - empty buckets dropped.
//!
//! Normalization is idempotent.

use std::collections::BTreeMap;

use crate::config::{ConfigResult, ExtractorConfig};

use super::intent::{WhereClause, WhereValue};
use super::year::YearExtractor;

/// Canonicalizes WHERE clauses for one vocabulary.
#[derive(Debug, Clone)]
pub struct WhereNormalizer {
    year_concepts: Vec<String>,
    years: YearExtractor,
}

impl WhereNormalizer {
    pub fn new(config: &ExtractorConfig) -> ConfigResult<Self> {
        Ok(Self {
            year_concepts: config.year_concepts.iter().map(|c| c.to_lowercase()).collect(),
            years: YearExtractor::new(config)?,
        })
    }

    pub fn normalize(&self, clause: WhereClause) -> WhereClause {
        clause
            .into_iter()
            .filter_map(|(concept, values)| {
                let is_year = self.year_concepts.contains(&concept.to_lowercase());
                let mut canonical: BTreeMap<String, WhereValue> = BTreeMap::new();
                for value in values {
                    let value = if is_year { self.normalize_year(value) } else { value };
                    canonical.entry(value.to_string()).or_insert(value);
                }
                if canonical.is_empty() {
                    None
                } else {
                    Some((concept, canonical.into_values().collect()))
                }
            })
            .collect()
    }

    fn normalize_year(&self, value: WhereValue) -> WhereValue {
        match value {
            WhereValue::Literal(text) => match self.years.parse(&text.to_lowercase()) {
                Some(expr) => WhereValue::Year(expr),
                None => WhereValue::Literal(text),
            },
            year @ WhereValue::Year(_) => year,
        }
    }
}
