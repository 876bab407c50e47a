//! Rule-based question → intent extraction.
//!
//! ## Pipeline
//!
//! ```text
//!                   ┌──→ SelectDetector ───────────────────────────┐
//! question ─────────┤                                              ├──→ IntentRecord
//!                   └──→ WherePartitioner ──→ ConceptMatcher ──┐   │
//!                                             + YearExtractor  ├──→ WhereNormalizer
//!                                                              ┘
//! ```
//!
//! The [`ConceptCatalog`] is never owned by the extractor: it is passed to
//! every call, so one extractor can serve several catalogs and tests can use
//! small synthetic ones.
//!
//! ## Usage
//!
//! ```rust
//! use film_intent::catalog::ConceptCatalog;
//! use film_intent::extract::IntentExtractor;
//!
//! let catalog = ConceptCatalog::from_concepts([
//!     ("titre", vec!["Mamma Mia!"]),
//!     ("acteur", vec!["Meryl Streep"]),
//!     ("annee", vec!["2008"]),
//! ])
//! .unwrap();
//! let extractor = IntentExtractor::default();
//! let intent = extractor.extract("Veuillez me montrer le titre des films où Meryl Streep joue", &catalog);
//! assert_eq!(intent.select_intent.as_deref(), Some("titre"));
//! assert_eq!(intent.where_intent.rendered("acteur"), vec!["Meryl Streep"]);
//! ```

pub mod intent;
pub mod matcher;
pub mod normalize;
pub mod partition;
pub mod select;
pub mod year;

use std::sync::LazyLock;

use crate::catalog::ConceptCatalog;
use crate::config::{ConfigResult, ExtractorConfig};

pub use intent::{Comparator, IntentRecord, WhereClause, WhereValue, YearExpression};
pub use matcher::{ConceptMatcher, match_concepts};
pub use normalize::WhereNormalizer;
pub use partition::{WherePartitioner, partition_where};
pub use select::SelectDetector;
pub use year::YearExtractor;

static DEFAULT_EXTRACTOR: LazyLock<IntentExtractor> = LazyLock::new(IntentExtractor::default);

/// Compiled extraction pipeline for one vocabulary.
#[derive(Debug, Clone)]
pub struct IntentExtractor {
    config: ExtractorConfig,
    select: SelectDetector,
    partitioner: WherePartitioner,
    years: YearExtractor,
    normalizer: WhereNormalizer,
}

impl Default for IntentExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default()).expect("default vocabulary must compile")
    }
}

impl IntentExtractor {
    /// Validate the vocabulary and compile every pattern.
    pub fn new(config: ExtractorConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            select: SelectDetector::new(&config)?,
            partitioner: WherePartitioner::new(&config)?,
            years: YearExtractor::new(&config)?,
            normalizer: WhereNormalizer::new(&config)?,
            config,
        })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Run the full pipeline on one question.
    pub fn extract(&self, query: &str, catalog: &ConceptCatalog) -> IntentRecord {
        let select_intent = self.detect_select(query, catalog).map(str::to_string);
        let scope = self.partition_where(query);
        let where_intent = self.normalize(self.scan_where(scope, catalog));
        tracing::debug!(
            query,
            select = ?select_intent,
            conditions = where_intent.len(),
            "intent extracted"
        );
        IntentRecord {
            select_intent,
            where_intent,
        }
    }

    /// SELECT target of a question, if any.
    pub fn detect_select<'c>(&self, query: &str, catalog: &'c ConceptCatalog) -> Option<&'c str> {
        self.select.detect(query, catalog)
    }

    /// The WHERE scope of a question.
    pub fn partition_where<'q>(&self, query: &'q str) -> &'q str {
        self.partitioner.partition(query)
    }

    /// Match literal values and year comparisons in `scope`, unnormalized.
    ///
    /// Comparative year expressions are extracted once and go to the first
    /// year concept in catalog order. Their years are consumed before the
    /// literal pass, so it does not emit `2005` next to `> 2005`. Literal
    /// values are then matched concept by concept with one consumed-value set
    /// for the whole scan.
    pub fn scan_where(&self, scope: &str, catalog: &ConceptCatalog) -> WhereClause {
        let mut matcher = ConceptMatcher::new(catalog);
        let mut clause = WhereClause::new();
        let year_owner = catalog
            .concepts()
            .find(|concept| self.config.is_year_concept(concept.name()));
        if let Some(owner) = year_owner {
            for expr in self.years.extract(scope) {
                tracing::debug!(concept = owner.name(), expression = %expr, "year match");
                matcher.consume(&expr.year);
                clause.push(owner.name(), WhereValue::Year(expr));
            }
        }
        for concept in catalog.concepts() {
            for hit in matcher.match_concept(concept, scope) {
                clause.push(concept.name(), WhereValue::Literal(hit));
            }
        }
        clause
    }

    /// Canonicalize a WHERE clause.
    pub fn normalize(&self, clause: WhereClause) -> WhereClause {
        self.normalizer.normalize(clause)
    }
}

/// Extract an intent with the default French/English vocabulary.
pub fn extract_intentions(query: &str, catalog: &ConceptCatalog) -> IntentRecord {
    DEFAULT_EXTRACTOR.extract(query, catalog)
}
