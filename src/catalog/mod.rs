//! Concept catalog: the dictionary of known surface values per concept.
//!
//! A catalog maps a concept name (`titre`, `acteur`, `annee`, `genre`, ...) to
//! the literal values that may appear in a question. It is built once from a
//! tabular source (see [`loader`]) and is read-only afterwards; every matcher
//! receives it by reference.
//!
//! ## Invariants
//!
//! - Numbered roles (`acteur1`, `acteur2`, `acteur3`) collapse into a single
//!   concept key (`acteur`) before any value is stored.
//! - Values are deduplicated and sorted within a concept; the empty string is
//!   never stored.
//! - Concepts iterate in first-seen order. The matcher's ownership tie-break
//!   depends on this order, so it is part of the contract.
//! - Every value carries a pre-compiled whole-word pattern built from the
//!   escaped literal. There is no way to construct an unescaped pattern.

pub mod error;
pub mod loader;

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;

pub use error::{CatalogError, CatalogResult};
pub use loader::CatalogFormat;

/// Trailing single digit on a role name: `acteur1` → `acteur`.
static RE_NUMBERED_ROLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\p{Alphabetic}_][\p{Alphabetic}_ ]*?)\s*[1-9]$").unwrap());

/// Collapse a numbered role name onto its base role.
///
/// `acteur1`, `acteur2` and `acteur3` all become `acteur`. Names without a
/// single trailing digit are returned trimmed but otherwise unchanged.
pub fn normalize_role_name(name: &str) -> String {
    let trimmed = name.trim();
    match RE_NUMBERED_ROLE.captures(trimmed) {
        Some(caps) => caps[1].to_string(),
        None => trimmed.to_string(),
    }
}

/// Wrap an escaped `body` in `\b` on each side where `literal` starts or
/// ends with a word character. `\b` next to punctuation would demand a word
/// character on the other side and never match in running text.
pub(crate) fn word_bounded(literal: &str, body: &str) -> String {
    let lead = if literal.chars().next().is_some_and(is_word_char) { r"\b" } else { "" };
    let tail = if literal.chars().last().is_some_and(is_word_char) { r"\b" } else { "" };
    format!("{lead}{body}{tail}")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// A literal catalog value together with its compiled whole-word pattern.
#[derive(Debug, Clone)]
pub struct CatalogValue {
    text: String,
    pattern: Regex,
}

impl CatalogValue {
    /// Compile the whole-word, case-insensitive pattern for `text`.
    ///
    /// The literal is always passed through [`regex::escape`], so values such
    /// as `"Mission: Impossible (1996)"` match literally. A word boundary is
    /// only required on a side that starts or ends with a word character.
    pub fn new(text: impl Into<String>) -> CatalogResult<Self> {
        let text = text.into();
        let body = word_bounded(&text, &regex::escape(&text));
        let pattern = Regex::new(&format!("(?i){body}")).map_err(|e| {
            CatalogError::Pattern {
                value: text.clone(),
                message: e.to_string(),
            }
        })?;
        Ok(Self { text, pattern })
    }

    /// The literal value as it appeared in the source.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the value occurs in `haystack` as a whole word.
    pub fn occurs_in(&self, haystack: &str) -> bool {
        self.pattern.is_match(haystack)
    }
}

/// One concept and its known values.
#[derive(Debug, Clone)]
pub struct Concept {
    name: String,
    values: Vec<CatalogValue>,
}

impl Concept {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Values in sorted order.
    pub fn values(&self) -> &[CatalogValue] {
        &self.values
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v.text == value)
    }
}

/// Immutable concept dictionary shared by every extraction call.
#[derive(Debug, Clone, Default)]
pub struct ConceptCatalog {
    concepts: Vec<Concept>,
    skipped_rows: usize,
}

impl ConceptCatalog {
    /// Start building a catalog by hand (synthetic catalogs, tests).
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Build a catalog from `(concept, values)` pairs.
    ///
    /// Concept names go through [`normalize_role_name`]; each value is
    /// trimmed and empty values are dropped. Values are not comma-split.
    pub fn from_concepts<I, C, V, S>(concepts: I) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = (C, V)>,
        C: AsRef<str>,
        V: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = CatalogBuilder::default();
        for (name, values) in concepts {
            builder.declare(name.as_ref());
            for value in values {
                builder.insert_value(name.as_ref(), value.as_ref());
            }
        }
        builder.build()
    }

    /// Load a catalog from a CSV file in the given shape.
    pub fn load(path: &std::path::Path, format: CatalogFormat) -> CatalogResult<Self> {
        loader::load(path, format)
    }

    /// Concepts in first-seen order.
    pub fn concepts(&self) -> impl Iterator<Item = &Concept> {
        self.concepts.iter()
    }

    /// Concept names in first-seen order.
    pub fn concept_names(&self) -> impl Iterator<Item = &str> {
        self.concepts.iter().map(|c| c.name.as_str())
    }

    /// Look up a concept by exact name.
    pub fn get(&self, name: &str) -> Option<&Concept> {
        self.concepts.iter().find(|c| c.name == name)
    }

    /// Number of concepts.
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Total number of stored values across all concepts.
    pub fn value_count(&self) -> usize {
        self.concepts.iter().map(|c| c.values.len()).sum()
    }

    /// Rows dropped by the loader because they were malformed.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}

/// Accumulates concept values, then compiles them into a [`ConceptCatalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    concepts: Vec<(String, BTreeSet<String>)>,
    index: HashMap<String, usize>,
    skipped_rows: usize,
}

impl CatalogBuilder {
    /// Register a concept name without adding values. Returns its slot.
    ///
    /// Columns that never hold a value still yield a concept, so that a
    /// question can target them in its SELECT part.
    pub fn declare(&mut self, name: &str) -> Option<usize> {
        let key = normalize_role_name(name);
        if key.is_empty() {
            return None;
        }
        if let Some(&slot) = self.index.get(&key) {
            return Some(slot);
        }
        let slot = self.concepts.len();
        self.index.insert(key.clone(), slot);
        self.concepts.push((key, BTreeSet::new()));
        Some(slot)
    }

    /// Add a single value to a concept, trimming it and dropping it if empty.
    pub fn insert_value(&mut self, concept: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        if let Some(slot) = self.declare(concept) {
            self.concepts[slot].1.insert(value.to_string());
        }
    }

    /// Split a raw cell on commas and add every non-empty token.
    pub fn insert_cell(&mut self, concept: &str, cell: &str) {
        for token in cell.split(',') {
            self.insert_value(concept, token);
        }
    }

    /// Record a malformed source row that was dropped.
    pub fn skip_row(&mut self) {
        self.skipped_rows += 1;
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Compile every value pattern and freeze the catalog.
    pub fn build(self) -> CatalogResult<ConceptCatalog> {
        let concepts = self
            .concepts
            .into_iter()
            .map(|(name, values)| {
                let values = values
                    .into_iter()
                    .map(CatalogValue::new)
                    .collect::<CatalogResult<Vec<_>>>()?;
                Ok(Concept { name, values })
            })
            .collect::<CatalogResult<Vec<_>>>()?;
        Ok(ConceptCatalog {
            concepts,
            skipped_rows: self.skipped_rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_roles_collapse() {
        assert_eq!(normalize_role_name("acteur1"), "acteur");
        assert_eq!(normalize_role_name("acteur3"), "acteur");
        assert_eq!(normalize_role_name(" acteur2 "), "acteur");
        assert_eq!(normalize_role_name("annee"), "annee");
        assert_eq!(normalize_role_name("top10"), "top10");
        assert_eq!(normalize_role_name("2005"), "2005");
    }

    #[test]
    fn builder_merges_numbered_columns() {
        let mut builder = ConceptCatalog::builder();
        builder.insert_cell("acteur1", "Meryl Streep");
        builder.insert_cell("acteur2", "Hugh Jackman, Meryl Streep");
        builder.insert_cell("acteur3", "Nicolas Cage");
        let catalog = builder.build().unwrap();

        assert_eq!(catalog.len(), 1);
        let acteur = catalog.get("acteur").unwrap();
        let values: Vec<_> = acteur.values().iter().map(|v| v.text()).collect();
        assert_eq!(values, vec!["Hugh Jackman", "Meryl Streep", "Nicolas Cage"]);
    }

    #[test]
    fn empty_tokens_are_dropped() {
        let mut builder = ConceptCatalog::builder();
        builder.insert_cell("genre", " , Drame,, ");
        builder.insert_value("genre", "   ");
        let catalog = builder.build().unwrap();
        let genre = catalog.get("genre").unwrap();
        assert_eq!(genre.values().len(), 1);
        assert!(genre.contains("Drame"));
        assert!(!genre.contains(""));
    }

    #[test]
    fn declared_concepts_survive_without_values() {
        let catalog = ConceptCatalog::from_concepts([("titre", Vec::<&str>::new())]).unwrap();
        assert_eq!(catalog.concept_names().collect::<Vec<_>>(), vec!["titre"]);
        assert_eq!(catalog.value_count(), 0);
    }

    #[test]
    fn concept_order_is_first_seen() {
        let catalog = ConceptCatalog::from_concepts([
            ("titre", vec!["Alien"]),
            ("acteur1", vec!["Sigourney Weaver"]),
            ("annee", vec!["1979"]),
            ("acteur2", vec!["John Hurt"]),
        ])
        .unwrap();
        assert_eq!(
            catalog.concept_names().collect::<Vec<_>>(),
            vec!["titre", "acteur", "annee"]
        );
    }

    #[test]
    fn value_pattern_is_whole_word_and_case_insensitive() {
        let cage = CatalogValue::new("Cage").unwrap();
        assert!(cage.occurs_in("un film avec Cage"));
        assert!(cage.occurs_in("un film avec cage."));
        assert!(!cage.occurs_in("Cageless"));
        assert!(!cage.occurs_in("Cag"));
    }

    #[test]
    fn value_pattern_escapes_metacharacters() {
        let value = CatalogValue::new("Mission: Impossible").unwrap();
        assert!(value.occurs_in("le film Mission: Impossible est sorti"));

        let dotted = CatalogValue::new("Dr. No").unwrap();
        assert!(dotted.occurs_in("je veux voir Dr. No ce soir"));
        assert!(!dotted.occurs_in("je veux voir Drx No ce soir"));

        let starred = CatalogValue::new("M*A*S*H").unwrap();
        assert!(starred.occurs_in("un épisode de M*A*S*H hier"));
        assert!(!starred.occurs_in("un épisode de MAAASH hier"));
    }

    #[test]
    fn values_with_punctuation_at_the_edges() {
        let mamma = CatalogValue::new("Mamma Mia!").unwrap();
        assert!(mamma.occurs_in("où le titre est Mamma Mia! avec Meryl Streep"));
        assert!(mamma.occurs_in("où le titre est Mamma Mia!"));
        assert!(!mamma.occurs_in("où le titre est Mamma Mia"));
        assert!(!mamma.occurs_in("xMamma Mia!"));

        let mission = CatalogValue::new("Mission: Impossible (1996)").unwrap();
        assert!(mission.occurs_in("les acteurs de Mission: Impossible (1996) svp"));
        assert!(mission.occurs_in("Mission: Impossible (1996)"));

        let summer = CatalogValue::new("(500) Days of Summer").unwrap();
        assert!(summer.occurs_in("le genre de (500) Days of Summer"));
        assert!(!summer.occurs_in("le genre de (500) Days of Summertime"));
    }
}
