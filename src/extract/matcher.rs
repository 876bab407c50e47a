//! Literal concept matching.
//!
//! Scans a text for every catalog value, concept by concept in catalog order.
//! A value string is owned by the first concept that matches it: once a
//! literal has been attributed it is recorded in a consumed set shared by the
//! whole scan, and later concepts skip it even if they list the same string.

use std::collections::HashSet;

use crate::catalog::{Concept, ConceptCatalog};

use super::intent::{WhereClause, WhereValue};

/// One scan over a catalog, carrying the set of already-attributed values.
pub struct ConceptMatcher<'c> {
    catalog: &'c ConceptCatalog,
    consumed: HashSet<String>,
}

impl<'c> ConceptMatcher<'c> {
    pub fn new(catalog: &'c ConceptCatalog) -> Self {
        Self {
            catalog,
            consumed: HashSet::new(),
        }
    }

    /// Mark a literal as attributed so no later concept can claim it.
    pub fn consume(&mut self, value: &str) {
        self.consumed.insert(value.to_string());
    }

    pub fn is_consumed(&self, value: &str) -> bool {
        self.consumed.contains(value)
    }

    /// Match the values of a single concept, consuming every hit.
    pub fn match_concept(&mut self, concept: &Concept, text: &str) -> Vec<String> {
        let mut hits = Vec::new();
        for value in concept.values() {
            if self.consumed.contains(value.text()) {
                continue;
            }
            if value.occurs_in(text) {
                tracing::debug!(concept = concept.name(), value = value.text(), "literal match");
                self.consumed.insert(value.text().to_string());
                hits.push(value.text().to_string());
            }
        }
        hits
    }

    /// Match every concept of the catalog in order.
    pub fn match_all(mut self, text: &str) -> WhereClause {
        let mut clause = WhereClause::new();
        for concept in self.catalog.concepts() {
            for hit in self.match_concept(concept, text) {
                clause.push(concept.name(), WhereValue::Literal(hit));
            }
        }
        clause
    }
}

/// Match all literal catalog values occurring in `text`.
pub fn match_concepts(text: &str, catalog: &ConceptCatalog) -> WhereClause {
    ConceptMatcher::new(catalog).match_all(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ConceptCatalog {
        ConceptCatalog::from_concepts([
            ("titre", vec!["Alien", "Heat"]),
            ("acteur", vec!["Nicolas Cage", "Cage", "Meryl Streep"]),
            ("genre", vec!["Drame", "Heat"]),
        ])
        .unwrap()
    }

    #[test]
    fn whole_word_only() {
        let catalog = ConceptCatalog::from_concepts([("acteur", vec!["Cage"])]).unwrap();
        assert_eq!(match_concepts("un film avec Cage", &catalog).rendered("acteur"), vec!["Cage"]);
        assert_eq!(match_concepts("un film avec cage", &catalog).rendered("acteur"), vec!["Cage"]);
        assert!(match_concepts("Cageless", &catalog).is_empty());
        assert!(match_concepts("Cag", &catalog).is_empty());
    }

    #[test]
    fn first_concept_owns_shared_value() {
        let clause = match_concepts("Je veux voir Heat ce soir", &catalog());
        assert_eq!(clause.rendered("titre"), vec!["Heat"]);
        assert!(clause.get("genre").is_none());
    }

    #[test]
    fn overlapping_values_both_match_within_a_concept() {
        let clause = match_concepts("un drame avec Nicolas Cage", &catalog());
        assert_eq!(clause.rendered("acteur"), vec!["Cage", "Nicolas Cage"]);
        assert_eq!(clause.rendered("genre"), vec!["Drame"]);
    }

    #[test]
    fn consumed_values_are_skipped() {
        let catalog = catalog();
        let mut matcher = ConceptMatcher::new(&catalog);
        matcher.consume("Alien");
        let titre = catalog.get("titre").unwrap();
        assert!(matcher.match_concept(titre, "Alien et Heat").contains(&"Heat".to_string()));
        assert!(!matcher.match_concept(titre, "Alien").contains(&"Alien".to_string()));
        assert!(matcher.is_consumed("Heat"));
    }

    #[test]
    fn empty_catalog_matches_nothing() {
        let catalog = ConceptCatalog::default();
        assert!(match_concepts("Meryl Streep", &catalog).is_empty());
    }
}
