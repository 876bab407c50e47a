// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # film-intent
//!
//! Turns French natural-language questions about a movie collection into a
//! structured intent: the column to SELECT and the WHERE conditions, each
//! condition keyed by a concept (`acteur`, `titre`, `annee`, ...).
//!
//! ## Architecture
//!
//! - **Concept catalog** (`catalog`): known values per concept, loaded from CSV
//! - **Rule extractor** (`extract`): SELECT detection, WHERE partitioning,
//!   catalog matching, year comparatives, normalization
//! - **Vocabulary config** (`config`): trigger verbs, markers, comparators (TOML)
//! - **Labels** (`label`, `sql`): canonical `select=[...]` / `where='...'`
//!   strings, from extracted intents or from SQL
//! - **Learning** (`dataset`, `classify`): CSV training sets, bag-of-words
//!   perceptron and logistic regression, evaluation reports
//!
//! ## Library usage
//!
//! ```no_run
//! use film_intent::catalog::{CatalogFormat, ConceptCatalog};
//! use film_intent::extract::IntentExtractor;
//!
//! let catalog = ConceptCatalog::load("concepts.csv".as_ref(), CatalogFormat::Columns).unwrap();
//! let extractor = IntentExtractor::default();
//! let intent = extractor.extract("Montrez le titre des films où Meryl Streep joue après 2005", &catalog);
//! println!("{intent}");
//! ```

pub mod catalog;
pub mod classify;
pub mod config;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod label;
pub mod sql;
