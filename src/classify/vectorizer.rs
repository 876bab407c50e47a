//! Bag-of-words token counting.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Tokens are runs of two or more word characters.
static RE_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Sparse feature vector: `(feature index, value)` sorted by index.
pub type SparseVector = Vec<(usize, f64)>;

/// Dot product of a dense weight row with a sparse vector.
///
/// Indices beyond the weight row (features unseen at fit time) are ignored.
pub fn dot(weights: &[f64], x: &SparseVector) -> f64 {
    x.iter()
        .filter_map(|&(j, v)| weights.get(j).map(|w| w * v))
        .sum()
}

/// Lowercased word tokens of a document.
pub fn tokenize(doc: &str) -> Vec<String> {
    RE_TOKEN
        .find_iter(&doc.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Maps documents to token-count vectors over a fitted vocabulary.
#[derive(Debug, Clone, Default)]
pub struct CountVectorizer {
    vocabulary: BTreeMap<String, usize>,
}

impl CountVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the vocabulary; indices follow alphabetical token order.
    pub fn fit<S: AsRef<str>>(&mut self, docs: &[S]) {
        let mut tokens: BTreeMap<String, usize> = BTreeMap::new();
        for doc in docs {
            for token in tokenize(doc.as_ref()) {
                tokens.insert(token, 0);
            }
        }
        for (idx, slot) in tokens.values_mut().enumerate() {
            *slot = idx;
        }
        self.vocabulary = tokens;
    }

    /// Count known tokens of one document. Unknown tokens are dropped.
    pub fn transform_one(&self, doc: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokenize(doc) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }
        counts.into_iter().collect()
    }

    pub fn transform<S: AsRef<str>>(&self, docs: &[S]) -> Vec<SparseVector> {
        docs.iter().map(|d| self.transform_one(d.as_ref())).collect()
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, docs: &[S]) -> Vec<SparseVector> {
        self.fit(docs);
        self.transform(docs)
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.vocabulary.get(token).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_drops_single_characters() {
        assert_eq!(
            tokenize("Montrez-moi l'année des films à voir"),
            vec!["montrez", "moi", "année", "des", "films", "voir"]
        );
    }

    #[test]
    fn vocabulary_is_alphabetical() {
        let mut vectorizer = CountVectorizer::new();
        vectorizer.fit(&["titre films", "acteur films"]);
        assert_eq!(vectorizer.len(), 3);
        assert_eq!(vectorizer.index_of("acteur"), Some(0));
        assert_eq!(vectorizer.index_of("films"), Some(1));
        assert_eq!(vectorizer.index_of("titre"), Some(2));
    }

    #[test]
    fn counts_and_unknown_tokens() {
        let mut vectorizer = CountVectorizer::new();
        vectorizer.fit(&["films films titre"]);
        assert_eq!(vectorizer.transform_one("Films FILMS films genre"), vec![(0, 3.0)]);
        assert!(vectorizer.transform_one("rien").is_empty());
    }

    #[test]
    fn dot_ignores_unseen_features() {
        assert_eq!(dot(&[1.0, 2.0], &vec![(0, 1.0), (1, 2.0), (7, 5.0)]), 5.0);
    }
}
