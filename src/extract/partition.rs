//! WHERE-scope partitioning.
//!
//! Conditions usually follow a clause marker ("... des films où Meryl Streep
//! joue"). Everything after the first marker is the WHERE scope; without a
//! marker the whole question is scanned.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{ConfigError, ConfigResult, ExtractorConfig};

static DEFAULT_PARTITIONER: LazyLock<WherePartitioner> = LazyLock::new(|| {
    WherePartitioner::new(&ExtractorConfig::default()).expect("default WHERE markers compile")
});

/// Splits a question at its first WHERE marker.
#[derive(Debug, Clone)]
pub struct WherePartitioner {
    marker: Regex,
}

impl WherePartitioner {
    pub fn new(config: &ExtractorConfig) -> ConfigResult<Self> {
        let markers: Vec<String> = config
            .where_markers
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .map(regex::escape)
            .collect();
        if markers.is_empty() {
            return Err(ConfigError::EmptyVocabulary {
                field: "where_markers",
            });
        }
        let marker = Regex::new(&format!(r"(?i)\b(?:{})\b", markers.join("|"))).map_err(|e| {
            ConfigError::Parse {
                path: "<where markers>".into(),
                message: e.to_string(),
            }
        })?;
        Ok(Self { marker })
    }

    /// The part of `text` after the first marker, trimmed; the whole text if
    /// no marker occurs.
    pub fn partition<'t>(&self, text: &'t str) -> &'t str {
        match self.marker.find(text) {
            Some(m) => text[m.end()..].trim(),
            None => text,
        }
    }
}

/// Partition with the default `où`/`where` markers.
pub fn partition_where(text: &str) -> &str {
    DEFAULT_PARTITIONER.partition(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_after_first_marker() {
        assert_eq!(
            partition_where("le titre des films où Meryl Streep joue"),
            "Meryl Streep joue"
        );
        assert_eq!(partition_where("Où joue Meryl Streep ?"), "joue Meryl Streep ?");
        assert_eq!(
            partition_where("films où acteur où genre"),
            "acteur où genre"
        );
    }

    #[test]
    fn english_marker() {
        assert_eq!(partition_where("show titles WHERE year > 2005"), "year > 2005");
    }

    #[test]
    fn without_marker_keeps_whole_text() {
        let text = "Veuillez me montrer les films de Meryl Streep";
        assert_eq!(partition_where(text), text);
    }

    #[test]
    fn marker_inside_word_is_not_a_split() {
        let text = "films whereas Meryl Streep";
        assert_eq!(partition_where(text), text);
    }

    #[test]
    fn custom_markers() {
        let config = ExtractorConfig {
            where_markers: vec!["dont".into()],
            ..Default::default()
        };
        let partitioner = WherePartitioner::new(&config).unwrap();
        assert_eq!(partitioner.partition("les films dont le genre est Drame"), "le genre est Drame");
    }
}
