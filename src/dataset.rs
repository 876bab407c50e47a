//! Training dataset: `(query_french, select_label, where_label)` rows.
//!
//! Rows are built from a labelled corpus, labelled either from the SQL side
//! ([`LabelSource::Sql`]) or by running the rule extractor on the question
//! ([`LabelSource::Rules`]). Both label WHERE clauses with masked literals so
//! the two sources share one label space. Rows are stored as CSV with a
//! `query_french,select_label,where_label` header.

use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::ConceptCatalog;
use crate::extract::IntentExtractor;
use crate::label::{IntentLabel, LiteralMode};
use crate::sql::{CorpusEntry, SqlLabelParser};

/// Errors from reading or writing a training dataset.
#[derive(Debug, Error, Diagnostic)]
pub enum DatasetError {
    #[error("dataset I/O error on \"{path}\": {source}")]
    #[diagnostic(
        code(intent::dataset::io),
        help("Check that the dataset path exists (for reading) or that its directory is writable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset CSV error: {message}")]
    #[diagnostic(
        code(intent::dataset::csv),
        help(
            "The dataset must be CSV with the header query_french,select_label,where_label. \
             Regenerate it with `film-intent dataset`."
        )
    )]
    Csv { message: String },
}

/// Convenience alias for dataset results.
pub type DatasetResult<T> = std::result::Result<T, DatasetError>;

/// One labelled question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRow {
    pub query_french: String,
    pub select_label: String,
    pub where_label: String,
}

impl TrainingRow {
    pub fn new(query: impl Into<String>, label: &IntentLabel) -> Self {
        Self {
            query_french: query.into(),
            select_label: label.select_label(),
            where_label: label.where_label(),
        }
    }
}

/// Where the labels of a dataset come from.
pub enum LabelSource<'a> {
    /// Parse the entry's SQL.
    Sql(SqlLabelParser),
    /// Run the rule extractor on the entry's question.
    Rules {
        extractor: &'a IntentExtractor,
        catalog: &'a ConceptCatalog,
    },
}

impl LabelSource<'_> {
    fn label(&self, entry: &CorpusEntry, query: &str) -> Option<IntentLabel> {
        match self {
            Self::Sql(parser) => entry
                .sql
                .as_deref()
                .filter(|sql| !sql.trim().is_empty())
                .map(|sql| parser.parse(sql)),
            Self::Rules { extractor, catalog } => Some(IntentLabel::from_record(
                &extractor.extract(query, catalog),
                LiteralMode::Masked,
            )),
        }
    }
}

/// Label every corpus entry that has a question (and SQL, for the SQL source).
pub fn build_dataset(entries: &[CorpusEntry], source: &LabelSource<'_>) -> Vec<TrainingRow> {
    let rows: Vec<TrainingRow> = entries
        .iter()
        .filter_map(|entry| {
            let query = entry.query_french.as_deref()?.trim();
            if query.is_empty() {
                return None;
            }
            let label = source.label(entry, query)?;
            Some(TrainingRow::new(query, &label))
        })
        .collect();
    tracing::info!(
        entries = entries.len(),
        rows = rows.len(),
        "training dataset built"
    );
    rows
}

/// Write rows as CSV to any sink.
pub fn write_to<W: std::io::Write>(writer: W, rows: &[TrainingRow]) -> DatasetResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row).map_err(csv_error)?;
    }
    wtr.flush().map_err(|e| DatasetError::Io {
        path: "<writer>".into(),
        source: e,
    })
}

/// Write rows to a CSV file.
pub fn write_dataset(path: &Path, rows: &[TrainingRow]) -> DatasetResult<()> {
    let file = std::fs::File::create(path).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    write_to(file, rows)
}

/// Read rows from any CSV source.
pub fn read_from<R: std::io::Read>(reader: R) -> DatasetResult<Vec<TrainingRow>> {
    let mut rdr = csv::Reader::from_reader(reader);
    rdr.deserialize::<TrainingRow>()
        .map(|row| row.map_err(csv_error))
        .collect()
}

/// Read rows from a CSV file.
pub fn read_dataset(path: &Path) -> DatasetResult<Vec<TrainingRow>> {
    let file = std::fs::File::open(path).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    read_from(file)
}

fn csv_error(e: csv::Error) -> DatasetError {
    DatasetError::Csv {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<CorpusEntry> {
        vec![
            CorpusEntry {
                sql: Some("SELECT titre FROM films WHERE acteur1 = 'Meryl Streep' AND annee > 2005".into()),
                query_french: Some("Montrez le titre des films où Meryl Streep joue après 2005".into()),
            },
            CorpusEntry {
                sql: Some("SELECT * FROM films".into()),
                query_french: None,
            },
            CorpusEntry {
                sql: None,
                query_french: Some("Affichez le genre des films avec Hugh Jackman".into()),
            },
        ]
    }

    #[test]
    fn sql_source_labels() {
        let rows = build_dataset(&corpus(), &LabelSource::Sql(SqlLabelParser::default()));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].select_label, "select=['titre']");
        assert_eq!(rows[0].where_label, "where='acteur = 'name' AND annee > 2005'");
    }

    #[test]
    fn rules_source_matches_sql_label_space() {
        let catalog = ConceptCatalog::from_concepts([
            ("titre", vec!["Logan"]),
            ("acteur", vec!["Meryl Streep", "Hugh Jackman"]),
            ("annee", vec!["2005"]),
            ("genre", vec!["Drame"]),
        ])
        .unwrap();
        let extractor = IntentExtractor::default();
        let source = LabelSource::Rules {
            extractor: &extractor,
            catalog: &catalog,
        };
        let rows = build_dataset(&corpus(), &source);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].select_label, "select=['titre']");
        assert_eq!(rows[0].where_label, "where='acteur = 'name' AND annee > 2005'");
        assert_eq!(rows[1].select_label, "select=['genre']");
        assert_eq!(rows[1].where_label, "where='acteur = 'name''");
    }

    #[test]
    fn empty_sql_is_skipped() {
        let entries = crate::sql::read_corpus(r#"[{"sql": null, "query_french": "Montrez les films"}]"#)
            .unwrap();
        let rows = build_dataset(&entries, &LabelSource::Sql(SqlLabelParser::default()));
        assert!(rows.is_empty());
    }

    #[test]
    fn csv_write_then_read() {
        let rows = build_dataset(&corpus(), &LabelSource::Sql(SqlLabelParser::default()));
        let mut buffer = Vec::new();
        write_to(&mut buffer, &rows).unwrap();
        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("query_french,select_label,where_label\n"));
        assert_eq!(read_from(buffer.as_slice()).unwrap(), rows);
    }

    #[test]
    fn missing_dataset_file() {
        let err = read_dataset(Path::new("/nonexistent/training_dataset.csv")).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }
}
