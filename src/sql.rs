//! SQL → label parsing for corpus auto-labelling.
//!
//! A labelled corpus pairs French questions with the SQL that answers them.
//! This module reads the SQL side with a handful of regexes (no grammar, no
//! execution) and reduces it to an [`IntentLabel`]: the selected column names
//! and a WHERE clause whose string literals are masked to `'name'` and whose
//! numbered role columns (`acteur1`, `acteur2`, ...) are folded to the base
//! role.

use std::path::Path;
use std::sync::LazyLock;

use miette::Diagnostic;
use regex::Regex;
use thiserror::Error;

use crate::label::{IntentLabel, MASKED_LITERAL};

static RE_SELECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)SELECT\s+(.*?)\s+FROM").unwrap());

static RE_WHERE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)WHERE\s+(.*)").unwrap());

static RE_PARENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*?\)").unwrap());

static RE_DOUBLE_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\(\((.*)\)\)$").unwrap());

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static RE_QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'[^']*'").unwrap());

static RE_DEFAULT_ROLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(acteur)[1-9]\b").unwrap());

static RE_EQ_DOUBLE_QUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"=\s*""#).unwrap());

/// Errors from reading a labelled corpus.
#[derive(Debug, Error, Diagnostic)]
pub enum LabelError {
    #[error("cannot read corpus \"{path}\": {source}")]
    #[diagnostic(
        code(intent::label::read),
        help("Check that the corpus file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corpus is not valid JSON: {message}")]
    #[diagnostic(
        code(intent::label::json),
        help("The corpus must be a JSON array of objects such as {{\"sql\": \"SELECT ...\"}}.")
    )]
    Json { message: String },

    #[error("corpus must be a JSON array, found {found}")]
    #[diagnostic(
        code(intent::label::not_an_array),
        help("Wrap the corpus entries in a top-level JSON array: [ {{\"sql\": ...}}, ... ].")
    )]
    NotAnArray { found: String },

    #[error("role list does not compile: {message}")]
    #[diagnostic(
        code(intent::label::role),
        help("Role names are matched literally; shorten or remove the offending names.")
    )]
    InvalidRole { message: String },
}

/// Convenience alias for label results.
pub type LabelResult<T> = std::result::Result<T, LabelError>;

/// Keys accepted for the French question, in lookup order.
const QUESTION_KEYS: [&str; 3] = ["query_french", "question", "french"];

/// One corpus entry. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusEntry {
    pub sql: Option<String>,
    pub query_french: Option<String>,
}

impl CorpusEntry {
    /// Read each field of a corpus object on its own.
    ///
    /// A present `sql` key always yields `Some`: a non-string value becomes
    /// empty SQL, so the entry keeps its `intentN` slot but produces no label.
    /// A non-string question is treated as absent.
    pub fn from_object(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        let sql = object
            .get("sql")
            .map(|value| value.as_str().unwrap_or_default().to_string());
        let query_french = QUESTION_KEYS
            .iter()
            .find_map(|key| object.get(*key).and_then(serde_json::Value::as_str))
            .map(str::to_string);
        Self { sql, query_french }
    }
}

/// A label generated from the N-th SQL query of a corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedLabel {
    /// `intent<N>`, N counting SQL-bearing entries from 1.
    pub name: String,
    pub label: IntentLabel,
}

impl std::fmt::Display for NamedLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let select = if self.label.select.is_empty() {
            String::new()
        } else {
            self.label.select_label()
        };
        let where_part = if self.label.where_clause.is_empty() {
            String::new()
        } else {
            self.label.where_label()
        };
        write!(f, "— {} : {select}; {where_part}", self.name)
    }
}

/// Regex-based SQL reader.
#[derive(Debug, Clone)]
pub struct SqlLabelParser {
    numbered_role: Option<Regex>,
}

impl Default for SqlLabelParser {
    fn default() -> Self {
        Self {
            numbered_role: Some(RE_DEFAULT_ROLE.clone()),
        }
    }
}

impl SqlLabelParser {
    /// Fold `<role>1`..`<role>9` onto `<role>` for each listed role.
    pub fn with_roles<I, S>(roles: I) -> LabelResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let roles: Vec<String> = roles
            .into_iter()
            .map(|r| regex::escape(r.as_ref().trim()))
            .filter(|r| !r.is_empty())
            .collect();
        let numbered_role = if roles.is_empty() {
            None
        } else {
            let pattern = format!(r"\b({})[1-9]\b", roles.join("|"));
            Some(Regex::new(&pattern).map_err(|e| LabelError::InvalidRole {
                message: e.to_string(),
            })?)
        };
        Ok(Self { numbered_role })
    }

    /// Extract the SELECT columns and the normalized WHERE clause of `sql`.
    pub fn parse(&self, sql: &str) -> IntentLabel {
        let mut label = IntentLabel::default();

        if let Some(caps) = RE_SELECT.captures(sql) {
            let select_part = caps[1].trim();
            label.select = if select_part == "*" {
                vec!["*".to_string()]
            } else {
                select_part.split(',').filter_map(select_column).collect()
            };
        }

        if let Some(caps) = RE_WHERE.captures(sql) {
            let clause = caps[1].trim();
            let clause = RE_DOUBLE_PARENS.replace(clause, "$1");
            let clause = RE_WHITESPACE.replace_all(&clause, " ");
            label.where_clause = self.normalize_where_clause(&clause);
        }

        label
    }

    /// Mask string literals, fold numbered roles, drop `= "` quoting.
    pub fn normalize_where_clause(&self, clause: &str) -> String {
        let clause = RE_QUOTED.replace_all(clause, MASKED_LITERAL);
        let clause = match &self.numbered_role {
            Some(role) => role.replace_all(&clause, "$1").into_owned(),
            None => clause.into_owned(),
        };
        RE_EQ_DOUBLE_QUOTE.replace_all(&clause, "= ").into_owned()
    }

    /// Label every SQL-bearing entry of a corpus, dropping empty labels.
    pub fn label_corpus(&self, entries: &[CorpusEntry]) -> Vec<NamedLabel> {
        entries
            .iter()
            .filter_map(|entry| entry.sql.as_deref())
            .enumerate()
            .filter_map(|(idx, sql)| {
                let label = self.parse(sql);
                if label.is_empty() {
                    tracing::debug!(index = idx + 1, "no SELECT or WHERE found");
                    None
                } else {
                    Some(NamedLabel {
                        name: format!("intent{}", idx + 1),
                        label,
                    })
                }
            })
            .collect()
    }
}

/// Reduce one comma-separated SELECT item to a bare column name.
fn select_column(item: &str) -> Option<String> {
    let item = item.trim().split(" AS ").next().unwrap_or("");
    let item = RE_PARENS.replace_all(item, "");
    let column = item.trim().rsplit('.').next().unwrap_or("").trim();
    (!column.is_empty()).then(|| column.to_string())
}

/// Parse one SQL query with the default role set.
pub fn parse_sql_query(sql: &str) -> IntentLabel {
    SqlLabelParser::default().parse(sql)
}

/// Parse a corpus from JSON text. Entries that are not objects are skipped;
/// see [`CorpusEntry::from_object`] for fields of the wrong type.
pub fn read_corpus(content: &str) -> LabelResult<Vec<CorpusEntry>> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| LabelError::Json {
            message: e.to_string(),
        })?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(LabelError::NotAnArray {
                found: json_kind(&other).to_string(),
            });
        }
    };
    let total = items.len();
    let entries: Vec<CorpusEntry> = items
        .iter()
        .filter_map(serde_json::Value::as_object)
        .map(CorpusEntry::from_object)
        .collect();
    if entries.len() < total {
        tracing::warn!(skipped = total - entries.len(), "skipping non-object corpus entries");
    }
    Ok(entries)
}

/// Read a corpus file.
pub fn load_corpus(path: &Path) -> LabelResult<Vec<CorpusEntry>> {
    let content = std::fs::read_to_string(path).map_err(|e| LabelError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    read_corpus(&content)
}

/// Read a corpus and label its SQL queries.
pub fn labels_from_corpus(content: &str) -> LabelResult<Vec<NamedLabel>> {
    Ok(SqlLabelParser::default().label_corpus(&read_corpus(content)?))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_star() {
        let label = parse_sql_query("SELECT * FROM films");
        assert_eq!(label.select, vec!["*"]);
        assert_eq!(label.where_clause, "");
    }

    #[test]
    fn select_columns_strip_alias_functions_and_tables() {
        let label = parse_sql_query(
            "SELECT f.titre, COUNT(f.acteur1) AS nb, films.annee FROM films f",
        );
        assert_eq!(label.select, vec!["titre", "COUNT", "annee"]);
    }

    #[test]
    fn where_literals_are_masked_and_roles_folded() {
        let label = parse_sql_query(
            "SELECT titre FROM films WHERE acteur1 = 'Meryl Streep' OR acteur2 = 'Meryl Streep' AND annee > 2005",
        );
        assert_eq!(label.select, vec!["titre"]);
        assert_eq!(
            label.where_clause,
            "acteur = 'name' OR acteur = 'name' AND annee > 2005"
        );
    }

    #[test]
    fn double_parentheses_and_whitespace() {
        let label = parse_sql_query(
            "SELECT titre FROM films WHERE ((genre  =\n 'Drame'   AND annee < 1990))",
        );
        assert_eq!(label.where_clause, "genre = 'name' AND annee < 1990");
    }

    #[test]
    fn double_quoted_values() {
        let label = parse_sql_query("select titre from films where genre = \"Drame\"");
        assert_eq!(label.select, vec!["titre"]);
        assert_eq!(label.where_clause, "genre = Drame\"");
    }

    #[test]
    fn no_select_or_where() {
        assert!(parse_sql_query("DELETE films").is_empty());
    }

    #[test]
    fn custom_roles() {
        let parser = SqlLabelParser::with_roles(["acteur", "realisateur"]).unwrap();
        assert_eq!(
            parser.normalize_where_clause("realisateur2 = 'x' AND acteur3 = 'y' AND top10 = 1"),
            "realisateur = 'name' AND acteur = 'name' AND top10 = 1"
        );
    }

    #[test]
    fn corpus_labels_are_numbered_over_sql_entries() {
        let json = r#"[
            {"sql": "SELECT titre FROM films WHERE acteur1 = 'Hugh Jackman'"},
            {"question": "pas de sql ici"},
            "not an object",
            {"sql": "DROP TABLE films"},
            {"sql": "SELECT * FROM films", "query_french": "Montrez tous les films"}
        ]"#;
        let labels = labels_from_corpus(json).unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].name, "intent1");
        assert_eq!(
            labels[0].to_string(),
            "— intent1 : select=['titre']; where='acteur = 'name''"
        );
        assert_eq!(labels[1].name, "intent3");
        assert_eq!(labels[1].to_string(), "— intent3 : select=['*']; ");
    }

    #[test]
    fn no_roles_means_no_folding() {
        let parser = SqlLabelParser::with_roles(Vec::<String>::new()).unwrap();
        assert_eq!(parser.normalize_where_clause("acteur1 = 'x'"), "acteur1 = 'name'");
    }

    #[test]
    fn mistyped_fields_keep_numbering_and_siblings() {
        let json = r#"[
            {"sql": null, "query_french": "rien"},
            {"sql": "SELECT titre FROM films WHERE genre = 'Drame'", "query_french": 12},
            {"sql": "SELECT annee FROM films"}
        ]"#;
        let entries = read_corpus(json).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].sql.as_deref(), Some(""));
        assert_eq!(entries[0].query_french.as_deref(), Some("rien"));
        assert_eq!(entries[1].query_french, None);

        let labels = SqlLabelParser::default().label_corpus(&entries);
        assert_eq!(labels.len(), 2);
        assert_eq!(
            labels[0].to_string(),
            "— intent2 : select=['titre']; where='genre = 'name''"
        );
        assert_eq!(labels[1].name, "intent3");
    }

    #[test]
    fn corpus_must_be_an_array() {
        assert!(matches!(
            read_corpus(r#"{"sql": "SELECT * FROM films"}"#),
            Err(LabelError::NotAnArray { .. })
        ));
        assert!(matches!(read_corpus("not json"), Err(LabelError::Json { .. })));
    }

    #[test]
    fn corpus_aliases() {
        let entries = read_corpus(r#"[{"sql": "SELECT 1 FROM t", "french": "bonjour"}]"#).unwrap();
        assert_eq!(entries[0].query_french.as_deref(), Some("bonjour"));
    }
}
