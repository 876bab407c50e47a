//! Canonical intent labels shared by the rule path and the SQL path.
//!
//! Both paths produce an [`IntentLabel`] (`{select: [...], where: "..."}`),
//! which renders to the strings the classifiers train on:
//!
//! ```text
//! select=['annee', 'titre']
//! where='acteur = 'name' AND annee > 2005'
//! ```
//!
//! SELECT columns are sorted before rendering so the same column set always
//! yields the same label.

use serde::{Deserialize, Serialize};

use crate::extract::{IntentRecord, WhereValue};

/// Placeholder that replaces quoted literals in masked WHERE clauses.
pub const MASKED_LITERAL: &str = "'name'";

/// Whether WHERE literals keep their value or are replaced by `'name'`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LiteralMode {
    /// `acteur = 'Meryl Streep'`
    #[default]
    Verbatim,
    /// `acteur = 'name'`
    Masked,
}

/// Structured label: SELECT columns plus a normalized WHERE clause string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentLabel {
    pub select: Vec<String>,
    #[serde(rename = "where")]
    pub where_clause: String,
}

impl IntentLabel {
    pub fn is_empty(&self) -> bool {
        self.select.is_empty() && self.where_clause.is_empty()
    }

    /// Render a rule-extracted intent as a label.
    ///
    /// Conditions become an SQL-like conjunction in concept order: literals as
    /// `concept = 'value'` (bare digits unquoted), year comparisons as
    /// `concept > 2005`.
    pub fn from_record(record: &IntentRecord, mode: LiteralMode) -> Self {
        let mut conditions = Vec::new();
        for (concept, values) in record.where_intent.iter() {
            for value in values {
                conditions.push(render_condition(concept, value, mode));
            }
        }
        Self {
            select: record.select_intent.iter().cloned().collect(),
            where_clause: conditions.join(" AND "),
        }
    }

    /// `select=['a', 'b']`, sorted.
    pub fn select_label(&self) -> String {
        let mut columns: Vec<&str> = self.select.iter().map(String::as_str).collect();
        columns.sort_unstable();
        let rendered: Vec<String> = columns.into_iter().map(py_repr).collect();
        format!("select=[{}]", rendered.join(", "))
    }

    /// `where='...'`.
    pub fn where_label(&self) -> String {
        format!("where='{}'", self.where_clause)
    }
}

impl From<&IntentRecord> for IntentLabel {
    fn from(record: &IntentRecord) -> Self {
        Self::from_record(record, LiteralMode::Verbatim)
    }
}

impl std::fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}; {}", self.select_label(), self.where_label())
    }
}

fn render_condition(concept: &str, value: &WhereValue, mode: LiteralMode) -> String {
    match value {
        WhereValue::Year(expr) => format!("{concept} {} {}", expr.op, expr.year),
        WhereValue::Literal(text) if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) => {
            format!("{concept} = {text}")
        }
        WhereValue::Literal(text) => match mode {
            LiteralMode::Masked => format!("{concept} = {MASKED_LITERAL}"),
            LiteralMode::Verbatim => format!("{concept} = '{}'", text.replace('\'', "''")),
        },
    }
}

/// Single-quote a list item, switching to double quotes when it holds an apostrophe.
fn py_repr(s: &str) -> String {
    if s.contains('\'') && !s.contains('"') {
        format!("\"{s}\"")
    } else {
        format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}
