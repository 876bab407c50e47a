//! Intent data model: comparators, year expressions, WHERE clauses and the
//! final [`IntentRecord`].

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

/// Closed set of comparison operators a year expression may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Comparator {
    Gt,
    Lt,
    Ge,
    Le,
}

impl Comparator {
    /// Parse the symbolic form (`>`, `<`, `>=`, `<=`).
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim() {
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            ">=" => Some(Self::Ge),
            "<=" => Some(Self::Le),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
        }
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A comparison bound to a 4-digit year, rendered as `"> 2005"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearExpression {
    pub op: Comparator,
    pub year: String,
}

impl YearExpression {
    pub fn new(op: Comparator, year: impl Into<String>) -> Self {
        Self {
            op,
            year: year.into(),
        }
    }
}

impl std::fmt::Display for YearExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.op, self.year)
    }
}

/// One entry of a WHERE bucket: a literal catalog hit or a year comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WhereValue {
    /// A catalog value found verbatim in the question.
    Literal(String),
    /// A comparative year expression.
    Year(YearExpression),
}

impl WhereValue {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    pub fn as_year(&self) -> Option<&YearExpression> {
        match self {
            Self::Year(expr) => Some(expr),
            Self::Literal(_) => None,
        }
    }
}

impl std::fmt::Display for WhereValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(value) => f.write_str(value),
            Self::Year(expr) => write!(f, "{expr}"),
        }
    }
}

impl Serialize for WhereValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Concept name → matched values, keyed in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WhereClause(BTreeMap<String, Vec<WhereValue>>);

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value to a concept's bucket, creating the bucket if needed.
    pub fn push(&mut self, concept: &str, value: WhereValue) {
        self.0.entry(concept.to_string()).or_default().push(value);
    }

    /// Replace a concept's bucket wholesale.
    pub fn insert(&mut self, concept: impl Into<String>, values: Vec<WhereValue>) {
        self.0.insert(concept.into(), values);
    }

    pub fn get(&self, concept: &str) -> Option<&[WhereValue]> {
        self.0.get(concept).map(Vec::as_slice)
    }

    /// Rendered values of a bucket, mostly useful for assertions.
    pub fn rendered(&self, concept: &str) -> Vec<String> {
        self.get(concept)
            .map(|values| values.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[WhereValue])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn concepts(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}

impl IntoIterator for WhereClause {
    type Item = (String, Vec<WhereValue>);
    type IntoIter = std::collections::btree_map::IntoIter<String, Vec<WhereValue>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, Vec<WhereValue>)> for WhereClause {
    fn from_iter<I: IntoIterator<Item = (String, Vec<WhereValue>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Result of one extraction call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntentRecord {
    /// Concept the question asks to display, if any.
    pub select_intent: Option<String>,
    /// Filter conditions, normalized.
    pub where_intent: WhereClause,
}

impl std::fmt::Display for IntentRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.select_intent {
            Some(target) => writeln!(f, "SELECT: {target}")?,
            None => writeln!(f, "SELECT: (none)")?,
        }
        if self.where_intent.is_empty() {
            return write!(f, "WHERE: (none)");
        }
        write!(f, "WHERE:")?;
        for (concept, values) in self.where_intent.iter() {
            let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
            write!(f, "\n  {concept}: {}", rendered.join(", "))?;
        }
        Ok(())
    }
}
