use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by table operations.
#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("column '{0}' does not exist in the table")]
    MissingColumn(String),
    #[error("subject '{subject}', measure '{measure}': value is not numeric")]
    NonNumeric { subject: String, measure: String },
}

// ---------------------------------------------------------------------------
// Value – a single cell in a table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common CSV dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.4}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl Value {
    /// Try to interpret the value as an `f64` for numeric comparison.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// SubjectRow – one row of a table
// ---------------------------------------------------------------------------

/// A single exam-taker (one row of the source table).
#[derive(Debug, Clone)]
pub struct SubjectRow {
    /// Subject code used as the join/comparison key.
    pub subject: String,
    /// Dynamic measure columns: column_name → value.
    pub values: BTreeMap<String, Value>,
}

// ---------------------------------------------------------------------------
// MeasureTable – the complete loaded table
// ---------------------------------------------------------------------------

/// A table of per-subject measurements, keyed by subject code.
#[derive(Debug, Clone)]
pub struct MeasureTable {
    /// All rows, in source order.
    pub rows: Vec<SubjectRow>,
    /// Ordered column names as they appeared in the source header
    /// (the subject-code column excluded).
    pub columns: Vec<String>,
}

impl MeasureTable {
    pub fn new(rows: Vec<SubjectRow>, columns: Vec<String>) -> Self {
        MeasureTable { rows, columns }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row carrying the given subject code. Duplicate codes resolve
    /// to the first occurrence.
    pub fn get(&self, subject: &str) -> Option<&SubjectRow> {
        self.rows.iter().find(|row| row.subject == subject)
    }

    /// Subject codes that occur more than once, in first-appearance order.
    pub fn duplicate_subjects(&self) -> Vec<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.subject.as_str()).or_default() += 1;
        }
        let mut seen = BTreeSet::new();
        self.rows
            .iter()
            .filter(|row| counts[row.subject.as_str()] > 1 && seen.insert(row.subject.as_str()))
            .map(|row| row.subject.clone())
            .collect()
    }

    /// Left join on subject code: appends `info`'s columns to every row.
    /// Columns already present keep their existing values; subjects absent
    /// from `info` get [`Value::Null`] in the appended columns.
    pub fn join(&self, info: &MeasureTable) -> MeasureTable {
        let mut added: Vec<String> = Vec::new();
        for col in &info.columns {
            if !self.columns.contains(col) {
                added.push(col.clone());
            }
        }

        let mut columns = self.columns.clone();
        columns.extend(added.iter().cloned());

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut values = row.values.clone();
                let meta = info.get(&row.subject);
                for col in &added {
                    let value = meta
                        .and_then(|m| m.values.get(col))
                        .cloned()
                        .unwrap_or(Value::Null);
                    values.insert(col.clone(), value);
                }
                SubjectRow {
                    subject: row.subject.clone(),
                    values,
                }
            })
            .collect();

        MeasureTable::new(rows, columns)
    }
}
