// gradus-core/src/domain/snapshot.rs

use std::collections::HashMap;

/// A typed scalar cell, as supplied by the tabular reader collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Numeric view of the cell. Null and text are not numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Canonical textual form, shared by the CSV artifacts and the
    /// uniqueness key digest. Null renders as the empty string.
    pub fn render(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Row {
    values: HashMap<String, Scalar>,
}

impl Row {
    pub fn new(values: HashMap<String, Scalar>) -> Self {
        Self { values }
    }

    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.values.get(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Scalar) {
        self.values.insert(column.into(), value);
    }
}

/// Immutable, in-memory view of the dataset under validation.
/// Loaded once per DQ run and dropped at its end — no cross-run caching.
#[derive(Debug)]
pub struct Snapshot {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Snapshot {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Column names in source order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
