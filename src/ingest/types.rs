// src/ingest/types.rs
use serde::Serialize;
use serde_json::{Map, Value};

/// In-memory tabular data: ordered column names plus rows aligned to them.
///
/// Cells are JSON values so the loader can keep the type information
/// (string vs number vs null) the column inferencer relies on.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with nulls, long rows truncated.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    /// Build from JSON-style records. Column order is first appearance;
    /// fields missing from a record become null.
    pub fn from_records(records: Vec<Map<String, Value>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for rec in &records {
            for k in rec.keys() {
                if !columns.iter().any(|c| c == k) {
                    columns.push(k.clone());
                }
            }
        }
        let mut table = Table::new(columns);
        for mut rec in records {
            let row = table
                .columns
                .iter()
                .map(|c| rec.remove(c).unwrap_or(Value::Null))
                .collect();
            table.rows.push(row);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First column with exactly this name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |r| &r[idx])
    }

    /// Copy with every column header lowercased and trimmed.
    pub fn with_normalized_columns(&self) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| c.trim().to_lowercase())
                .collect(),
            rows: self.rows.clone(),
        }
    }
}

/// String coercion used for text scoring, platform labels and length stats.
/// Null becomes the empty string.
pub fn cell_to_string(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
