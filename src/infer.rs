// src/infer.rs
//! Column inference over an arbitrary schema: which column holds the post
//! text, the platform label and the timestamp.
//!
//! All lookups expect headers already lowercased and trimmed
//! (see [`Table::with_normalized_columns`]).

use serde::Serialize;
use serde_json::Value;

use crate::ingest::{cell_to_string, Table};

/// Text column names in priority order.
pub const TEXT_COLUMN_CANDIDATES: [&str; 7] = [
    "text",
    "content",
    "post",
    "message",
    "tweet",
    "caption",
    "description",
];

/// Identify the text column.
///
/// 1. exact name match, in candidate priority order
/// 2. first column (schema order) whose name contains a candidate
/// 3. the string-typed column with the greatest mean string length;
///    ties go to the leftmost column
///
/// `None` when nothing qualifies.
pub fn find_text_column(columns: &[String], rows: &[Vec<Value>]) -> Option<String> {
    for cand in TEXT_COLUMN_CANDIDATES {
        if columns.iter().any(|c| c == cand) {
            return Some(cand.to_string());
        }
    }

    if let Some(c) = columns
        .iter()
        .find(|c| TEXT_COLUMN_CANDIDATES.iter().any(|cand| c.contains(cand)))
    {
        return Some(c.clone());
    }

    longest_string_column(columns, rows).map(|i| columns[i].clone())
}

/// A column is string-typed when it holds at least one string cell.
fn is_string_column(rows: &[Vec<Value>], idx: usize) -> bool {
    rows.iter()
        .any(|r| matches!(r.get(idx), Some(Value::String(_))))
}

fn mean_len(rows: &[Vec<Value>], idx: usize) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let total: usize = rows
        .iter()
        .map(|r| r.get(idx).map_or(0, |v| cell_to_string(v).chars().count()))
        .sum();
    total as f64 / rows.len() as f64
}

fn longest_string_column(columns: &[String], rows: &[Vec<Value>]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for idx in (0..columns.len()).filter(|&i| is_string_column(rows, i)) {
        let len = mean_len(rows, idx);
        // strictly greater keeps the leftmost column on ties
        if best.map_or(true, |(_, b)| len > b) {
            best = Some((idx, len));
        }
    }
    best.map(|(i, _)| i)
}

/// Where the platform label comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "column", rename_all = "snake_case")]
pub enum PlatformSource {
    /// A `platform` column.
    Column(String),
    /// A `source` column standing in for the platform.
    Alias(String),
    /// No column; every row gets [`crate::platform::UNKNOWN_PLATFORM`].
    Synthesized,
}

impl PlatformSource {
    pub fn column(&self) -> Option<&str> {
        match self {
            PlatformSource::Column(c) | PlatformSource::Alias(c) => Some(c),
            PlatformSource::Synthesized => None,
        }
    }
}

pub fn find_platform_column(columns: &[String]) -> PlatformSource {
    if columns.iter().any(|c| c == "platform") {
        PlatformSource::Column("platform".to_string())
    } else if columns.iter().any(|c| c == "source") {
        PlatformSource::Alias("source".to_string())
    } else {
        PlatformSource::Synthesized
    }
}

/// First column (schema order) whose name contains `date` or `time`;
/// failing that, the first `*_at` column (`posted_at`, `created_at`).
pub fn find_date_column(columns: &[String]) -> Option<String> {
    columns
        .iter()
        .find(|c| {
            let l = c.to_lowercase();
            l.contains("date") || l.contains("time")
        })
        .or_else(|| columns.iter().find(|c| c.to_lowercase().ends_with("_at")))
        .cloned()
}

/// Where the per-row dates came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "column", rename_all = "snake_case")]
pub enum DateSource {
    /// Parsed from this column.
    Column(String),
    /// This column matched by name but did not parse; processing time used.
    Unparseable(String),
    /// No date-like column; processing time used.
    Missing,
}

/// All three inferences for a normalized table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub text_column: Option<String>,
    pub platform: PlatformSource,
    pub date_column: Option<String>,
}

pub fn infer_schema(table: &Table) -> Schema {
    Schema {
        text_column: find_text_column(table.columns(), table.rows()),
        platform: find_platform_column(table.columns()),
        date_column: find_date_column(table.columns()),
    }
}
