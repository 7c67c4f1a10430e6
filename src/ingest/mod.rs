// src/ingest/mod.rs
//! Loading raw post tables from CSV or JSON.
//!
//! The format is picked from the file extension; anything other than
//! `.csv` / `.json` is rejected before any bytes are read.

pub mod samples;
pub mod types;

use serde_json::{Map, Number, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::error::PipelineError;
pub use crate::ingest::types::{cell_to_string, Table};

/// Recognized tabular encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}

impl Format {
    /// Format from a file name's extension (case-insensitive).
    pub fn from_file_name(name: &str) -> Result<Self, PipelineError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            _ => Err(PipelineError::UnsupportedFormat(name.to_string())),
        }
    }
}

/// Load a table from a file on disk.
pub fn load_path(path: &Path) -> Result<Table, PipelineError> {
    let name = path.display().to_string();
    let format = Format::from_file_name(&name)?;
    let bytes = fs::read(path).map_err(|source| PipelineError::Io {
        path: name.clone(),
        source,
    })?;
    parse(format, &bytes)
}

/// Load a table from uploaded bytes; `file_name` only decides the format.
pub fn load_bytes(file_name: &str, bytes: &[u8]) -> Result<Table, PipelineError> {
    let format = Format::from_file_name(file_name)?;
    parse(format, bytes)
}

pub fn parse(format: Format, bytes: &[u8]) -> Result<Table, PipelineError> {
    match format {
        Format::Csv => parse_csv(bytes),
        Format::Json => parse_json(bytes),
    }
}

/// Header row gives the columns; cells are typed by [`infer_cell`].
pub fn parse_csv(bytes: &[u8]) -> Result<Table, PipelineError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = rdr.headers().map_err(PipelineError::csv)?.clone();
    let mut table = Table::new(headers.iter());
    for rec in rdr.records() {
        let rec = rec.map_err(PipelineError::csv)?;
        table.push_row(rec.iter().map(infer_cell).collect());
    }
    Ok(table)
}

/// Accepts an array of records, or a column-oriented object whose values
/// are arrays (`{"col": [..]}`) or index-keyed objects (`{"col": {"0": ..}}`).
pub fn parse_json(bytes: &[u8]) -> Result<Table, PipelineError> {
    let v: Value = serde_json::from_slice(bytes).map_err(PipelineError::json)?;
    match v {
        Value::Array(items) => {
            let mut records = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Object(m) => records.push(m),
                    other => {
                        return Err(json_shape_error(format!(
                            "expected an object per record, found {}",
                            type_name(&other)
                        )))
                    }
                }
            }
            Ok(Table::from_records(records))
        }
        Value::Object(cols) => columns_to_table(cols),
        other => Err(json_shape_error(format!(
            "expected an array of records or an object of columns, found {}",
            type_name(&other)
        ))),
    }
}

fn columns_to_table(cols: Map<String, Value>) -> Result<Table, PipelineError> {
    let mut names = Vec::with_capacity(cols.len());
    let mut columns: Vec<BTreeMap<usize, Value>> = Vec::with_capacity(cols.len());
    let mut row_ids: BTreeSet<usize> = BTreeSet::new();

    for (name, col) in cols {
        let cells: BTreeMap<usize, Value> = match col {
            Value::Array(a) => a.into_iter().enumerate().collect(),
            // index-keyed: the key is the row, whatever order the document uses
            Value::Object(m) => m
                .into_iter()
                .map(|(k, v)| match k.trim().parse::<usize>() {
                    Ok(i) => Ok((i, v)),
                    Err(_) => Err(json_shape_error(format!(
                        "column '{name}' has non-integer row index '{k}'"
                    ))),
                })
                .collect::<Result<_, _>>()?,
            other => {
                return Err(json_shape_error(format!(
                    "column '{name}' must be an array or object, found {}",
                    type_name(&other)
                )))
            }
        };
        row_ids.extend(cells.keys().copied());
        names.push(name);
        columns.push(cells);
    }

    let mut table = Table::new(names);
    for id in row_ids {
        let row = columns
            .iter_mut()
            .map(|c| c.remove(&id).unwrap_or(Value::Null))
            .collect();
        table.push_row(row);
    }
    Ok(table)
}

fn json_shape_error(message: String) -> PipelineError {
    PipelineError::Parse {
        format: "JSON",
        message,
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Type a raw CSV cell: empty → null, integer/float → number,
/// `true`/`false` → bool, anything else stays a string.
pub fn infer_cell(raw: &str) -> Value {
    let t = raw.trim();
    if t.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = t.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(f) = t.parse::<f64>() {
        if let Some(n) = Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    if t.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if t.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    Value::String(raw.to_string())
}
