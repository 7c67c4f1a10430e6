// src/dates.rs
//! Timestamp parsing for date-like columns.
//!
//! Strings are tried against RFC 3339 / RFC 2822, a handful of common
//! naive datetime and date layouts (read as UTC), and the legacy Twitter
//! `created_at` layout. Numbers are Unix seconds.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%a %b %d %H:%M:%S %z %Y",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %B %Y", "%d %b %Y", "%B %d, %Y", "%b %d, %Y",
];

/// One cell of a date column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateCell {
    /// Null or blank.
    Missing,
    Parsed(DateTime<Utc>),
    Invalid,
}

pub fn parse_cell(v: &Value) -> DateCell {
    match v {
        Value::Null => DateCell::Missing,
        Value::String(s) if s.trim().is_empty() => DateCell::Missing,
        Value::String(s) => parse_str(s).map_or(DateCell::Invalid, DateCell::Parsed),
        Value::Number(n) => {
            let ts = if let Some(i) = n.as_i64() {
                DateTime::from_timestamp(i, 0)
            } else {
                n.as_f64().and_then(from_fractional_secs)
            };
            ts.map_or(DateCell::Invalid, DateCell::Parsed)
        }
        _ => DateCell::Invalid,
    }
}

fn from_fractional_secs(f: f64) -> Option<DateTime<Utc>> {
    if !f.is_finite() {
        return None;
    }
    let secs = f.floor();
    let nanos = ((f - secs) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
}

/// Parse one timestamp string; naive values are taken as UTC.
pub fn parse_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for f in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, f) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for f in NAIVE_DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, f) {
            return Some(ndt.and_utc());
        }
    }
    for f in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, f) {
            return d.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc());
        }
    }
    None
}

/// Resolve a whole column. Missing cells take `now`; a single invalid cell
/// rejects the column (`None`).
pub fn resolve_column<'a>(
    values: impl IntoIterator<Item = &'a Value>,
    now: DateTime<Utc>,
) -> Option<Vec<DateTime<Utc>>> {
    values
        .into_iter()
        .map(|v| match parse_cell(v) {
            DateCell::Parsed(dt) => Some(dt),
            DateCell::Missing => Some(now),
            DateCell::Invalid => None,
        })
        .collect()
}
