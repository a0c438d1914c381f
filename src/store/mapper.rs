//! Translation between backend rows and typed entities.
//!
//! Mapping is best-effort and never fails: text is trimmed and blank text
//! becomes `None`, numeric-like text is reduced to its digits, and
//! anything that still does not fit becomes `None`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;

use crate::cache::Cacheable;
use crate::remote::{Order, Row};

/// A collection entity with its row mapping.
pub trait Entity: Cacheable + Sized {
  /// Partial update accepted by `to_row`
  type Patch: Send + Sync;

  /// Backend collection name
  const COLLECTION: &'static str;

  /// Listing order, requested from the backend and re-applied locally
  /// with case-insensitive text comparison
  const ORDER: Order;

  /// Total mapping from a backend row.
  fn from_row(row: &Row) -> Self;

  /// Partial mapping: only fields present on the patch are emitted.
  fn to_row(patch: &Self::Patch) -> Row;

  /// A patch that sets every mutable field to this entity's value.
  fn to_patch(&self) -> Self::Patch;

  /// Comparison implementing `ORDER`.
  fn sort_cmp(&self, other: &Self) -> Ordering;
}

/// Trim text, mapping blank input to `None`.
pub fn normalize_text(value: &str) -> Option<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    None
  } else {
    Some(trimmed.to_string())
  }
}

/// Reduce free text to its digits and parse; `"15000 km"` is 15000.
pub fn parse_mileage_text(value: &str) -> Option<u64> {
  let digits: String = value.chars().filter(char::is_ascii_digit).collect();
  digits.parse().ok()
}

/// Mileage from a JSON number or numeric-like string.
pub fn normalize_mileage(value: &Value) -> Option<u64> {
  match value {
    Value::Number(n) => n.as_u64().or_else(|| {
      n.as_f64()
        .filter(|f| f.is_finite() && *f >= 0.0 && *f <= u64::MAX as f64)
        .map(|f| f.trunc() as u64)
    }),
    Value::String(s) => parse_mileage_text(s),
    _ => None,
  }
}

/// Optional text column. Scalars other than strings are rendered as text.
pub fn opt_text(row: &Row, column: &str) -> Option<String> {
  match row.get(column)? {
    Value::String(s) => normalize_text(s),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

/// Required text column; missing or blank becomes an empty string.
pub fn req_text(row: &Row, column: &str) -> String {
  opt_text(row, column).unwrap_or_default()
}

/// Timestamp column, with or without an offset (naive values are UTC).
pub fn timestamp(row: &Row, column: &str) -> Option<DateTime<Utc>> {
  let raw = row.get(column)?.as_str()?.trim();
  DateTime::parse_from_rfc3339(raw)
    .map(|dt| dt.with_timezone(&Utc))
    .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.and_utc()))
    .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|dt| dt.and_utc()))
    .ok()
}

/// Outgoing value for a text field: trimmed, or `null` when blank.
pub fn text_value(value: &str) -> Value {
  normalize_text(value).map_or(Value::Null, Value::String)
}

/// Builds an outgoing row from patch fields, skipping untouched ones.
#[derive(Debug, Default)]
pub struct RowWriter {
  row: Row,
}

impl RowWriter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Required text column.
  pub fn text(&mut self, column: &str, field: &Option<String>) -> &mut Self {
    if let Some(value) = field {
      self.row.insert(column.to_string(), text_value(value));
    }
    self
  }

  /// Nullable text column; `Some(None)` writes `null`.
  pub fn nullable_text(&mut self, column: &str, field: &Option<Option<String>>) -> &mut Self {
    if let Some(value) = field {
      let value = value.as_deref().map_or(Value::Null, text_value);
      self.row.insert(column.to_string(), value);
    }
    self
  }

  /// Any other column, converted to JSON by the caller.
  pub fn value<T, F>(&mut self, column: &str, field: &Option<T>, to_json: F) -> &mut Self
  where
    F: FnOnce(&T) -> Value,
  {
    if let Some(value) = field {
      self.row.insert(column.to_string(), to_json(value));
    }
    self
  }

  pub fn finish(&mut self) -> Row {
    std::mem::take(&mut self.row)
  }
}
