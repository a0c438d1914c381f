//! In-process collection backend used by the store tests.

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{Filter, Order, RemoteCollection, RemoteError, Row};

/// Collections held in memory, with a per-collection count of full listings.
#[derive(Default)]
pub struct MemoryCollection {
  tables: Mutex<HashMap<String, Vec<Row>>>,
  lists: Mutex<HashMap<String, usize>>,
  next_id: AtomicUsize,
  failing: AtomicBool,
}

impl MemoryCollection {
  pub fn new() -> Self {
    Self::default()
  }

  /// Seed rows as if they already existed in the backend.
  pub fn with_rows(self, collection: &str, rows: Vec<Row>) -> Self {
    self
      .tables
      .lock()
      .unwrap()
      .entry(collection.to_string())
      .or_default()
      .extend(rows);
    self
  }

  /// Make every subsequent call fail with a 503 until reset.
  pub fn set_failing(&self, failing: bool) {
    self.failing.store(failing, Ordering::SeqCst);
  }

  /// How many full listings of a collection have been served.
  pub fn list_calls(&self, collection: &str) -> usize {
    self
      .lists
      .lock()
      .unwrap()
      .get(collection)
      .copied()
      .unwrap_or(0)
  }

  fn guard(&self) -> Result<(), RemoteError> {
    if self.failing.load(Ordering::SeqCst) {
      return Err(RemoteError::Status {
        status: 503,
        body: "service unavailable".to_string(),
      });
    }
    Ok(())
  }

  fn not_found(collection: &str, id: &str) -> RemoteError {
    RemoteError::NotFound {
      collection: collection.to_string(),
      id: id.to_string(),
    }
  }
}

fn row_id(row: &Row) -> Option<&str> {
  row.get("id").and_then(Value::as_str)
}

fn text_of(value: Option<&Value>) -> String {
  match value {
    Some(Value::String(s)) => s.clone(),
    Some(Value::Null) | None => String::new(),
    Some(other) => other.to_string(),
  }
}

fn matches(row: &Row, filter: &Filter) -> bool {
  match filter {
    Filter::Eq { column, value } => text_of(row.get(column)) == *value,
    Filter::Contains { column, needle } => text_of(row.get(column))
      .to_lowercase()
      .contains(&needle.to_lowercase()),
    Filter::Any(filters) => filters.iter().any(|f| matches(row, f)),
  }
}

#[async_trait]
impl RemoteCollection for MemoryCollection {
  async fn list(&self, collection: &str, order: Option<Order>) -> Result<Vec<Row>, RemoteError> {
    self.guard()?;
    *self
      .lists
      .lock()
      .unwrap()
      .entry(collection.to_string())
      .or_default() += 1;

    let mut rows = self
      .tables
      .lock()
      .unwrap()
      .get(collection)
      .cloned()
      .unwrap_or_default();
    if let Some(order) = order {
      rows.sort_by_key(|r| text_of(r.get(order.column)).to_lowercase());
      if !order.ascending {
        rows.reverse();
      }
    }
    Ok(rows)
  }

  async fn insert(&self, collection: &str, mut row: Row) -> Result<Row, RemoteError> {
    self.guard()?;
    let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    // Strictly increasing creation times keep ordering deterministic
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(n as i64);

    row.insert("id".into(), Value::String(format!("{}-{}", collection, n)));
    row.insert("created_at".into(), Value::String(created.to_rfc3339()));
    self
      .tables
      .lock()
      .unwrap()
      .entry(collection.to_string())
      .or_default()
      .push(row.clone());
    Ok(row)
  }

  async fn update(&self, collection: &str, id: &str, row: Row) -> Result<Row, RemoteError> {
    self.guard()?;
    let mut tables = self.tables.lock().unwrap();
    let existing = tables
      .get_mut(collection)
      .and_then(|rows| rows.iter_mut().find(|r| row_id(r) == Some(id)))
      .ok_or_else(|| Self::not_found(collection, id))?;
    existing.extend(row);
    Ok(existing.clone())
  }

  async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError> {
    self.guard()?;
    if let Some(rows) = self.tables.lock().unwrap().get_mut(collection) {
      rows.retain(|r| row_id(r) != Some(id));
    }
    Ok(())
  }

  async fn find_first(&self, collection: &str, filter: &Filter) -> Result<Option<Row>, RemoteError> {
    self.guard()?;
    Ok(
      self
        .tables
        .lock()
        .unwrap()
        .get(collection)
        .and_then(|rows| rows.iter().find(|r| matches(r, filter)).cloned()),
    )
  }
}
