//! Client side of the hosted relational backend.
//!
//! Rows travel as flat JSON objects with backend-native (snake_case)
//! column names. Translating them to entities is the store's job.

mod client;
mod error;
#[cfg(test)]
pub mod memory;

pub use client::PostgrestClient;
pub use error::RemoteError;

use async_trait::async_trait;

/// A single backend row.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Server-side ordering for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
  pub column: &'static str,
  pub ascending: bool,
}

impl Order {
  pub const fn asc(column: &'static str) -> Self {
    Self {
      column,
      ascending: true,
    }
  }

  pub const fn desc(column: &'static str) -> Self {
    Self {
      column,
      ascending: false,
    }
  }
}

/// Row filter for lookups that are not by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
  /// Exact match on a column
  Eq { column: String, value: String },
  /// Case-insensitive substring match on a column
  Contains { column: String, needle: String },
  /// Any of the inner filters
  Any(Vec<Filter>),
}

impl Filter {
  pub fn eq(column: &str, value: &str) -> Self {
    Filter::Eq {
      column: column.to_string(),
      value: value.to_string(),
    }
  }

  pub fn contains(column: &str, needle: &str) -> Self {
    Filter::Contains {
      column: column.to_string(),
      needle: needle.to_string(),
    }
  }
}

/// Operations the stores need from a named collection.
#[async_trait]
pub trait RemoteCollection: Send + Sync {
  /// Fetch every row of the collection.
  async fn list(&self, collection: &str, order: Option<Order>) -> Result<Vec<Row>, RemoteError>;

  /// Insert a row and return it as stored, including generated columns.
  async fn insert(&self, collection: &str, row: Row) -> Result<Row, RemoteError>;

  /// Apply a partial row to the record with the given id and return the result.
  async fn update(&self, collection: &str, id: &str, row: Row) -> Result<Row, RemoteError>;

  /// Delete the record with the given id.
  async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError>;

  /// Return the first row matching the filter, if any.
  async fn find_first(&self, collection: &str, filter: &Filter) -> Result<Option<Row>, RemoteError>;
}
