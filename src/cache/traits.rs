//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};

/// Trait for entities that can be cached.
///
/// Implementors provide the identifier the snapshot is keyed by.
pub trait Cacheable: Clone + Send + Sync + 'static {
  /// Unique identifier for this entity (the backend-assigned id)
  fn cache_key(&self) -> String;

  /// Entity type name used in diagnostics (e.g., "moped", "contact")
  fn entity_type() -> &'static str;
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the snapshot serving the data was taken (if from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  /// Create a new cache result from a still-valid snapshot.
  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      cached_at: Some(cached_at),
    }
  }
}

/// Indicates where cached data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from a full collection fetch
  Network,
  /// Data from a snapshot still inside its TTL
  Cache,
}
