//! Whole-collection snapshot held by the cache layer.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use super::traits::Cacheable;

/// The last full copy of a collection, keyed by entity id.
///
/// A snapshot is only ever built from a complete fetch and is replaced
/// wholesale; it is never merged or patched.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
  entries: HashMap<String, T>,
  /// Monotonic instant of the fetch, used for TTL checks
  fetched_at: Instant,
  /// Wall-clock time of the fetch, reported to callers
  cached_at: DateTime<Utc>,
}

impl<T: Cacheable> Snapshot<T> {
  /// Build a snapshot from a complete collection listing.
  pub fn from_entities(entities: &[T]) -> Self {
    Self {
      entries: entities
        .iter()
        .map(|e| (e.cache_key(), e.clone()))
        .collect(),
      fetched_at: Instant::now(),
      cached_at: Utc::now(),
    }
  }

  /// Look up a single entity by id.
  pub fn get(&self, key: &str) -> Option<&T> {
    self.entries.get(key)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn cached_at(&self) -> DateTime<Utc> {
    self.cached_at
  }

  /// True while `now - fetched_at < ttl`.
  pub fn is_fresh(&self, ttl: Duration) -> bool {
    self.fetched_at.elapsed() < ttl
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Clone, PartialEq)]
  struct Item(&'static str);

  impl Cacheable for Item {
    fn cache_key(&self) -> String {
      self.0.to_string()
    }

    fn entity_type() -> &'static str {
      "item"
    }
  }

  #[test]
  fn test_keys_by_cache_key() {
    let snapshot = Snapshot::from_entities(&[Item("a"), Item("b")]);
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.get("b"), Some(&Item("b")));
    assert_eq!(snapshot.get("c"), None);
  }

  #[tokio::test(start_paused = true)]
  async fn test_freshness_boundary() {
    let snapshot = Snapshot::from_entities(&[Item("a")]);
    let ttl = Duration::from_secs(60);

    tokio::time::advance(Duration::from_millis(59_999)).await;
    assert!(snapshot.is_fresh(ttl));

    tokio::time::advance(Duration::from_millis(1)).await;
    assert!(!snapshot.is_fresh(ttl));
  }

  #[test]
  fn test_zero_ttl_is_never_fresh() {
    let snapshot = Snapshot::from_entities(&[Item("a")]);
    assert!(!snapshot.is_fresh(Duration::ZERO));
  }
}
