//! Cache layer that orchestrates caching logic with network fetching.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use super::snapshot::Snapshot;
use super::traits::{CacheResult, Cacheable};

/// How long a snapshot stays valid unless configured otherwise.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Read-through cache over a single whole-collection slot.
///
/// The layer holds at most one [`Snapshot`]. Lookups are served from it
/// while it is inside the TTL; otherwise the caller-supplied fetcher is
/// run and its result replaces the snapshot. Failed fetches leave the
/// previous snapshot in place.
///
/// Concurrent lookups against an invalid cache each run their own fetch.
/// The lock is only taken around the snapshot swap, never across the
/// fetch, so the last completed fetch wins.
pub struct CacheLayer<T: Cacheable> {
  slot: Arc<RwLock<Option<Snapshot<T>>>>,
  /// How long before a snapshot is considered stale
  ttl: Duration,
}

impl<T: Cacheable> CacheLayer<T> {
  /// Create an empty cache layer with the default TTL.
  pub fn new() -> Self {
    Self {
      slot: Arc::new(RwLock::new(None)),
      ttl: DEFAULT_TTL,
    }
  }

  /// Set the TTL for snapshots.
  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  pub fn ttl(&self) -> Duration {
    self.ttl
  }

  /// True iff a snapshot exists and is younger than the TTL.
  #[allow(dead_code)]
  pub async fn is_valid(&self) -> bool {
    self
      .slot
      .read()
      .await
      .as_ref()
      .is_some_and(|s| s.is_fresh(self.ttl))
  }

  /// Drop the current snapshot so the next lookup refetches.
  #[allow(dead_code)]
  pub async fn invalidate(&self) {
    *self.slot.write().await = None;
  }

  /// Replace the snapshot with a complete listing.
  async fn replace(&self, entities: &[T]) {
    let snapshot = Snapshot::from_entities(entities);
    debug!(
      entity = T::entity_type(),
      count = snapshot.len(),
      "replacing cache snapshot"
    );
    *self.slot.write().await = Some(snapshot);
  }

  /// Run a full fetch and store its result as the new snapshot.
  ///
  /// The fetched list is returned in the order the fetcher produced it.
  /// On error the existing snapshot is untouched.
  pub async fn refresh<F, Fut, E>(&self, fetcher: F) -> Result<CacheResult<Vec<T>>, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
  {
    let data = fetcher().await?;
    self.replace(&data).await;
    Ok(CacheResult::from_network(data))
  }

  /// Resolve a single entity by key with a read-through strategy.
  ///
  /// 1. If the snapshot is valid, answer from it (a miss is `None`)
  /// 2. Otherwise run the full fetch, replace the snapshot, and look up
  ///    the key in the fresh data
  pub async fn fetch_one<F, Fut, E>(&self, key: &str, fetcher: F) -> Result<CacheResult<Option<T>>, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
  {
    {
      let slot = self.slot.read().await;
      if let Some(snapshot) = slot.as_ref().filter(|s| s.is_fresh(self.ttl)) {
        debug!(entity = T::entity_type(), key, "cache hit");
        return Ok(CacheResult::from_cache(
          snapshot.get(key).cloned(),
          snapshot.cached_at(),
        ));
      }
    }

    debug!(entity = T::entity_type(), key, "cache invalid, refreshing");
    let fresh = self.refresh(fetcher).await?;
    let found = fresh.data.into_iter().find(|e| e.cache_key() == key);
    Ok(CacheResult::from_network(found))
  }
}

impl<T: Cacheable> Default for CacheLayer<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Cacheable> Clone for CacheLayer<T> {
  fn clone(&self) -> Self {
    Self {
      slot: Arc::clone(&self.slot),
      ttl: self.ttl,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::CacheSource;
  use std::sync::atomic::{AtomicUsize, Ordering};

  #[derive(Debug, Clone, PartialEq)]
  struct Item {
    id: String,
    label: String,
  }

  impl Cacheable for Item {
    fn cache_key(&self) -> String {
      self.id.clone()
    }

    fn entity_type() -> &'static str {
      "item"
    }
  }

  fn items(n: usize) -> Vec<Item> {
    (1..=n)
      .map(|i| Item {
        id: format!("m{}", i),
        label: format!("item {}", i),
      })
      .collect()
  }

  /// Fetcher over a fixed listing that counts how often it ran.
  async fn counted(calls: &AtomicUsize, data: Vec<Item>) -> Result<Vec<Item>, String> {
    calls.fetch_add(1, Ordering::SeqCst);
    Ok(data)
  }

  #[tokio::test(start_paused = true)]
  async fn test_absent_cache_fetches_once_and_becomes_valid() {
    let cache = CacheLayer::<Item>::new();
    let calls = AtomicUsize::new(0);
    assert!(!cache.is_valid().await);

    let result = cache
      .fetch_one("m1", || counted(&calls, items(5)))
      .await
      .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.source, CacheSource::Network);
    assert_eq!(result.data.unwrap().id, "m1");
    assert!(cache.is_valid().await);
  }

  #[tokio::test(start_paused = true)]
  async fn test_second_lookup_within_ttl_hits_cache() {
    let cache = CacheLayer::<Item>::new();
    let calls = AtomicUsize::new(0);

    cache
      .fetch_one("m2", || counted(&calls, items(3)))
      .await
      .unwrap();
    tokio::time::advance(Duration::from_secs(30)).await;
    let second = cache
      .fetch_one("m2", || counted(&calls, items(3)))
      .await
      .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(second.source, CacheSource::Cache);
    assert!(second.cached_at.is_some());
    assert_eq!(second.data.unwrap().label, "item 2");
  }

  #[tokio::test(start_paused = true)]
  async fn test_miss_within_ttl_does_not_refetch() {
    let cache = CacheLayer::<Item>::new();
    let calls = AtomicUsize::new(0);

    cache.refresh(|| counted(&calls, items(2))).await.unwrap();
    let missing = cache
      .fetch_one("m9", || counted(&calls, items(2)))
      .await
      .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(missing.data.is_none());
  }

  #[tokio::test(start_paused = true)]
  async fn test_expired_snapshot_triggers_exactly_one_refresh() {
    let cache = CacheLayer::<Item>::new();
    let calls = AtomicUsize::new(0);

    cache
      .fetch_one("m1", || counted(&calls, items(2)))
      .await
      .unwrap();
    tokio::time::advance(DEFAULT_TTL).await;
    assert!(!cache.is_valid().await);

    let result = cache
      .fetch_one("m1", || counted(&calls, items(2)))
      .await
      .unwrap();
    cache
      .fetch_one("m2", || counted(&calls, items(2)))
      .await
      .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(result.source, CacheSource::Network);
  }

  #[tokio::test(start_paused = true)]
  async fn test_failed_refresh_keeps_previous_snapshot() {
    let cache = CacheLayer::<Item>::new();
    let calls = AtomicUsize::new(0);

    cache.refresh(|| counted(&calls, items(2))).await.unwrap();
    let err = cache
      .refresh(|| async { Err::<Vec<Item>, _>("boom".to_string()) })
      .await
      .unwrap_err();
    assert_eq!(err, "boom");

    // Still valid and still serving the earlier data
    assert!(cache.is_valid().await);
    let hit = cache
      .fetch_one("m2", || counted(&calls, Vec::new()))
      .await
      .unwrap();
    assert_eq!(hit.source, CacheSource::Cache);
    assert!(hit.data.is_some());
  }

  #[tokio::test(start_paused = true)]
  async fn test_failed_refresh_from_absent_stays_absent() {
    let cache = CacheLayer::<Item>::new();
    let result = cache
      .fetch_one("m1", || async { Err::<Vec<Item>, _>("offline") })
      .await;

    assert!(result.is_err());
    assert!(!cache.is_valid().await);
  }

  #[tokio::test(start_paused = true)]
  async fn test_refresh_replaces_snapshot_wholesale() {
    let cache = CacheLayer::<Item>::new();
    let calls = AtomicUsize::new(0);

    cache.refresh(|| counted(&calls, items(3))).await.unwrap();
    cache
      .refresh(|| counted(&calls, items(3).split_off(2)))
      .await
      .unwrap();

    let gone = cache
      .fetch_one("m1", || counted(&calls, Vec::new()))
      .await
      .unwrap();
    assert_eq!(gone.source, CacheSource::Cache);
    assert!(gone.data.is_none());
  }

  #[tokio::test(start_paused = true)]
  async fn test_invalidate_and_clone_share_slot() {
    let cache = CacheLayer::<Item>::new().with_ttl(Duration::from_secs(5));
    let shared = cache.clone();
    let calls = AtomicUsize::new(0);

    cache.refresh(|| counted(&calls, items(1))).await.unwrap();
    assert!(shared.is_valid().await);
    assert_eq!(shared.ttl(), Duration::from_secs(5));

    shared.invalidate().await;
    assert!(!cache.is_valid().await);
  }
}
