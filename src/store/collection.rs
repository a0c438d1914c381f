//! Collection store: CRUD over a remote collection with a cached id lookup.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::cache::{CacheLayer, CacheSource};
use crate::remote::RemoteCollection;

use super::error::StoreError;
use super::mapper::Entity;

/// Typed access to one backend collection.
///
/// Listing always goes to the network and refreshes the cache; lookups by
/// id prefer the cache. Writes never touch the cache, so callers list
/// again to observe them.
pub struct CollectionStore<E: Entity> {
  pub(super) remote: Arc<dyn RemoteCollection>,
  cache: CacheLayer<E>,
}

impl<E: Entity> CollectionStore<E> {
  pub fn new(remote: Arc<dyn RemoteCollection>, ttl: Duration) -> Self {
    Self {
      remote,
      cache: CacheLayer::new().with_ttl(ttl),
    }
  }

  /// The cache backing `find_by_id`.
  pub fn cache(&self) -> &CacheLayer<E> {
    &self.cache
  }

  /// Full fetch, mapped and sorted by the collection's order.
  async fn fetch_all(&self) -> Result<Vec<E>, StoreError> {
    let rows = self
      .remote
      .list(E::COLLECTION, Some(E::ORDER))
      .await
      .map_err(|e| StoreError::new("list", E::COLLECTION, e))?;

    let mut entities: Vec<E> = rows.iter().map(E::from_row).collect();
    entities.sort_by(E::sort_cmp);
    Ok(entities)
  }

  /// Fetch the whole collection, refreshing the cache.
  pub async fn list_all(&self) -> Result<Vec<E>, StoreError> {
    let result = self
      .cache
      .refresh(|| self.fetch_all())
      .await
      .inspect_err(log_failure)?;

    info!(
      collection = E::COLLECTION,
      count = result.data.len(),
      "listed collection"
    );
    Ok(result.data)
  }

  /// Resolve one entity by id, from the cache while it is valid.
  pub async fn find_by_id(&self, id: &str) -> Result<Option<E>, StoreError> {
    let result = self
      .cache
      .fetch_one(id, || self.fetch_all())
      .await
      .inspect_err(log_failure)?;

    if result.source == CacheSource::Cache {
      debug!(
        collection = E::COLLECTION,
        id,
        cached_at = ?result.cached_at,
        found = result.data.is_some(),
        "served from snapshot"
      );
    }
    Ok(result.data)
  }

  /// Insert a new record; the backend assigns `id` and `created_at`.
  pub async fn create(&self, patch: &E::Patch) -> Result<E, StoreError> {
    let row = self
      .remote
      .insert(E::COLLECTION, E::to_row(patch))
      .await
      .map_err(|e| StoreError::new("create", E::COLLECTION, e))
      .inspect_err(log_failure)?;

    let entity = E::from_row(&row);
    info!(collection = E::COLLECTION, id = %entity.cache_key(), "created record");
    Ok(entity)
  }

  /// Apply a partial update and return the record as stored.
  pub async fn update(&self, id: &str, patch: &E::Patch) -> Result<E, StoreError> {
    let row = self
      .remote
      .update(E::COLLECTION, id, E::to_row(patch))
      .await
      .map_err(|e| StoreError::new("update", E::COLLECTION, e))
      .inspect_err(log_failure)?;

    info!(collection = E::COLLECTION, id, "updated record");
    Ok(E::from_row(&row))
  }

  pub async fn remove(&self, id: &str) -> Result<(), StoreError> {
    self
      .remote
      .delete(E::COLLECTION, id)
      .await
      .map_err(|e| StoreError::new("delete", E::COLLECTION, e))
      .inspect_err(log_failure)?;

    info!(collection = E::COLLECTION, id, "removed record");
    Ok(())
  }
}

impl<E: Entity> Clone for CollectionStore<E> {
  fn clone(&self) -> Self {
    Self {
      remote: Arc::clone(&self.remote),
      cache: self.cache.clone(),
    }
  }
}

pub(super) fn log_failure(err: &StoreError) {
  error!(
    action = err.action,
    collection = err.collection,
    cause = %err.source,
    "store operation failed"
  );
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::DEFAULT_TTL;
  use crate::remote::memory::MemoryCollection;
  use crate::remote::Row;
  use crate::store::types::{Moped, MopedPatch, MopedStatus};
  use serde_json::{json, Value};

  fn moped_rows() -> Vec<Row> {
    [
      ("m1", "Yamaha"),
      ("m2", "Honda"),
      ("m3", "Suzuki"),
      ("m4", "Aprilia"),
      ("m5", "Vespa"),
    ]
    .iter()
    .map(|(id, brand)| match json!({"id": id, "brand": brand, "model": "X", "license_plate": "P", "status": "available"}) {
      Value::Object(map) => map,
      _ => unreachable!(),
    })
    .collect()
  }

  fn setup() -> (Arc<MemoryCollection>, CollectionStore<Moped>) {
    let remote = Arc::new(MemoryCollection::new().with_rows("mopeds", moped_rows()));
    let store = CollectionStore::new(remote.clone(), DEFAULT_TTL);
    (remote, store)
  }

  fn new_moped() -> MopedPatch {
    MopedPatch {
      brand: Some("Piaggio".to_string()),
      model: Some("Liberty".to_string()),
      license_plate: Some(" 777KZ01 ".to_string()),
      status: Some(MopedStatus::Available),
      mileage: Some(Some(1200)),
      color: Some(Some("   ".to_string())),
      ..Default::default()
    }
  }

  #[tokio::test(start_paused = true)]
  async fn test_find_by_id_on_absent_cache_fetches_once() {
    let (remote, store) = setup();
    assert!(!store.cache().is_valid().await);

    let moped = store.find_by_id("m1").await.unwrap().unwrap();

    assert_eq!(moped.id, "m1");
    assert_eq!(remote.list_calls("mopeds"), 1);
    assert!(store.cache().is_valid().await);
  }

  #[tokio::test(start_paused = true)]
  async fn test_repeated_lookup_within_ttl_uses_cache() {
    let (remote, store) = setup();

    store.find_by_id("m1").await.unwrap();
    tokio::time::advance(Duration::from_secs(59)).await;
    let again = store.find_by_id("m3").await.unwrap().unwrap();

    assert_eq!(again.brand, "Suzuki");
    assert_eq!(remote.list_calls("mopeds"), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn test_lookup_after_ttl_refreshes_once() {
    let (remote, store) = setup();

    store.find_by_id("m1").await.unwrap();
    tokio::time::advance(Duration::from_secs(61)).await;
    store.find_by_id("m1").await.unwrap();
    store.find_by_id("m2").await.unwrap();

    assert_eq!(remote.list_calls("mopeds"), 2);
  }

  #[tokio::test(start_paused = true)]
  async fn test_list_all_is_sorted_and_always_fetches() {
    let (remote, store) = setup();

    let first = store.list_all().await.unwrap();
    store.list_all().await.unwrap();

    let brands: Vec<_> = first.iter().map(|m| m.brand.as_str()).collect();
    assert_eq!(brands, ["Aprilia", "Honda", "Suzuki", "Vespa", "Yamaha"]);
    assert_eq!(remote.list_calls("mopeds"), 2);
  }

  #[tokio::test(start_paused = true)]
  async fn test_list_all_orders_mixed_case_brands() {
    let (_remote, store) = setup();
    let patch = MopedPatch {
      brand: Some("benelli".to_string()),
      ..new_moped()
    };
    store.create(&patch).await.unwrap();

    let listed = store.list_all().await.unwrap();
    let brands: Vec<_> = listed.iter().map(|m| m.brand.as_str()).collect();
    assert_eq!(brands, ["Aprilia", "benelli", "Honda", "Suzuki", "Vespa", "Yamaha"]);
  }

  #[tokio::test(start_paused = true)]
  async fn test_created_record_appears_in_next_listing() {
    let (_remote, store) = setup();

    let created = store.create(&new_moped()).await.unwrap();
    assert!(!created.id.is_empty());
    assert!(created.created_at.is_some());

    let listed = store.list_all().await.unwrap();
    let found = listed.iter().find(|m| m.id == created.id).unwrap();
    assert_eq!(found.brand, "Piaggio");
    assert_eq!(found.license_plate, "777KZ01");
    assert_eq!(found.mileage, Some(1200));
    assert_eq!(found.color, None);
    assert_eq!(found.created_at, created.created_at);
  }

  #[tokio::test(start_paused = true)]
  async fn test_writes_do_not_touch_valid_cache() {
    let (_remote, store) = setup();

    store.find_by_id("m1").await.unwrap();
    let created = store.create(&new_moped()).await.unwrap();

    // Snapshot predates the insert
    assert!(store.find_by_id(&created.id).await.unwrap().is_none());

    store.list_all().await.unwrap();
    assert!(store.find_by_id(&created.id).await.unwrap().is_some());
  }

  #[tokio::test(start_paused = true)]
  async fn test_update_returns_stored_record() {
    let (_remote, store) = setup();

    let patch = MopedPatch {
      status: Some(MopedStatus::Rented),
      ..Default::default()
    };
    let updated = store.update("m2", &patch).await.unwrap();

    assert_eq!(updated.status, MopedStatus::Rented);
    assert_eq!(updated.brand, "Honda");
  }

  #[tokio::test(start_paused = true)]
  async fn test_update_of_missing_record_is_not_found() {
    let (_remote, store) = setup();

    let err = store
      .update("nope", &MopedPatch::default())
      .await
      .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "failed to update mopeds");
  }

  #[tokio::test(start_paused = true)]
  async fn test_remove_then_list() {
    let (_remote, store) = setup();

    store.remove("m4").await.unwrap();
    let listed = store.list_all().await.unwrap();

    assert_eq!(listed.len(), 4);
    assert!(listed.iter().all(|m| m.id != "m4"));
  }

  #[tokio::test(start_paused = true)]
  async fn test_failed_listing_is_reported_and_keeps_snapshot() {
    let (remote, store) = setup();
    store.list_all().await.unwrap();

    remote.set_failing(true);
    let err = store.list_all().await.unwrap_err();
    assert_eq!(err.action, "list");

    // The last good snapshot still answers lookups inside the TTL
    assert_eq!(store.find_by_id("m5").await.unwrap().unwrap().brand, "Vespa");

    tokio::time::advance(DEFAULT_TTL).await;
    assert!(store.find_by_id("m5").await.is_err());
  }

  #[tokio::test(start_paused = true)]
  async fn test_failed_lookup_is_distinct_from_missing() {
    let (remote, store) = setup();

    assert!(store.find_by_id("ghost").await.unwrap().is_none());

    store.cache().invalidate().await;
    remote.set_failing(true);
    assert!(store.find_by_id("ghost").await.is_err());
  }

  #[tokio::test(start_paused = true)]
  async fn test_concurrent_lookups_on_invalid_cache() {
    let (remote, store) = setup();

    let (a, b) = tokio::join!(store.find_by_id("m1"), store.find_by_id("m2"));

    assert_eq!(a.unwrap().unwrap().id, "m1");
    assert_eq!(b.unwrap().unwrap().id, "m2");
    // No coalescing: each caller may run its own refresh
    assert!((1..=2).contains(&remote.list_calls("mopeds")));
  }

  #[tokio::test(start_paused = true)]
  async fn test_clones_share_cache() {
    let (remote, store) = setup();
    let other = store.clone();

    store.find_by_id("m1").await.unwrap();
    other.find_by_id("m2").await.unwrap();

    assert_eq!(remote.list_calls("mopeds"), 1);
  }
}
