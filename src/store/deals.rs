//! Deal board: deals joined with the mopeds they rent.

use futures::{stream, StreamExt, TryStreamExt};

use super::collection::CollectionStore;
use super::error::StoreError;
use super::types::{Deal, DealPatch, Moped};

/// Deals with lazily resolved moped references.
///
/// Holds a handle to the shared moped store so every resolution goes
/// through the same cache.
#[derive(Clone)]
pub struct DealBoard {
  deals: CollectionStore<Deal>,
  mopeds: CollectionStore<Moped>,
}

impl DealBoard {
  pub fn new(deals: CollectionStore<Deal>, mopeds: CollectionStore<Moped>) -> Self {
    Self { deals, mopeds }
  }

  /// The moped a deal refers to, if any. Dangling references are `None`.
  pub async fn moped_for(&self, deal: &Deal) -> Result<Option<Moped>, StoreError> {
    match deal.moped_id.as_deref() {
      Some(id) => self.mopeds.find_by_id(id).await,
      None => Ok(None),
    }
  }

  /// All deals with their mopeds, newest deal first.
  ///
  /// Resolutions run one after another so the first one primes the moped
  /// cache for the rest.
  pub async fn list_with_mopeds(&self) -> Result<Vec<(Deal, Option<Moped>)>, StoreError> {
    let deals = self.deals.list_all().await?;
    stream::iter(deals)
      .then(|deal| async move {
        let moped = self.moped_for(&deal).await?;
        Ok::<_, StoreError>((deal, moped))
      })
      .try_collect()
      .await
  }

  /// One deal with its moped.
  pub async fn show(&self, id: &str) -> Result<Option<(Deal, Option<Moped>)>, StoreError> {
    let Some(deal) = self.deals.find_by_id(id).await? else {
      return Ok(None);
    };
    let moped = self.moped_for(&deal).await?;
    Ok(Some((deal, moped)))
  }

  /// Move a deal to another board stage.
  pub async fn move_to_stage(&self, id: &str, stage: &str) -> Result<Deal, StoreError> {
    let patch = DealPatch {
      stage: Some(stage.to_string()),
      ..Default::default()
    };
    self.deals.update(id, &patch).await
  }
}
