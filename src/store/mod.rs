//! Typed stores over the backend collections.

mod cache;
mod collection;
mod contacts;
mod deals;
mod error;
pub mod mapper;
mod rows;
pub mod types;

pub use collection::CollectionStore;
pub use deals::DealBoard;
pub use error::StoreError;

use std::sync::Arc;
use std::time::Duration;

use crate::remote::RemoteCollection;
use types::{Contact, Deal, Moped, Warehouse};

/// Every store, built once per process over one remote client.
///
/// The deal board shares the moped store's cache.
#[derive(Clone)]
pub struct Stores {
  pub mopeds: CollectionStore<Moped>,
  pub contacts: CollectionStore<Contact>,
  pub warehouses: CollectionStore<Warehouse>,
  pub deals: CollectionStore<Deal>,
  pub board: DealBoard,
}

impl Stores {
  pub fn new(remote: Arc<dyn RemoteCollection>, ttl: Duration) -> Self {
    let mopeds = CollectionStore::new(Arc::clone(&remote), ttl);
    let contacts = CollectionStore::new(Arc::clone(&remote), ttl);
    let warehouses = CollectionStore::new(Arc::clone(&remote), ttl);
    let deals = CollectionStore::new(remote, ttl);
    let board = DealBoard::new(deals.clone(), mopeds.clone());

    Self {
      mopeds,
      contacts,
      warehouses,
      deals,
      board,
    }
  }
}
