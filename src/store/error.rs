use thiserror::Error;

use crate::remote::RemoteError;

/// A failed store operation, tagged with what was being attempted.
#[derive(Debug, Error)]
#[error("failed to {action} {collection}")]
pub struct StoreError {
  pub action: &'static str,
  pub collection: &'static str,
  #[source]
  pub source: RemoteError,
}

impl StoreError {
  pub fn new(action: &'static str, collection: &'static str, source: RemoteError) -> Self {
    Self {
      action,
      collection,
      source,
    }
  }

  /// True when the backend had no record with the requested id.
  pub fn is_not_found(&self) -> bool {
    matches!(self.source, RemoteError::NotFound { .. })
  }
}
