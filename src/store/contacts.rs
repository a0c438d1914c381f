//! Contact-specific queries.

use tracing::debug;

use crate::remote::Filter;

use super::collection::{log_failure, CollectionStore};
use super::error::StoreError;
use super::mapper::{normalize_text, Entity};
use super::types::Contact;

impl CollectionStore<Contact> {
  /// Find a contact whose name contains `name` (case-insensitive) or whose
  /// phone equals `phone`. Returns `None` without a request when both are
  /// blank.
  pub async fn find_by_name_or_phone(
    &self,
    name: Option<&str>,
    phone: Option<&str>,
  ) -> Result<Option<Contact>, StoreError> {
    let name = name.and_then(normalize_text);
    let phone = phone.and_then(normalize_text);

    let filter = match (name, phone) {
      (Some(name), Some(phone)) => Filter::Any(vec![
        Filter::contains("name", &name),
        Filter::eq("phone", &phone),
      ]),
      (Some(name), None) => Filter::contains("name", &name),
      (None, Some(phone)) => Filter::eq("phone", &phone),
      (None, None) => return Ok(None),
    };

    debug!(?filter, "searching contacts");
    let row = self
      .remote
      .find_first(Contact::COLLECTION, &filter)
      .await
      .map_err(|e| StoreError::new("search", Contact::COLLECTION, e))
      .inspect_err(log_failure)?;

    Ok(row.as_ref().map(Contact::from_row))
  }

  /// Resolve the contact's emergency contact through the cached lookup.
  pub async fn emergency_contact(&self, contact: &Contact) -> Result<Option<Contact>, StoreError> {
    match contact.emergency_contact_id.as_deref() {
      Some(id) => self.find_by_id(id).await,
      None => Ok(None),
    }
  }
}
