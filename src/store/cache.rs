//! Caching implementations for store entities.

use crate::cache::Cacheable;

use super::types::{Contact, Deal, Moped, Warehouse};

impl Cacheable for Moped {
  fn cache_key(&self) -> String {
    self.id.clone()
  }

  fn entity_type() -> &'static str {
    "moped"
  }
}

impl Cacheable for Contact {
  fn cache_key(&self) -> String {
    self.id.clone()
  }

  fn entity_type() -> &'static str {
    "contact"
  }
}

impl Cacheable for Warehouse {
  fn cache_key(&self) -> String {
    self.id.clone()
  }

  fn entity_type() -> &'static str {
    "warehouse"
  }
}

impl Cacheable for Deal {
  fn cache_key(&self) -> String {
    self.id.clone()
  }

  fn entity_type() -> &'static str {
    "deal"
  }
}
