//! Generic read-through caching layer.
//!
//! This module provides a backend-agnostic caching mechanism that:
//! - Holds one full snapshot of a collection, keyed by entity id
//! - Treats the snapshot as valid for a fixed TTL
//! - Refreshes the whole snapshot on a miss against a stale or absent cache

mod layer;
mod snapshot;
mod traits;

pub use layer::{CacheLayer, DEFAULT_TTL};
pub use traits::{CacheSource, Cacheable};
