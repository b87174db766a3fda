//! In-memory caching in front of the upstream client.
//!
//! - `client`: the [`CachingClient`] decorator
//! - `store`: the TTL map with stale reads
//! - `key`: namespaced, escaped cache keys
//! - `eviction`: the background sweep and its handle

mod client;
mod eviction;
mod key;
mod store;

pub use client::{CacheOutcome, CachingClient, Lookup};
pub use eviction::EvictionHandle;
pub use key::CacheKey;
pub use store::{CacheInfo, Cacheable, CachedValue, StoredValue, TtlStore};
