//! In-memory TTL store with stale reads.
//!
//! One coarse read/write lock guards the whole map. Every critical section is
//! a single map operation and no lock is ever held across an await point that
//! does I/O.

use super::key::CacheKey;
use crate::models::{Match, PlayerStats};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// The value shapes this cache holds.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Stats(PlayerStats),
    Matches(Vec<Match>),
}

/// Conversion between a lookup's result type and [`CachedValue`].
pub trait Cacheable: Clone + Sized {
    fn into_cached(self) -> CachedValue;
    fn from_cached(value: CachedValue) -> Option<Self>;
}

impl Cacheable for PlayerStats {
    fn into_cached(self) -> CachedValue {
        CachedValue::Stats(self)
    }

    fn from_cached(value: CachedValue) -> Option<Self> {
        match value {
            CachedValue::Stats(stats) => Some(stats),
            CachedValue::Matches(_) => None,
        }
    }
}

impl Cacheable for Vec<Match> {
    fn into_cached(self) -> CachedValue {
        CachedValue::Matches(self)
    }

    fn from_cached(value: CachedValue) -> Option<Self> {
        match value {
            CachedValue::Matches(matches) => Some(matches),
            CachedValue::Stats(_) => None,
        }
    }
}

/// Diagnostic view of one key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    /// An entry exists, fresh or stale.
    pub hit: bool,
    /// Seconds since the entry was fetched.
    pub age_seconds: u64,
    /// The entry is past its TTL.
    pub stale: bool,
}

/// A cached value together with how old it is.
#[derive(Debug, Clone)]
pub struct StoredValue {
    pub value: CachedValue,
    pub age: Duration,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CachedValue,
    fetched_at: Instant,
    /// Set once at insert; only a new insert replaces it. `None` when the
    /// TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    fn expired_for(&self, now: Instant) -> Duration {
        self.expires_at
            .map(|expires_at| now.saturating_duration_since(expires_at))
            .unwrap_or_default()
    }

    fn stored(&self, now: Instant) -> StoredValue {
        StoredValue {
            value: self.value.clone(),
            age: now.saturating_duration_since(self.fetched_at),
        }
    }
}

/// Keyed store of fetched values with per-insert expiry.
#[derive(Debug, Default)]
pub struct TtlStore {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl TtlStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value for `key` if it has not expired.
    pub async fn get_fresh(&self, key: &CacheKey) -> Option<StoredValue> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.stored(now))
    }

    /// The value for `key` regardless of expiry.
    pub async fn get_any(&self, key: &CacheKey) -> Option<StoredValue> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.get(key).map(|entry| entry.stored(now))
    }

    /// Store `value` under `key`, fresh for `ttl` from now.
    pub async fn insert(&self, key: CacheKey, value: CachedValue, ttl: Duration) {
        let now = Instant::now();
        let entry = CacheEntry {
            value,
            fetched_at: now,
            expires_at: now.checked_add(ttl),
        };
        self.entries.write().await.insert(key, entry);
    }

    pub async fn info(&self, key: &CacheKey) -> CacheInfo {
        let now = Instant::now();
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) => CacheInfo {
                hit: true,
                age_seconds: now.saturating_duration_since(entry.fetched_at).as_secs(),
                stale: entry.is_expired(now),
            },
            None => CacheInfo::default(),
        }
    }

    /// Remove entries whose expiry lies more than `ceiling` in the past.
    ///
    /// Returns the number of removed entries.
    pub async fn evict_stale(&self, ceiling: Duration) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expired_for(now) <= ceiling);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
