//! Caching decorator for a [`StatsSource`].
//!
//! Lookup order:
//! 1. Fresh entry for the key: return it, no upstream call
//! 2. Otherwise call the wrapped source
//! 3. Success: store with the TTL for this operation kind and return
//! 4. Failure: return any entry for the key, however old; only when there is
//!    none does the error reach the caller
//!
//! Concurrent misses on the same key each call upstream; the last one to
//! finish wins the stored value.

use super::eviction::EvictionHandle;
use super::key::CacheKey;
use super::store::{CacheInfo, Cacheable, TtlStore};
use crate::config::{normalize_mode, CacheConfig};
use crate::error::Result;
use crate::models::{Match, PlayerStats};
use crate::source::{DynStatsSource, StatsSource};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Where a lookup's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Fresh cached value.
    Hit,
    /// Fetched from upstream just now.
    Miss,
    /// Cached value served because upstream failed.
    Stale,
}

impl CacheOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheOutcome::Hit => "HIT",
            CacheOutcome::Miss => "MISS",
            CacheOutcome::Stale => "STALE",
        }
    }
}

/// A value plus its cache provenance.
#[derive(Debug, Clone)]
pub struct Lookup<T> {
    pub value: T,
    pub outcome: CacheOutcome,
    pub age_seconds: u64,
}

/// Stats source with an in-memory TTL cache and stale fallback.
pub struct CachingClient {
    inner: DynStatsSource,
    store: Arc<TtlStore>,
    config: CacheConfig,
    eviction: EvictionHandle,
}

impl CachingClient {
    /// Wrap `inner` and start the background sweep.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(inner: DynStatsSource, config: CacheConfig) -> Self {
        let store = Arc::new(TtlStore::new());
        let eviction =
            EvictionHandle::spawn(store.clone(), config.sweep_interval, config.stale_ceiling);

        Self {
            inner,
            store,
            config,
            eviction,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Stats lookup with provenance.
    pub async fn lookup_player_stats(
        &self,
        platform: &str,
        gamertag: &str,
        mode: &str,
    ) -> Result<Lookup<PlayerStats>> {
        let mode = normalize_mode(mode);
        let key = CacheKey::stats(platform, gamertag, mode);
        self.lookup(
            key,
            self.config.stats_ttl,
            self.inner.fetch_player_stats(platform, gamertag, mode),
        )
        .await
    }

    /// Recent-matches lookup with provenance.
    pub async fn lookup_recent_matches(
        &self,
        platform: &str,
        gamertag: &str,
    ) -> Result<Lookup<Vec<Match>>> {
        let key = CacheKey::matches(platform, gamertag);
        self.lookup(
            key,
            self.config.match_ttl,
            self.inner.fetch_recent_matches(platform, gamertag),
        )
        .await
    }

    /// Hit/age/staleness for `key`. Diagnostic only.
    pub async fn cache_info(&self, key: &CacheKey) -> CacheInfo {
        self.store.info(key).await
    }

    /// Run one eviction sweep now and return how many entries it removed.
    pub async fn sweep_now(&self) -> usize {
        self.store.evict_stale(self.config.stale_ceiling).await
    }

    pub async fn len(&self) -> usize {
        self.store.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.store.is_empty().await
    }

    /// Stop the background sweep. Lookups keep working.
    pub fn shutdown(&self) {
        self.eviction.shutdown();
    }

    pub fn is_sweeping(&self) -> bool {
        self.eviction.is_running()
    }

    async fn lookup<T, F>(&self, key: CacheKey, ttl: Duration, fetch: F) -> Result<Lookup<T>>
    where
        T: Cacheable,
        F: Future<Output = Result<T>>,
    {
        if let Some(stored) = self.store.get_fresh(&key).await {
            let age_seconds = stored.age.as_secs();
            if let Some(value) = T::from_cached(stored.value) {
                debug!(key = %key, age_seconds, "Cache hit");
                return Ok(Lookup {
                    value,
                    outcome: CacheOutcome::Hit,
                    age_seconds,
                });
            }
        }

        debug!(key = %key, "Cache miss");

        // If the caller drops this future mid-fetch, nothing below runs and
        // the store is left untouched.
        let error = match fetch.await {
            Ok(value) => {
                self.store.insert(key, value.clone().into_cached(), ttl).await;
                return Ok(Lookup {
                    value,
                    outcome: CacheOutcome::Miss,
                    age_seconds: 0,
                });
            }
            Err(error) => error,
        };

        if let Some(stored) = self.store.get_any(&key).await {
            let age_seconds = stored.age.as_secs();
            if let Some(value) = T::from_cached(stored.value) {
                warn!(
                    key = %key,
                    age_seconds,
                    error = %error,
                    "Serving stale cache entry after upstream failure"
                );
                return Ok(Lookup {
                    value,
                    outcome: CacheOutcome::Stale,
                    age_seconds,
                });
            }
        }

        Err(error)
    }
}

#[async_trait]
impl StatsSource for CachingClient {
    async fn fetch_player_stats(
        &self,
        platform: &str,
        gamertag: &str,
        mode: &str,
    ) -> Result<PlayerStats> {
        self.lookup_player_stats(platform, gamertag, mode)
            .await
            .map(|lookup| lookup.value)
    }

    async fn fetch_recent_matches(&self, platform: &str, gamertag: &str) -> Result<Vec<Match>> {
        self.lookup_recent_matches(platform, gamertag)
            .await
            .map(|lookup| lookup.value)
    }

    async fn rotate_credential(&self, token: String) {
        self.inner.rotate_credential(token).await;
    }
}
