//! The read capability shared by the upstream client and the cache in front of it.

use crate::error::Result;
use crate::models::{Match, PlayerStats};
use async_trait::async_trait;
use std::sync::Arc;

/// Source of player stats and recent matches.
///
/// Implemented by [`UpstreamClient`](crate::upstream::UpstreamClient) and by
/// [`CachingClient`](crate::cache::CachingClient), which wraps another source
/// behind the same interface.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Lifetime stats for a player. An empty `mode` means the default mode.
    async fn fetch_player_stats(
        &self,
        platform: &str,
        gamertag: &str,
        mode: &str,
    ) -> Result<PlayerStats>;

    /// The player's most recent matches.
    async fn fetch_recent_matches(&self, platform: &str, gamertag: &str) -> Result<Vec<Match>>;

    /// Swap the upstream session token used by subsequent requests.
    async fn rotate_credential(&self, token: String);
}

/// Shared, type-erased source.
pub type DynStatsSource = Arc<dyn StatsSource>;
