//! wzstats core - resilient access to the Call of Duty stats API.
//!
//! The upstream is slow, rate limited and inconsistent about how it reports
//! failure. This crate puts two layers between it and application code:
//!
//! - [`UpstreamClient`] issues authenticated requests, retries transport
//!   failures, and classifies every response into [`StatsError`].
//! - [`CachingClient`] wraps any [`StatsSource`] with a TTL cache that serves
//!   stale data when the upstream fails and sweeps out old entries in the
//!   background.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wzstats_core::{CacheConfig, CachingClient, StatsSource, UpstreamClient, UpstreamConfig};
//!
//! #[tokio::main]
//! async fn main() -> wzstats_core::Result<()> {
//!     let upstream = UpstreamClient::new(UpstreamConfig::new(
//!         "https://my.callofduty.com/api/papi-client",
//!         "sso-token",
//!     ))?;
//!     let client = CachingClient::new(Arc::new(upstream), CacheConfig::default());
//!
//!     let stats = client.fetch_player_stats("psn", "alice", "wz").await?;
//!     println!("{} kills", stats.kills);
//!
//!     client.shutdown();
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod network;
pub mod source;
pub mod upstream;

pub use cache::{CacheInfo, CacheKey, CacheOutcome, CachingClient, Lookup};
pub use config::{CacheConfig, UpstreamConfig, DEFAULT_MODE, DEFAULT_PLATFORM};
pub use error::{Result, StatsError};
pub use models::{GulagResult, Match, ModeStats, PlayerStats};
pub use network::RetryConfig;
pub use source::{DynStatsSource, StatsSource};
pub use upstream::UpstreamClient;
