//! Configuration for the upstream client and the caching layer.
//!
//! Constants live on unit structs the same way for both halves; the runtime
//! configuration structs take their defaults from them.

use crate::network::RetryConfig;
use std::time::Duration;

/// Upstream API constants.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://my.callofduty.com/api/papi-client";
    pub const DEFAULT_TITLE: &'static str = "mw";
    pub const USER_AGENT: &'static str = "wzstats/0.1";
    pub const AUTH_COOKIE_NAME: &'static str = "ACT_SSO_COOKIE";
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
    pub const TOTAL_TIMEOUT: Duration = Duration::from_secs(30);
    pub const MAX_ATTEMPTS: u32 = 3;
    pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);
    pub const RETRY_MAX_DELAY: Duration = Duration::from_secs(5);
    /// Bytes of an unclassified body kept for diagnostics.
    pub const BODY_EXCERPT_BYTES: usize = 200;
}

/// Caching layer constants.
pub struct CacheDefaults;

impl CacheDefaults {
    pub const STATS_TTL: Duration = Duration::from_secs(5 * 60);
    pub const MATCH_TTL: Duration = Duration::from_secs(2 * 60);
    pub const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);
    pub const STALE_CEILING: Duration = Duration::from_secs(60 * 60);
}

/// Mode used when a caller passes an empty mode.
pub const DEFAULT_MODE: &str = "wz";

/// Platform used when a search omits one.
pub const DEFAULT_PLATFORM: &str = "uno";

/// Return `mode`, or [`DEFAULT_MODE`] when it is empty.
pub fn normalize_mode(mode: &str) -> &str {
    let trimmed = mode.trim();
    if trimmed.is_empty() {
        DEFAULT_MODE
    } else {
        trimmed
    }
}

/// Settings for [`UpstreamClient`](crate::upstream::UpstreamClient).
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Session token used until the first rotation.
    pub initial_token: String,
    /// Game title segment of the upstream paths.
    pub title: String,
    /// Timeout for a single attempt.
    pub request_timeout: Duration,
    /// Deadline for a whole fetch, retries included.
    pub total_timeout: Duration,
    /// Transport-level retry policy.
    pub retry: RetryConfig,
}

impl UpstreamConfig {
    pub fn new(base_url: impl Into<String>, initial_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            initial_token: initial_token.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_total_timeout(mut self, timeout: Duration) -> Self {
        self.total_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: NetworkConfig::DEFAULT_BASE_URL.to_string(),
            initial_token: String::new(),
            title: NetworkConfig::DEFAULT_TITLE.to_string(),
            request_timeout: NetworkConfig::REQUEST_TIMEOUT,
            total_timeout: NetworkConfig::TOTAL_TIMEOUT,
            retry: RetryConfig::new()
                .with_max_attempts(NetworkConfig::MAX_ATTEMPTS)
                .with_base_delay(NetworkConfig::RETRY_BASE_DELAY)
                .with_max_delay(NetworkConfig::RETRY_MAX_DELAY),
        }
    }
}

/// Settings for [`CachingClient`](crate::cache::CachingClient).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Freshness window for stats lookups.
    pub stats_ttl: Duration,
    /// Freshness window for match-list lookups.
    pub match_ttl: Duration,
    /// How often the background sweep runs.
    pub sweep_interval: Duration,
    /// How long past expiry an entry is kept as a stale fallback.
    pub stale_ceiling: Duration,
}

impl CacheConfig {
    pub fn with_stats_ttl(mut self, ttl: Duration) -> Self {
        self.stats_ttl = ttl;
        self
    }

    pub fn with_match_ttl(mut self, ttl: Duration) -> Self {
        self.match_ttl = ttl;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_stale_ceiling(mut self, ceiling: Duration) -> Self {
        self.stale_ceiling = ceiling;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stats_ttl: CacheDefaults::STATS_TTL,
            match_ttl: CacheDefaults::MATCH_TTL,
            sweep_interval: CacheDefaults::SWEEP_INTERVAL,
            stale_ceiling: CacheDefaults::STALE_CEILING,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mode() {
        assert_eq!(normalize_mode(""), "wz");
        assert_eq!(normalize_mode("   "), "wz");
        assert_eq!(normalize_mode("br"), "br");
    }

    #[test]
    fn test_upstream_config_strips_trailing_slash() {
        let config = UpstreamConfig::new("http://localhost:9000/api/", "token");
        assert_eq!(config.base_url, "http://localhost:9000/api");
        assert_eq!(config.title, "mw");
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_cache_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.stats_ttl, Duration::from_secs(300));
        assert_eq!(config.match_ttl, Duration::from_secs(120));
        assert_eq!(config.sweep_interval, Duration::from_secs(600));
        assert_eq!(config.stale_ceiling, Duration::from_secs(3600));
    }
}
