//! Deterministic cache keys.

use crate::config::normalize_mode;
use std::fmt;

/// Key of one cached lookup.
///
/// Keys are namespaced by operation (`stats:` / `matches:`) and every
/// component is percent-encoded, so `:` inside a gamertag cannot make two
/// different requests share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a stats lookup. An empty mode is the default mode.
    pub fn stats(platform: &str, gamertag: &str, mode: &str) -> Self {
        Self(format!(
            "stats:{}:{}:{}",
            urlencoding::encode(platform),
            urlencoding::encode(gamertag),
            urlencoding::encode(normalize_mode(mode)),
        ))
    }

    /// Key for a recent-matches lookup.
    pub fn matches(platform: &str, gamertag: &str) -> Self {
        Self(format!(
            "matches:{}:{}",
            urlencoding::encode(platform),
            urlencoding::encode(gamertag),
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
