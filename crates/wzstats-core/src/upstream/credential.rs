//! The rotatable upstream session token.

use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared session token.
///
/// Readers take a snapshot under the read lock, so a request either sees the
/// old token or the new one, never a mix. A rotation applies to requests that
/// read the token after it commits.
#[derive(Clone, Default)]
pub struct Credential {
    token: Arc<RwLock<String>>,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(token.into())),
        }
    }

    /// Snapshot of the current token.
    pub async fn current(&self) -> String {
        self.token.read().await.clone()
    }

    /// Replace the token. Any string is accepted verbatim.
    pub async fn rotate(&self, token: impl Into<String>) {
        *self.token.write().await = token.into();
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}
