//! Error types for the stats client.
//!
//! Every upstream response is reduced to one of these variants before it
//! reaches a caller. The first six variants form the closed taxonomy that HTTP
//! handlers map onto outward statuses; `Upstream` and `Config` cover the
//! remaining opaque failures.

use thiserror::Error;

/// Main error type for the stats client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("player not found")]
    PlayerNotFound,

    #[error("player profile is set to private")]
    PrivateProfile,

    #[error("rate limited by the upstream API")]
    RateLimited,

    #[error("upstream session token has expired")]
    TokenExpired,

    #[error("upstream API is unavailable")]
    ApiUnavailable,

    /// A response that matched no known status or body pattern.
    #[error("unexpected upstream response (status {status}): {excerpt}")]
    UpstreamUnclassified {
        status: u16,
        /// At most the first 200 bytes of the body.
        excerpt: String,
    },

    /// A business error reported inside a 200 envelope with an unrecognised message.
    #[error("upstream error: {message}")]
    Upstream { message: String },

    #[error("configuration error: {message}")]
    Config { message: String },
}

/// Result type alias for stats client operations.
pub type Result<T> = std::result::Result<T, StatsError>;

impl StatsError {
    /// Stable machine-readable code for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            StatsError::PlayerNotFound => "player_not_found",
            StatsError::PrivateProfile => "private_profile",
            StatsError::RateLimited => "rate_limited",
            StatsError::TokenExpired => "token_expired",
            StatsError::ApiUnavailable => "api_unavailable",
            StatsError::UpstreamUnclassified { .. } => "upstream_unclassified",
            StatsError::Upstream { .. } => "upstream_error",
            StatsError::Config { .. } => "config_error",
        }
    }

    /// Whether rotating the credential could resolve this error.
    pub fn is_credential_problem(&self) -> bool {
        matches!(self, StatsError::TokenExpired)
    }

    /// Whether this error belongs to the closed taxonomy handed to callers.
    pub fn is_classified(&self) -> bool {
        !matches!(self, StatsError::Upstream { .. } | StatsError::Config { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes_are_distinct() {
        let errors = [
            StatsError::PlayerNotFound,
            StatsError::PrivateProfile,
            StatsError::RateLimited,
            StatsError::TokenExpired,
            StatsError::ApiUnavailable,
            StatsError::UpstreamUnclassified {
                status: 418,
                excerpt: String::new(),
            },
            StatsError::Upstream {
                message: "boom".to_string(),
            },
            StatsError::Config {
                message: "bad".to_string(),
            },
        ];

        let mut kinds: Vec<_> = errors.iter().map(|e| e.kind()).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn test_only_token_expired_is_credential_problem() {
        assert!(StatsError::TokenExpired.is_credential_problem());
        assert!(!StatsError::ApiUnavailable.is_credential_problem());
        assert!(!StatsError::RateLimited.is_credential_problem());
    }

    #[test]
    fn test_unclassified_display_includes_status() {
        let err = StatsError::UpstreamUnclassified {
            status: 418,
            excerpt: "teapot".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unexpected upstream response (status 418): teapot"
        );
        assert!(err.is_classified());
        assert!(!StatsError::Upstream {
            message: "x".to_string()
        }
        .is_classified());
    }
}
