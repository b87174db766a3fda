//! Request middleware: admin authentication and per-client rate limiting.

use crate::error::ApiError;
use crate::server::AppState;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use sha2::{Digest, Sha256};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Compare two keys through their SHA-256 digests.
///
/// Digests have a fixed length and the fold visits every byte, so the time
/// taken does not depend on where the keys first differ.
fn keys_match(presented: &str, expected: &str) -> bool {
    let presented = Sha256::digest(presented.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    presented
        .iter()
        .zip(expected.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

/// Reject admin requests without the configured bearer key.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.admin_api_key.as_deref() else {
        return Err(ApiError::admin_not_configured());
    };

    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or_default();

    if presented.is_empty() || !keys_match(presented, expected) {
        warn!(path = %request.uri().path(), "Rejected admin request");
        return Err(ApiError::unauthorized());
    }

    Ok(next.run(request).await)
}

/// Shared per-IP limiter.
#[derive(Clone)]
pub struct RateLimitState {
    limiter: Arc<DefaultKeyedRateLimiter<IpAddr>>,
}

impl RateLimitState {
    /// Allow `requests` per minute per client, with the same burst.
    pub fn per_minute(requests: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN));
        Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
        }
    }

    /// Periodically drop limiter state for clients that have gone quiet.
    pub fn spawn_pruning(&self, every: Duration) -> JoinHandle<()> {
        let limiter = self.limiter.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every.max(Duration::from_secs(1)));
            ticker.tick().await;
            loop {
                ticker.tick().await;
                limiter.retain_recent();
                limiter.shrink_to_fit();
                debug!(tracked = limiter.len(), "Pruned rate limiter state");
            }
        })
    }

    fn check(&self, ip: IpAddr) -> Result<(), ApiError> {
        self.limiter.check_key(&ip).map_err(|not_until| {
            let retry_after = not_until
                .wait_time_from(DefaultClock::default().now())
                .as_secs()
                .max(1);
            ApiError::too_many_requests(retry_after)
        })
    }
}

/// Enforce the per-IP quota.
///
/// Requests without connection info (in-process callers) share one bucket.
pub async fn rate_limit(
    State(state): State<RateLimitState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ip = connect_info
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if let Err(err) = state.check(ip) {
        debug!(%ip, "Rate limit exceeded");
        return Err(err);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_match_only_identical_keys() {
        assert!(keys_match("admin-secret", "admin-secret"));
        assert!(!keys_match("admin-secreT", "admin-secret"));
        assert!(!keys_match("admin", "admin-secret"));
        assert!(!keys_match("", "admin-secret"));
    }

    #[test]
    fn test_quota_is_per_client() {
        let state = RateLimitState::per_minute(2);
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(state.check(a).is_ok());
        assert!(state.check(a).is_ok());
        let err = state.check(a).unwrap_err();
        assert_eq!(err.code, "rate_limited");
        assert!(err.retry_after.unwrap() >= 1);

        assert!(state.check(b).is_ok());
    }

    #[test]
    fn test_zero_quota_still_admits_one() {
        let state = RateLimitState::per_minute(0);
        assert!(state.check(IpAddr::V4(Ipv4Addr::LOCALHOST)).is_ok());
    }
}
