//! Response classification.
//!
//! The upstream signals failure in several inconsistent ways: plain status
//! codes, redirects to a login flow, an HTML login page served with 200, and
//! JSON envelopes with `"status": "error"` served with 200. [`classify_response`]
//! turns any of these into exactly one [`StatsError`], or into the decoded
//! payload when the response really is a success.
//!
//! Order of checks:
//! 1. Any status other than 200 is decided by status alone.
//! 2. For 200, a body starting with `<` is a login page.
//! 3. A `{"status": "error", "data": {"message": ...}}` envelope is mapped by message.
//! 4. Otherwise the body is decoded as the requested payload.

use crate::config::NetworkConfig;
use crate::error::{Result, StatsError};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Substring rules for 200-status error envelopes, checked in order.
const MESSAGE_RULES: &[(&str, StatsError)] = &[
    ("not authenticated", StatsError::TokenExpired),
    ("not allowed", StatsError::PlayerNotFound),
    ("user not found", StatsError::PlayerNotFound),
    ("rate limit", StatsError::RateLimited),
];

/// Classify a completed upstream response and decode its payload.
pub fn classify_response<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T> {
    if status != 200 {
        return Err(classify_status(status, body));
    }

    if looks_like_html(body) {
        return Err(StatsError::TokenExpired);
    }

    if let Some(message) = envelope_error_message(body) {
        return Err(classify_message(&message));
    }

    serde_json::from_slice(body).map_err(|_| StatsError::UpstreamUnclassified {
        status,
        excerpt: body_excerpt(body),
    })
}

/// Map a non-200 status to its error.
pub fn classify_status(status: u16, body: &[u8]) -> StatsError {
    match status {
        401 => StatsError::TokenExpired,
        403 => StatsError::PrivateProfile,
        404 => StatsError::PlayerNotFound,
        429 => StatsError::RateLimited,
        300..=399 => StatsError::TokenExpired,
        500.. => StatsError::ApiUnavailable,
        _ => StatsError::UpstreamUnclassified {
            status,
            excerpt: body_excerpt(body),
        },
    }
}

/// Map the message of a 200-status error envelope to its error.
pub fn classify_message(message: &str) -> StatsError {
    let lowered = message.to_lowercase();
    MESSAGE_RULES
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
        .map(|(_, error)| error.clone())
        .unwrap_or_else(|| StatsError::Upstream {
            message: message.to_string(),
        })
}

/// First non-whitespace byte opens a tag.
fn looks_like_html(body: &[u8]) -> bool {
    body.iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'<')
}

/// The message of an `"status": "error"` envelope, if the body is one.
fn envelope_error_message(body: &[u8]) -> Option<String> {
    let envelope: Value = serde_json::from_slice(body).ok()?;
    if envelope.get("status").and_then(Value::as_str) != Some("error") {
        return None;
    }

    let message = envelope
        .get("data")
        .and_then(|data| data.get("message"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some(message.to_string())
}

/// Lossy UTF-8 rendering of at most the first 200 bytes of `body`.
pub fn body_excerpt(body: &[u8]) -> String {
    let end = body.len().min(NetworkConfig::BODY_EXCERPT_BYTES);
    String::from_utf8_lossy(&body[..end]).into_owned()
}
