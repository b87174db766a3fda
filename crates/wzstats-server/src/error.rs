//! JSON error responses.
//!
//! Every failure leaves the API as `{"error": <code>, "message": <text>}`.
//! Upstream errors are mapped from [`StatsError`]; the rest come from request
//! validation and the middleware.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use wzstats_core::StatsError;

/// Wire shape of an error response.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
}

/// An error ready to be sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    /// Seconds for a `Retry-After` header.
    pub retry_after: Option<u64>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Invalid or missing admin API key",
        )
    }

    pub fn admin_not_configured() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "admin_not_configured",
            "Admin API key is not configured",
        )
    }

    pub fn internal_server_error() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_server_error",
            "An unexpected error occurred",
        )
    }

    pub fn too_many_requests(retry_after: u64) -> Self {
        Self {
            retry_after: Some(retry_after),
            ..Self::new(StatusCode::TOO_MANY_REQUESTS, "rate_limited", "Too many requests")
        }
    }
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::PlayerNotFound => {
                Self::new(StatusCode::NOT_FOUND, "player_not_found", "Player not found")
            }
            StatsError::PrivateProfile => Self::new(
                StatusCode::FORBIDDEN,
                "private_profile",
                "Player profile is set to private",
            ),
            StatsError::TokenExpired => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                "Stats API authentication expired",
            ),
            StatsError::ApiUnavailable => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                "Stats API is currently unavailable",
            ),
            StatsError::RateLimited => Self::new(
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests to the stats API",
            ),
            other => {
                error!(kind = other.kind(), error = %other, "Unhandled error in API handler");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An unexpected error occurred",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.code,
            message: &self.message,
        };
        let mut response = (self.status, Json(body)).into_response();

        if let Some(seconds) = self.retry_after {
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_error_mapping() {
        let cases = [
            (StatsError::PlayerNotFound, StatusCode::NOT_FOUND, "player_not_found"),
            (StatsError::PrivateProfile, StatusCode::FORBIDDEN, "private_profile"),
            (StatsError::TokenExpired, StatusCode::SERVICE_UNAVAILABLE, "service_unavailable"),
            (StatsError::ApiUnavailable, StatusCode::SERVICE_UNAVAILABLE, "service_unavailable"),
            (StatsError::RateLimited, StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
            (
                StatsError::Upstream {
                    message: "odd".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
            ),
            (
                StatsError::UpstreamUnclassified {
                    status: 418,
                    excerpt: String::new(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
            ),
        ];

        for (err, status, code) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status, status);
            assert_eq!(api.code, code);
        }
    }

    #[test]
    fn test_token_expired_message_differs_from_outage() {
        let expired: ApiError = StatsError::TokenExpired.into();
        let down: ApiError = StatsError::ApiUnavailable.into();
        assert_eq!(expired.code, down.code);
        assert_ne!(expired.message, down.message);
    }

    #[test]
    fn test_retry_after_header() {
        let response = ApiError::too_many_requests(12).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "12");
    }
}
