//! Authenticated client for the upstream stats API.
//!
//! Wraps reqwest with:
//! - Session-cookie authentication from a rotatable [`Credential`]
//! - No redirect following (a redirect means the session expired)
//! - Bounded transport retries with backoff and an overall deadline
//! - Classification of every response through [`classify_response`]

use super::classifier::classify_response;
use super::credential::Credential;
use super::wire::{MatchesResponse, ProfileResponse};
use crate::config::{normalize_mode, NetworkConfig, UpstreamConfig, DEFAULT_MODE};
use crate::error::{Result, StatsError};
use crate::models::{Match, PlayerStats};
use crate::network::{retry_async, RetryConfig};
use crate::source::StatsSource;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, redirect, Client};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A response that made it back over the wire, before classification.
struct RawResponse {
    status: u16,
    body: Bytes,
}

/// Client for the upstream stats API.
pub struct UpstreamClient {
    http: Client,
    base_url: String,
    title: String,
    credential: Credential,
    retry: RetryConfig,
    total_timeout: Duration,
}

impl UpstreamClient {
    /// Create a client from configuration.
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        url::Url::parse(&config.base_url).map_err(|e| StatsError::Config {
            message: format!("invalid upstream base URL {:?}: {}", config.base_url, e),
        })?;

        let http = Client::builder()
            .timeout(config.request_timeout)
            .redirect(redirect::Policy::none())
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| StatsError::Config {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            title: config.title,
            credential: Credential::new(config.initial_token),
            retry: config.retry,
            total_timeout: config.total_timeout,
        })
    }

    /// The credential shared by all requests from this client.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    fn stats_path(&self, platform: &str, gamertag: &str, mode: &str) -> String {
        format!(
            "/stats/cod/v1/title/{}/platform/{}/gamer/{}/profile/type/{}",
            urlencoding::encode(&self.title),
            urlencoding::encode(platform),
            urlencoding::encode(gamertag),
            urlencoding::encode(mode),
        )
    }

    fn matches_path(&self, platform: &str, gamertag: &str) -> String {
        format!(
            "/crm/cod/v2/title/{}/platform/{}/gamer/{}/matches/{}/start/0/end/0/details",
            urlencoding::encode(&self.title),
            urlencoding::encode(platform),
            urlencoding::encode(gamertag),
            DEFAULT_MODE,
        )
    }

    /// GET `path`, retrying transport failures, and classify the result.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        let response = match tokio::time::timeout(self.total_timeout, self.send_with_retry(&url)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(path, error = %e, "Upstream transport failure");
                return Err(StatsError::ApiUnavailable);
            }
            Err(_) => {
                warn!(
                    path,
                    timeout_ms = self.total_timeout.as_millis() as u64,
                    "Upstream request exceeded its deadline"
                );
                return Err(StatsError::ApiUnavailable);
            }
        };

        debug!(path, status = response.status, bytes = response.body.len(), "Upstream response");

        classify_response(response.status, &response.body).inspect_err(|e| {
            warn!(
                path,
                status = response.status,
                kind = e.kind(),
                error = %e,
                "Upstream request classified as failure"
            );
        })
    }

    async fn send_with_retry(&self, url: &str) -> std::result::Result<RawResponse, reqwest::Error> {
        let (result, stats) = retry_async(
            &self.retry,
            || self.send_once(url),
            |e: &reqwest::Error| !e.is_builder(),
        )
        .await;

        if stats.attempts > 1 {
            debug!(attempts = stats.attempts, "Upstream request needed retries");
        }
        result
    }

    async fn send_once(&self, url: &str) -> std::result::Result<RawResponse, reqwest::Error> {
        let token = self.credential.current().await;
        let response = self
            .http
            .get(url)
            .header(
                header::COOKIE,
                format!("{}={}", NetworkConfig::AUTH_COOKIE_NAME, token),
            )
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl StatsSource for UpstreamClient {
    async fn fetch_player_stats(
        &self,
        platform: &str,
        gamertag: &str,
        mode: &str,
    ) -> Result<PlayerStats> {
        let path = self.stats_path(platform, gamertag, normalize_mode(mode));
        let profile: ProfileResponse = self.get(&path).await?;
        Ok(profile.into_player_stats(platform, gamertag))
    }

    async fn fetch_recent_matches(&self, platform: &str, gamertag: &str) -> Result<Vec<Match>> {
        let path = self.matches_path(platform, gamertag);
        let response: MatchesResponse = self.get(&path).await?;
        Ok(response.into_matches())
    }

    async fn rotate_credential(&self, token: String) {
        self.credential.rotate(token).await;
        info!("Upstream credential rotated");
    }
}
