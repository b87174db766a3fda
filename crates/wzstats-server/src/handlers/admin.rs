//! Admin endpoints. Mounted behind [`require_admin`](crate::middleware::require_admin).

use crate::error::ApiError;
use crate::server::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use wzstats_core::{CacheInfo, CacheKey, StatsSource};

use super::players::ModeQuery;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct PlayerCacheInfo {
    pub stats: CacheInfo,
    pub matches: CacheInfo,
}

/// `POST /admin/token` - replace the upstream session token.
pub async fn update_token(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = body.map_err(|_| {
        ApiError::invalid_request("Request body must contain a JSON object with a 'token' field")
    })?;

    if request.token.is_empty() {
        return Err(ApiError::invalid_request("Token must not be empty"));
    }

    // Used verbatim; the upstream is the only judge of a token.
    state.stats.rotate_credential(request.token).await;
    info!("Session token updated through admin API");

    Ok(Json(json!({
        "status": "ok",
        "message": "Session token updated",
    })))
}

/// `GET /admin/cache/:platform/:gamertag?mode=` - cache state for one player.
pub async fn cache_info(
    State(state): State<Arc<AppState>>,
    Path((platform, gamertag)): Path<(String, String)>,
    Query(query): Query<ModeQuery>,
) -> Json<PlayerCacheInfo> {
    let stats_key = CacheKey::stats(&platform, &gamertag, &query.mode);
    let matches_key = CacheKey::matches(&platform, &gamertag);

    Json(PlayerCacheInfo {
        stats: state.stats.cache_info(&stats_key).await,
        matches: state.stats.cache_info(&matches_key).await,
    })
}
