//! Player search and stats.

use super::cached_json;
use crate::error::ApiError;
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wzstats_core::{PlayerStats, DEFAULT_PLATFORM};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub gamertag: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub mode: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ModeQuery {
    #[serde(default)]
    pub mode: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub platform: String,
    pub gamertag: String,
    pub stats: PlayerStats,
}

/// `GET /players/search?gamertag=&platform=&mode=`
pub async fn search_player(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, ApiError> {
    let gamertag = query.gamertag.trim();
    if gamertag.is_empty() {
        return Err(ApiError::invalid_request(
            "gamertag query parameter is required",
        ));
    }

    let platform = match query.platform.trim() {
        "" => DEFAULT_PLATFORM,
        platform => platform,
    };

    let lookup = state
        .stats
        .lookup_player_stats(platform, gamertag, &query.mode)
        .await?;

    let body = SearchResult {
        platform: platform.to_string(),
        gamertag: gamertag.to_string(),
        stats: lookup.value.clone(),
    };
    Ok(cached_json(&lookup, body))
}

/// `GET /players/:platform/:gamertag/stats?mode=`
pub async fn player_stats(
    State(state): State<Arc<AppState>>,
    Path((platform, gamertag)): Path<(String, String)>,
    Query(query): Query<ModeQuery>,
) -> Result<Response, ApiError> {
    let lookup = state
        .stats
        .lookup_player_stats(&platform, &gamertag, &query.mode)
        .await?;

    Ok(cached_json(&lookup, &lookup.value))
}
