//! Recent matches with pagination.

use super::cached_json;
use crate::error::ApiError;
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wzstats_core::Match;

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

/// Raw query values. Unparseable numbers fall back to the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct MatchesQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    #[serde(default)]
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchPage {
    pub matches: Vec<Match>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

impl MatchesQuery {
    fn limit(&self) -> usize {
        match self.limit.as_deref().and_then(|v| v.trim().parse::<i64>().ok()) {
            Some(n) if n > 0 => (n as usize).min(MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        }
    }

    fn offset(&self) -> usize {
        self.offset
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map_or(0, |n| n.max(0) as usize)
    }
}

/// Filter by mode (case-insensitive, empty means all) and slice one page.
pub fn paginate(matches: &[Match], mode: &str, limit: usize, offset: usize) -> MatchPage {
    let mode = mode.trim();
    let filtered: Vec<&Match> = matches
        .iter()
        .filter(|m| mode.is_empty() || m.mode.eq_ignore_ascii_case(mode))
        .collect();

    MatchPage {
        total: filtered.len(),
        matches: filtered
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect(),
        limit,
        offset,
    }
}

/// `GET /players/:platform/:gamertag/matches?limit=&offset=&mode=`
pub async fn recent_matches(
    State(state): State<Arc<AppState>>,
    Path((platform, gamertag)): Path<(String, String)>,
    Query(query): Query<MatchesQuery>,
) -> Result<Response, ApiError> {
    let lookup = state.stats.lookup_recent_matches(&platform, &gamertag).await?;
    let page = paginate(&lookup.value, &query.mode, query.limit(), query.offset());
    Ok(cached_json(&lookup, page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn game(id: &str, mode: &str) -> Match {
        Match {
            match_id: id.to_string(),
            mode: mode.to_string(),
            map: "mp_don4".to_string(),
            placement: 1,
            kills: 0,
            deaths: 0,
            kd_ratio: 0.0,
            damage_dealt: 0,
            damage_taken: 0,
            gulag_result: None,
            duration: 0,
            match_time: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn query(limit: Option<&str>, offset: Option<&str>) -> MatchesQuery {
        MatchesQuery {
            limit: limit.map(String::from),
            offset: offset.map(String::from),
            mode: String::new(),
        }
    }

    #[test]
    fn test_limit_rules() {
        assert_eq!(query(None, None).limit(), 20);
        assert_eq!(query(Some("0"), None).limit(), 20);
        assert_eq!(query(Some("-3"), None).limit(), 20);
        assert_eq!(query(Some("abc"), None).limit(), 20);
        assert_eq!(query(Some("5"), None).limit(), 5);
        assert_eq!(query(Some("500"), None).limit(), 100);
    }

    #[test]
    fn test_offset_rules() {
        assert_eq!(query(None, None).offset(), 0);
        assert_eq!(query(None, Some("-1")).offset(), 0);
        assert_eq!(query(None, Some("x")).offset(), 0);
        assert_eq!(query(None, Some("7")).offset(), 7);
    }

    #[test]
    fn test_paginate_filters_then_slices() {
        let all = vec![
            game("1", "br"),
            game("2", "plunder"),
            game("3", "BR"),
            game("4", "br"),
        ];

        let page = paginate(&all, "br", 2, 1);
        assert_eq!(page.total, 3);
        let ids: Vec<&str> = page.matches.iter().map(|m| m.match_id.as_str()).collect();
        assert_eq!(ids, ["3", "4"]);

        let everything = paginate(&all, "", 20, 0);
        assert_eq!(everything.total, 4);
        assert_eq!(everything.matches.len(), 4);

        let past_end = paginate(&all, "", 20, 10);
        assert_eq!(past_end.total, 4);
        assert!(past_end.matches.is_empty());
    }
}
