//! Data returned to callers.
//!
//! Field names serialize in camelCase to match the frontend's TypeScript types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifetime statistics for one player in one mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub platform: String,
    pub gamertag: String,
    pub level: i64,
    pub prestige: i64,
    pub kills: i64,
    pub deaths: i64,
    pub kd_ratio: f64,
    pub wins: i64,
    pub losses: i64,
    pub win_pct: f64,
    pub score_per_min: f64,
    pub headshots: i64,
    pub time_played: i64,
    pub matches_played: i64,
    pub top_five: i64,
    pub top_ten: i64,
    pub top_twenty_five: i64,
    pub assists: i64,
    pub damage_done: i64,
    /// Per-mode breakdown keyed by the upstream's mode name.
    #[serde(default)]
    pub modes: BTreeMap<String, ModeStats>,
}

/// Lifetime statistics restricted to one game mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeStats {
    pub kills: i64,
    pub deaths: i64,
    pub kd_ratio: f64,
    pub wins: i64,
    pub top_five: i64,
    pub top_ten: i64,
    pub score_per_min: f64,
    pub time_played: i64,
    pub matches_played: i64,
}

/// Outcome of the gulag round in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GulagResult {
    Win,
    Loss,
}

/// One recent match as seen by the requested player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    #[serde(rename = "matchID")]
    pub match_id: String,
    pub mode: String,
    pub map: String,
    pub placement: i64,
    pub kills: i64,
    pub deaths: i64,
    pub kd_ratio: f64,
    pub damage_dealt: i64,
    pub damage_taken: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gulag_result: Option<GulagResult>,
    pub duration: i64,
    pub match_time: DateTime<Utc>,
}
