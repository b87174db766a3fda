//! Upstream payload shapes and the tolerant decoders behind them.
//!
//! The upstream mixes floats, integers, numeric strings and nulls for the same
//! fields, and sometimes omits whole blocks. Numeric fields decode through
//! [`lenient_number`] and nested blocks through [`tolerant`], so a bad field
//! costs that field (zeroed) instead of the whole response.

use crate::models::{GulagResult, Match, ModeStats, PlayerStats};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Decode any JSON value as a finite number, defaulting to zero.
pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_or_zero(&value))
}

/// Decode any JSON value as a string; numbers are stringified, the rest is empty.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Decode a nested block, falling back to its default when it is mistyped.
pub(crate) fn tolerant<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Decode an object of blocks, each one tolerantly.
pub(crate) fn tolerant_map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Object(entries) = value else {
        return Ok(BTreeMap::new());
    };

    Ok(entries
        .into_iter()
        .map(|(name, block)| (name, serde_json::from_value(block).unwrap_or_default()))
        .collect())
}

/// Decode an array of blocks, each one tolerantly.
pub(crate) fn tolerant_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

fn number_or_zero(value: &Value) -> f64 {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite()).unwrap_or(0.0)
}

fn whole(n: f64) -> i64 {
    n as i64
}

// Profile endpoint

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProfileResponse {
    #[serde(default, deserialize_with = "tolerant")]
    data: ProfileData,
}

#[derive(Debug, Default, Deserialize)]
struct ProfileData {
    #[serde(default, deserialize_with = "lenient_number")]
    level: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    prestige: f64,
    #[serde(default, deserialize_with = "tolerant")]
    lifetime: Lifetime,
}

#[derive(Debug, Default, Deserialize)]
struct Lifetime {
    #[serde(default, deserialize_with = "tolerant")]
    all: AllBlock,
    #[serde(default, deserialize_with = "tolerant_map")]
    mode: BTreeMap<String, ModeBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct AllBlock {
    #[serde(default, deserialize_with = "tolerant")]
    properties: StatsProperties,
}

#[derive(Debug, Default, Deserialize)]
struct ModeBlock {
    #[serde(default, deserialize_with = "tolerant")]
    properties: ModeProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsProperties {
    #[serde(default, deserialize_with = "lenient_number")]
    kills: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    deaths: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    kd_ratio: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    wins: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    losses: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    wl_ratio: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    score_per_minute: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    headshots: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    time_played: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    matches_played: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    top_five: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    top_ten: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    top_twenty_five: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    assists: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    damage_done: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModeProperties {
    #[serde(default, deserialize_with = "lenient_number")]
    kills: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    deaths: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    kd_ratio: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    wins: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    top_five: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    top_ten: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    score_per_minute: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    time_played: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    games_played: f64,
}

impl ProfileResponse {
    pub(crate) fn into_player_stats(self, platform: &str, gamertag: &str) -> PlayerStats {
        let data = self.data;
        let all = data.lifetime.all.properties;

        let modes = data
            .lifetime
            .mode
            .into_iter()
            .map(|(name, block)| {
                let p = block.properties;
                let stats = ModeStats {
                    kills: whole(p.kills),
                    deaths: whole(p.deaths),
                    kd_ratio: p.kd_ratio,
                    wins: whole(p.wins),
                    top_five: whole(p.top_five),
                    top_ten: whole(p.top_ten),
                    score_per_min: p.score_per_minute,
                    time_played: whole(p.time_played),
                    matches_played: whole(p.games_played),
                };
                (name, stats)
            })
            .collect();

        PlayerStats {
            platform: platform.to_string(),
            gamertag: gamertag.to_string(),
            level: whole(data.level),
            prestige: whole(data.prestige),
            kills: whole(all.kills),
            deaths: whole(all.deaths),
            kd_ratio: all.kd_ratio,
            wins: whole(all.wins),
            losses: whole(all.losses),
            win_pct: all.wl_ratio,
            score_per_min: all.score_per_minute,
            headshots: whole(all.headshots),
            time_played: whole(all.time_played),
            matches_played: whole(all.matches_played),
            top_five: whole(all.top_five),
            top_ten: whole(all.top_ten),
            top_twenty_five: whole(all.top_twenty_five),
            assists: whole(all.assists),
            damage_done: whole(all.damage_done),
            modes,
        }
    }
}

// Matches endpoint

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MatchesResponse {
    #[serde(default, deserialize_with = "tolerant")]
    data: MatchesData,
}

#[derive(Debug, Default, Deserialize)]
struct MatchesData {
    #[serde(default, deserialize_with = "tolerant_vec")]
    matches: Vec<RawMatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMatch {
    #[serde(rename = "matchID", default, deserialize_with = "lenient_string")]
    match_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    mode: String,
    #[serde(default, deserialize_with = "lenient_string")]
    map: String,
    #[serde(default, deserialize_with = "tolerant")]
    player_stats: RawMatchPlayerStats,
    #[serde(default, deserialize_with = "lenient_number")]
    duration: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    utc_start_seconds: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMatchPlayerStats {
    #[serde(default, deserialize_with = "lenient_number")]
    kills: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    deaths: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    kd_ratio: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    damage_done: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    damage_taken: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    team_placement: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    gulag_kills: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    gulag_deaths: f64,
}

impl MatchesResponse {
    pub(crate) fn into_matches(self) -> Vec<Match> {
        self.data.matches.into_iter().map(RawMatch::into_match).collect()
    }
}

impl RawMatch {
    fn into_match(self) -> Match {
        let stats = self.player_stats;
        let gulag_result = if stats.gulag_kills > 0.0 {
            Some(GulagResult::Win)
        } else if stats.gulag_deaths > 0.0 {
            Some(GulagResult::Loss)
        } else {
            None
        };

        Match {
            match_id: self.match_id,
            mode: self.mode,
            map: self.map,
            placement: whole(stats.team_placement),
            kills: whole(stats.kills),
            deaths: whole(stats.deaths),
            kd_ratio: stats.kd_ratio,
            damage_dealt: whole(stats.damage_done),
            damage_taken: whole(stats.damage_taken),
            gulag_result,
            duration: whole(self.duration),
            match_time: start_time(self.utc_start_seconds),
        }
    }
}

fn start_time(seconds: f64) -> DateTime<Utc> {
    DateTime::from_timestamp(whole(seconds), 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
