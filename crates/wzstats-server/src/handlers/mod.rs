//! HTTP handlers, split by resource.

pub mod admin;
pub mod health;
pub mod matches;
pub mod players;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use wzstats_core::Lookup;

pub const CACHE_HEADER: &str = "x-cache";
pub const DATA_AGE_HEADER: &str = "x-data-age";

/// JSON body plus `X-Cache` / `X-Data-Age` describing where it came from.
pub(crate) fn cached_json<T, B>(lookup: &Lookup<T>, body: B) -> Response
where
    B: Serialize,
{
    (
        [
            (CACHE_HEADER, lookup.outcome.as_str().to_string()),
            (DATA_AGE_HEADER, lookup.age_seconds.to_string()),
        ],
        Json(body),
    )
        .into_response()
}
