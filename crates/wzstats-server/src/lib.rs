//! HTTP API for Warzone player stats.
//!
//! Serves player stats and recent matches from a [`wzstats_core::CachingClient`],
//! annotating each response with where the data came from.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use error::ApiError;
pub use middleware::RateLimitState;
pub use server::{build_router, serve, shutdown_signal, AppState, RouterOptions};
