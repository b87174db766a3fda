//! Access to the upstream stats API.
//!
//! - `client`: authenticated requests, transport retries, credential rotation
//! - `classifier`: maps status codes and bodies onto the error taxonomy
//! - `credential`: the shared, atomically swapped session token
//! - `wire`: payload shapes and tolerant decoding

mod classifier;
mod client;
mod credential;
mod wire;

pub use classifier::{body_excerpt, classify_message, classify_response, classify_status};
pub use client::UpstreamClient;
pub use credential::Credential;
