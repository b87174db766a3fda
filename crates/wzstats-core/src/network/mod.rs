//! Transport-level helpers shared by the upstream client.

mod retry;

pub use retry::{retry_async, RetryConfig, RetryStats};
