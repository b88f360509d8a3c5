//! Shared HTTP plumbing.

use reqwest::Client;
use std::time::Duration;

pub const USER_AGENT: &str = concat!("routeforge/", env!("CARGO_PKG_VERSION"));

/// Client with a request timeout. Falls back to a default client if the
/// builder fails (e.g. no TLS backend available).
pub fn build_client(timeout: Duration) -> Client {
    match Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            tracing::warn!("Failed to build HTTP client, using defaults: {}", err);
            Client::new()
        }
    }
}

/// Base URL without trailing slashes, so paths can be appended with `/`.
pub fn normalize_base(base_url: impl Into<String>) -> String {
    base_url.into().trim().trim_end_matches('/').to_string()
}
