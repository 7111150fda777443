//! HTTP Client Factory
//!
//! Provides a factory function for building reqwest clients with a request timeout.

use std::time::Duration;

/// Build a `reqwest::Client` with an optional overall request timeout.
///
/// Falls back to a default client if the builder rejects the configuration.
pub fn build_http_client(timeout: Option<Duration>) -> reqwest::Client {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to build configured HTTP client, using defaults");
        reqwest::Client::new()
    })
}
