//! Response Models

use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
    pub database: bool,
    /// AI provider enabled with credentials; otherwise rule-based only
    pub provider_configured: bool,
    /// Result of a live provider check; absent when not configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_reachable: Option<bool>,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            service: "smart-tagging".to_string(),
            database: false,
            provider_configured: false,
            provider_reachable: None,
        }
    }
}
