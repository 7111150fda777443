//! Settings Models
//!
//! Application configuration: provider, notification channels, persistence,
//! and the debug toggle. Secrets are never serialized.

use serde::{Deserialize, Serialize};
use smart_tagging_llm::{ProviderConfig, ProviderType};

/// Application configuration stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// AI provider used by the classification engine
    #[serde(default)]
    pub provider: ProviderSettings,
    /// Out-of-band alert channels
    #[serde(default)]
    pub notifications: NotificationSettings,
    /// Storage settings
    #[serde(default)]
    pub persistence: PersistenceSettings,
    /// Enable debug logging
    #[serde(default)]
    pub debug: bool,
}

/// AI provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Disable to force the rule-based classifier
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub provider: ProviderType,
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,
    /// Chat-completions URL override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-attempt timeout
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
    /// Retries after the first attempt
    #[serde(default = "default_provider_retries")]
    pub max_retries: u32,
    /// Fixed pause between attempts
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_true() -> bool {
    true
}

fn default_model() -> String {
    "llama-3.1-70b-versatile".to_string()
}

fn default_provider_timeout() -> u64 {
    30
}

fn default_provider_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    250
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    512
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: ProviderType::Groq,
            api_key: None,
            base_url: None,
            model: default_model(),
            timeout_secs: default_provider_timeout(),
            max_retries: default_provider_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl ProviderSettings {
    /// Build the provider-level config consumed by the LLM crate.
    pub fn to_provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider,
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout_secs: self.timeout_secs,
            json_mode: true,
        }
    }

    /// Enabled and holding a non-blank API key.
    pub fn is_configured(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Notification channel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// WhatsApp messaging API endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_api_url: Option<String>,
    #[serde(skip_serializing, default)]
    pub whatsapp_api_token: Option<String>,
    /// Transactional email API endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_api_url: Option<String>,
    #[serde(skip_serializing, default)]
    pub email_api_token: Option<String>,
    #[serde(default = "default_email_from")]
    pub email_from: String,
    /// Per-attempt timeout for each channel
    #[serde(default = "default_notification_timeout")]
    pub timeout_secs: u64,
    /// Retries after the first attempt, per channel
    #[serde(default = "default_notification_retries")]
    pub max_retries: u32,
    /// Fixed pause between attempts on one channel
    #[serde(default = "default_notification_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_email_from() -> String {
    "noreply@emenutables.com".to_string()
}

fn default_notification_timeout() -> u64 {
    10
}

fn default_notification_retries() -> u32 {
    1
}

fn default_notification_retry_delay_ms() -> u64 {
    200
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            whatsapp_api_url: None,
            whatsapp_api_token: None,
            email_api_url: None,
            email_api_token: None,
            email_from: default_email_from(),
            timeout_secs: default_notification_timeout(),
            max_retries: default_notification_retries(),
            retry_delay_ms: default_notification_retry_delay_ms(),
        }
    }
}

/// Persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceSettings {
    /// SQLite file; defaults to ~/.smart-tagging/data.db
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
    /// Optimistic-concurrency attempts per commit
    #[serde(default = "default_commit_attempts")]
    pub max_commit_attempts: u32,
}

fn default_commit_attempts() -> u32 {
    5
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            database_path: None,
            max_commit_attempts: default_commit_attempts(),
        }
    }
}

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "SMART_TAGGING_";

impl AppConfig {
    /// Apply environment overrides using the given lookup.
    ///
    /// Unparseable numeric/boolean values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(&format!("{}{}", ENV_PREFIX, name)).filter(|v| !v.trim().is_empty())
        };

        if let Some(v) = get("API_KEY") {
            self.provider.api_key = Some(v);
        }
        if let Some(v) = get("BASE_URL") {
            self.provider.base_url = Some(v);
        }
        if let Some(v) = get("MODEL") {
            self.provider.model = v;
        }
        if let Some(v) = get("TIMEOUT_SECS").and_then(|v| v.trim().parse().ok()) {
            self.provider.timeout_secs = v;
        }
        if let Some(v) = get("MAX_RETRIES").and_then(|v| v.trim().parse().ok()) {
            self.provider.max_retries = v;
        }
        if let Some(v) = get("WHATSAPP_API_URL") {
            self.notifications.whatsapp_api_url = Some(v);
        }
        if let Some(v) = get("WHATSAPP_API_TOKEN") {
            self.notifications.whatsapp_api_token = Some(v);
        }
        if let Some(v) = get("EMAIL_API_URL") {
            self.notifications.email_api_url = Some(v);
        }
        if let Some(v) = get("EMAIL_API_TOKEN") {
            self.notifications.email_api_token = Some(v);
        }
        if let Some(v) = get("EMAIL_FROM") {
            self.notifications.email_from = v;
        }
        if let Some(v) = get("DATABASE_PATH") {
            self.persistence.database_path = Some(v);
        }
        if let Some(v) = get("DEBUG").and_then(|v| parse_bool(&v)) {
            self.debug = v;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.provider.timeout_secs == 0 {
            return Err("provider.timeout_secs must be at least 1".to_string());
        }
        if self.provider.max_retries > 10 {
            return Err("provider.max_retries cannot exceed 10".to_string());
        }
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(format!(
                "Invalid provider.temperature: {}. Must be between 0 and 2",
                self.provider.temperature
            ));
        }
        if self.provider.model.trim().is_empty() {
            return Err("provider.model cannot be empty".to_string());
        }
        if self.notifications.timeout_secs == 0 {
            return Err("notifications.timeout_secs must be at least 1".to_string());
        }
        if self.notifications.max_retries > 10 {
            return Err("notifications.max_retries cannot exceed 10".to_string());
        }
        if self.persistence.max_commit_attempts == 0 {
            return Err("persistence.max_commit_attempts must be at least 1".to_string());
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
