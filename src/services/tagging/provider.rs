//! Provider-Backed Classifier
//!
//! Sends one chat-completions request per attempt, bounded by a per-attempt
//! timeout and a fixed retry budget.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use smart_tagging_core::AnalysisResult;
use smart_tagging_llm::{LlmError, LlmProvider, Message};

use super::prompt::{parse_provider_output, system_prompt, user_message};
use super::{Classifier, ClassifierError};
use crate::models::settings::ProviderSettings;

/// Attempt budget for one classification.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Pause between attempts
    pub retry_delay: Duration,
    /// Hard bound on each attempt
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay: Duration::from_millis(250),
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&ProviderSettings> for RetryPolicy {
    fn from(settings: &ProviderSettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            retry_delay: Duration::from_millis(settings.retry_delay_ms),
            attempt_timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Classifier backed by an external LLM.
pub struct ProviderClassifier {
    provider: Arc<dyn LlmProvider>,
    policy: RetryPolicy,
    enabled: bool,
}

impl ProviderClassifier {
    pub fn new(provider: Arc<dyn LlmProvider>, policy: RetryPolicy, enabled: bool) -> Self {
        Self {
            provider,
            policy,
            enabled,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn attempt(&self, user: &str) -> Result<String, LlmError> {
        let call = self
            .provider
            .send_message(vec![Message::user(user)], Some(system_prompt()));

        let response = tokio::time::timeout(self.policy.attempt_timeout, call)
            .await
            .map_err(|_| LlmError::Timeout {
                seconds: self.policy.attempt_timeout.as_secs(),
            })??;

        response
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| LlmError::ParseError {
                message: "Empty completion".to_string(),
            })
    }
}

#[async_trait]
impl Classifier for ProviderClassifier {
    fn name(&self) -> &'static str {
        self.provider.name()
    }

    fn is_available(&self) -> bool {
        self.enabled && self.provider.config().has_api_key()
    }

    async fn classify(
        &self,
        special_request_text: &str,
        dietary_preferences: &str,
    ) -> Result<AnalysisResult, ClassifierError> {
        if !self.is_available() {
            return Err(ClassifierError::Unavailable(format!(
                "{} is disabled or has no API key",
                self.provider.name()
            )));
        }

        let user = user_message(special_request_text, dietary_preferences);
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            match self.attempt(&user).await {
                Ok(content) => {
                    return parse_provider_output(&content)
                        .map_err(ClassifierError::MalformedResponse);
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    tracing::debug!(
                        provider = self.provider.name(),
                        attempt,
                        max_attempts,
                        error = %e,
                        "Provider attempt failed, retrying"
                    );
                    attempt += 1;
                    tokio::time::sleep(self.policy.retry_delay).await;
                }
                Err(LlmError::ParseError { message }) => {
                    return Err(ClassifierError::MalformedResponse(message));
                }
                Err(e) => return Err(ClassifierError::Provider(e)),
            }
        }
    }

    async fn check_health(&self) -> Result<(), ClassifierError> {
        if !self.is_available() {
            return Err(ClassifierError::Unavailable(format!(
                "{} is disabled or has no API key",
                self.provider.name()
            )));
        }

        tokio::time::timeout(self.policy.attempt_timeout, self.provider.health_check())
            .await
            .map_err(|_| {
                ClassifierError::Provider(LlmError::Timeout {
                    seconds: self.policy.attempt_timeout.as_secs(),
                })
            })?
            .map_err(ClassifierError::Provider)
    }
}
