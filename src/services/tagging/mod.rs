//! Tagging Services
//!
//! Two interchangeable classifiers behind one [`Classifier`] contract:
//!
//! - `ProviderClassifier` calls an OpenAI-compatible chat-completions API.
//! - `RuleBasedClassifier` is the deterministic keyword fallback.
//!
//! `ClassificationEngine` picks one per call and never fails.

pub mod engine;
pub mod prompt;
pub mod provider;
pub mod rule_based;

use async_trait::async_trait;
use smart_tagging_core::AnalysisResult;
use smart_tagging_llm::LlmError;
use thiserror::Error;

pub use engine::{Classification, ClassificationEngine, ClassificationSource};
pub use provider::{ProviderClassifier, RetryPolicy};
pub use rule_based::{RuleBasedClassifier, RULE_BASED_CONFIDENCE};

/// Why a classifier could not produce a result.
#[derive(Debug, Clone, Error)]
pub enum ClassifierError {
    /// Disabled or missing credentials; no call was made
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    /// The provider call failed (after retries, if retryable)
    #[error("Provider error: {0}")]
    Provider(LlmError),

    /// The provider answered but the payload was not usable
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Produces an [`AnalysisResult`] from the two reservation text fields.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Whether a call could be attempted right now.
    fn is_available(&self) -> bool;

    /// Classify one reservation note.
    async fn classify(
        &self,
        special_request_text: &str,
        dietary_preferences: &str,
    ) -> Result<AnalysisResult, ClassifierError>;

    /// Verify the backing service answers. Local classifiers are always up.
    async fn check_health(&self) -> Result<(), ClassifierError> {
        Ok(())
    }
}
