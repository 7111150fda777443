//! Classification Engine
//!
//! Chooses between the provider-backed classifier and the rule-based
//! fallback for each call. Outputs are never mixed within one call.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smart_tagging_core::AnalysisResult;
use tracing::{debug, warn};

use super::rule_based::RuleBasedClassifier;
use super::{Classifier, ClassifierError};

/// Which strategy produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    Provider,
    RuleBased,
}

impl std::fmt::Display for ClassificationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassificationSource::Provider => write!(f, "provider"),
            ClassificationSource::RuleBased => write!(f, "rule_based"),
        }
    }
}

/// Engine output
#[derive(Debug, Clone)]
pub struct Classification {
    pub result: AnalysisResult,
    pub source: ClassificationSource,
    /// Set when the provider was tried and failed
    pub fallback_reason: Option<String>,
}

/// Dual-strategy classifier that always returns a well-formed result.
pub struct ClassificationEngine {
    primary: Option<Arc<dyn Classifier>>,
    fallback: RuleBasedClassifier,
}

impl ClassificationEngine {
    pub fn new(primary: Arc<dyn Classifier>) -> Self {
        Self {
            primary: Some(primary),
            fallback: RuleBasedClassifier::new(),
        }
    }

    /// Engine with no provider; every call uses the keyword fallback.
    pub fn rule_based_only() -> Self {
        Self {
            primary: None,
            fallback: RuleBasedClassifier::new(),
        }
    }

    /// Provider health at call time.
    pub fn provider_available(&self) -> bool {
        self.primary.as_ref().is_some_and(|p| p.is_available())
    }

    /// Whether the configured provider answers a health check.
    ///
    /// `None` when no provider is configured.
    pub async fn provider_reachable(&self) -> Option<bool> {
        let primary = self.primary.as_ref().filter(|p| p.is_available())?;
        match primary.check_health().await {
            Ok(()) => Some(true),
            Err(e) => {
                warn!(
                    classifier = primary.name(),
                    error = %e,
                    "Provider health check failed"
                );
                Some(false)
            }
        }
    }

    /// Classify one reservation note. Never fails.
    pub async fn classify(
        &self,
        special_request_text: &str,
        dietary_preferences: &str,
    ) -> Classification {
        let primary = match self.primary.as_ref().filter(|p| p.is_available()) {
            Some(primary) => primary,
            None => {
                debug!("Provider unavailable, using rule-based classifier");
                return self.fallback_result(special_request_text, dietary_preferences, None);
            }
        };

        match primary
            .classify(special_request_text, dietary_preferences)
            .await
        {
            Ok(result) => Classification {
                result,
                source: ClassificationSource::Provider,
                fallback_reason: None,
            },
            Err(e) => {
                warn!(
                    classifier = primary.name(),
                    error = %e,
                    "Provider classification failed, degrading to rule-based"
                );
                self.fallback_result(special_request_text, dietary_preferences, Some(e))
            }
        }
    }

    fn fallback_result(
        &self,
        special_request_text: &str,
        dietary_preferences: &str,
        error: Option<ClassifierError>,
    ) -> Classification {
        Classification {
            result: self.fallback.analyze(special_request_text, dietary_preferences),
            source: ClassificationSource::RuleBased,
            fallback_reason: error.map(|e| e.to_string()),
        }
    }
}
