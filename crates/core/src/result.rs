//! Analysis Result Model
//!
//! The structured signal every classifier produces and the persistence layer
//! stores. Constructors enforce the result invariants so no code path can
//! hand out a result with an urgent reason on a non-urgent sentiment (or the
//! other way round).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::vocabulary::{SentimentLevel, SmartTag};

/// Maximum summary length in characters.
pub const MAX_SUMMARY_CHARS: usize = 500;

/// Maximum urgent reason length in characters.
pub const MAX_URGENT_REASON_CHARS: usize = 300;

/// Confidence used when a classifier gives none (or garbage).
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Reason attached when something is urgent but nobody said why.
pub const GENERIC_URGENT_REASON: &str = "Severe allergy / medical concern detected";

/// Structured CRM signal derived from one reservation note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAnalysisResult")]
pub struct AnalysisResult {
    /// Tags drawn from the closed vocabulary. A set: unique, order-irrelevant.
    pub tags: BTreeSet<SmartTag>,
    pub sentiment: SentimentLevel,
    /// Always within `[0, 1]`.
    pub confidence: f64,
    pub summary: String,
    pub analyzed_at: DateTime<Utc>,
    /// Present iff `sentiment == Urgent`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgent_reason: Option<String>,
}

/// Unchecked shape used only for deserialization; normalized on the way in.
#[derive(Deserialize)]
struct RawAnalysisResult {
    #[serde(default)]
    tags: BTreeSet<SmartTag>,
    #[serde(default)]
    sentiment: SentimentLevel,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    summary: String,
    #[serde(default = "Utc::now")]
    analyzed_at: DateTime<Utc>,
    #[serde(default)]
    urgent_reason: Option<String>,
}

impl From<RawAnalysisResult> for AnalysisResult {
    fn from(raw: RawAnalysisResult) -> Self {
        let mut result = AnalysisResult::new(
            raw.tags,
            raw.sentiment,
            normalize_confidence(raw.confidence),
            raw.summary,
            raw.urgent_reason,
        );
        result.analyzed_at = raw.analyzed_at;
        result
    }
}

impl AnalysisResult {
    /// Build a result, enforcing every invariant.
    ///
    /// Confidence is clamped, text fields are truncated, and the urgent reason
    /// is kept only for `Urgent` (an `Urgent` result without one gets
    /// [`GENERIC_URGENT_REASON`]). An `Urgent` result always carries
    /// [`SmartTag::Allergy`].
    pub fn new(
        tags: impl IntoIterator<Item = SmartTag>,
        sentiment: SentimentLevel,
        confidence: f64,
        summary: impl Into<String>,
        urgent_reason: Option<String>,
    ) -> Self {
        let urgent_reason = if sentiment.is_urgent() {
            let reason = urgent_reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| GENERIC_URGENT_REASON.to_string());
            Some(truncate_chars(&reason, MAX_URGENT_REASON_CHARS))
        } else {
            None
        };

        let mut tags: BTreeSet<SmartTag> = tags.into_iter().collect();
        if sentiment.is_urgent() {
            tags.insert(SmartTag::Allergy);
        }

        Self {
            tags,
            sentiment,
            confidence: normalize_confidence(Some(confidence)),
            summary: truncate_chars(summary.into().trim(), MAX_SUMMARY_CHARS),
            analyzed_at: Utc::now(),
            urgent_reason,
        }
    }

    /// Force this result to `Urgent` with the given reason.
    ///
    /// Only raises urgency. Adds [`SmartTag::Allergy`]; other tags, confidence
    /// and summary are untouched.
    pub fn escalate(mut self, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let reason = if reason.trim().is_empty() {
            GENERIC_URGENT_REASON.to_string()
        } else {
            reason
        };
        self.sentiment = SentimentLevel::Urgent;
        self.tags.insert(SmartTag::Allergy);
        self.urgent_reason = Some(truncate_chars(reason.trim(), MAX_URGENT_REASON_CHARS));
        self
    }

    /// Merge a newer analysis into this (stored) one.
    ///
    /// Tags accumulate; sentiment, confidence, summary, timestamp and urgent
    /// reason come from `latest`.
    pub fn merged_with(&self, latest: &AnalysisResult) -> AnalysisResult {
        let mut tags = self.tags.clone();
        tags.extend(latest.tags.iter().copied());
        AnalysisResult {
            tags,
            sentiment: latest.sentiment,
            confidence: latest.confidence,
            summary: latest.summary.clone(),
            analyzed_at: latest.analyzed_at,
            urgent_reason: latest.urgent_reason.clone(),
        }
    }

    pub fn is_urgent(&self) -> bool {
        self.sentiment.is_urgent()
    }

    pub fn has_tag(&self, tag: SmartTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Comma-separated tag wire names, in vocabulary order.
    pub fn tag_list(&self) -> String {
        self.tags
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Clamp a finite confidence into `[0, 1]`; missing or non-finite values
/// become [`DEFAULT_CONFIDENCE`].
pub fn normalize_confidence(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => DEFAULT_CONFIDENCE,
    }
}

/// Truncate to at most `max` characters on a char boundary.
pub fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((idx, _)) => value[..idx].to_string(),
        None => value.to_string(),
    }
}
