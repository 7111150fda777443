//! Rule-Based Classifier
//!
//! Deterministic keyword fallback. Matching runs on diacritic-stripped,
//! lower-cased text with word-boundary regexes compiled once.

use regex::Regex;
use std::sync::OnceLock;

use async_trait::async_trait;
use smart_tagging_core::text::{combine, normalize};
use smart_tagging_core::{AnalysisResult, SentimentLevel, SmartTag};

use super::{Classifier, ClassifierError};

/// Fixed confidence of every rule-based result.
pub const RULE_BASED_CONFIDENCE: f64 = 0.55;

/// Keyword patterns per tag. A tag fires when any of its patterns match.
const TAG_KEYWORDS: &[(SmartTag, &[&str])] = &[
    (SmartTag::Vip, &[r"\bvips?\b"]),
    (
        SmartTag::Celeb,
        &[r"\bceleb(?:s|rity|rities)?\b", r"\bfamous\b"],
    ),
    (
        SmartTag::FrequentVisitor,
        &[
            r"\bfrequent\w*",
            r"\bregulars? (?:guest|customer)s?\b",
            r"\bloyal\w*",
        ],
    ),
    (SmartTag::Birthday, &[r"\bbirthdays?\b", r"\bb-?days?\b"]),
    (SmartTag::Anniversary, &[r"\banniversar(?:y|ies)\b"]),
    (SmartTag::NoShow, &[r"\bno[- ]?shows?\b"]),
    (
        SmartTag::DietaryRestriction,
        &[
            r"\bvegan\b",
            r"\bvegetarian\b",
            r"\bhalal\b",
            r"\bkosher\b",
            r"\bgluten[- ]?free\b",
            r"\bpescatarian\b",
            r"\bdairy[- ]?free\b",
            r"\bketo\b",
        ],
    ),
    (
        SmartTag::Allergy,
        &[
            r"\ballerg\w*",
            r"\bnut[- ]?free\b",
            r"\blactose\b",
            r"\bceliac\b",
            r"\bintoleran\w*",
            r"\bepi-?pens?\b",
            r"\banaphyla\w*",
        ],
    ),
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    r"\bcomplain\w*",
    r"\bdisappoint\w*",
    r"\bunhappy\b",
    r"\bterrible\b",
    r"\brude\b",
    r"\bworst\b",
    r"\bangry\b",
    r"\bupset\b",
];

const POSITIVE_KEYWORDS: &[&str] = &[
    r"\bcelebrat\w*",
    r"\blove\b",
    r"\bexcited\b",
    r"\bwonderful\b",
    r"\bspecial\b",
    r"\bthank\w*",
    r"\bdelighted\b",
];

fn alternation(patterns: &[&str]) -> Option<Regex> {
    Regex::new(&format!("(?:{})", patterns.join("|"))).ok()
}

fn tag_patterns() -> &'static Vec<(SmartTag, Regex)> {
    static PATTERNS: OnceLock<Vec<(SmartTag, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        TAG_KEYWORDS
            .iter()
            .filter_map(|(tag, patterns)| alternation(patterns).map(|re| (*tag, re)))
            .collect()
    })
}

fn negative_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| alternation(NEGATIVE_KEYWORDS)).as_ref()
}

fn positive_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| alternation(POSITIVE_KEYWORDS)).as_ref()
}

/// Keyword classifier used when the provider cannot be.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedClassifier;

impl RuleBasedClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify without ever failing.
    ///
    /// Every matching tag is included. Sentiment is Negative when a negative
    /// keyword fires, else Positive on a positive keyword, else Neutral. Never
    /// Urgent; escalation belongs to the urgency override.
    pub fn analyze(&self, special_request_text: &str, dietary_preferences: &str) -> AnalysisResult {
        let text = normalize(&combine(special_request_text, dietary_preferences));

        let tags: Vec<SmartTag> = tag_patterns()
            .iter()
            .filter(|(_, re)| re.is_match(&text))
            .map(|(tag, _)| *tag)
            .collect();

        let sentiment = if negative_pattern().is_some_and(|re| re.is_match(&text)) {
            SentimentLevel::Negative
        } else if positive_pattern().is_some_and(|re| re.is_match(&text)) {
            SentimentLevel::Positive
        } else {
            SentimentLevel::Neutral
        };

        let summary = if tags.is_empty() {
            "Rule-based analysis (AI unavailable): no tags detected".to_string()
        } else {
            let names: Vec<&str> = tags.iter().map(|t| t.as_str()).collect();
            format!(
                "Rule-based analysis (AI unavailable): detected {}",
                names.join(", ")
            )
        };

        AnalysisResult::new(tags, sentiment, RULE_BASED_CONFIDENCE, summary, None)
    }
}

#[async_trait]
impl Classifier for RuleBasedClassifier {
    fn name(&self) -> &'static str {
        "rule-based"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn classify(
        &self,
        special_request_text: &str,
        dietary_preferences: &str,
    ) -> Result<AnalysisResult, ClassifierError> {
        Ok(self.analyze(special_request_text, dietary_preferences))
    }
}
