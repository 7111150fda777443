//! Urgency Override
//!
//! Safety scan that runs after classification. A high-risk phrase anywhere in
//! the reservation text forces `Urgent`, whatever the classifier said. It can
//! only raise urgency.

use regex::Regex;
use std::sync::OnceLock;

use smart_tagging_core::text::{combine, normalize};
use smart_tagging_core::AnalysisResult;

/// High-risk phrases, matched on normalized text.
const URGENT_PATTERNS: &[&str] = &[
    r"\banaphyla\w*",
    r"\bepi-?pens?\b",
    r"\blife[- ]threatening\b",
    r"\bsevere allerg\w*",
    r"\bfatal allerg\w*",
    r"\bdeadly allerg\w*",
    r"\ballergic shock\b",
    r"\bcannot breathe\b",
    r"\bthroat swell\w*",
    r"\bemergenc\w*",
    r"\bmedical alert\b",
    r"\bceliac disease\b",
];

fn urgent_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        URGENT_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect()
    })
}

/// Find the first high-risk phrase in `text`.
///
/// Earliest position wins; on a tie the longer match wins. Returns the matched
/// phrase as it appears in the normalized text.
pub fn detect_urgent_keyword(text: &str) -> Option<String> {
    let normalized = normalize(text);

    urgent_patterns()
        .iter()
        .filter_map(|re| re.find(&normalized))
        .min_by_key(|m| (m.start(), std::cmp::Reverse(m.len())))
        .map(|m| m.as_str().to_string())
}

/// Human-readable reason naming the matched phrase.
pub fn urgent_reason_for(phrase: &str) -> String {
    format!("Detected urgent keyword: '{}'", phrase)
}

/// Apply the override to a provisional result.
///
/// A match forces `Urgent` with a reason naming the phrase and adds the
/// `Allergy` tag. Without a match
/// the provisional result is returned unchanged (an `Urgent` one stays
/// `Urgent`).
pub fn override_urgency(text: &str, provisional: AnalysisResult) -> AnalysisResult {
    match detect_urgent_keyword(text) {
        Some(phrase) => {
            if !provisional.is_urgent() {
                tracing::info!(
                    phrase = %phrase,
                    from = %provisional.sentiment,
                    "Urgency override raised sentiment to Urgent"
                );
            }
            provisional.escalate(urgent_reason_for(&phrase))
        }
        None => provisional,
    }
}

/// Override using both reservation text fields.
pub fn override_reservation(
    special_request_text: &str,
    dietary_preferences: &str,
    provisional: AnalysisResult,
) -> AnalysisResult {
    override_urgency(
        &combine(special_request_text, dietary_preferences),
        provisional,
    )
}
