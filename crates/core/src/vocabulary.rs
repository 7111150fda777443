//! Tag Vocabulary
//!
//! The closed set of smart tags and sentiment levels every classifier must
//! produce. Wire names are a fixed contract with downstream consumers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// One categorical CRM label from the fixed eight-tag vocabulary.
///
/// Ordering follows declaration order so tag sets serialize deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SmartTag {
    #[serde(rename = "VIP")]
    Vip,
    #[serde(rename = "Celeb")]
    Celeb,
    #[serde(rename = "frequent-visitor")]
    FrequentVisitor,
    #[serde(rename = "Birthday")]
    Birthday,
    #[serde(rename = "Anniversary")]
    Anniversary,
    #[serde(rename = "No-show")]
    NoShow,
    #[serde(rename = "Dietary-restriction")]
    DietaryRestriction,
    #[serde(rename = "Allergy")]
    Allergy,
}

/// Presentation grouping for tags. Not used for any decision in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagCategory {
    Status,
    Milestone,
    Behavioral,
    Health,
}

impl SmartTag {
    /// Every tag in the vocabulary, in wire order.
    pub const ALL: [SmartTag; 8] = [
        SmartTag::Vip,
        SmartTag::Celeb,
        SmartTag::FrequentVisitor,
        SmartTag::Birthday,
        SmartTag::Anniversary,
        SmartTag::NoShow,
        SmartTag::DietaryRestriction,
        SmartTag::Allergy,
    ];

    /// The exact wire name of this tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            SmartTag::Vip => "VIP",
            SmartTag::Celeb => "Celeb",
            SmartTag::FrequentVisitor => "frequent-visitor",
            SmartTag::Birthday => "Birthday",
            SmartTag::Anniversary => "Anniversary",
            SmartTag::NoShow => "No-show",
            SmartTag::DietaryRestriction => "Dietary-restriction",
            SmartTag::Allergy => "Allergy",
        }
    }

    /// The presentation category this tag belongs to.
    pub fn category(&self) -> TagCategory {
        match self {
            SmartTag::Vip | SmartTag::Celeb => TagCategory::Status,
            SmartTag::Birthday | SmartTag::Anniversary => TagCategory::Milestone,
            SmartTag::FrequentVisitor | SmartTag::NoShow => TagCategory::Behavioral,
            SmartTag::DietaryRestriction | SmartTag::Allergy => TagCategory::Health,
        }
    }

    /// Lenient lookup used when sanitizing model output.
    ///
    /// Case-insensitive; spaces and underscores are treated as hyphens and
    /// plural spellings (`allergies`, `No shows`) are accepted. Returns `None`
    /// for anything outside the vocabulary.
    pub fn from_label(label: &str) -> Option<Self> {
        let key: String = label
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '_' { '-' } else { c })
            .collect();

        match key.as_str() {
            "vip" => Some(SmartTag::Vip),
            "celeb" | "celebs" | "celebrity" => Some(SmartTag::Celeb),
            "frequent-visitor" | "frequent-visitors" => Some(SmartTag::FrequentVisitor),
            "birthday" | "birthdays" => Some(SmartTag::Birthday),
            "anniversary" | "anniversaries" => Some(SmartTag::Anniversary),
            "no-show" | "no-shows" | "noshow" => Some(SmartTag::NoShow),
            "dietary-restriction" | "dietary-restrictions" => Some(SmartTag::DietaryRestriction),
            "allergy" | "allergies" => Some(SmartTag::Allergy),
            _ => None,
        }
    }
}

impl fmt::Display for SmartTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SmartTag {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SmartTag::from_label(s).ok_or_else(|| CoreError::parse(format!("unknown tag: {}", s)))
    }
}

impl fmt::Display for TagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagCategory::Status => write!(f, "Status"),
            TagCategory::Milestone => write!(f, "Milestone"),
            TagCategory::Behavioral => write!(f, "Behavioral"),
            TagCategory::Health => write!(f, "Health"),
        }
    }
}

/// Overall sentiment/urgency of a reservation note.
///
/// Ordered `Neutral < Positive < Negative < Urgent`. `Urgent` is the override
/// level and is never downgraded within one analysis.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum SentimentLevel {
    #[default]
    Neutral,
    Positive,
    Negative,
    Urgent,
}

impl SentimentLevel {
    /// Wire name of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLevel::Neutral => "Neutral",
            SentimentLevel::Positive => "Positive",
            SentimentLevel::Negative => "Negative",
            SentimentLevel::Urgent => "Urgent",
        }
    }

    pub fn is_urgent(&self) -> bool {
        matches!(self, SentimentLevel::Urgent)
    }

    /// Coerce a free-form label into the nearest level.
    ///
    /// Exact names match case-insensitively, then common prefixes
    /// (`pos`, `neg`, `urg`). Anything unrecognized is `Neutral`.
    pub fn coerce(raw: &str) -> Self {
        let value = raw.trim().to_lowercase();
        if value.starts_with("urg") {
            SentimentLevel::Urgent
        } else if value.starts_with("neg") {
            SentimentLevel::Negative
        } else if value.starts_with("pos") {
            SentimentLevel::Positive
        } else {
            SentimentLevel::Neutral
        }
    }
}

impl fmt::Display for SentimentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
