//! Smart Tagging Core
//!
//! Vocabulary and result model for the Smart Tagging workspace. This crate has
//! no dependency on storage, HTTP, or LLM providers.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `vocabulary` - The closed tag set (`SmartTag`, `TagCategory`) and `SentimentLevel`
//! - `result` - `AnalysisResult` and its invariants
//! - `text` - Diacritic-insensitive normalization for keyword matching

pub mod error;
pub mod result;
pub mod text;
pub mod vocabulary;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Result Model ───────────────────────────────────────────────────────
pub use result::{
    normalize_confidence, truncate_chars, AnalysisResult, DEFAULT_CONFIDENCE,
    GENERIC_URGENT_REASON, MAX_SUMMARY_CHARS, MAX_URGENT_REASON_CHARS,
};

// ── Vocabulary ─────────────────────────────────────────────────────────
pub use vocabulary::{SentimentLevel, SmartTag, TagCategory};
