//! Core Error Types
//!
//! Defines the foundational error types used across the Smart Tagging workspace.
//! These error types are dependency-light (only thiserror + serde_json) to keep
//! the core crate small.
//!
//! The main application crate extends these with additional error variants
//! (e.g., Database, Sqlite, Conflict) that require heavier dependencies.

use thiserror::Error;

/// Core error type for the Smart Tagging workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Parse errors (unknown tag or sentiment values)
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

/// Convert CoreError to a string
impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::parse("unknown tag: Regular");
        assert_eq!(err.to_string(), "Parse error: unknown tag: Regular");
    }

    #[test]
    fn test_error_conversion() {
        let err = CoreError::validation("text is empty");
        let msg: String = err.into();
        assert!(msg.contains("Validation error"));
    }

    #[test]
    fn test_serde_error_conversion() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let core_err: CoreError = serde_err.into();
        assert!(matches!(core_err, CoreError::Serialization(_)));
    }
}
