//! Unified Error Type System
//!
//! Centralized error types for the entire service.
//!
//! ## Error Taxonomy
//!
//! - **Config**: bad or missing credential, out-of-range generation
//!   parameter. Fatal at startup.
//! - **Provider**: transport or provider-side failure. Recovered per item in
//!   batch mode, surfaced as a server error in single-request mode.
//! - **Validation**: malformed or incomplete provider output. Always a
//!   client-facing unprocessable response, never a generic server error.
//! - **Request**: malformed incoming request (empty or overlong topic,
//!   oversized batch). Rejected before any provider call.
//!
//! No automatic retries exist anywhere in the service.

use thiserror::Error;

/// Bounds enforced on the parsed explanation, in whitespace-delimited words.
///
/// The prompt asks the model for 100-1000 words, but the validator has always
/// accepted a looser floor of 20. Kept as-is.
pub const MIN_EXPLANATION_WORDS: usize = 20;
pub const MAX_EXPLANATION_WORDS: usize = 1000;

#[derive(Debug, Error)]
pub enum ExplainError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    /// Transport or provider-side failure, normalized to a single kind
    /// carrying the original message.
    #[error("{provider} API error: {message}")]
    Provider { provider: String, message: String },

    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Malformed incoming request, rejected before any provider call.
    #[error("{0}")]
    Request(String),

    /// Batch exceeds the configured cap, rejected before any provider call.
    #[error("Maximum {cap} topics allowed per batch request, got {got}")]
    BatchTooLarge { cap: usize, got: usize },
}

impl ExplainError {
    /// Create a provider error with the provider name attached.
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExplainError>;

// =============================================================================
// Validation Error
// =============================================================================

/// Structured validation failure for provider output.
///
/// One variant per trigger condition so callers can distinguish failures by
/// discriminant instead of message text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No JSON object found anywhere in the response text.
    #[error("no JSON object found in response")]
    JsonNotFound,

    /// A brace-delimited span was found but is not syntactically valid JSON.
    #[error("invalid JSON in response: {0}")]
    JsonSyntax(String),

    /// A required top-level field is absent.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The test case object lacks one of its required fields.
    #[error("missing required test case field: {0}")]
    MissingTestCaseField(&'static str),

    #[error("explanation is too short: {words} words (minimum 20)")]
    ExplanationTooShort { words: usize },

    #[error("explanation is too long: {words} words (maximum 1000)")]
    ExplanationTooLong { words: usize },
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = ExplainError::provider("gemini", "connection refused");
        assert_eq!(err.to_string(), "gemini API error: connection refused");
    }

    #[test]
    fn test_batch_too_large_message() {
        let err = ExplainError::BatchTooLarge { cap: 10, got: 11 };
        assert!(err.to_string().contains("Maximum 10 topics"));
    }

    #[test]
    fn test_validation_error_discriminants() {
        assert_ne!(
            ValidationError::MissingField("explanation"),
            ValidationError::MissingField("test_case")
        );
        assert_eq!(
            ValidationError::ExplanationTooShort { words: 5 }.to_string(),
            "explanation is too short: 5 words (minimum 20)"
        );
    }

    #[test]
    fn test_validation_error_converts_to_explain_error() {
        let err: ExplainError = ValidationError::JsonNotFound.into();
        assert!(matches!(err, ExplainError::Validation(_)));
    }
}
