//! HTTP Request/Response Value Objects
//!
//! All entities are transient and per-request; nothing is persisted and no
//! entity outlives a single call.

use serde::{Deserialize, Serialize};

/// Maximum accepted topic length in characters.
pub const MAX_TOPIC_CHARS: usize = 500;

/// Incoming request for a single topic explanation.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicRequest {
    /// The topic to explain, 1-500 characters.
    pub topic: String,

    /// Complexity level: beginner, intermediate, or advanced.
    /// Unrecognized values fall back to intermediate in the prompt builder.
    #[serde(default = "default_complexity_level")]
    pub complexity_level: String,

    /// Whether to ask for practical examples.
    #[serde(default = "default_include_examples")]
    pub include_examples: bool,
}

fn default_complexity_level() -> String {
    "intermediate".to_string()
}

fn default_include_examples() -> bool {
    true
}

/// Test case accompanying an explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
    pub description: String,
}

/// Validated structured output extracted from raw provider text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedExplanation {
    pub explanation: String,
    pub test_case: TestCase,
}

/// Diagnostic fields attached to every successful explanation.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseMetadata {
    pub prompt_length: usize,
    pub response_length: usize,
    pub model_used: String,
    pub processing_successful: bool,
    pub tokens_used: u32,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Successful response for a single topic.
#[derive(Debug, Clone, Serialize)]
pub struct ExplanationResponse {
    pub topic: String,
    pub explanation: String,
    pub test_case: TestCase,
    pub complexity_level: String,
    pub metadata: ResponseMetadata,
}

/// One entry in a batch response. Failed items carry the error message
/// inline with `tokens_used` reported as 0; the batch itself never aborts.
#[derive(Debug, Clone, Serialize)]
pub struct BatchExplanationItem {
    pub topic: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_case: Option<TestCase>,
    pub complexity_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub tokens_used: u32,
}

/// Response for a batch of topics, one item per input in the same order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchExplanationResponse {
    pub results: Vec<BatchExplanationItem>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}
