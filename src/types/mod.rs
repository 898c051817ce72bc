//! Core Types
//!
//! Shared value objects and the unified error system.

pub mod api;
pub mod error;

pub use api::{
    BatchExplanationItem, BatchExplanationResponse, ExplanationResponse, MAX_TOPIC_CHARS,
    ParsedExplanation, ResponseMetadata, TestCase, TopicRequest,
};
pub use error::{
    ExplainError, MAX_EXPLANATION_WORDS, MIN_EXPLANATION_WORDS, Result, ValidationError,
};
