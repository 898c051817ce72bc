//! Explainer - Topic Explanation Service
//!
//! A small backend service that accepts a topic string, forwards a
//! constructed prompt to an LLM provider, parses the resulting text as
//! structured JSON, and returns an explanation plus a test case.
//!
//! ## Pipeline
//!
//! topic request -> prompt string -> provider call -> raw text ->
//! validated structured result -> response object
//!
//! Nothing is persisted; every entity lives for one request. The provider
//! adapter is constructed once at startup with validated configuration and
//! injected into request handlers.
//!
//! ## Modules
//!
//! - [`ai`]: prompt construction, provider adapters, response validation
//! - [`config`]: environment-driven settings with startup validation
//! - [`server`]: axum router, CORS, request handlers
//! - [`types`]: request/response value objects and the error taxonomy

pub mod ai;
pub mod config;
pub mod server;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::Settings;

// Error Types
pub use types::error::{ExplainError, Result, ValidationError};

// AI Pipeline
pub use ai::{
    ComplexityLevel, GenerationRequest, GenerationResult, LlmProvider, SharedProvider, TokenUsage,
    build_prompt, create_provider, parse_explanation,
};

// Server
pub use server::{AppState, router, run};
