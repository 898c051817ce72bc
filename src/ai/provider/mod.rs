//! LLM Provider Abstraction
//!
//! Defines the `LlmProvider` trait shared by the Gemini and OpenAI adapters.
//! Both providers expose the same contract: a prompt plus generation
//! parameters in, a normalized `GenerationResult` out, and every transport or
//! provider-side failure collapsed into `ExplainError::Provider` carrying the
//! original message.
//!
//! Token accounting is best effort: when a provider response omits exact
//! counts, `TokenUsage::estimate` approximates them from whitespace word
//! counts scaled by a fixed factor. The numbers are an approximation, not a
//! guarantee.

mod gemini;
mod openai;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::config::Settings;
use crate::types::{ExplainError, Result};

/// Scaling factor applied to whitespace word counts when a provider does not
/// report exact token usage.
const TOKENS_PER_WORD: f64 = 1.3;

// =============================================================================
// Generation Request/Result
// =============================================================================

/// Parameters for one provider call.
///
/// Temperature and max_tokens are passed through unchanged; range validation
/// happens upstream in [`Settings::validate`](crate::config::Settings::validate)
/// before the process starts serving requests.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_message: Option<String>,
}

/// Token usage for one provider call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    /// Approximate usage from whitespace-delimited word counts.
    ///
    /// Used when the provider omits exact counts in its response.
    pub fn estimate(prompt: &str, completion: &str) -> Self {
        Self::new(estimate_tokens(prompt), estimate_tokens(completion))
    }
}

fn estimate_tokens(text: &str) -> u32 {
    (text.split_whitespace().count() as f64 * TOKENS_PER_WORD) as u32
}

/// Normalized result of one successful provider call.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub text: String,
    pub model: String,
    pub usage: TokenUsage,
    pub finish_reason: String,
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// Shared provider handle, constructed once at startup with validated
/// configuration and passed explicitly to request handlers.
pub type SharedProvider = Arc<dyn LlmProvider>;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for one request.
    ///
    /// One outbound network call, no retries. The per-call timeout is the
    /// reqwest client timeout set at construction.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult>;

    /// Provider name for logging and error context.
    fn name(&self) -> &str;

    /// Generate completions for a list of requests, strictly in order and
    /// one at a time.
    ///
    /// Failures are isolated per item: a failed call yields an `Err` entry at
    /// that position and processing continues, so the returned list always
    /// has the same length as the input and the batch never aborts.
    async fn generate_batch(
        &self,
        requests: &[GenerationRequest],
    ) -> Vec<Result<GenerationResult>> {
        let mut results = Vec::with_capacity(requests.len());
        for (i, request) in requests.iter().enumerate() {
            match self.generate(request).await {
                Ok(result) => {
                    info!(
                        "Batch completion {}/{} successful ({} tokens)",
                        i + 1,
                        requests.len(),
                        result.usage.total_tokens
                    );
                    results.push(Ok(result));
                }
                Err(err) => {
                    error!("Batch completion {}/{} failed: {}", i + 1, requests.len(), err);
                    results.push(Err(err));
                }
            }
        }
        results
    }
}

/// Create a provider from configuration.
///
/// The credential and HTTP client live for the life of the process; per-call
/// parameters (model, temperature, max_tokens) travel in each
/// [`GenerationRequest`].
pub fn create_provider(settings: &Settings) -> Result<SharedProvider> {
    match settings.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiProvider::new(settings)?)),
        "openai" => Ok(Arc::new(OpenAiProvider::new(settings)?)),
        other => Err(ExplainError::Config(format!(
            "Unknown provider: {}. Supported: gemini, openai",
            other
        ))),
    }
}

// =============================================================================
// Tests
// =============================================================================
