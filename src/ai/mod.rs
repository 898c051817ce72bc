//! LLM Pipeline
//!
//! The prompt-to-validated-result pipeline: prompt construction, provider
//! adapters, and response validation. Data flows one direction:
//! topic -> prompt string -> provider call -> raw text -> validated result.

pub mod prompt;
pub mod provider;
pub mod validation;

pub use prompt::{ComplexityLevel, SYSTEM_MESSAGE, build_prompt};
pub use provider::{
    GeminiProvider, GenerationRequest, GenerationResult, LlmProvider, OpenAiProvider,
    SharedProvider, TokenUsage, create_provider,
};
pub use validation::parse_explanation;
