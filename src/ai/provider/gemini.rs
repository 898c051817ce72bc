//! Gemini API Provider
//!
//! Provider adapter for Google's Generative Language REST API
//! (`models/{model}:generateContent`).
//!
//! Gemini does not always report exact token counts; when `usageMetadata` is
//! absent the adapter falls back to the word-count estimate in
//! [`TokenUsage::estimate`]. Callers must treat usage as approximate.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{GenerationRequest, GenerationResult, LlmProvider, TokenUsage};
use crate::config::Settings;
use crate::types::{ExplainError, Result};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const PROVIDER_NAME: &str = "gemini";

/// Gemini REST provider with secure API key handling.
pub struct GeminiProvider {
    /// API key stored securely, never exposed in logs or debug output.
    api_key: SecretString,
    api_base: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| {
                ExplainError::provider(PROVIDER_NAME, format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            api_key: SecretString::from(settings.api_key.clone()),
            api_base: DEFAULT_API_BASE.to_string(),
            client,
        })
    }

    fn build_request(&self, request: &GenerationRequest) -> GenerateContentRequest {
        // The generateContent endpoint has no system role in this shape, so a
        // system message is folded into the prompt text.
        let full_prompt = match &request.system_message {
            Some(system) => format!("System: {}\n\nUser: {}", system, request.prompt),
            None => request.prompt.clone(),
        };

        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: full_prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        info!(
            "Making Gemini API call (model: {}, temperature: {})",
            request.model, request.temperature
        );

        let body = self.build_request(request);
        let url = format!("{}/models/{}:generateContent", self.api_base, request.model);

        debug!("Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ExplainError::provider(PROVIDER_NAME, format!("request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(ExplainError::provider(
                PROVIDER_NAME,
                format!("API error ({}): {}", status, detail),
            ));
        }

        let response_body: GenerateContentResponse = response.json().await.map_err(|e| {
            ExplainError::provider(PROVIDER_NAME, format!("failed to parse response: {}", e))
        })?;

        let candidate = response_body.candidates.into_iter().next().ok_or_else(|| {
            ExplainError::provider(PROVIDER_NAME, "no candidates in response")
        })?;

        let text: String = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect();

        if text.is_empty() {
            return Err(ExplainError::provider(
                PROVIDER_NAME,
                "empty text in response",
            ));
        }

        let usage = match response_body.usage_metadata {
            Some(meta) => TokenUsage::new(meta.prompt_token_count, meta.candidates_token_count),
            // Approximation: word counts scaled by a fixed factor.
            None => TokenUsage::estimate(&body.contents[0].parts[0].text, &text),
        };

        info!(
            "Gemini API call successful. Tokens used: {}",
            usage.total_tokens
        );

        Ok(GenerationResult {
            text,
            model: request.model.clone(),
            usage,
            finish_reason: candidate
                .finish_reason
                .unwrap_or_else(|| "stop".to_string())
                .to_lowercase(),
        })
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u32,
}
