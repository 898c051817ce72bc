//! OpenAI API Provider
//!
//! Provider adapter for OpenAI's Chat Completions API. OpenAI reports exact
//! token counts in its `usage` block; the word-count estimate is only used
//! if that block is missing.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{GenerationRequest, GenerationResult, LlmProvider, TokenUsage};
use crate::config::Settings;
use crate::types::{ExplainError, Result};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const PROVIDER_NAME: &str = "openai";

/// OpenAI Chat Completions provider with secure API key handling.
pub struct OpenAiProvider {
    /// API key stored securely, never exposed in logs or debug output.
    api_key: SecretString,
    api_base: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl OpenAiProvider {
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

    fn build_request(&self, request: &GenerationRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);

        if let Some(system) = &request.system_message {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }

        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        ChatCompletionRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        info!(
            "Making OpenAI API call (model: {}, temperature: {})",
            request.model, request.temperature
        );

        let body = self.build_request(request);
        let url = format!("{}/chat/completions", self.api_base);

        debug!("Sending request to OpenAI API");

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
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

        let response_body: ChatCompletionResponse = response.json().await.map_err(|e| {
            ExplainError::provider(PROVIDER_NAME, format!("failed to parse response: {}", e))
        })?;

        let choice = response_body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ExplainError::provider(PROVIDER_NAME, "no choices in response"))?;

        let text = choice.message.content.ok_or_else(|| {
            ExplainError::provider(PROVIDER_NAME, "no content in response")
        })?;

        let usage = match response_body.usage {
            Some(u) => TokenUsage::new(u.prompt_tokens, u.completion_tokens),
            None => TokenUsage::estimate(&request.prompt, &text),
        };

        info!(
            "OpenAI API call successful. Tokens used: {}",
            usage.total_tokens
        );

        Ok(GenerationResult {
            text,
            model: request.model.clone(),
            usage,
            finish_reason: choice.finish_reason.unwrap_or_else(|| "stop".to_string()),
        })
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    prompt_tokens: u32,
    completion_tokens: u32,
}
