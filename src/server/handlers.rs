//! Request Handlers
//!
//! Each explanation request runs one sequential chain: shape checks, prompt
//! construction, provider call, response validation. The batch path loops the
//! same chain per topic with per-item failure isolation.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tracing::{error, info};

use super::AppState;
use crate::ai::{ComplexityLevel, GenerationRequest, GenerationResult, SYSTEM_MESSAGE};
use crate::ai::{build_prompt, parse_explanation};
use crate::types::{
    BatchExplanationItem, BatchExplanationResponse, ExplainError, ExplanationResponse,
    MAX_TOPIC_CHARS, ResponseMetadata, TopicRequest,
};

const SERVICE_NAME: &str = "Topic Explanation Service";

// =============================================================================
// Error Mapping
// =============================================================================

/// Client-facing error with a FastAPI-style `detail` body.
///
/// Mapping policy: validation failures are client-correctable (422), shape
/// faults are rejected up front (422, or 400 for an oversized batch), and
/// everything else is a generic server error (500).
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl From<ExplainError> for ApiError {
    fn from(err: ExplainError) -> Self {
        match &err {
            ExplainError::Validation(cause) => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Response validation error: {}", cause),
            ),
            ExplainError::Request(_) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            ExplainError::BatchTooLarge { .. } => {
                Self::new(StatusCode::BAD_REQUEST, err.to_string())
            }
            _ => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal server error: {}", err),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

// =============================================================================
// Liveness Endpoints
// =============================================================================

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": format!("{} is running", SERVICE_NAME),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "provider": state.provider.name(),
    }))
}

// =============================================================================
// Explanation Endpoints
// =============================================================================

/// `POST /explain-topic`: generate an explanation and test case for a topic.
pub async fn explain_topic(
    State(state): State<AppState>,
    Json(request): Json<TopicRequest>,
) -> Result<Json<ExplanationResponse>, ApiError> {
    validate_topic(&request.topic)?;

    let prompt = build_prompt(
        &request.topic,
        ComplexityLevel::parse(&request.complexity_level),
        request.include_examples,
    );
    let generation = generation_request(&state, prompt);

    let result = state.provider.generate(&generation).await.map_err(|err| {
        error!("Provider call failed for topic '{}': {}", request.topic, err);
        ApiError::from(err)
    })?;

    let parsed = parse_explanation(&result.text).map_err(|err| {
        error!(
            "Response validation error for topic '{}': {}",
            request.topic, err
        );
        ApiError::from(ExplainError::from(err))
    })?;

    info!("Successfully processed topic: {}", request.topic);

    Ok(Json(ExplanationResponse {
        topic: request.topic,
        explanation: parsed.explanation,
        test_case: parsed.test_case,
        complexity_level: request.complexity_level,
        metadata: metadata(&generation.prompt, &result),
    }))
}

/// `POST /batch-explain`: generate explanations for up to the configured
/// maximum number of topics.
///
/// Shape checks (batch cap, per-topic length) run before any provider call.
/// Provider and validation failures are reported inline per item with
/// `tokens_used` of 0; the batch itself always completes.
pub async fn batch_explain(
    State(state): State<AppState>,
    Json(requests): Json<Vec<TopicRequest>>,
) -> Result<Json<BatchExplanationResponse>, ApiError> {
    let cap = state.settings.max_batch_size;
    if requests.len() > cap {
        return Err(ExplainError::BatchTooLarge {
            cap,
            got: requests.len(),
        }
        .into());
    }

    for request in &requests {
        validate_topic(&request.topic)?;
    }

    let generations: Vec<GenerationRequest> = requests
        .iter()
        .map(|request| {
            generation_request(
                &state,
                build_prompt(
                    &request.topic,
                    ComplexityLevel::parse(&request.complexity_level),
                    request.include_examples,
                ),
            )
        })
        .collect();

    let outcomes = state.provider.generate_batch(&generations).await;

    let results: Vec<BatchExplanationItem> = requests
        .into_iter()
        .zip(outcomes)
        .map(|(request, outcome)| batch_item(request, outcome))
        .collect();

    let succeeded = results.iter().filter(|r| r.success).count();
    let failed = results.len() - succeeded;
    info!(
        "Batch processed: {} succeeded, {} failed of {}",
        succeeded,
        failed,
        results.len()
    );

    Ok(Json(BatchExplanationResponse {
        total: results.len(),
        succeeded,
        failed,
        results,
    }))
}

// =============================================================================
// Helpers
// =============================================================================

fn validate_topic(topic: &str) -> Result<(), ApiError> {
    if topic.is_empty() {
        return Err(ExplainError::Request("topic must not be empty".to_string()).into());
    }
    let chars = topic.chars().count();
    if chars > MAX_TOPIC_CHARS {
        return Err(ExplainError::Request(format!(
            "topic must be at most {} characters, got {}",
            MAX_TOPIC_CHARS, chars
        ))
        .into());
    }
    Ok(())
}

fn generation_request(state: &AppState, prompt: String) -> GenerationRequest {
    GenerationRequest {
        prompt,
        model: state.settings.model.clone(),
        temperature: state.settings.temperature,
        max_tokens: state.settings.max_tokens,
        system_message: Some(SYSTEM_MESSAGE.to_string()),
    }
}

fn metadata(prompt: &str, result: &GenerationResult) -> ResponseMetadata {
    ResponseMetadata {
        prompt_length: prompt.chars().count(),
        response_length: result.text.chars().count(),
        model_used: result.model.clone(),
        processing_successful: true,
        tokens_used: result.usage.total_tokens,
        prompt_tokens: result.usage.prompt_tokens,
        completion_tokens: result.usage.completion_tokens,
    }
}

fn batch_item(
    request: TopicRequest,
    outcome: crate::types::Result<GenerationResult>,
) -> BatchExplanationItem {
    let validated = outcome.and_then(|result| {
        let parsed = parse_explanation(&result.text).map_err(ExplainError::from)?;
        Ok((result, parsed))
    });

    match validated {
        Ok((result, parsed)) => BatchExplanationItem {
            topic: request.topic,
            success: true,
            explanation: Some(parsed.explanation),
            test_case: Some(parsed.test_case),
            complexity_level: request.complexity_level,
            error: None,
            tokens_used: result.usage.total_tokens,
        },
        Err(err) => BatchExplanationItem {
            topic: request.topic,
            success: false,
            explanation: None,
            test_case: None,
            complexity_level: request.complexity_level,
            error: Some(err.to_string()),
            tokens_used: 0,
        },
    }
}
