//! End-to-end router tests with a scripted provider.
//!
//! Exercises the full request path in-process: shape checks, prompt
//! construction, provider call, response validation, and error mapping.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use explainer::types::{ExplainError, Result};
use explainer::{
    AppState, GenerationRequest, GenerationResult, LlmProvider, Settings, TokenUsage, router,
};

const VALID_EXPLANATION: &str = "Machine learning is a subset of artificial intelligence that \
    enables computers to learn and make decisions from data without being explicitly programmed \
    for every single task they perform.";

fn valid_provider_text() -> String {
    json!({
        "explanation": VALID_EXPLANATION,
        "test_case": {
            "input": "A dataset of house prices",
            "expected_output": "A price prediction model",
            "description": "Tests understanding of supervised learning"
        }
    })
    .to_string()
}

/// Provider that replays a fixed script of outcomes, one per call.
struct ScriptedProvider {
    calls: AtomicUsize,
    script: Vec<Result<String>>,
}

impl ScriptedProvider {
    fn returning(script: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            script,
        })
    }

    fn always_valid() -> Arc<Self> {
        Self::returning((0..16).map(|_| Ok(valid_provider_text())).collect())
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.get(call) {
            Some(Ok(text)) => Ok(GenerationResult {
                text: text.clone(),
                model: request.model.clone(),
                usage: TokenUsage::new(75, 75),
                finish_reason: "stop".to_string(),
            }),
            _ => Err(ExplainError::provider("scripted", "simulated outage")),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn test_app(provider: Arc<ScriptedProvider>) -> Router {
    let settings = Settings {
        api_key: "test-key".to_string(),
        ..Settings::default()
    };
    router(AppState::new(Arc::new(settings), provider))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// =============================================================================
// Liveness
// =============================================================================

#[tokio::test]
async fn root_reports_running() {
    let (status, body) = get_json(test_app(ScriptedProvider::always_valid()), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Topic Explanation Service is running");
}

#[tokio::test]
async fn health_reports_healthy() {
    let (status, body) = get_json(test_app(ScriptedProvider::always_valid()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["provider"], "scripted");
}

// =============================================================================
// Single Explanation
// =============================================================================

#[tokio::test]
async fn explain_topic_happy_path() {
    let app = test_app(ScriptedProvider::always_valid());
    let (status, body) = post_json(
        app,
        "/explain-topic",
        json!({"topic": "Machine Learning", "complexity_level": "intermediate"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["topic"], "Machine Learning");
    assert_eq!(body["explanation"], VALID_EXPLANATION);
    assert_eq!(body["complexity_level"], "intermediate");
    assert_eq!(body["test_case"]["input"], "A dataset of house prices");
    assert_eq!(body["metadata"]["processing_successful"], true);
    assert_eq!(body["metadata"]["tokens_used"], 150);
    assert_eq!(body["metadata"]["prompt_tokens"], 75);
    assert_eq!(body["metadata"]["completion_tokens"], 75);
    assert!(body["metadata"]["prompt_length"].as_u64().unwrap() > 100);
}

#[tokio::test]
async fn empty_topic_rejected_before_provider_call() {
    let provider = ScriptedProvider::always_valid();
    let app = test_app(provider.clone());
    let (status, _) = post_json(app, "/explain-topic", json!({"topic": ""})).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn overlong_topic_rejected_before_provider_call() {
    let provider = ScriptedProvider::always_valid();
    let app = test_app(provider.clone());
    let long_topic = "a".repeat(501);
    let (status, body) = post_json(app, "/explain-topic", json!({"topic": long_topic})).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("500"));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn topic_of_exactly_500_chars_accepted() {
    let app = test_app(ScriptedProvider::always_valid());
    let topic = "a".repeat(500);
    let (status, _) = post_json(app, "/explain-topic", json!({"topic": topic})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn provider_failure_maps_to_server_error() {
    let provider =
        ScriptedProvider::returning(vec![Err(ExplainError::provider("scripted", "down"))]);
    let app = test_app(provider);
    let (status, body) = post_json(app, "/explain-topic", json!({"topic": "Graphs"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("Internal server error"));
}

#[tokio::test]
async fn unvalidatable_output_maps_to_unprocessable() {
    let provider = ScriptedProvider::returning(vec![Ok("no json here at all".to_string())]);
    let app = test_app(provider);
    let (status, body) = post_json(app, "/explain-topic", json!({"topic": "Graphs"})).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .contains("Response validation error")
    );
}

#[tokio::test]
async fn short_explanation_maps_to_unprocessable() {
    let text = json!({
        "explanation": "way too short",
        "test_case": {"input": "a", "expected_output": "b", "description": "c"}
    })
    .to_string();
    let app = test_app(ScriptedProvider::returning(vec![Ok(text)]));
    let (status, body) = post_json(app, "/explain-topic", json!({"topic": "Graphs"})).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("too short"));
}

// =============================================================================
// Batch Explanation
// =============================================================================

#[tokio::test]
async fn batch_of_eleven_rejected_with_cap_message() {
    let provider = ScriptedProvider::always_valid();
    let app = test_app(provider.clone());
    let topics: Vec<Value> = (0..11).map(|i| json!({"topic": format!("Topic {i}")})).collect();
    let (status, body) = post_json(app, "/batch-explain", Value::Array(topics)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("Maximum 10 topics"));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn batch_of_ten_accepted() {
    let app = test_app(ScriptedProvider::always_valid());
    let topics: Vec<Value> = (0..10).map(|i| json!({"topic": format!("Topic {i}")})).collect();
    let (status, body) = post_json(app, "/batch-explain", Value::Array(topics)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 10);
    assert_eq!(body["succeeded"], 10);
    assert_eq!(body["failed"], 0);
}

#[tokio::test]
async fn batch_isolates_middle_failure() {
    let provider = ScriptedProvider::returning(vec![
        Ok(valid_provider_text()),
        Err(ExplainError::provider("scripted", "simulated outage")),
        Ok(valid_provider_text()),
    ]);
    let app = test_app(provider);
    let topics = json!([
        {"topic": "Stacks"},
        {"topic": "Queues"},
        {"topic": "Heaps"}
    ]);
    let (status, body) = post_json(app, "/batch-explain", topics).await;

    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);

    assert_eq!(results[0]["success"], true);
    assert_eq!(results[0]["topic"], "Stacks");

    assert_eq!(results[1]["success"], false);
    assert_eq!(results[1]["topic"], "Queues");
    assert_eq!(results[1]["tokens_used"], 0);
    assert!(results[1]["error"].as_str().unwrap().contains("simulated outage"));

    assert_eq!(results[2]["success"], true);
    assert_eq!(results[2]["topic"], "Heaps");

    assert_eq!(body["succeeded"], 2);
    assert_eq!(body["failed"], 1);
}

#[tokio::test]
async fn batch_with_invalid_topic_rejected_before_provider_call() {
    let provider = ScriptedProvider::always_valid();
    let app = test_app(provider.clone());
    let topics = json!([{"topic": "Valid"}, {"topic": ""}]);
    let (status, _) = post_json(app, "/batch-explain", topics).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(provider.call_count(), 0);
}
