//! HTTP surface: decodes requests for the classifier and serializes verdicts.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::core::Verdict;
use crate::error::ApiError;
use crate::service::BotDetectionService;
use crate::utils::create_request_span;

/// Body of a classification request; absent fields are empty strings
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DetectRequest {
    pub user_agent: String,
    pub ip: String,
}

/// Build the application router
pub fn router(service: BotDetectionService, request_timeout: Duration) -> Router {
    Router::new()
        .route("/api/detect_bot", post(detect_bot))
        .route("/health", get(health))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn detect_bot(
    State(service): State<BotDetectionService>,
    body: Result<Json<DetectRequest>, JsonRejection>,
) -> Result<Json<Verdict>, ApiError> {
    let Json(request) = body?;
    let request_id = uuid::Uuid::new_v4().to_string();

    let verdict = service
        .classify(&request.user_agent, &request.ip)
        .instrument(create_request_span(&request_id))
        .await;
    Ok(Json(verdict))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
