use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors returned by the HTTP surface.
///
/// Only malformed requests are errors; downstream lookup failures are
/// absorbed by the classifier and never reach this type.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request body was not a JSON object of the expected shape
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        };
        tracing::debug!(status = %status, error = %self, event = "request_rejected");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
