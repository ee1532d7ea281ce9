//! HTTP error handling and response types.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::services::AttentionError;
use crate::vision::VisionError;

/// Message returned when a request body lacks a required field.
pub const MISSING_DATA: &str = "Missing required data";

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error message
    pub error: String,
    /// Error code for programmatic handling
    pub code: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request (missing fields, malformed JSON)
    BadRequest(String),
    /// Processing failed
    Internal(String),
}

impl AppError {
    pub fn missing_data() -> Self {
        AppError::BadRequest(MISSING_DATA.to_string())
    }

    /// Log a processing failure with its full source chain and wrap it.
    pub fn internal(err: &(dyn std::error::Error + 'static)) -> Self {
        let chain = error_chain(err);
        tracing::error!(error = %chain, "request processing failed");
        AppError::Internal(chain)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg)),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
        };

        (status, Json(error)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "rejected request body");
        AppError::missing_data()
    }
}

impl From<AttentionError> for AppError {
    fn from(err: AttentionError) -> Self {
        AppError::internal(&err)
    }
}

impl From<VisionError> for AppError {
    fn from(err: VisionError) -> Self {
        AppError::internal(&err)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::internal(&err)
    }
}

/// `err: cause: cause...`
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}
