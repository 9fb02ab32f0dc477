//! Application error type mapping domain failures to HTTP status codes.
//!
//! Every error body is `{"error": "<message>"}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use memorb_types::error::{EpisodicError, RepositoryError, ScrapeError, TranscriptError};
use memorb_types::llm::LlmError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Missing or malformed request input.
    Validation(String),
    /// Unknown tenant or resource.
    NotFound(String),
    /// Vector store, embedder, LLM, or browser failure.
    Upstream(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Validation(msg) | AppError::NotFound(msg) | AppError::Upstream(msg) => msg,
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl From<TranscriptError> for AppError {
    fn from(e: TranscriptError) -> Self {
        match e {
            TranscriptError::NotFound(_) => AppError::NotFound(e.to_string()),
            TranscriptError::Empty => AppError::Upstream(e.to_string()),
        }
    }
}

impl From<EpisodicError> for AppError {
    fn from(e: EpisodicError) -> Self {
        match e {
            EpisodicError::Transcript(inner) => inner.into(),
            EpisodicError::Memory(inner) => AppError::Upstream(inner.to_string()),
        }
    }
}

impl From<ScrapeError> for AppError {
    fn from(e: ScrapeError) -> Self {
        if e.is_extraction() {
            AppError::Validation(e.to_string())
        } else {
            AppError::Upstream(e.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self.message(), "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self.message(), "request rejected");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}
