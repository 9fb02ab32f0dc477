//! SSE chat endpoints.
//!
//! - POST /api/chat: memory-backed, one `{content}` event per upstream fragment
//! - POST /api/chatV2: transcript-backed, a single `{content}` event
//!
//! Both end with `{"done": true}`, preceded by `{"error"}` on failure.

use std::convert::Infallible;

use axum::extract::State;
use axum::http::{HeaderName, header};
use axum::response::IntoResponse;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::{Stream, StreamExt};
use serde::Deserialize;

use memorb_core::chat::ChatEvent;
use memorb_types::tenant::TenantId;

use crate::http::error::AppError;
use crate::http::extractors::json::{JsonBody, or_default_tenant};
use crate::state::AppState;

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

/// Request body for both chat endpoints.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub user_id: Option<String>,
}

impl ChatRequest {
    fn into_parts(self) -> Result<(TenantId, String), AppError> {
        let message = self
            .message
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| AppError::Validation("Message cannot be empty".into()))?;
        Ok((or_default_tenant(self.user_id), message))
    }
}

fn to_sse_event(event: ChatEvent) -> Result<Event, Infallible> {
    let data = serde_json::to_string(&event).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to serialize chat event");
        r#"{"error":"serialization failed"}"#.to_string()
    });
    Ok(Event::default().data(data))
}

fn sse_response<S>(events: S) -> impl IntoResponse
where
    S: Stream<Item = ChatEvent> + Send + 'static,
{
    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (X_ACCEL_BUFFERING, "no"),
        ],
        Sse::new(events.map(to_sse_event)).keep_alive(KeepAlive::default()),
    )
}

/// POST /api/chat - retrieval-augmented streaming chat.
pub async fn chat(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (tenant, message) = body.into_parts()?;
    tracing::info!(tenant = %tenant, chars = message.chars().count(), "chat message");

    let session = state.memory.build_session(&tenant);
    Ok(sse_response(state.chat.persistent_chat(session, message)))
}

/// POST /api/chatV2 - lightweight chat over the in-process transcript.
pub async fn chat_v2(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (tenant, message) = body.into_parts()?;
    tracing::info!(tenant = %tenant, chars = message.chars().count(), "chatV2 message");

    Ok(sse_response(state.chat.lightweight_chat(tenant, message)))
}
