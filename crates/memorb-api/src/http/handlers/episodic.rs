//! Episodic memory endpoints.
//!
//! - POST /api/save_episodic_memory
//! - DELETE /api/del_episodic_memory

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use memorb_types::error::TranscriptError;
use memorb_types::tenant::TenantId;

use crate::http::error::AppError;
use crate::http::extractors::json::{JsonBody, UserBody};
use crate::state::AppState;

/// POST /api/save_episodic_memory - reflect on the tenant's transcript and store it.
pub async fn save_episodic_memory(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<UserBody>,
) -> Result<Json<Value>, AppError> {
    let tenant = TenantId::new(body.required()?);

    let outcome = state
        .episodic
        .record_transcript(&state.transcripts, &tenant)
        .await?;
    tracing::info!(tenant = %tenant, stored = !outcome.is_error(), "episodic reflection finished");

    Ok(Json(json!({ "status": "success" })))
}

/// DELETE /api/del_episodic_memory - forget the tenant's in-process transcript.
pub async fn delete_episodic_memory(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<UserBody>,
) -> Result<Json<Value>, AppError> {
    let user_id = body.required()?;
    let tenant = TenantId::new(user_id.clone());

    if !state.transcripts.remove(&tenant) {
        return Err(TranscriptError::NotFound(user_id).into());
    }

    Ok(Json(json!({
        "success": true,
        "message": format!("Episodic memory for user {tenant} deleted"),
    })))
}
