//! Memory namespace endpoints: snapshot export/import and deletion.
//!
//! - POST /api/export-memory
//! - POST /api/import-memory (multipart)
//! - POST /api/del-memory

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use memorb_types::memory::SnapshotArchive;
use memorb_types::tenant::TenantId;

use crate::http::error::AppError;
use crate::http::extractors::json::{JsonBody, UserBody, or_default_tenant};
use crate::state::AppState;

/// POST /api/export-memory - download the tenant namespace as a snapshot file.
pub async fn export_memory(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<UserBody>,
) -> Result<Response, AppError> {
    let tenant = body.or_default();

    let archive = state.memory.export(&tenant).await.map_err(|e| {
        tracing::error!(tenant = %tenant, error = %e, "snapshot export failed");
        AppError::Upstream("Snapshot export failed".into())
    })?;
    tracing::info!(tenant = %tenant, snapshot = %archive.name, size = archive.bytes.len(), "exported snapshot");

    let disposition = format!("attachment; filename=\"{}\"", archive.name.replace('"', ""));
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        archive.bytes,
    )
        .into_response())
}

/// POST /api/import-memory - restore the tenant namespace from an uploaded snapshot.
///
/// Form fields: `user_id` (optional) and `snapshot` (file).
pub async fn import_memory(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut user_id: Option<String> = None;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        match field.name() {
            Some("user_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.body_text()))?;
                user_id = Some(text);
            }
            Some("snapshot") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.body_text()))?;
                upload = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let (name, bytes) = upload.ok_or_else(|| AppError::Validation("Uploaded file not found".into()))?;
    if name.is_empty() {
        return Err(AppError::Validation("No file selected".into()));
    }

    let tenant = or_default_tenant(user_id);

    state
        .memory
        .import(&tenant, SnapshotArchive { name, bytes })
        .await
        .map_err(|e| {
            tracing::error!(tenant = %tenant, error = %e, "snapshot import failed");
            AppError::Upstream("Memory snapshot import failed".into())
        })?;

    Ok(Json(json!({ "message": "Memory snapshot imported successfully" })))
}

/// POST /api/del-memory - drop the tenant namespace.
pub async fn delete_memory(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<UserBody>,
) -> Result<Json<Value>, AppError> {
    let tenant = TenantId::new(body.required()?);

    state.memory.delete(&tenant).await.map_err(|e| {
        tracing::error!(tenant = %tenant, error = %e, "namespace delete failed");
        AppError::Upstream(format!("Failed to delete memory for user {tenant}"))
    })?;

    Ok(Json(json!({ "message": format!("Memory for user {tenant} deleted") })))
}
