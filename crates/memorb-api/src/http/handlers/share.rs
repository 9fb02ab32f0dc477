//! POST /api/chatgpt-share - recover conversation turns from a share page.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use memorb_types::scrape::ScrapeStrategy;

use crate::http::error::AppError;
use crate::http::extractors::json::JsonBody;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    pub url: Option<String>,
    /// Overrides the configured default strategy.
    pub strategy: Option<ScrapeStrategy>,
}

pub async fn extract_share(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ShareRequest>,
) -> Result<Json<Value>, AppError> {
    let url = body
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::Validation("URL is required".into()))?;

    let messages = state.scrapers.scrape(&url, body.strategy).await?;
    Ok(Json(json!({ "messages": messages })))
}
