//! `memorb reflect`: run the reflection pipeline over a saved conversation.

use std::path::Path;

use anyhow::{Context, Result};

use memorb_types::llm::Message;

use crate::state::AppState;

/// Read a JSON array of messages and print the reflection outcome.
///
/// An unparseable model reply still prints, as `{"error", "raw"}`.
pub async fn reflect(state: &AppState, file: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let messages: Vec<Message> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of messages", file.display()))?;

    let outcome = state.reflection.reflect(&messages).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
