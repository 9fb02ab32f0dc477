//! Memory namespace CLI commands.

use anyhow::{Context, Result};
use console::style;

use memorb_types::tenant::TenantId;

use crate::state::AppState;

/// Recreate `user_id`'s namespace, dropping every stored memory.
///
/// ```bash
/// memorb provision --user-id alice
/// ```
pub async fn provision(state: &AppState, user_id: &str, json: bool) -> Result<()> {
    let tenant = TenantId::new(user_id);
    let namespace = state
        .memory
        .provision(&tenant)
        .await
        .with_context(|| format!("failed to provision namespace for '{tenant}'"))?;
    let dims = state.memory.base_config().vector_store.embedding_model_dims;

    if json {
        let out = serde_json::json!({
            "user_id": tenant.as_str(),
            "namespace": namespace.as_str(),
            "dims": dims,
            "distance": "cosine",
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!();
        println!(
            "  {} Provisioned {} ({} dims, cosine)",
            style("✓").green().bold(),
            style(namespace.as_str()).cyan(),
            dims,
        );
        println!();
    }
    Ok(())
}
