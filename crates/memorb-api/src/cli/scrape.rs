//! `memorb scrape`: print a share page's turns as JSON.

use anyhow::{Result, anyhow};

use memorb_types::scrape::ScrapeStrategy;

use crate::state::AppState;

pub async fn scrape(state: &AppState, url: &str, strategy: Option<&str>) -> Result<()> {
    let strategy = strategy
        .map(|s| s.parse::<ScrapeStrategy>().map_err(|e| anyhow!(e)))
        .transpose()?;

    let turns = state.scrapers.scrape(url, strategy).await?;
    println!("{}", serde_json::to_string_pretty(&turns)?);
    Ok(())
}
