//! Raw-HTML share-page scraper: one GET, then the script-literal heuristic.

use std::time::Duration;

use memorb_core::scrape::ConversationScraper;
use memorb_core::scrape::heuristic::{self, HeuristicConfig};
use memorb_types::config::ScraperConfig;
use memorb_types::error::ScrapeError;
use memorb_types::scrape::{ConversationTurn, ScrapeStrategy};

pub struct RawHtmlScraper {
    http: reqwest::Client,
    heuristic: HeuristicConfig,
}

impl RawHtmlScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.navigation_timeout_ms))
            .build()
            .map_err(|e| ScrapeError::Request(e.to_string()))?;
        Ok(Self {
            http,
            heuristic: HeuristicConfig::new(config.min_literal_len, &config.keywords),
        })
    }
}

impl ConversationScraper for RawHtmlScraper {
    fn strategy(&self) -> ScrapeStrategy {
        ScrapeStrategy::RawHtml
    }

    #[tracing::instrument(skip(self))]
    async fn scrape(&self, url: &str) -> Result<Vec<ConversationTurn>, ScrapeError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| ScrapeError::Request(e.to_string()))?;
        tracing::debug!(bytes = html.len(), "fetched share page");

        heuristic::extract_turns(&html, &self.heuristic)
    }
}
