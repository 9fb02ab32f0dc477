//! Conversation scraping from public share pages.
//!
//! - `ConversationScraper`: RPITIT trait, implemented in memorb-infra by the
//!   rendered-DOM and raw-HTML scrapers
//! - `BoxConversationScraper`: object-safe wrapper for dynamic dispatch
//! - `heuristic`: the pure text extraction behind the raw-HTML scraper
//!
//! The strategies are alternatives; nothing chains one into the other.

pub mod heuristic;

use std::future::Future;
use std::pin::Pin;

use memorb_types::error::ScrapeError;
use memorb_types::scrape::{ConversationTurn, ScrapeStrategy};

/// Trait for turning a share URL into ordered conversation turns.
pub trait ConversationScraper: Send + Sync {
    fn strategy(&self) -> ScrapeStrategy;

    fn scrape(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Vec<ConversationTurn>, ScrapeError>> + Send;
}

/// Object-safe version of [`ConversationScraper`].
pub trait ConversationScraperDyn: Send + Sync {
    fn strategy_dyn(&self) -> ScrapeStrategy;

    fn scrape_boxed<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ConversationTurn>, ScrapeError>> + Send + 'a>>;
}

impl<T: ConversationScraper> ConversationScraperDyn for T {
    fn strategy_dyn(&self) -> ScrapeStrategy {
        self.strategy()
    }

    fn scrape_boxed<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ConversationTurn>, ScrapeError>> + Send + 'a>> {
        Box::pin(self.scrape(url))
    }
}

/// Type-erased scraper.
pub struct BoxConversationScraper {
    inner: Box<dyn ConversationScraperDyn + Send + Sync>,
}

impl BoxConversationScraper {
    pub fn new<T: ConversationScraper + 'static>(scraper: T) -> Self {
        Self {
            inner: Box::new(scraper),
        }
    }

    pub fn strategy(&self) -> ScrapeStrategy {
        self.inner.strategy_dyn()
    }

    pub async fn scrape(&self, url: &str) -> Result<Vec<ConversationTurn>, ScrapeError> {
        self.inner.scrape_boxed(url).await
    }
}

/// One scraper per strategy; callers pick explicitly.
pub struct ScraperSet {
    rendered: BoxConversationScraper,
    raw_html: BoxConversationScraper,
    default_strategy: ScrapeStrategy,
}

impl ScraperSet {
    pub fn new(
        rendered: BoxConversationScraper,
        raw_html: BoxConversationScraper,
        default_strategy: ScrapeStrategy,
    ) -> Self {
        Self {
            rendered,
            raw_html,
            default_strategy,
        }
    }

    pub fn default_strategy(&self) -> ScrapeStrategy {
        self.default_strategy
    }

    pub fn get(&self, strategy: ScrapeStrategy) -> &BoxConversationScraper {
        match strategy {
            ScrapeStrategy::Rendered => &self.rendered,
            ScrapeStrategy::RawHtml => &self.raw_html,
        }
    }

    /// Scrape with `strategy`, or the configured default.
    #[tracing::instrument(skip(self))]
    pub async fn scrape(
        &self,
        url: &str,
        strategy: Option<ScrapeStrategy>,
    ) -> Result<Vec<ConversationTurn>, ScrapeError> {
        let strategy = strategy.unwrap_or(self.default_strategy);
        let turns = self.get(strategy).scrape(url).await?;
        tracing::info!(%strategy, turns = turns.len(), "scraped share page");
        Ok(turns)
    }
}
