//! Share-page scrapers, one per [`ScrapeStrategy`].

pub mod raw_html;
pub mod rendered;

use memorb_core::scrape::{BoxConversationScraper, ScraperSet};
use memorb_types::config::ScraperConfig;
use memorb_types::error::ScrapeError;

use self::raw_html::RawHtmlScraper;
use self::rendered::RenderedScraper;

/// Build both scrapers from config, defaulting to `config.strategy`.
pub fn build_scrapers(config: &ScraperConfig) -> Result<ScraperSet, ScrapeError> {
    Ok(ScraperSet::new(
        BoxConversationScraper::new(RenderedScraper::new(config)),
        BoxConversationScraper::new(RawHtmlScraper::new(config)?),
        config.strategy,
    ))
}
