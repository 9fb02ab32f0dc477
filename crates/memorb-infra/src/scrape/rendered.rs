//! Rendered-DOM share-page scraper.
//!
//! Launches headless Chromium, navigates to the share URL, waits for
//! role-marked message elements, and reads each element's role attribute
//! and visible text in document order. The browser is torn down on every
//! exit path.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout};

use memorb_core::scrape::ConversationScraper;
use memorb_types::config::ScraperConfig;
use memorb_types::error::ScrapeError;
use memorb_types::llm::{Message, MessageRole};
use memorb_types::scrape::{ConversationTurn, ScrapeStrategy};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct RenderedScraper {
    role_attribute: String,
    navigation_timeout: Duration,
    selector_timeout: Duration,
}

/// Raw `(role attribute, inner text)` read from one element.
pub(crate) type RawElement = (Option<String>, Option<String>);

impl RenderedScraper {
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            role_attribute: config.role_attribute.clone(),
            navigation_timeout: Duration::from_millis(config.navigation_timeout_ms),
            selector_timeout: Duration::from_millis(config.selector_timeout_ms),
        }
    }

    fn selector(&self) -> String {
        format!("[{}]", self.role_attribute)
    }

    async fn launch() -> Result<(Browser, JoinHandle<()>), ScrapeError> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .build()
            .map_err(ScrapeError::Browser)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))?;
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        Ok((browser, handle))
    }

    async fn read_page(&self, browser: &Browser, url: &str) -> Result<Vec<RawElement>, ScrapeError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))?;

        navigate_within(self.navigation_timeout, page.goto(url)).await?;

        let selector = self.selector();
        let (page, query, attribute) = (&page, selector.as_str(), self.role_attribute.as_str());
        poll_elements(query, self.selector_timeout, POLL_INTERVAL, move || {
            read_elements(page, query, attribute)
        })
        .await
    }
}

/// Read every element matching `selector` once.
async fn read_elements(
    page: &Page,
    selector: &str,
    attribute: &str,
) -> Result<Vec<RawElement>, ScrapeError> {
    let elements = page
        .find_elements(selector)
        .await
        .map_err(|e| ScrapeError::Browser(e.to_string()))?;

    let mut raw = Vec::with_capacity(elements.len());
    for element in elements {
        let role = element
            .attribute(attribute)
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))?;
        let text = element
            .inner_text()
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))?;
        raw.push((role, text));
    }
    Ok(raw)
}

/// Await a navigation, mapping both its failure and the deadline to `Navigation`.
pub(crate) async fn navigate_within<F, T, E>(limit: Duration, navigation: F) -> Result<T, ScrapeError>
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    timeout(limit, navigation)
        .await
        .map_err(|_| ScrapeError::Navigation(format!("timed out after {}ms", limit.as_millis())))?
        .map_err(|e| ScrapeError::Navigation(e.to_string()))
}

/// Call `read` until it yields elements or `limit` passes.
///
/// A read error ends the wait immediately.
pub(crate) async fn poll_elements<F, Fut>(
    selector: &str,
    limit: Duration,
    interval: Duration,
    mut read: F,
) -> Result<Vec<RawElement>, ScrapeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<RawElement>, ScrapeError>>,
{
    let deadline = Instant::now() + limit;
    loop {
        let raw = read().await?;
        if !raw.is_empty() {
            return Ok(raw);
        }
        if Instant::now() >= deadline {
            return Err(ScrapeError::SelectorTimeout {
                selector: selector.to_string(),
                timeout_ms: limit.as_millis() as u64,
            });
        }
        tokio::time::sleep(interval).await;
    }
}

/// Turn raw element reads into turns, trimming text and skipping unknown roles.
pub(crate) fn turns_from_elements(elements: Vec<RawElement>) -> Vec<ConversationTurn> {
    elements
        .into_iter()
        .filter_map(|(role, text)| {
            let role = role?;
            match role.parse::<MessageRole>() {
                Ok(role) => Some(Message {
                    role,
                    content: text.unwrap_or_default().trim().to_string(),
                }),
                Err(_) => {
                    tracing::debug!(%role, "skipping element with unknown role");
                    None
                }
            }
        })
        .collect()
}

impl ConversationScraper for RenderedScraper {
    fn strategy(&self) -> ScrapeStrategy {
        ScrapeStrategy::Rendered
    }

    #[tracing::instrument(skip(self))]
    async fn scrape(&self, url: &str) -> Result<Vec<ConversationTurn>, ScrapeError> {
        let (mut browser, handler) = Self::launch().await?;

        let result = self.read_page(&browser, url).await;

        if let Err(e) = browser.close().await {
            tracing::warn!(error = %e, "failed to close browser");
        }
        if let Err(e) = browser.wait().await {
            tracing::warn!(error = %e, "browser process did not exit cleanly");
        }
        handler.abort();
        let _ = handler.await;

        let turns = turns_from_elements(result?);
        tracing::debug!(turns = turns.len(), "read rendered share page");
        Ok(turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(role: Option<&str>, text: Option<&str>) -> RawElement {
        (role.map(String::from), text.map(String::from))
    }

    #[test]
    fn test_turns_keep_document_order_and_trim() {
        let turns = turns_from_elements(vec![
            el(Some("user"), Some("  How do I tile a floor?\n")),
            el(Some("assistant"), Some("Start with a level subfloor.")),
            el(Some("user"), Some("Thanks")),
        ]);
        assert_eq!(
            turns,
            vec![
                Message::user("How do I tile a floor?"),
                Message::assistant("Start with a level subfloor."),
                Message::user("Thanks"),
            ]
        );
    }

    #[test]
    fn test_turns_skip_unknown_or_missing_roles() {
        let turns = turns_from_elements(vec![
            el(Some("tool"), Some("ignored")),
            el(None, Some("ignored")),
            el(Some("assistant"), None),
        ]);
        assert_eq!(turns, vec![Message::assistant("")]);
    }

    #[test]
    fn test_selector_from_role_attribute() {
        let scraper = RenderedScraper::new(&ScraperConfig::default());
        assert_eq!(scraper.selector(), "[data-message-author-role]");
        assert_eq!(scraper.selector_timeout, Duration::from_secs(10));
        assert_eq!(scraper.navigation_timeout, Duration::from_secs(60));
    }

    const TICK: Duration = Duration::from_millis(5);

    #[tokio::test]
    async fn test_poll_times_out_when_no_element_appears() {
        let mut calls = 0;
        let err = poll_elements("[data-message-author-role]", Duration::from_millis(30), TICK, || {
            calls += 1;
            async { Ok(Vec::new()) }
        })
        .await
        .unwrap_err();

        assert!(err.is_timeout());
        assert!(matches!(
            err,
            ScrapeError::SelectorTimeout { ref selector, timeout_ms: 30 } if selector == "[data-message-author-role]"
        ));
        assert!(calls > 1);
    }

    #[tokio::test]
    async fn test_poll_returns_once_elements_appear() {
        let mut calls = 0;
        let raw = poll_elements("[r]", Duration::from_secs(5), TICK, || {
            calls += 1;
            let ready = calls >= 3;
            async move {
                Ok(if ready {
                    vec![el(Some("user"), Some("hi"))]
                } else {
                    Vec::new()
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(raw, vec![el(Some("user"), Some("hi"))]);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_poll_read_error_is_not_a_timeout() {
        let mut calls = 0;
        let err = poll_elements("[r]", Duration::from_secs(5), TICK, || {
            calls += 1;
            async { Err(ScrapeError::Browser("target crashed".into())) }
        })
        .await
        .unwrap_err();

        assert!(!err.is_timeout());
        assert!(matches!(err, ScrapeError::Browser(ref msg) if msg == "target crashed"));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_navigation_deadline_is_navigation_error() {
        let err = navigate_within(
            Duration::from_millis(20),
            std::future::pending::<Result<(), String>>(),
        )
        .await
        .unwrap_err();

        assert!(!err.is_timeout());
        assert!(matches!(err, ScrapeError::Navigation(ref msg) if msg == "timed out after 20ms"));
    }

    #[tokio::test]
    async fn test_navigation_failure_and_success() {
        let err = navigate_within(Duration::from_secs(1), async {
            Err::<(), _>("net::ERR_NAME_NOT_RESOLVED")
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ScrapeError::Navigation(ref msg) if msg == "net::ERR_NAME_NOT_RESOLVED"));

        let value = navigate_within(Duration::from_secs(1), async { Ok::<_, String>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    #[ignore = "requires a local Chromium install and network access"]
    async fn test_live_scrape_times_out_without_messages() {
        let config = ScraperConfig {
            selector_timeout_ms: 500,
            ..ScraperConfig::default()
        };
        let err = RenderedScraper::new(&config)
            .scrape("data:text/html,<p>no messages</p>")
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }
}
