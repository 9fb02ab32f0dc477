//! Types for recovering conversation turns from public share pages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::llm::Message;

/// One role-tagged turn of a scraped conversation, in chronological order.
pub type ConversationTurn = Message;

/// How a share page is turned into conversation turns.
///
/// The two strategies are alternatives; one never falls back to the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeStrategy {
    /// Drive a headless browser and read role-marked DOM elements.
    #[default]
    Rendered,
    /// Plain GET plus the longest-script / quoted-literal heuristic.
    RawHtml,
}

impl fmt::Display for ScrapeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrapeStrategy::Rendered => write!(f, "rendered"),
            ScrapeStrategy::RawHtml => write!(f, "raw_html"),
        }
    }
}

impl FromStr for ScrapeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "rendered" | "dom" => Ok(ScrapeStrategy::Rendered),
            "raw_html" | "raw" => Ok(ScrapeStrategy::RawHtml),
            other => Err(format!("invalid scrape strategy: '{other}'")),
        }
    }
}
