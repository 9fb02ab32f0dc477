//! Business logic and port traits for memorb.
//!
//! This crate multiplexes one shared memory configuration into per-tenant
//! namespaces, and holds the chat, reflection, and scraping logic. It
//! defines the "ports" (`LlmProvider`, `VectorStore`, `Embedder`,
//! `ConversationScraper`) that `memorb-infra` implements, and depends only
//! on `memorb-types` -- never on `memorb-infra` or any network client.

pub mod chat;
pub mod llm;
pub mod memory;
pub mod reflection;
pub mod scrape;
pub mod tenant;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
