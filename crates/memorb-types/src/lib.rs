//! Shared domain types for memorb.
//!
//! This crate contains the types passed between the memorb layers:
//! tenants and namespaces, LLM messages and stream events, memory points,
//! reflection records, scraped conversation turns, configuration, and the
//! error enums used across the workspace.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror, secrecy.

pub mod config;
pub mod error;
pub mod llm;
pub mod memory;
pub mod reflection;
pub mod scrape;
pub mod tenant;
