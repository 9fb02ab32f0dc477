//! Configuration types for memorb.
//!
//! [`Settings`] is the deserialized `config.toml`; every field has a default
//! so an empty or missing file yields a working local setup. Credentials
//! never come from the file: [`LlmCredentials`] is filled from the
//! environment and [`AppConfig`] pairs the two.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::memory::{DistanceMetric, NamespaceSpec};
use crate::scrape::ScrapeStrategy;

/// Everything the process needs at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub settings: Settings,
    pub credentials: LlmCredentials,
}

/// LLM endpoint credentials (`OPENAI_API_KEY`, `OPENAI_API_BASE`).
#[derive(Debug, Clone)]
pub struct LlmCredentials {
    pub api_key: SecretString,
    pub base_url: String,
}

/// Top-level `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub memory: MemoryConfig,
    pub episodic: EpisodicConfig,
    pub scraper: ScraperConfig,
}

/// HTTP listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
        }
    }
}

/// Conversational model settings.
///
/// `chat_model` serves the streaming memory-backed chat; the remaining
/// fields drive the lightweight chat and the reflection pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub chat_model: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            chat_model: "gpt-4o-mini".into(),
            model: "gpt-4o-mini".into(),
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

/// Base memory configuration shared by every tenant.
///
/// Per-tenant configs are derived from this value by replacing only
/// `vector_store.collection_name`; the base itself is never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub llm: MemoryLlmConfig,
    pub embedder: EmbedderConfig,
    pub vector_store: VectorStoreConfig,
    pub version: String,
    /// How many memories the persistent chat retrieves per query.
    pub search_limit: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            llm: MemoryLlmConfig::default(),
            embedder: EmbedderConfig::default(),
            vector_store: VectorStoreConfig::default(),
            version: "v1.1".into(),
            search_limit: 10,
        }
    }
}

/// Model settings for fact extraction when memories are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryLlmConfig {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
}

impl Default for MemoryLlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".into(),
            temperature: 0.2,
            max_tokens: 2000,
            top_p: 1.0,
        }
    }
}

/// Embedding backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedderConfig {
    pub provider: String,
    pub model: String,
    pub base_url: String,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".into(),
            model: "mxbai-embed-large".into(),
            base_url: "http://localhost:11434".into(),
        }
    }
}

/// Vector store connection plus the collection the config is bound to.
///
/// In the base config `collection_name` is the tenant namespace prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub collection_name: String,
    pub host: String,
    /// REST port (snapshots).
    pub port: u16,
    /// gRPC port (collections and points).
    pub grpc_port: u16,
    pub embedding_model_dims: u64,
}

impl VectorStoreConfig {
    pub fn rest_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn grpc_url(&self) -> String {
        format!("http://{}:{}", self.host, self.grpc_port)
    }

    /// Shape used when a namespace is created or provisioned.
    pub fn namespace_spec(&self) -> NamespaceSpec {
        NamespaceSpec {
            dims: self.embedding_model_dims,
            distance: DistanceMetric::Cosine,
        }
    }
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            collection_name: "memory_orb".into(),
            host: "localhost".into(),
            port: 6333,
            grpc_port: 6334,
            embedding_model_dims: 1024,
        }
    }
}

/// Lightweight chat transcripts and their reflections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodicConfig {
    /// Prefix of the namespaces reflections are stored in.
    pub collection_prefix: String,
    /// First message of every new transcript.
    pub system_prompt: String,
}

impl Default for EpisodicConfig {
    fn default() -> Self {
        Self {
            collection_prefix: "episodic_memory".into(),
            system_prompt:
                "You are a helpful AI Assistant. Answer the User's queries succinctly in one sentence."
                    .into(),
        }
    }
}

/// Share-page scraping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Strategy used when a request does not name one.
    pub strategy: ScrapeStrategy,
    pub navigation_timeout_ms: u64,
    pub selector_timeout_ms: u64,
    /// Attribute carrying the author role on rendered message elements.
    pub role_attribute: String,
    /// Minimum length of a quoted literal the raw-HTML heuristic considers.
    pub min_literal_len: usize,
    /// Topic keywords a literal must contain (case-insensitive) to count as a turn.
    pub keywords: Vec<String>,
}

/// Home-improvement vocabulary the raw-HTML heuristic shipped with.
///
/// Domain-specific: set `scraper.keywords` when scraping other subjects.
pub const DEFAULT_SCRAPE_KEYWORDS: &[&str] = &[
    "renovation",
    "remodel",
    "kitchen",
    "bathroom",
    "flooring",
    "tile",
    "paint",
    "cabinet",
    "countertop",
    "contractor",
];

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            strategy: ScrapeStrategy::Rendered,
            navigation_timeout_ms: 60_000,
            selector_timeout_ms: 10_000,
            role_attribute: "data-message-author-role".into(),
            min_literal_len: 50,
            keywords: DEFAULT_SCRAPE_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}
