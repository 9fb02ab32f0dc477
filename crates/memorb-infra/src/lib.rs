//! Infrastructure layer for memorb.
//!
//! Implements the ports defined in `memorb-core`: the OpenAI-compatible LLM
//! provider, the Qdrant vector store, the Ollama embedder, both share-page
//! scrapers, and config loading.

pub mod config;
pub mod llm;
pub mod scrape;
pub mod vector;
