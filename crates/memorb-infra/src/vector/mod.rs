//! Vector storage and embedding adapters.
//!
//! Qdrant holds every tenant namespace; Ollama turns text into vectors.

pub mod embedder;
pub mod qdrant;
