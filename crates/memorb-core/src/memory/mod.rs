//! Per-tenant memory for memorb.
//!
//! Ports (`VectorStore`, `Embedder`) with their boxed wrappers, the LLM fact
//! extractor, and the session factory that binds all of them to one tenant
//! namespace.

pub mod box_embedder;
pub mod box_vector;
pub mod embedder;
pub mod extractor;
pub mod session;
pub mod vector;
