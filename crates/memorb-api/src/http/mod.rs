//! HTTP/REST API layer for memorb.
//!
//! Axum router under `/api/` with flat `{"error"}` failures and SSE chat.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
