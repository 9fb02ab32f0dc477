//! Observability for memorb: tracing subscriber and optional OTel export.

pub mod tracing_setup;
