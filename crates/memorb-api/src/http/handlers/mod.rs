//! HTTP request handlers, grouped by concern.

pub mod chat;
pub mod episodic;
pub mod memory;
pub mod share;
