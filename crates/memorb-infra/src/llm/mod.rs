//! LLM provider implementations.
//!
//! memorb talks to one OpenAI-compatible endpoint, configured by
//! `OPENAI_API_KEY` / `OPENAI_API_BASE`.

pub mod openai_compat;

use memorb_core::llm::box_provider::BoxLlmProvider;
use memorb_types::config::LlmCredentials;

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::OpenAiCompatConfig;

/// Build the shared provider from startup credentials.
///
/// `default_model` is used by requests that leave `model` empty.
pub fn create_provider(credentials: &LlmCredentials, default_model: &str) -> BoxLlmProvider {
    BoxLlmProvider::new(OpenAiCompatibleProvider::new(
        OpenAiCompatConfig::from_credentials(credentials, default_model),
    ))
}
