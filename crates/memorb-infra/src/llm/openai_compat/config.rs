//! Configuration for the OpenAI-compatible provider.

use secrecy::SecretString;

use memorb_types::config::LlmCredentials;

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name, used in logs.
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    pub base_url: String,
    pub api_key: SecretString,
    /// Model used when a request leaves `model` empty.
    pub model: String,
}

impl OpenAiCompatConfig {
    pub fn from_credentials(credentials: &LlmCredentials, model: &str) -> Self {
        Self {
            provider_name: "openai".into(),
            base_url: credentials.base_url.trim_end_matches('/').to_string(),
            api_key: credentials.api_key.clone(),
            model: model.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_from_credentials_trims_base() {
        let creds = LlmCredentials {
            api_key: SecretString::from("sk-test".to_string()),
            base_url: "https://llm.example/v1/".into(),
        };
        let config = OpenAiCompatConfig::from_credentials(&creds, "gpt-4o-mini");
        assert_eq!(config.base_url, "https://llm.example/v1");
        assert_eq!(config.api_key.expose_secret(), "sk-test");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.provider_name, "openai");
    }
}
