//! Ollama embedding client.
//!
//! Calls `POST {base_url}/api/embed`, which accepts a batch of inputs and
//! returns one vector per input.

use serde::{Deserialize, Serialize};

use memorb_core::memory::embedder::Embedder;
use memorb_types::config::EmbedderConfig;
use memorb_types::error::RepositoryError;

pub struct OllamaEmbedder {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    dims: usize,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbedderConfig, dims: usize) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/api/embed", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            dims,
        }
    }
}

impl Embedder for OllamaEmbedder {
    #[tracing::instrument(skip(self, texts), fields(model = %self.model, count = texts.len()))]
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RepositoryError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .http
            .post(&self.endpoint)
            .json(&EmbedRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| RepositoryError::Embedding(format!("embedding request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RepositoryError::Embedding(format!(
                "embedding endpoint returned HTTP {status}: {body}"
            )));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| RepositoryError::Embedding(format!("unexpected embedding response: {e}")))?;

        if parsed.embeddings.len() != texts.len() {
            return Err(RepositoryError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.embeddings.len()
            )));
        }
        if let Some(bad) = parsed.embeddings.iter().find(|v| v.len() != self.dims) {
            return Err(RepositoryError::Embedding(format!(
                "model {} returned {} dimensions, namespace expects {}",
                self.model,
                bad.len(),
                self.dims
            )));
        }

        Ok(parsed.embeddings)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dims
    }
}
