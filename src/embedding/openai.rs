//! OpenAI embeddings provider using the `/embeddings` endpoint.

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use super::{prepare_input, EmbeddingProvider};
use crate::config::PilotConfig;
use crate::error::{Error, Result};
use crate::http;

pub struct OpenAiEmbeddingProvider {
    client: reqwest::blocking::Client,
    api_key: Secret<String>,
    endpoint: String,
    model: String,
}

impl std::fmt::Debug for OpenAiEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEmbeddingProvider")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbeddingProvider {
    /// Build the provider from configuration.
    ///
    /// Fails with [`Error::Configuration`] when no API key is configured.
    pub fn from_config(config: &PilotConfig) -> Result<Self> {
        let api_key = http::require_api_key(config.api_key(), "embedding provider")?;
        let client = http::blocking_client(config.embedding.timeout_secs)?;
        let provider = Self {
            client,
            api_key: Secret::new(api_key),
            endpoint: http::endpoint(&config.embedding.base_url, "embeddings"),
            model: config.embedding.model.clone(),
        };
        tracing::debug!(endpoint = %provider.endpoint, model = %provider.model, "embedding provider ready");
        Ok(provider)
    }
}

impl EmbeddingProvider for OpenAiEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let input = prepare_input(text)?;
        let req = EmbeddingRequest {
            model: &self.model,
            input: [&input],
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&req)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json::<EmbeddingResponse>())
            .map_err(|e| {
                tracing::warn!(error = %e, model = %self.model, "embedding request failed");
                Error::from(e)
            })?;

        let embedding = resp
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::Provider("empty embedding response".into()))?;

        if embedding.is_empty() {
            return Err(Error::Provider("provider returned an empty embedding".into()));
        }
        Ok(embedding)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
