//! Text-to-vector embedding providers.
//!
//! Provides the [`EmbeddingProvider`] trait, a remote implementation backed by an
//! OpenAI-compatible `/embeddings` endpoint, and a deterministic bag-of-words
//! implementation for offline use. Providers are created via [`create_provider`]
//! from configuration.

pub mod hash;
pub mod openai;

use crate::config::PilotConfig;
use crate::error::{Error, Result};

/// Dimension assumed when the provider cannot be probed (text-embedding-ada-002).
pub const FALLBACK_DIMENSION: usize = 1536;

/// Text embedded to discover a provider's output dimension.
const PROBE_TEXT: &str = "initial_dimension_check";

/// Trait for embedding text into vectors.
///
/// All methods are synchronous and may block on network I/O.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single non-empty text string into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Name of the model producing the vectors.
    fn model_name(&self) -> &str;
}

/// Reject empty input and fold newlines into spaces.
///
/// Embedding backends handle single-line input better.
pub fn prepare_input(text: &str) -> Result<String> {
    if text.is_empty() {
        return Err(Error::InvalidInput(
            "input text must be a non-empty string".into(),
        ));
    }
    Ok(text.replace("\r\n", " ").replace('\n', " "))
}

/// Ask the provider for one embedding and report its length.
///
/// Falls back to [`FALLBACK_DIMENSION`] when the call fails.
pub fn probe_dimension(provider: &dyn EmbeddingProvider) -> usize {
    try_probe_dimension(provider).unwrap_or_else(|e| {
        tracing::warn!(
            error = %e,
            fallback = FALLBACK_DIMENSION,
            "could not determine embedding dimension, using fallback"
        );
        FALLBACK_DIMENSION
    })
}

/// Ask the provider for one embedding and report its length, surfacing failures.
pub fn try_probe_dimension(provider: &dyn EmbeddingProvider) -> Result<usize> {
    let dim = provider.embed(PROBE_TEXT)?.len();
    if dim == 0 {
        return Err(Error::Provider("provider returned an empty embedding".into()));
    }
    Ok(dim)
}

/// Create an embedding provider from config.
///
/// Supported providers: `openai` (remote, needs an API key) and `hash` (offline).
pub fn create_provider(config: &PilotConfig) -> Result<Box<dyn EmbeddingProvider>> {
    match config.embedding.provider.as_str() {
        "openai" => {
            let provider = openai::OpenAiEmbeddingProvider::from_config(config)?;
            Ok(Box::new(provider))
        }
        "hash" => Ok(Box::new(hash::HashEmbeddingProvider::new(
            config.embedding.hash_dimensions,
        )?)),
        other => Err(Error::Configuration(format!(
            "unknown embedding provider: {other}. Supported: openai, hash"
        ))),
    }
}
