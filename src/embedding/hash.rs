//! Deterministic bag-of-words embeddings.
//!
//! Each lowercased alphanumeric token is hashed (FNV-1a) into one of `dims`
//! buckets and the counts are L2-normalised. Texts sharing more words end up
//! closer in L2 distance. No network, no model files.

use super::{prepare_input, EmbeddingProvider};
use crate::error::{Error, Result};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
    dims: usize,
    model: String,
}

impl HashEmbeddingProvider {
    pub fn new(dims: usize) -> Result<Self> {
        if dims == 0 {
            return Err(Error::Configuration(
                "hash embedding dimension must be at least 1".into(),
            ));
        }
        Ok(Self {
            dims,
            model: format!("hash-bow-{dims}"),
        })
    }

    pub fn dimensions(&self) -> usize {
        self.dims
    }

    fn bucket(&self, token: &str) -> usize {
        let hash = token
            .bytes()
            .fold(FNV_OFFSET, |acc, b| (acc ^ b as u64).wrapping_mul(FNV_PRIME));
        (hash % self.dims as u64) as usize
    }
}

impl EmbeddingProvider for HashEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let text = prepare_input(text)?;
        let mut v = vec![0.0f32; self.dims];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            v[self.bucket(&token.to_lowercase())] += 1.0;
        }
        Ok(l2_normalize(v))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// L2-normalize a vector. A zero vector is returned unchanged.
fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}
