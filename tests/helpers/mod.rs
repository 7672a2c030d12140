#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use promptpilot::embedding::hash::HashEmbeddingProvider;
use promptpilot::embedding::EmbeddingProvider;
use promptpilot::memory::MemoryStore;
use promptpilot::{Error, Result};
use tempfile::TempDir;

/// Bucket count large enough that the words used in tests do not collide.
pub const TEST_DIMS: usize = 256;

/// Wraps the hash provider and counts calls to `embed`.
pub struct CountingProvider {
    inner: HashEmbeddingProvider,
    calls: AtomicUsize,
}

impl CountingProvider {
    pub fn new(dims: usize) -> Self {
        Self {
            inner: HashEmbeddingProvider::new(dims).unwrap(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for CountingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed(text)
    }

    fn model_name(&self) -> &str {
        "counting"
    }
}

/// Fails every call with a provider error.
pub struct FailingProvider;

impl EmbeddingProvider for FailingProvider {
    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::Provider("service unavailable".into()))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

/// Hash embeddings that can be switched to fail mid-test.
pub struct SwitchableProvider {
    inner: HashEmbeddingProvider,
    failing: AtomicBool,
}

impl SwitchableProvider {
    pub fn new(dims: usize) -> Self {
        Self {
            inner: HashEmbeddingProvider::new(dims).unwrap(),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl EmbeddingProvider for SwitchableProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Provider("service unavailable".into()));
        }
        self.inner.embed(text)
    }

    fn model_name(&self) -> &str {
        "switchable"
    }
}

/// Probes fine (returns `dims`-length vectors for the dimension probe) but
/// returns a vector of the wrong length for everything else.
pub struct WrongLengthProvider {
    pub dims: usize,
}

impl EmbeddingProvider for WrongLengthProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text == "initial_dimension_check" {
            Ok(vec![0.5; self.dims])
        } else {
            Ok(vec![0.5; self.dims + 1])
        }
    }

    fn model_name(&self) -> &str {
        "wrong-length"
    }
}

/// A store in a fresh temp dir backed by the hash provider.
pub fn hash_store() -> (TempDir, MemoryStore) {
    store_with(Arc::new(HashEmbeddingProvider::new(TEST_DIMS).unwrap()))
}

pub fn store_with(provider: Arc<dyn EmbeddingProvider>) -> (TempDir, MemoryStore) {
    let tmp = TempDir::new().unwrap();
    let store = MemoryStore::new(tmp.path(), provider);
    (tmp, store)
}
