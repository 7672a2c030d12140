//! Per-project memory: embed, index, persist, recall, wipe.
//!
//! [`MemoryStore`] owns the base directory and the embedding provider and hands
//! out one [`ProjectMemory`] per project id. A handle is single-owner: mutations
//! take `&mut self`, and nothing coordinates two handles (or two processes) on
//! the same project.
//!
//! Persisted state is treated like a cache. Anything wrong with it on open
//! (missing, half-written, corrupt, built for another embedding dimension, or
//! a provider that cannot confirm the dimension) is logged and replaced with
//! an empty memory rather than reported. The files themselves are left alone
//! until the next successful `add` overwrites them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use super::index::VectorIndex;
use super::persist::{self, Corpus, LoadError, State};
use crate::config::PilotConfig;
use crate::embedding::{self, EmbeddingProvider};
use crate::error::{Error, Result};

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recall {
    pub id: usize,
    pub text: String,
    /// Distance reported by the index; smaller is closer.
    pub distance: f32,
}

/// Factory for project memories sharing a base directory and provider.
#[derive(Clone)]
pub struct MemoryStore {
    base_dir: PathBuf,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl MemoryStore {
    pub fn new(base_dir: impl Into<PathBuf>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            base_dir: base_dir.into(),
            embedder,
        }
    }

    /// Build a store rooted at the configured directory with the configured provider.
    pub fn from_config(config: &PilotConfig) -> Result<Self> {
        let provider = embedding::create_provider(config)?;
        Ok(Self::new(config.resolved_store_dir(), Arc::from(provider)))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Open (load or initialise) the memory for `project_id`.
    pub fn open(&self, project_id: &str) -> Result<ProjectMemory> {
        ProjectMemory::open(&self.base_dir, project_id, Arc::clone(&self.embedder))
    }

    /// Whether `project_id` has a directory under the base directory.
    ///
    /// Unlike [`open`](Self::open), this never creates anything.
    pub fn exists(&self, project_id: &str) -> Result<bool> {
        validate_project_id(project_id)?;
        Ok(self.base_dir.join(project_id).is_dir())
    }

    /// Names of the project directories under the base directory, sorted.
    pub fn list_projects(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.base_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::storage(&self.base_dir, e)),
        };

        let mut projects = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::storage(&self.base_dir, e))?;
            if entry.path().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    projects.push(name.to_string());
                }
            }
        }
        projects.sort();
        Ok(projects)
    }
}

/// Project ids are used verbatim as directory names.
pub fn validate_project_id(project_id: &str) -> Result<()> {
    if project_id.trim().is_empty() {
        return Err(Error::InvalidInput(
            "project_id must be a non-empty string".into(),
        ));
    }
    if project_id == "." || project_id == ".." || project_id.contains(['/', '\\']) {
        return Err(Error::InvalidInput(format!(
            "project_id must be a single path component, got {project_id:?}"
        )));
    }
    Ok(())
}

/// The memory of one project: a similarity index plus the texts behind it.
pub struct ProjectMemory {
    project_id: String,
    dir: PathBuf,
    index: VectorIndex,
    corpus: Corpus,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl std::fmt::Debug for ProjectMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectMemory")
            .field("project_id", &self.project_id)
            .field("dir", &self.dir)
            .field("entries", &self.corpus.len())
            .field("dimension", &self.index.dimension())
            .finish()
    }
}

impl ProjectMemory {
    /// Open the memory of `project_id` under `base_dir`.
    ///
    /// Creates the project directory if needed, then loads what is on disk or
    /// falls back to an empty memory. Only an invalid id or an uncreatable
    /// directory make this fail.
    pub fn open(
        base_dir: &Path,
        project_id: &str,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        validate_project_id(project_id)?;

        let dir = base_dir.join(project_id);
        std::fs::create_dir_all(&dir).map_err(|e| Error::storage(&dir, e))?;

        let State { index, corpus } = match load_state(&dir, embedder.as_ref()) {
            Ok(state) => {
                tracing::debug!(
                    project = %project_id,
                    count = state.corpus.len(),
                    dimension = state.index.dimension(),
                    "memory loaded"
                );
                state
            }
            Err(LoadError::NotFound) => {
                tracing::debug!(project = %project_id, "no persisted memory, starting empty");
                empty_state(embedder.as_ref())?
            }
            Err(
                e @ (LoadError::Incomplete { .. }
                | LoadError::Io { .. }
                | LoadError::Corpus(_)
                | LoadError::Index(_)
                | LoadError::RaggedCorpus { .. }
                | LoadError::NonSequentialIds { .. }
                | LoadError::CountMismatch { .. }),
            ) => {
                tracing::warn!(
                    project = %project_id,
                    error = %e,
                    "persisted memory is unusable, re-initialising"
                );
                empty_state(embedder.as_ref())?
            }
            Err(e @ (LoadError::DimensionMismatch { .. } | LoadError::ProbeFailed(_))) => {
                tracing::warn!(
                    project = %project_id,
                    error = %e,
                    "embedding dimension changed or unknown, discarding memory"
                );
                empty_state(embedder.as_ref())?
            }
        };

        Ok(Self {
            project_id: project_id.to_string(),
            dir,
            index,
            corpus,
            embedder,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Directory holding this project's files.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Number of stored texts.
    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    /// Embedding dimension the index was built with.
    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// Stored texts in insertion order.
    pub fn texts(&self) -> &[String] {
        &self.corpus.texts
    }

    /// Embed `text`, append it, and persist both files before returning.
    ///
    /// The handle only changes once both files are written; on any error the
    /// memory is exactly as it was before the call.
    pub fn add(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Err(Error::InvalidInput(
                "memory text must be a non-empty string".into(),
            ));
        }

        let vector = self.embedder.embed(text)?;
        let id = self.corpus.next_id();
        let mut index = self.index.with_entry(id, &vector)?;
        let mut corpus = self.corpus.clone();
        corpus.push(id, text.to_string());

        persist::save(&self.dir, &mut index, &corpus)?;
        self.index = index;
        self.corpus = corpus;

        tracing::info!(
            project = %self.project_id,
            id,
            count = self.corpus.len(),
            "memory added"
        );
        Ok(())
    }

    /// The up-to-`k` stored texts closest to `query`, nearest first.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<String>> {
        Ok(self
            .search_scored(query, k)?
            .into_iter()
            .map(|r| r.text)
            .collect())
    }

    /// Like [`search`](Self::search), keeping ids and distances.
    ///
    /// An empty memory or `k == 0` returns nothing without calling the provider.
    /// Equal distances come back in the index's iteration order.
    pub fn search_scored(&self, query: &str, k: usize) -> Result<Vec<Recall>> {
        if query.is_empty() {
            return Err(Error::InvalidInput(
                "search query must be a non-empty string".into(),
            ));
        }
        if self.index.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed(query)?;
        let hits = self.index.search(&vector, k.min(self.corpus.len()))?;

        Ok(hits
            .into_iter()
            .filter_map(|(id, distance)| {
                self.corpus.text_for(id).map(|text| Recall {
                    id,
                    text: text.to_string(),
                    distance,
                })
            })
            .collect())
    }

    /// Wipe this project: remove its directory and reset to an empty memory.
    ///
    /// Removal failures are logged, not returned; the in-memory state is reset
    /// either way.
    pub fn delete(&mut self) {
        match persist::remove_dir(&self.dir) {
            Ok(true) => tracing::info!(
                project = %self.project_id,
                path = %self.dir.display(),
                "memory deleted"
            ),
            Ok(false) => tracing::info!(
                project = %self.project_id,
                path = %self.dir.display(),
                "no memory on disk, nothing to delete"
            ),
            Err(e) => tracing::error!(
                project = %self.project_id,
                path = %self.dir.display(),
                error = %e,
                "failed to delete memory directory"
            ),
        }

        let dimension = embedding::probe_dimension(self.embedder.as_ref());
        match VectorIndex::new(dimension) {
            Ok(index) => self.index = index,
            // Only reachable for a zero dimension; keep the old shape, drop the entries.
            Err(e) => {
                tracing::error!(error = %e, "could not size a fresh index, reusing dimension");
                if let Ok(index) = VectorIndex::new(self.index.dimension()) {
                    self.index = index;
                }
            }
        }
        self.corpus = Corpus::default();
    }

    pub(crate) fn corpus_file(&self) -> PathBuf {
        persist::text_data_path(&self.dir)
    }

    pub(crate) fn index_file(&self) -> PathBuf {
        persist::index_path(&self.dir)
    }
}

/// Load persisted state and check it against the provider's current dimension.
///
/// A provider that cannot be probed makes the loaded state unusable too.
fn load_state(dir: &Path, embedder: &dyn EmbeddingProvider) -> std::result::Result<State, LoadError> {
    let state = persist::load(dir)?;
    let current = embedding::try_probe_dimension(embedder)
        .map_err(|e| LoadError::ProbeFailed(e.to_string()))?;
    if current != state.index.dimension() {
        return Err(LoadError::DimensionMismatch {
            stored: state.index.dimension(),
            current,
        });
    }
    Ok(state)
}

fn empty_state(embedder: &dyn EmbeddingProvider) -> Result<State> {
    let dimension = embedding::probe_dimension(embedder);
    Ok(State {
        index: VectorIndex::new(dimension)?,
        corpus: Corpus::default(),
    })
}
