//! On-disk layout of one project's memory.
//!
//! ```text
//! <base>/<project_id>/index.hora       library-native index dump
//! <base>/<project_id>/text_data.json   {"texts": [...], "ids": [...]}
//! ```
//!
//! [`load`] reports every way the pair can be unusable as a [`LoadError`];
//! the store decides what to do with each.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::index::VectorIndex;
use crate::error::{Error, Result};

pub const INDEX_FILE: &str = "index.hora";
pub const TEXT_DATA_FILE: &str = "text_data.json";

/// Insertion-ordered texts and the index ids they were stored under.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    pub texts: Vec<String>,
    #[serde(default)]
    pub ids: Vec<usize>,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Next id to assign: the current corpus length.
    pub fn next_id(&self) -> usize {
        self.texts.len()
    }

    pub fn push(&mut self, id: usize, text: String) {
        self.ids.push(id);
        self.texts.push(text);
    }

    /// Text stored under index id `id`, found by its position in the id list.
    pub fn text_for(&self, id: usize) -> Option<&str> {
        self.ids
            .iter()
            .position(|&stored| stored == id)
            .and_then(|pos| self.texts.get(pos))
            .map(String::as_str)
    }
}

/// A loaded, self-consistent index and corpus.
#[derive(Debug)]
pub struct State {
    pub index: VectorIndex,
    pub corpus: Corpus,
}

/// Why persisted memory could not be used.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("no persisted memory")]
    NotFound,

    #[error("{missing} is missing while {present} exists")]
    Incomplete {
        missing: &'static str,
        present: &'static str,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt text_data.json: {0}")]
    Corpus(#[from] serde_json::Error),

    #[error("corrupt index.hora: {0}")]
    Index(String),

    #[error("corpus has {texts} texts but {ids} ids")]
    RaggedCorpus { texts: usize, ids: usize },

    #[error("corpus ids are not 0..{len} in order")]
    NonSequentialIds { len: usize },

    #[error("index holds {index} vectors but corpus holds {corpus} texts")]
    CountMismatch { index: usize, corpus: usize },

    #[error("index dimension {stored} differs from provider dimension {current}")]
    DimensionMismatch { stored: usize, current: usize },

    #[error("could not determine provider dimension: {0}")]
    ProbeFailed(String),
}

pub fn index_path(dir: &Path) -> PathBuf {
    dir.join(INDEX_FILE)
}

pub fn text_data_path(dir: &Path) -> PathBuf {
    dir.join(TEXT_DATA_FILE)
}

/// Load the index and corpus stored in `dir`.
pub fn load(dir: &Path) -> std::result::Result<State, LoadError> {
    let index_path = index_path(dir);
    let text_path = text_data_path(dir);

    match (index_path.exists(), text_path.exists()) {
        (false, false) => return Err(LoadError::NotFound),
        (true, false) => {
            return Err(LoadError::Incomplete {
                missing: TEXT_DATA_FILE,
                present: INDEX_FILE,
            })
        }
        (false, true) => {
            return Err(LoadError::Incomplete {
                missing: INDEX_FILE,
                present: TEXT_DATA_FILE,
            })
        }
        (true, true) => {}
    }

    let corpus = read_corpus(&text_path)?;
    let index = VectorIndex::load(&index_path, corpus.len()).map_err(LoadError::Index)?;

    if index.len() != corpus.len() {
        return Err(LoadError::CountMismatch {
            index: index.len(),
            corpus: corpus.len(),
        });
    }

    Ok(State { index, corpus })
}

fn read_corpus(path: &Path) -> std::result::Result<Corpus, LoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut corpus: Corpus = serde_json::from_str(&contents)?;

    if corpus.ids.is_empty() && !corpus.texts.is_empty() {
        corpus.ids = (0..corpus.texts.len()).collect();
    }
    if corpus.ids.len() != corpus.texts.len() {
        return Err(LoadError::RaggedCorpus {
            texts: corpus.texts.len(),
            ids: corpus.ids.len(),
        });
    }
    if corpus.ids.iter().enumerate().any(|(pos, &id)| pos != id) {
        return Err(LoadError::NonSequentialIds { len: corpus.len() });
    }
    Ok(corpus)
}

/// Persist both files: the index first, then the corpus.
///
/// Each file is written to a temporary sibling and renamed into place. The
/// directory is recreated if it has been removed since the project was opened.
pub fn save(dir: &Path, index: &mut VectorIndex, corpus: &Corpus) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| Error::storage(dir, e))?;
    index.save(&index_path(dir))?;

    let text_path = text_data_path(dir);
    let tmp_path = text_path.with_extension("json.tmp");
    let json = serde_json::to_vec(corpus)?;
    std::fs::write(&tmp_path, json).map_err(|e| Error::storage(&tmp_path, e))?;
    std::fs::rename(&tmp_path, &text_path).map_err(|e| Error::storage(&text_path, e))?;
    Ok(())
}

/// Remove a project directory and everything in it.
///
/// Returns `Ok(false)` when there was nothing to remove.
pub fn remove_dir(dir: &Path) -> std::io::Result<bool> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Size of `path` in bytes, 0 when it does not exist.
pub fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
