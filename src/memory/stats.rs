use serde::Serialize;
use std::path::PathBuf;

use super::persist;
use super::store::ProjectMemory;

/// Snapshot of one project's memory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryStats {
    pub project_id: String,
    pub entries: usize,
    pub dimension: usize,
    pub path: PathBuf,
    /// Size of the index file, 0 when nothing has been persisted.
    pub index_bytes: u64,
    pub corpus_bytes: u64,
}

impl ProjectMemory {
    /// Compute statistics for this project. Missing files count as zero bytes.
    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            project_id: self.project_id().to_string(),
            entries: self.len(),
            dimension: self.dimension(),
            path: self.path().to_path_buf(),
            index_bytes: persist::file_size(&self.index_file()),
            corpus_bytes: persist::file_size(&self.corpus_file()),
        }
    }
}
