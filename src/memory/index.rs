//! Flat L2 similarity index.
//!
//! Thin wrapper over `hora`'s brute-force index: exact nearest-neighbour search
//! by Euclidean distance, with the library's own binary dump format on disk.
//! The wrapper tracks the entry count and dimension itself and converts the
//! library's panicking load/dump paths into errors.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use hora::core::ann_index::{ANNIndex, SerializableIndex};
use hora::core::metrics::Metric;
use hora::index::bruteforce_idx::BruteForceIndex;
use hora::index::bruteforce_params::BruteForceParams;

use crate::error::{Error, Result};

pub struct VectorIndex {
    inner: BruteForceIndex<f32, usize>,
    dimension: usize,
    len: usize,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("dimension", &self.dimension)
            .field("len", &self.len)
            .finish()
    }
}

/// Run a library call that reports failure by panicking as well as by `Err`.
fn guarded<R>(
    op: &str,
    f: impl FnOnce() -> std::result::Result<R, &'static str>,
) -> std::result::Result<R, String> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(format!("{op}: {e}")),
        Err(payload) => {
            let msg = payload
                .downcast_ref::<String>()
                .map(String::as_str)
                .or_else(|| payload.downcast_ref::<&str>().copied())
                .unwrap_or("panic");
            Err(format!("{op}: {msg}"))
        }
    }
}

fn path_str(path: &Path) -> std::result::Result<&str, String> {
    path.to_str()
        .ok_or_else(|| format!("index path is not valid UTF-8: {}", path.display()))
}

impl VectorIndex {
    /// Create an empty index for vectors of `dimension` floats.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::Index("dimension must be at least 1".into()));
        }
        let mut inner = BruteForceIndex::new(dimension, &BruteForceParams::default());
        inner.build(Metric::Euclidean).map_err(|e| Error::Index(e.into()))?;
        Ok(Self {
            inner,
            dimension,
            len: 0,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert `vector` under `id`.
    pub fn add(&mut self, id: usize, vector: &[f32]) -> Result<()> {
        self.check_dimension(vector)?;
        self.inner
            .add(vector, id)
            .map_err(|e| Error::Index(e.into()))?;
        self.len += 1;
        Ok(())
    }

    /// A copy of this index with `vector` added under `id`; `self` is untouched.
    ///
    /// Existing entries are re-inserted in id order.
    pub fn with_entry(&self, id: usize, vector: &[f32]) -> Result<Self> {
        self.check_dimension(vector)?;
        let mut next = Self::new(self.dimension)?;
        for (existing, stored) in self.entries() {
            next.add(existing, &stored)?;
        }
        next.add(id, vector)?;
        Ok(next)
    }

    /// Every stored `(id, vector)` pair, sorted by id.
    fn entries(&self) -> Vec<(usize, Vec<f32>)> {
        if self.len == 0 {
            return Vec::new();
        }
        let origin = vec![0.0f32; self.dimension];
        let mut entries: Vec<(usize, Vec<f32>)> = self
            .inner
            .search_nodes(&origin, self.len)
            .into_iter()
            .filter_map(|(node, _)| node.idx().as_ref().map(|&id| (id, node.vectors().clone())))
            .collect();
        entries.sort_by_key(|(id, _)| *id);
        entries
    }

    /// The `k` nearest ids to `query`, closest first, with their distances.
    ///
    /// `k` is clamped to the number of stored vectors. Entries the library
    /// returns without an id are skipped.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        self.check_dimension(query)?;
        let k = k.min(self.len);
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut hits: Vec<(usize, f32)> = self
            .inner
            .search_nodes(query, k)
            .into_iter()
            .filter_map(|(node, distance)| node.idx().as_ref().map(|&id| (id, distance)))
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(hits)
    }

    /// Write the index to `path` in the library's binary format.
    ///
    /// The dump goes to a temporary sibling first and is renamed into place.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        let tmp_path = path.with_extension("tmp");
        let tmp = path_str(&tmp_path).map_err(Error::Index)?.to_string();
        let inner = &mut self.inner;
        guarded("dump", || inner.dump(&tmp)).map_err(Error::Index)?;
        std::fs::rename(&tmp_path, path).map_err(|e| Error::storage(path, e))
    }

    /// Read an index written by [`save`](Self::save).
    ///
    /// `expected_len` is the corpus size the index is meant to pair with; the
    /// loaded entry count is measured against it (up to one past it).
    pub fn load(path: &Path, expected_len: usize) -> std::result::Result<Self, String> {
        let p = path_str(path)?;
        let mut inner = guarded("load", || BruteForceIndex::<f32, usize>::load(p))?;
        let dimension = inner.dimension();
        if dimension == 0 {
            return Err("stored index has dimension 0".into());
        }
        inner.build(Metric::Euclidean).map_err(|e| format!("build: {e}"))?;

        let probe = vec![0.0f32; dimension];
        let inner_ref = &inner;
        let len = guarded("count", || {
            Ok(inner_ref.search_nodes(&probe, expected_len + 1).len())
        })?;

        Ok(Self {
            inner,
            dimension,
            len,
        })
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}
