//! Process-wide, build-once cache of the taxiway network.

use crate::error::Result;
use crate::graph::TaxiwayGraph;
use crate::tables;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

/// Where the reference tables live.
#[derive(Debug, Clone)]
pub struct NetworkSource {
    pub vertex_file: PathBuf,
    pub segment_file: PathBuf,
}

impl NetworkSource {
    pub fn new(vertex_file: impl AsRef<Path>, segment_file: impl AsRef<Path>) -> Self {
        Self {
            vertex_file: vertex_file.as_ref().to_path_buf(),
            segment_file: segment_file.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self) -> Result<TaxiwayGraph> {
        tracing::info!(
            "Loading taxiway network from {} and {}",
            self.vertex_file.display(),
            self.segment_file.display()
        );
        let vertices = tables::read_vertices_from_path(&self.vertex_file)?;
        let segments = tables::read_segments_from_path(&self.segment_file)?;
        Ok(TaxiwayGraph::build(vertices, &segments))
    }
}

/// Holds the network once it has been built.
///
/// Only the first successful build is kept; a failed build leaves the cache
/// empty so a later call can retry. Readers never take the lock once the
/// network is available.
#[derive(Debug, Default)]
pub struct NetworkCache {
    graph: OnceLock<Arc<TaxiwayGraph>>,
    build_lock: Mutex<()>,
}

impl NetworkCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached network, if already built.
    pub fn get(&self) -> Option<Arc<TaxiwayGraph>> {
        self.graph.get().cloned()
    }

    pub fn is_built(&self) -> bool {
        self.graph.get().is_some()
    }

    /// Return the network, running `build` if it has not been built yet.
    ///
    /// Concurrent callers are serialized on the first build; `build` runs at
    /// most once per successful initialization.
    pub fn ensure_built<F>(&self, build: F) -> Result<Arc<TaxiwayGraph>>
    where
        F: FnOnce() -> Result<TaxiwayGraph>,
    {
        if let Some(graph) = self.graph.get() {
            return Ok(graph.clone());
        }

        let _guard = self
            .build_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(graph) = self.graph.get() {
            return Ok(graph.clone());
        }

        let graph = Arc::new(build()?);
        Ok(self.graph.get_or_init(|| graph).clone())
    }

    /// [`NetworkCache::ensure_built`] reading the tables named by `source`.
    pub fn ensure_loaded(&self, source: &NetworkSource) -> Result<Arc<TaxiwayGraph>> {
        self.ensure_built(|| source.load())
    }
}
