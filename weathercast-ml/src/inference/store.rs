//! Shared, atomically reloadable artifact bundle for a serving process.

use crate::artifact::ArtifactPaths;
use crate::error::PipelineError;
use crate::inference::applier::{InferenceRequest, Prediction, apply};
use crate::inference::bundle::ArtifactBundle;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Holds the current bundle for concurrent readers.
///
/// A reload loads a complete bundle off to the side and swaps the `Arc` in a
/// single write; readers that took a [`snapshot`](Self::snapshot) before the
/// swap keep using the old triple until they drop it.
#[derive(Debug)]
pub struct ArtifactStore {
    paths: ArtifactPaths,
    current: RwLock<Option<Arc<ArtifactBundle>>>,
    generation: AtomicU64,
}

impl ArtifactStore {
    /// A store with nothing loaded yet.
    pub fn new(dir: &Path) -> Self {
        Self {
            paths: ArtifactPaths::in_dir(dir),
            current: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// A store with the bundle in `dir` already loaded.
    pub fn open(dir: &Path) -> Result<Self, PipelineError> {
        let store = Self::new(dir);
        store.reload()?;
        Ok(store)
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// Number of successful installs so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Load the bundle from disk and install it.
    ///
    /// On failure the previously installed bundle stays in place.
    pub fn reload(&self) -> Result<u64, PipelineError> {
        match ArtifactBundle::load(&self.paths) {
            Ok(bundle) => self.install(bundle),
            Err(e) => {
                tracing::warn!(error = %e, "Artifact reload failed, keeping current bundle");
                Err(e)
            }
        }
    }

    /// Swap in a bundle. Returns the new generation.
    pub fn install(&self, bundle: ArtifactBundle) -> Result<u64, PipelineError> {
        let bundle_id = bundle.bundle_id().to_string();
        let mut current = self
            .current
            .write()
            .map_err(|_| PipelineError::artifacts_unavailable("artifact store lock poisoned"))?;
        *current = Some(Arc::new(bundle));
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        drop(current);

        tracing::info!(bundle_id = %bundle_id, generation, "Installed artifact bundle");
        Ok(generation)
    }

    /// The bundle in place right now.
    pub fn snapshot(&self) -> Result<Arc<ArtifactBundle>, PipelineError> {
        let current = self
            .current
            .read()
            .map_err(|_| PipelineError::artifacts_unavailable("artifact store lock poisoned"))?;
        current
            .clone()
            .ok_or_else(|| PipelineError::artifacts_unavailable("no artifact bundle loaded"))
    }

    /// Predict with the current bundle.
    pub fn predict(&self, request: &InferenceRequest) -> Result<Prediction, PipelineError> {
        let bundle = self.snapshot()?;
        apply(&bundle, request)
    }
}
