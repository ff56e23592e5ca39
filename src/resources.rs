//! Shared registry of renderer-produced artifacts
//!
//! The renderer writes compiled templates and manifests here between request
//! bursts; request-handling middleware reads them on every request. Rebuilds
//! replace the whole mapping atomically so an in-flight request never
//! observes a half-written registry.

use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;

/// One compiled artifact produced by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    /// A compiled page or app template
    Template(String),
    /// A build manifest (asset names, chunk maps, ...)
    Manifest(serde_json::Value),
}

/// Snapshot-swapped map of renderer artifacts.
///
/// Cloning the registry clones the handle, not the contents; all clones
/// observe the same swaps.
#[derive(Clone, Default)]
pub struct ResourceRegistry {
    inner: Arc<ArcSwap<HashMap<String, Resource>>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot of the whole registry.
    pub fn snapshot(&self) -> Arc<HashMap<String, Resource>> {
        self.inner.load_full()
    }

    /// Clone of a single resource from the current snapshot.
    pub fn get(&self, name: &str) -> Option<Resource> {
        self.inner.load().get(name).cloned()
    }

    /// Atomically replace the whole registry with a rebuilt mapping.
    ///
    /// This is the only write path; keys are never mutated in place.
    pub fn swap(&self, resources: HashMap<String, Resource>) {
        self.inner.store(Arc::new(resources));
    }

    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.load().len()
    }
}
