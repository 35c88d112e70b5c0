//! Artifact manager factory chain
//!
//! Factories are consulted in registration order; the first that claims a
//! build supplies its manager. When none does, the build gets a
//! [`StandardArtifactManager`]. The choice is cached on the record, so a
//! factory registered later never rebinds a build that already has a
//! manager.
//!
//! Registration is append-only. Resolution iterates an immutable snapshot
//! of the chain taken under a read lock, so registering never waits for a
//! resolution in progress and vice versa.

use crate::manager::StandardArtifactManager;
use parking_lot::RwLock;
use runkeep_core::{ArtifactManager, Result};
use runkeep_history::RunRecord;
use std::sync::Arc;
use tracing::debug;

/// Supplies artifact managers for builds it recognises
pub trait ArtifactManagerFactory: Send + Sync {
    /// A manager for `run`, or `None` to let the next factory decide
    fn manager_for(&self, run: &RunRecord) -> Option<Arc<dyn ArtifactManager>>;
}

/// Ordered, append-only chain of factories
#[derive(Default)]
pub struct ArtifactManagerFactories {
    chain: RwLock<Arc<Vec<Arc<dyn ArtifactManagerFactory>>>>,
}

impl ArtifactManagerFactories {
    /// Empty chain (every build gets the standard manager)
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a factory at the end of the chain
    pub fn register(&self, factory: Arc<dyn ArtifactManagerFactory>) {
        let mut chain = self.chain.write();
        let mut next = Vec::with_capacity(chain.len() + 1);
        next.extend(chain.iter().cloned());
        next.push(factory);
        *chain = Arc::new(next);
    }

    /// Number of registered factories
    pub fn len(&self) -> usize {
        self.chain.read().len()
    }

    /// Whether no factory is registered
    pub fn is_empty(&self) -> bool {
        self.chain.read().is_empty()
    }

    /// Current chain
    pub fn snapshot(&self) -> Arc<Vec<Arc<dyn ArtifactManagerFactory>>> {
        Arc::clone(&self.chain.read())
    }

    /// Choose a manager for `run` without binding it
    pub fn pick(&self, run: &RunRecord) -> Arc<dyn ArtifactManager> {
        for factory in self.snapshot().iter() {
            if let Some(manager) = factory.manager_for(run) {
                return manager;
            }
        }
        Arc::new(StandardArtifactManager::new(run.dir()))
    }

    /// The manager bound to `run`, binding one on first access
    pub fn manager_for_run(&self, run: &RunRecord) -> Result<Arc<dyn ArtifactManager>> {
        run.artifact_manager_or_init(|run| {
            let manager = self.pick(run);
            debug!(build = %run.display_name(), manager = manager.name(), "Bound artifact manager");
            Ok(manager)
        })
    }
}

impl std::fmt::Debug for ArtifactManagerFactories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactManagerFactories")
            .field("factories", &self.len())
            .finish()
    }
}
