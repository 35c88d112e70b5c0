//! Run listeners
//!
//! Listeners are told about builds leaving the history. Registration is
//! append-only; notification iterates an immutable snapshot of the list, so a
//! listener registered during a notification sees only later events.

use crate::record::RunRecord;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Observer of build lifecycle events
pub trait RunListener: Send + Sync {
    /// A build was deleted from its job's history
    fn on_deleted(&self, run: &RunRecord);

    /// A build published its result
    fn on_completed(&self, _run: &RunRecord) {}
}

/// Append-only set of listeners
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<Arc<Vec<Arc<dyn RunListener>>>>,
}

impl ListenerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener
    pub fn register(&self, listener: Arc<dyn RunListener>) {
        let mut guard = self.listeners.write();
        let mut next = Vec::with_capacity(guard.len() + 1);
        next.extend(guard.iter().cloned());
        next.push(listener);
        *guard = Arc::new(next);
    }

    /// Current listeners
    pub fn snapshot(&self) -> Arc<Vec<Arc<dyn RunListener>>> {
        Arc::clone(&self.listeners.read())
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    /// Whether no listener is registered
    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    /// Tell every listener that `run` was deleted
    pub fn notify_deleted(&self, run: &RunRecord) {
        let listeners = self.snapshot();
        debug!(build = %run.display_name(), listeners = listeners.len(), "Notifying deletion");
        for listener in listeners.iter() {
            listener.on_deleted(run);
        }
    }

    /// Tell every listener that `run` completed
    pub fn notify_completed(&self, run: &RunRecord) {
        for listener in self.snapshot().iter() {
            listener.on_completed(run);
        }
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}
