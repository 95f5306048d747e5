//! Snapshot-at-spawn: the explicit copy step that gives a child context an
//! independent view of its parent's entries.

use super::{current, ContextId, TASK_CONTEXT};
use crate::slot::registry;
use std::future::Future;
use tracing::debug;

/// A child context, ready to be entered by a task or a closure.
///
/// Capturing copies the parent's entry of every live slot into the child at
/// that instant; later writes on either side are invisible to the other.
/// When the snapshot (or the scope it was moved into) is dropped, the child's
/// entries are removed again.
#[derive(Debug)]
pub struct Snapshot {
    parent: Option<ContextId>,
    inherited: usize,
    guard: ContextGuard,
}

impl Snapshot {
    /// Snapshot the calling context.
    pub fn capture() -> Self {
        let parent = current();
        let child = ContextId::next();
        let inherited = registry::inherit_all(parent, child);
        debug!(parent = %parent, child = %child, inherited, "Captured context snapshot");
        Self {
            parent: Some(parent),
            inherited,
            guard: ContextGuard { id: child },
        }
    }

    /// A new context with no entries at all.
    pub fn empty() -> Self {
        let child = ContextId::next();
        debug!(child = %child, "Created empty context");
        Self {
            parent: None,
            inherited: 0,
            guard: ContextGuard { id: child },
        }
    }

    pub fn id(&self) -> ContextId {
        self.guard.id
    }

    pub fn parent(&self) -> Option<ContextId> {
        self.parent
    }

    /// Number of slots that had an entry to copy at capture time.
    pub fn inherited(&self) -> usize {
        self.inherited
    }

    /// Run a closure inside the child context.
    pub fn run<F, R>(self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let id = self.guard.id;
        let _guard = self.guard;
        TASK_CONTEXT.sync_scope(id, f)
    }

    /// Run a future inside the child context. The context is entered on every
    /// poll and reclaimed when the returned future completes or is dropped.
    pub fn scope<F>(self, future: F) -> impl Future<Output = F::Output>
    where
        F: Future,
    {
        let id = self.guard.id;
        let guard = self.guard;
        async move {
            let _guard = guard;
            TASK_CONTEXT.scope(id, future).await
        }
    }
}

/// Owns a child identity; removes its entries from every slot on drop.
#[derive(Debug)]
struct ContextGuard {
    id: ContextId,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let removed = registry::forget_all(self.id);
        debug!(context = %self.id, removed, "Reclaimed context entries");
    }
}
