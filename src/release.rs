//! Releasing the calling context's entry.

use crate::namespace::Namespace;
use crate::slot::ContextSlot;
use crate::stack::Stack;
use tracing::debug;

/// Storage that can drop the calling context's entry
pub trait Release {
    /// Clear the calling context's entry. True if one existed.
    fn release_current(&self) -> bool;
}

impl<T> Release for ContextSlot<T> {
    fn release_current(&self) -> bool {
        self.clear().is_some()
    }
}

impl<T> Release for Namespace<T> {
    fn release_current(&self) -> bool {
        self.slot().release_current()
    }
}

impl<T> Release for Stack<T> {
    fn release_current(&self) -> bool {
        self.slot().release_current()
    }
}

/// Clear the calling context's entry in `obj`. Releasing twice, or releasing
/// something the context never wrote to, does nothing.
pub fn release<R: Release + ?Sized>(obj: &R) {
    if obj.release_current() {
        debug!("Released context entry");
    }
}

/// A group of storages released together, typically at the end of each
/// unit of work (a request, a job) in whatever context ran it.
#[derive(Default)]
pub struct LocalManager {
    locals: Vec<Box<dyn Release + Send + Sync>>,
}

impl LocalManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a storage handle. Handles are clones that share the original's
    /// entries.
    pub fn with(mut self, local: impl Release + Send + Sync + 'static) -> Self {
        self.push(local);
        self
    }

    pub fn push(&mut self, local: impl Release + Send + Sync + 'static) {
        self.locals.push(Box::new(local));
    }

    pub fn len(&self) -> usize {
        self.locals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
    }

    /// Release the calling context's entry in every managed storage.
    /// Returns how many entries existed.
    pub fn cleanup(&self) -> usize {
        let released = self
            .locals
            .iter()
            .filter(|local| local.release_current())
            .count();
        debug!(released, managed = self.locals.len(), "Cleaned up context locals");
        released
    }

    /// Run `f`, then clean up the calling context even if `f` panics.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        let _cleanup = CleanupOnDrop(self);
        f()
    }
}

impl Release for LocalManager {
    fn release_current(&self) -> bool {
        self.cleanup() > 0
    }
}

struct CleanupOnDrop<'a>(&'a LocalManager);

impl Drop for CleanupOnDrop<'_> {
    fn drop(&mut self) {
        self.0.cleanup();
    }
}
