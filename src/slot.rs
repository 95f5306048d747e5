//! Context Slots
//!
//! A [`ContextSlot`] holds one payload per execution context. Each instance
//! owns its own registry, so two slots never alias even when both are used
//! from the same contexts. The registry itself is the only synchronised
//! structure: a context only ever reads or writes its own entry.

pub(crate) mod registry;

pub use registry::live_slot_count;

use crate::context::{self, ContextId};
use parking_lot::RwLock;
use registry::ContextEntries;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::trace;

static NEXT_SLOT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one slot instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(u64);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot#{}", self.0)
    }
}

struct SlotInner<T> {
    id: SlotId,
    name: Option<String>,
    entries: RwLock<HashMap<ContextId, T>>,
}

impl<T: Clone + Send + Sync + 'static> ContextEntries for SlotInner<T> {
    fn slot_id(&self) -> SlotId {
        self.id
    }

    fn inherit(&self, parent: ContextId, child: ContextId) -> bool {
        let mut entries = self.entries.write();
        match entries.get(&parent).cloned() {
            Some(payload) => {
                entries.insert(child, payload);
                true
            }
            None => false,
        }
    }

    fn forget(&self, context: ContextId) -> bool {
        // Drop the payload after the lock is released.
        let removed = self.entries.write().remove(&context);
        removed.is_some()
    }
}

/// Per-context storage for one payload.
///
/// Cloning a `ContextSlot` yields another handle to the same registry.
/// Closures passed to [`with`](Self::with) and [`update`](Self::update) run
/// while the registry lock is held and must not access the same slot.
pub struct ContextSlot<T> {
    inner: Arc<SlotInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> ContextSlot<T> {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A slot with a diagnostic name (shown in `Debug` and trace events).
    pub fn named(name: impl Into<String>) -> Self {
        Self::build(Some(name.into()))
    }

    fn build(name: Option<String>) -> Self {
        let inner = Arc::new(SlotInner {
            id: SlotId(NEXT_SLOT_ID.fetch_add(1, Ordering::Relaxed)),
            name,
            entries: RwLock::new(HashMap::new()),
        });
        let weak: Weak<dyn ContextEntries> = Arc::downgrade(&inner) as Weak<dyn ContextEntries>;
        registry::register(weak);
        Self { inner }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for ContextSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ContextSlot<T> {
    pub fn id(&self) -> SlotId {
        self.inner.id
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// Borrow the calling context's payload, if any.
    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        let ctx = context::current();
        let entries = self.inner.entries.read_recursive();
        f(entries.get(&ctx))
    }

    /// Store a payload for the calling context only; returns the previous one.
    pub fn set(&self, value: T) -> Option<T> {
        let ctx = context::current();
        trace!(slot = %self.inner.id, context = %ctx, "Set slot entry");
        self.inner.entries.write().insert(ctx, value)
    }

    /// Mutate the calling context's entry in place. An entry left as `None`
    /// is removed.
    pub fn update<R>(&self, f: impl FnOnce(&mut Option<T>) -> R) -> R {
        let ctx = context::current();
        let mut entries = self.inner.entries.write();
        let mut entry = entries.remove(&ctx);
        let out = f(&mut entry);
        if let Some(payload) = entry {
            entries.insert(ctx, payload);
        }
        out
    }

    /// Remove the calling context's entry, returning it.
    pub fn clear(&self) -> Option<T> {
        let ctx = context::current();
        let removed = self.inner.entries.write().remove(&ctx);
        if removed.is_some() {
            trace!(slot = %self.inner.id, context = %ctx, "Cleared slot entry");
        }
        removed
    }

    pub fn is_set(&self) -> bool {
        self.with(|entry| entry.is_some())
    }

    /// Number of contexts that currently hold an entry.
    pub fn context_count(&self) -> usize {
        self.inner.entries.read().len()
    }
}

impl<T: Clone> ContextSlot<T> {
    /// The calling context's payload, cloned.
    pub fn get(&self) -> Option<T> {
        self.with(|entry| entry.cloned())
    }

    /// The calling context's payload, or `default` when unset.
    pub fn get_or(&self, default: T) -> T {
        self.get().unwrap_or(default)
    }
}

impl<T> Clone for ContextSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for ContextSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextSlot")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("contexts", &self.context_count())
            .finish()
    }
}
