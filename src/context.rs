//! Execution Contexts
//!
//! Every read or write against a [`ContextSlot`](crate::ContextSlot) is keyed by
//! the [`ContextId`] of the caller. A native thread gets one identity on first
//! use; an async task run under [`Snapshot::scope`] (or [`spawn`]) carries its
//! own identity in a tokio task-local, which takes precedence while the task is
//! being polled.

mod snapshot;

pub use snapshot::Snapshot;

use crate::slot::registry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use tracing::{debug, trace};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

static THREAD_SPAWN_POLICY: AtomicU8 = AtomicU8::new(ThreadSpawnPolicy::Empty as u8);

tokio::task_local! {
    pub(crate) static TASK_CONTEXT: ContextId;
}

thread_local! {
    static THREAD_CONTEXT: ThreadContext = ThreadContext::new();
}

/// Identity of one logical execution context (a thread or a scoped task)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    pub(crate) fn next() -> Self {
        ContextId(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// The identity owned by a native thread. Dropped with the thread's locals,
/// at which point its entries are removed from every live slot.
struct ThreadContext {
    id: ContextId,
}

impl ThreadContext {
    fn new() -> Self {
        let id = ContextId::next();
        trace!(context = %id, "Allocated thread context");
        Self { id }
    }
}

impl Drop for ThreadContext {
    fn drop(&mut self) {
        let removed = registry::forget_all(self.id);
        if removed > 0 {
            debug!(context = %self.id, removed, "Reclaimed thread context entries");
        }
    }
}

/// Whether a thread started with [`spawn_thread`] sees a copy of its parent's
/// entries or starts with none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadSpawnPolicy {
    #[default]
    Empty = 0,
    Inherit = 1,
}

impl ThreadSpawnPolicy {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => ThreadSpawnPolicy::Inherit,
            _ => ThreadSpawnPolicy::Empty,
        }
    }
}

/// Identity of the calling context.
///
/// Inside a task scope this is the task's identity, otherwise the current
/// thread's. While the thread's locals are being torn down a fresh, throwaway
/// identity is returned, so late writes are isolated and simply lost.
pub fn current() -> ContextId {
    if let Ok(id) = TASK_CONTEXT.try_with(|id| *id) {
        return id;
    }
    THREAD_CONTEXT.try_with(|ctx| ctx.id).unwrap_or_else(|_| {
        let id = ContextId::next();
        trace!(context = %id, "Thread context torn down; using ephemeral context");
        id
    })
}

/// True while running inside [`Snapshot::scope`] or [`Snapshot::run`].
pub fn in_scope() -> bool {
    TASK_CONTEXT.try_with(|_| ()).is_ok()
}

pub fn thread_spawn_policy() -> ThreadSpawnPolicy {
    ThreadSpawnPolicy::from_u8(THREAD_SPAWN_POLICY.load(Ordering::Relaxed))
}

pub fn set_thread_spawn_policy(policy: ThreadSpawnPolicy) {
    debug!(?policy, "Thread spawn policy set");
    THREAD_SPAWN_POLICY.store(policy as u8, Ordering::Relaxed);
}

/// Spawn a tokio task that starts with a snapshot of the caller's entries.
///
/// Must be called from within a tokio runtime.
pub fn spawn<F>(future: F) -> tokio::task::JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(Snapshot::capture().scope(future))
}

/// Spawn a native thread whose starting entries follow [`thread_spawn_policy`].
pub fn spawn_thread<F, R>(f: F) -> std::thread::JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    match thread_spawn_policy() {
        ThreadSpawnPolicy::Empty => std::thread::spawn(f),
        ThreadSpawnPolicy::Inherit => {
            let snapshot = Snapshot::capture();
            std::thread::spawn(move || snapshot.run(f))
        }
    }
}
