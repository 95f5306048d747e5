//! ctxlocal: Context-Scoped Storage
//!
//! Storage whose contents are visible only to the execution context (native
//! thread or async task) that wrote them, plus a transparent [`Proxy`] that
//! resolves a value from such storage on every access.
//!
//! - [`ContextSlot`]: one payload per context
//! - [`Namespace`]: string-keyed mapping per context
//! - [`Stack`]: LIFO sequence per context
//! - [`Proxy`]: forwards operations to whatever its resolver returns now
//! - [`release`]: drop the calling context's entry
//! - [`LocalManager`]: release a group of storages together
//!
//! Tasks get a fresh context when run under a [`Snapshot`], which copies the
//! parent's entries at spawn time; see [`context::spawn`].

pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod namespace;
pub mod proxy;
pub mod release;
pub mod shared;
pub mod slot;
pub mod stack;

pub use context::{ContextId, Snapshot};
pub use error::LocalError;
pub use namespace::Namespace;
pub use proxy::{Op, Proxy};
pub use release::{release, LocalManager, Release};
pub use shared::Shared;
pub use slot::ContextSlot;
pub use stack::Stack;
