//! Process-wide list of live slots.
//!
//! Snapshot and reclaim steps act on "every slot the context has an entry
//! in", so each slot registers a weak handle of itself here on construction.
//! Dead handles are pruned on the next registration.

use super::SlotId;
use crate::context::ContextId;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use tracing::trace;

/// Type-erased view of one slot's per-context entries
pub(crate) trait ContextEntries: Send + Sync {
    fn slot_id(&self) -> SlotId;

    /// Copy the parent's entry (if any) into the child. True if copied.
    fn inherit(&self, parent: ContextId, child: ContextId) -> bool;

    /// Remove the context's entry. True if one existed.
    fn forget(&self, context: ContextId) -> bool;
}

static SLOTS: RwLock<Vec<Weak<dyn ContextEntries>>> = parking_lot::const_rwlock(Vec::new());

pub(crate) fn register(slot: Weak<dyn ContextEntries>) {
    let mut slots = SLOTS.write();
    slots.retain(|s| s.strong_count() > 0);
    slots.push(slot);
    trace!(live = slots.len(), "Registered context slot");
}

/// Upgrade every live slot, releasing the list lock before the caller
/// touches any slot.
fn live() -> Vec<Arc<dyn ContextEntries>> {
    SLOTS.read().iter().filter_map(Weak::upgrade).collect()
}

pub(crate) fn inherit_all(parent: ContextId, child: ContextId) -> usize {
    live()
        .iter()
        .filter(|slot| {
            let copied = slot.inherit(parent, child);
            if copied {
                trace!(slot = %slot.slot_id(), parent = %parent, child = %child, "Inherited entry");
            }
            copied
        })
        .count()
}

pub(crate) fn forget_all(context: ContextId) -> usize {
    live()
        .iter()
        .filter(|slot| slot.forget(context))
        .count()
}

/// Number of slots currently alive in the process.
pub fn live_slot_count() -> usize {
    SLOTS.read().iter().filter(|s| s.strong_count() > 0).count()
}
