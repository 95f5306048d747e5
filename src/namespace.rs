//! Context-scoped key/value namespace.

use crate::error::LocalError;
use crate::proxy::Proxy;
use crate::shared::Shared;
use crate::slot::ContextSlot;
use std::collections::HashMap;
use std::fmt;

type Entries<T> = HashMap<String, Shared<T>>;

/// A string-keyed mapping with one independent view per execution context.
///
/// Values are stored in [`Shared`] cells: `get` hands out the cell, so
/// mutating through it (or through a proxy from [`bind`](Self::bind)) changes
/// the stored object. A child task inherits a shallow copy of the mapping: the
/// keys are its own, the cells are shared until rebound.
pub struct Namespace<T> {
    slot: ContextSlot<Entries<T>>,
}

impl<T: Send + Sync + 'static> Namespace<T> {
    pub fn new() -> Self {
        Self::from_slot(ContextSlot::new())
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::from_slot(ContextSlot::named(name))
    }
}

impl<T: Send + Sync + 'static> Default for Namespace<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Namespace<T> {
    /// Build a namespace on an existing slot. Namespaces built on clones of
    /// one slot see the same entries.
    pub fn from_slot(slot: ContextSlot<Entries<T>>) -> Self {
        Self { slot }
    }

    pub fn slot(&self) -> &ContextSlot<Entries<T>> {
        &self.slot
    }

    /// The cell stored under `key` in the calling context.
    pub fn get(&self, key: &str) -> Result<Shared<T>, LocalError> {
        self.lookup(key).ok_or_else(|| LocalError::not_found(key))
    }

    pub(crate) fn lookup(&self, key: &str) -> Option<Shared<T>> {
        self.slot
            .with(|entries| entries.and_then(|map| map.get(key).cloned()))
    }

    /// Store `value` under `key` in a fresh cell, returning the cell.
    pub fn set(&self, key: impl Into<String>, value: T) -> Shared<T> {
        let cell = Shared::new(value);
        self.set_shared(key, cell.clone());
        cell
    }

    /// Bind `key` to an existing cell.
    pub fn set_shared(&self, key: impl Into<String>, cell: Shared<T>) {
        let key = key.into();
        self.slot.update(|entry| {
            entry.get_or_insert_with(HashMap::new).insert(key, cell);
        });
    }

    /// Remove `key`, returning its cell.
    pub fn delete(&self, key: &str) -> Result<Shared<T>, LocalError> {
        self.slot
            .update(|entry| entry.as_mut().and_then(|map| map.remove(key)))
            .ok_or_else(|| LocalError::not_found(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slot
            .with(|entries| entries.is_some_and(|map| map.contains_key(key)))
    }

    /// Keys bound in the calling context, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .slot
            .with(|entries| entries.map(|map| map.keys().cloned().collect()))
            .unwrap_or_default();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.slot.with(|entries| entries.map_or(0, HashMap::len))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A proxy that looks `key` up in this namespace on every access.
    pub fn bind(&self, key: impl Into<String>) -> Proxy<T>
    where
        T: Send + Sync + 'static,
    {
        Proxy::from_namespace(self, key)
    }
}

impl<T: Clone> Namespace<T> {
    /// Clone the value stored under `key`.
    pub fn get_value(&self, key: &str) -> Result<T, LocalError> {
        self.get(key).map(|cell| cell.get())
    }
}

impl<T> Clone for Namespace<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T> fmt::Debug for Namespace<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("slot", &self.slot)
            .field("keys", &self.keys())
            .finish()
    }
}
