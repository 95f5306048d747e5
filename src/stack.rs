//! Context-scoped LIFO stack.

use crate::proxy::Proxy;
use crate::shared::Shared;
use crate::slot::ContextSlot;
use std::fmt;

/// A last-in-first-out sequence with one independent view per execution
/// context. Popping past empty returns `None` rather than failing; popping
/// the last element removes the context's entry.
pub struct Stack<T> {
    slot: ContextSlot<Vec<Shared<T>>>,
}

impl<T: Send + Sync + 'static> Stack<T> {
    pub fn new() -> Self {
        Self::from_slot(ContextSlot::new())
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::from_slot(ContextSlot::named(name))
    }

    /// A proxy resolving to the current top of the stack.
    pub fn proxy(&self) -> Proxy<T> {
        Proxy::from_stack(self)
    }
}

impl<T: Send + Sync + 'static> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Stack<T> {
    pub fn from_slot(slot: ContextSlot<Vec<Shared<T>>>) -> Self {
        Self { slot }
    }

    pub fn slot(&self) -> &ContextSlot<Vec<Shared<T>>> {
        &self.slot
    }

    /// Push `value` in a fresh cell, returning the cell.
    pub fn push(&self, value: T) -> Shared<T> {
        let cell = Shared::new(value);
        self.push_shared(cell.clone());
        cell
    }

    pub fn push_shared(&self, cell: Shared<T>) {
        self.slot
            .update(|entry| entry.get_or_insert_with(Vec::new).push(cell));
    }

    pub fn pop(&self) -> Option<Shared<T>> {
        self.slot.update(|entry| {
            let stack = entry.as_mut()?;
            let top = stack.pop();
            if stack.is_empty() {
                *entry = None;
            }
            top
        })
    }

    pub fn top(&self) -> Option<Shared<T>> {
        self.slot
            .with(|entry| entry.and_then(|stack| stack.last().cloned()))
    }

    pub fn len(&self) -> usize {
        self.slot.with(|entry| entry.map_or(0, Vec::len))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Stack<T> {
    /// Clone the value on top of the stack.
    pub fn top_value(&self) -> Option<T> {
        self.top().map(|cell| cell.get())
    }
}

impl<T> Clone for Stack<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("slot", &self.slot)
            .field("len", &self.len())
            .finish()
    }
}
