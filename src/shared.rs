//! Shared Values
//!
//! Every value stored in a [`Namespace`](crate::Namespace) or
//! [`Stack`](crate::Stack) lives in a [`Shared`] cell. Handing out clones of the
//! cell (not of the value) is what lets a proxy and direct access observe and
//! mutate one object.

use parking_lot::lock_api::{ArcRwLockReadGuard, ArcRwLockWriteGuard};
use parking_lot::{RawRwLock, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::sync::Arc;

/// Owned read guard over a shared value; keeps the cell alive.
pub type ReadGuard<T> = ArcRwLockReadGuard<RawRwLock, T>;

/// Owned write guard over a shared value; keeps the cell alive.
pub type WriteGuard<T> = ArcRwLockWriteGuard<RawRwLock, T>;

/// Reference-counted, interior-mutable handle to one stored value
pub struct Shared<T> {
    cell: Arc<RwLock<T>>,
}

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self {
            cell: Arc::new(RwLock::new(value)),
        }
    }

    /// Borrow the value for reading.
    ///
    /// Read locks are taken recursively so comparing a value with itself
    /// (for example through two proxies bound to one cell) cannot deadlock
    /// behind a queued writer.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.cell.read_recursive()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.cell.write()
    }

    pub fn read_owned(&self) -> ReadGuard<T> {
        self.cell.read_arc()
    }

    pub fn write_owned(&self) -> WriteGuard<T> {
        self.cell.write_arc()
    }

    /// Identity comparison: true when both handles point at the same cell.
    pub fn ptr_eq(a: &Shared<T>, b: &Shared<T>) -> bool {
        Arc::ptr_eq(&a.cell, &b.cell)
    }

    /// Replace the stored value, returning the old one.
    pub fn replace(&self, value: T) -> T {
        std::mem::replace(&mut *self.cell.write(), value)
    }

    /// Number of live handles to this cell.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.cell)
    }
}

impl<T: Clone> Shared<T> {
    /// Clone the current value out of the cell.
    pub fn get(&self) -> T {
        self.read().clone()
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T> From<T> for Shared<T> {
    fn from(value: T) -> Self {
        Shared::new(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&*self.read()).finish()
    }
}
