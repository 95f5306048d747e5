//! Container, iteration and numeric-conversion forwarding.

use super::protocol::{AsIndex, Complex, Contains, Length, Numeric, RemoveItem, Sliceable};
use super::{Op, Proxy};
use crate::error::LocalError;
use crate::shared::Shared;
use std::ops::{Index, IndexMut, RangeBounds};

impl<T> Proxy<T> {
    pub fn len(&self) -> Result<usize, LocalError>
    where
        T: Length,
    {
        self.apply(Op::Len, Length::length)
    }

    pub fn is_empty(&self) -> Result<bool, LocalError>
    where
        T: Length,
    {
        self.len().map(|len| len == 0)
    }

    pub fn length_hint(&self) -> Result<usize, LocalError>
    where
        T: Length,
    {
        self.apply(Op::LengthHint, Length::length_hint)
    }

    pub fn contains<Q: ?Sized>(&self, item: &Q) -> Result<bool, LocalError>
    where
        T: Contains<Q>,
    {
        self.apply(Op::Contains, |target| target.contains_item(item))
    }

    /// Clone of `target[index]`.
    pub fn get_item<I>(&self, index: I) -> Result<T::Output, LocalError>
    where
        T: Index<I>,
        T::Output: Clone,
    {
        self.apply(Op::GetItem, |target| target[index].clone())
    }

    /// `target[index] = value`
    pub fn set_item<I>(&self, index: I, value: T::Output) -> Result<(), LocalError>
    where
        T: IndexMut<I>,
        T::Output: Sized,
    {
        self.apply_mut(Op::SetItem, |target| target[index] = value)
    }

    pub fn del_item<I>(&self, index: I) -> Result<T::Removed, LocalError>
    where
        T: RemoveItem<I>,
    {
        self.apply_mut(Op::DelItem, |target| target.remove_item(index))
    }

    pub fn get_slice<R>(&self, range: R) -> Result<Vec<T::Item>, LocalError>
    where
        T: Sliceable,
        R: RangeBounds<usize>,
    {
        self.apply(Op::GetSlice, |target| target.slice(range))
    }

    pub fn set_slice<R>(&self, range: R, items: Vec<T::Item>) -> Result<(), LocalError>
    where
        T: Sliceable,
        R: RangeBounds<usize>,
    {
        self.apply_mut(Op::SetSlice, |target| target.splice_in(range, items))
    }

    /// Items of the target in iteration order, taken from a copy.
    pub fn items(&self) -> Result<Vec<T::Item>, LocalError>
    where
        T: Clone + IntoIterator,
    {
        self.apply(Op::Iter, |target| target.clone().into_iter().collect())
    }

    /// Items of the target in reverse order, taken from a copy.
    pub fn items_rev(&self) -> Result<Vec<T::Item>, LocalError>
    where
        T: Clone + IntoIterator,
        T::IntoIter: DoubleEndedIterator,
    {
        self.apply(Op::IterRev, |target| target.clone().into_iter().rev().collect())
    }

    /// Iterate a target that is itself an iterator. Resolves once; the
    /// returned iterator advances the stored object.
    pub fn iter(&self) -> Result<ProxyIter<T>, LocalError>
    where
        T: Iterator,
    {
        self.bound(Op::Iter).map(|cell| ProxyIter { cell })
    }

    /// Advance an iterator target by one item.
    pub fn try_next(&self) -> Result<Option<T::Item>, LocalError>
    where
        T: Iterator,
    {
        self.apply_mut(Op::Next, Iterator::next)
    }

    /// The target's bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, LocalError>
    where
        T: AsRef<[u8]>,
    {
        self.apply(Op::Bytes, |target| target.as_ref().to_vec())
    }

    /// The target as an `i64`. Values outside its range, and NaN or
    /// infinite floats, fail with `OutOfRange`.
    pub fn to_int(&self) -> Result<i64, LocalError>
    where
        T: Numeric,
    {
        self.apply(Op::Int, Numeric::to_int)?
            .ok_or(LocalError::OutOfRange { op: Op::Int })
    }

    pub fn to_float(&self) -> Result<f64, LocalError>
    where
        T: Numeric,
    {
        self.apply(Op::Float, Numeric::to_float)
    }

    pub fn to_complex(&self) -> Result<Complex, LocalError>
    where
        T: Numeric,
    {
        self.apply(Op::Complex, Numeric::to_complex)
    }

    pub fn round(&self, ndigits: Option<i32>) -> Result<f64, LocalError>
    where
        T: Numeric,
    {
        self.apply(Op::Round, |target| target.round(ndigits))
    }

    pub fn trunc(&self) -> Result<i64, LocalError>
    where
        T: Numeric,
    {
        self.apply(Op::Trunc, Numeric::trunc)?
            .ok_or(LocalError::OutOfRange { op: Op::Trunc })
    }

    pub fn floor(&self) -> Result<i64, LocalError>
    where
        T: Numeric,
    {
        self.apply(Op::Floor, Numeric::floor)?
            .ok_or(LocalError::OutOfRange { op: Op::Floor })
    }

    pub fn ceil(&self) -> Result<i64, LocalError>
    where
        T: Numeric,
    {
        self.apply(Op::Ceil, Numeric::ceil)?
            .ok_or(LocalError::OutOfRange { op: Op::Ceil })
    }

    /// The target as a sequence index.
    pub fn index(&self) -> Result<isize, LocalError>
    where
        T: AsIndex,
    {
        self.apply(Op::Index, AsIndex::as_index)?
            .ok_or(LocalError::OutOfRange { op: Op::Index })
    }
}

/// Iterator over a stored iterator object. Holds the cell resolved when it
/// was created.
pub struct ProxyIter<T> {
    cell: Shared<T>,
}

impl<T: Iterator> Iterator for ProxyIter<T> {
    type Item = T::Item;

    fn next(&mut self) -> Option<T::Item> {
        self.cell.write().next()
    }
}
