//! Capability traits a proxy forwards to.
//!
//! Operators and formatting go through the std traits. Everything without a
//! std counterpart is described here and implemented for the common std
//! types; user types opt in by implementing the trait.

use crate::error::LocalError;
use crate::shared::Shared;
use async_trait::async_trait;
use serde_json::Value;
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::ops::{Bound, Range, RangeBounds};
use std::sync::Arc;

/// Truth value of an object.
pub trait Truthy {
    fn truthy(&self) -> bool;
}

macro_rules! truthy_nonzero {
    ($($ty:ty => $zero:expr),* $(,)?) => {$(
        impl Truthy for $ty {
            fn truthy(&self) -> bool {
                *self != $zero
            }
        }
    )*};
}

truthy_nonzero!(
    i8 => 0, i16 => 0, i32 => 0, i64 => 0, i128 => 0, isize => 0,
    u8 => 0, u16 => 0, u32 => 0, u64 => 0, u128 => 0, usize => 0,
    f32 => 0.0, f64 => 0.0, bool => false,
);

macro_rules! truthy_nonempty {
    ($($ty:ty),* $(,)?) => {$(
        impl Truthy for $ty {
            fn truthy(&self) -> bool {
                !self.is_empty()
            }
        }
    )*};
}

truthy_nonempty!(String, str);

impl<U> Truthy for Vec<U> {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<U> Truthy for VecDeque<U> {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<K, V> Truthy for HashMap<K, V> {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<K, V> Truthy for BTreeMap<K, V> {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<U> Truthy for HashSet<U> {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<U> Truthy for BTreeSet<U> {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<U> Truthy for Option<U> {
    fn truthy(&self) -> bool {
        self.is_some()
    }
}

impl Truthy for Value {
    fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(fields) => !fields.is_empty(),
        }
    }
}

/// Element count.
pub trait Length {
    fn length(&self) -> usize;

    /// Estimated length; defaults to the exact one.
    fn length_hint(&self) -> usize {
        self.length()
    }
}

macro_rules! length_via_len {
    ($($ty:ty $([$($gen:ident),*])?),* $(,)?) => {$(
        impl$(<$($gen),*>)? Length for $ty {
            fn length(&self) -> usize {
                self.len()
            }
        }
    )*};
}

length_via_len!(
    String,
    Vec<U> [U],
    VecDeque<U> [U],
    HashMap<K, V> [K, V],
    BTreeMap<K, V> [K, V],
    HashSet<U> [U],
    BTreeSet<U> [U],
);

/// Membership test.
pub trait Contains<Q: ?Sized> {
    fn contains_item(&self, item: &Q) -> bool;
}

impl<U: PartialEq> Contains<U> for Vec<U> {
    fn contains_item(&self, item: &U) -> bool {
        self.contains(item)
    }
}

impl<U: PartialEq> Contains<U> for VecDeque<U> {
    fn contains_item(&self, item: &U) -> bool {
        self.contains(item)
    }
}

impl<U: Eq + Hash> Contains<U> for HashSet<U> {
    fn contains_item(&self, item: &U) -> bool {
        self.contains(item)
    }
}

impl<U: Ord> Contains<U> for BTreeSet<U> {
    fn contains_item(&self, item: &U) -> bool {
        self.contains(item)
    }
}

impl<K: Eq + Hash, V> Contains<K> for HashMap<K, V> {
    fn contains_item(&self, item: &K) -> bool {
        self.contains_key(item)
    }
}

impl<K: Ord, V> Contains<K> for BTreeMap<K, V> {
    fn contains_item(&self, item: &K) -> bool {
        self.contains_key(item)
    }
}

impl Contains<str> for String {
    fn contains_item(&self, item: &str) -> bool {
        self.contains(item)
    }
}

impl Contains<char> for String {
    fn contains_item(&self, item: &char) -> bool {
        self.contains(*item)
    }
}

/// Item deletion by index or key.
pub trait RemoveItem<I> {
    type Removed;

    fn remove_item(&mut self, index: I) -> Self::Removed;
}

impl<U> RemoveItem<usize> for Vec<U> {
    type Removed = Option<U>;

    fn remove_item(&mut self, index: usize) -> Option<U> {
        (index < self.len()).then(|| self.remove(index))
    }
}

impl<U> RemoveItem<usize> for VecDeque<U> {
    type Removed = Option<U>;

    fn remove_item(&mut self, index: usize) -> Option<U> {
        self.remove(index)
    }
}

impl<K: Eq + Hash, V> RemoveItem<K> for HashMap<K, V> {
    type Removed = Option<V>;

    fn remove_item(&mut self, key: K) -> Option<V> {
        self.remove(&key)
    }
}

impl<K: Ord, V> RemoveItem<K> for BTreeMap<K, V> {
    type Removed = Option<V>;

    fn remove_item(&mut self, key: K) -> Option<V> {
        self.remove(&key)
    }
}

/// Range reads and range replacement.
pub trait Sliceable {
    type Item;

    fn slice<R: RangeBounds<usize>>(&self, range: R) -> Vec<Self::Item>;

    /// Replace `range` with `items`; the lengths may differ.
    fn splice_in<R: RangeBounds<usize>>(&mut self, range: R, items: Vec<Self::Item>);
}

impl<U: Clone> Sliceable for Vec<U> {
    type Item = U;

    fn slice<R: RangeBounds<usize>>(&self, range: R) -> Vec<U> {
        self[clamp_range(&range, self.len())].to_vec()
    }

    fn splice_in<R: RangeBounds<usize>>(&mut self, range: R, items: Vec<U>) {
        let bounds = clamp_range(&range, self.len());
        self.splice(bounds, items).for_each(drop);
    }
}

/// Resolve `range` against `len` items. Bounds past the end clamp to `len`
/// and an inverted range is empty at its start.
fn clamp_range<R: RangeBounds<usize>>(range: &R, len: usize) -> Range<usize> {
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start.saturating_add(1),
        Bound::Unbounded => 0,
    }
    .min(len);
    let end = match range.end_bound() {
        Bound::Included(&end) => end.saturating_add(1),
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    }
    .min(len);
    start..end.max(start)
}

/// Absolute value.
pub trait Absolute {
    type Output;

    fn absolute(&self) -> Self::Output;
}

macro_rules! absolute_via_abs {
    ($($ty:ty),* $(,)?) => {$(
        impl Absolute for $ty {
            type Output = $ty;

            fn absolute(&self) -> $ty {
                self.abs()
            }
        }
    )*};
}

absolute_via_abs!(i8, i16, i32, i64, i128, isize, f32, f64);

/// Complex number produced by [`Numeric::to_complex`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

/// Numeric conversions and rounding. Integer conversions return `None`
/// when the value does not fit an `i64`.
pub trait Numeric {
    fn to_int(&self) -> Option<i64>;

    fn to_float(&self) -> f64;

    fn to_complex(&self) -> Complex {
        Complex::new(self.to_float(), 0.0)
    }

    /// Round half to even, to `ndigits` decimal places when given.
    fn round(&self, ndigits: Option<i32>) -> f64 {
        let value = self.to_float();
        match ndigits {
            None => value.round_ties_even(),
            Some(digits) => {
                let scale = 10f64.powi(digits);
                (value * scale).round_ties_even() / scale
            }
        }
    }

    fn trunc(&self) -> Option<i64> {
        integral_to_i64(self.to_float().trunc())
    }

    fn floor(&self) -> Option<i64> {
        integral_to_i64(self.to_float().floor())
    }

    fn ceil(&self) -> Option<i64> {
        integral_to_i64(self.to_float().ceil())
    }
}

/// Checked cast of an already-integral float. NaN and infinities fail the
/// range test.
fn integral_to_i64(value: f64) -> Option<i64> {
    // -2^63 is exact as f64; 2^63 is the first value past i64::MAX.
    let min = i64::MIN as f64;
    (value >= min && value < -min).then_some(value as i64)
}

macro_rules! numeric_int {
    ($($ty:ty),* $(,)?) => {$(
        impl Numeric for $ty {
            fn to_int(&self) -> Option<i64> {
                i64::try_from(*self).ok()
            }

            fn to_float(&self) -> f64 {
                *self as f64
            }

            fn trunc(&self) -> Option<i64> {
                self.to_int()
            }

            fn floor(&self) -> Option<i64> {
                self.to_int()
            }

            fn ceil(&self) -> Option<i64> {
                self.to_int()
            }
        }
    )*};
}

numeric_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! numeric_float {
    ($($ty:ty),* $(,)?) => {$(
        impl Numeric for $ty {
            fn to_int(&self) -> Option<i64> {
                Numeric::trunc(self)
            }

            fn to_float(&self) -> f64 {
                *self as f64
            }
        }
    )*};
}

numeric_float!(f32, f64);

/// Conversion to a sequence index. `None` when the value does not fit an
/// `isize`.
pub trait AsIndex {
    fn as_index(&self) -> Option<isize>;
}

macro_rules! as_index_int {
    ($($ty:ty),* $(,)?) => {$(
        impl AsIndex for $ty {
            fn as_index(&self) -> Option<isize> {
                isize::try_from(*self).ok()
            }
        }
    )*};
}

as_index_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Named attributes.
pub trait Attributes {
    type Value;

    fn get_attr(&self, name: &str) -> Result<Self::Value, LocalError>;

    fn set_attr(&mut self, name: &str, value: Self::Value) -> Result<(), LocalError>;

    fn del_attr(&mut self, name: &str) -> Result<(), LocalError>;

    /// Attribute names, sorted.
    fn dir(&self) -> Vec<String> {
        Vec::new()
    }
}

impl<V: Clone> Attributes for HashMap<String, V> {
    type Value = V;

    fn get_attr(&self, name: &str) -> Result<V, LocalError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| LocalError::no_attribute(name))
    }

    fn set_attr(&mut self, name: &str, value: V) -> Result<(), LocalError> {
        self.insert(name.to_string(), value);
        Ok(())
    }

    fn del_attr(&mut self, name: &str) -> Result<(), LocalError> {
        self.remove(name)
            .map(|_| ())
            .ok_or_else(|| LocalError::no_attribute(name))
    }

    fn dir(&self) -> Vec<String> {
        let mut names: Vec<String> = self.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Attributes for Value {
    type Value = Value;

    fn get_attr(&self, name: &str) -> Result<Value, LocalError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| LocalError::no_attribute(name))
    }

    fn set_attr(&mut self, name: &str, value: Value) -> Result<(), LocalError> {
        match self.as_object_mut() {
            Some(fields) => {
                fields.insert(name.to_string(), value);
                Ok(())
            }
            None => Err(LocalError::no_attribute(name)),
        }
    }

    fn del_attr(&mut self, name: &str) -> Result<(), LocalError> {
        self.as_object_mut()
            .and_then(|fields| fields.remove(name))
            .map(|_| ())
            .ok_or_else(|| LocalError::no_attribute(name))
    }

    fn dir(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .as_object()
            .map(|fields| fields.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

/// Documentation text attached to an object.
pub trait Documented {
    fn doc(&self) -> Option<String>;
}

/// A value that describes a type: lets a proxy to it take part in instance
/// and subclass checks.
pub trait TypeObject {
    fn type_name(&self) -> &str;

    /// Direct base type names.
    fn bases(&self) -> Vec<String> {
        Vec::new()
    }

    /// This type followed by its bases, in resolution order.
    fn mro(&self) -> Vec<String> {
        let mut order = vec![self.type_name().to_string()];
        order.extend(self.bases());
        order
    }

    fn subclasses(&self) -> Vec<String> {
        Vec::new()
    }

    fn instance_check(&self, value: &dyn Any) -> bool;

    /// Whether the type named `name` is this type or derives from it.
    fn subclass_check(&self, name: &str) -> bool {
        name == self.type_name()
    }
}

/// Recursive copy: the result shares no mutable state with the original.
pub trait DeepCopy {
    fn deep_copy(&self) -> Self;
}

macro_rules! deep_copy_via_clone {
    ($($ty:ty),* $(,)?) => {$(
        impl DeepCopy for $ty {
            fn deep_copy(&self) -> Self {
                self.clone()
            }
        }
    )*};
}

deep_copy_via_clone!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
    String, Value,
);

impl<U: DeepCopy> DeepCopy for Vec<U> {
    fn deep_copy(&self) -> Self {
        self.iter().map(DeepCopy::deep_copy).collect()
    }
}

impl<U: DeepCopy> DeepCopy for VecDeque<U> {
    fn deep_copy(&self) -> Self {
        self.iter().map(DeepCopy::deep_copy).collect()
    }
}

impl<U: DeepCopy> DeepCopy for Option<U> {
    fn deep_copy(&self) -> Self {
        self.as_ref().map(DeepCopy::deep_copy)
    }
}

impl<U: DeepCopy> DeepCopy for Box<U> {
    fn deep_copy(&self) -> Self {
        Box::new((**self).deep_copy())
    }
}

impl<U: DeepCopy> DeepCopy for Arc<U> {
    fn deep_copy(&self) -> Self {
        Arc::new((**self).deep_copy())
    }
}

impl<K: Clone + Eq + Hash, V: DeepCopy> DeepCopy for HashMap<K, V> {
    fn deep_copy(&self) -> Self {
        self.iter().map(|(k, v)| (k.clone(), v.deep_copy())).collect()
    }
}

impl<K: Clone + Ord, V: DeepCopy> DeepCopy for BTreeMap<K, V> {
    fn deep_copy(&self) -> Self {
        self.iter().map(|(k, v)| (k.clone(), v.deep_copy())).collect()
    }
}

impl<U: DeepCopy> DeepCopy for Shared<U> {
    fn deep_copy(&self) -> Self {
        Shared::new(self.read().deep_copy())
    }
}

/// Synchronous enter/exit protocol.
pub trait ContextManager {
    type Entered;

    fn enter(&mut self) -> Self::Entered;

    /// `failed` is true when the body unwound.
    fn exit(&mut self, failed: bool);
}

/// Asynchronous enter/exit protocol.
#[async_trait]
pub trait AsyncContextManager: Send {
    type Entered: Send;

    async fn enter(&mut self) -> Self::Entered;

    async fn exit(&mut self, failed: bool);
}
