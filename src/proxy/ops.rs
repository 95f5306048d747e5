//! Operator forwarding.
//!
//! Binary operators compute on a clone of the target, so `&proxy + 1` works
//! for any `T: Clone + Add<Rhs>`. The reflected impls cover primitives and
//! strings on the left-hand side. Compound assignment mutates the stored
//! target in place.
//!
//! None of these traits can report an error, so an unbound proxy panics with
//! the [`LocalError::Unbound`] message; the `try_*` methods on [`Proxy`] are
//! the fallible forms.

use super::protocol::Absolute;
use super::{Op, Proxy};
use crate::error::LocalError;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::ops::{
    Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Div,
    DivAssign, Mul, MulAssign, Neg, Not, Rem, RemAssign, Shl, ShlAssign, Shr, ShrAssign, Sub,
    SubAssign,
};

impl<T, U> PartialEq<Proxy<U>> for Proxy<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &Proxy<U>) -> bool {
        let rhs = other.force_target(Op::Eq);
        let rhs = rhs.read();
        self.force(Op::Eq, |lhs| *lhs == *rhs)
    }
}

impl<T, U> PartialOrd<Proxy<U>> for Proxy<T>
where
    T: PartialOrd<U>,
{
    fn partial_cmp(&self, other: &Proxy<U>) -> Option<Ordering> {
        let rhs = other.force_target(Op::Cmp);
        let rhs = rhs.read();
        self.force(Op::Cmp, |lhs| lhs.partial_cmp(&*rhs))
    }
}

macro_rules! forward_comparisons {
    ($($rhs:ty),* $(,)?) => {$(
        impl<T: PartialEq<$rhs>> PartialEq<$rhs> for Proxy<T> {
            fn eq(&self, other: &$rhs) -> bool {
                self.force(Op::Eq, |lhs| lhs == other)
            }
        }

        impl<T: PartialOrd<$rhs>> PartialOrd<$rhs> for Proxy<T> {
            fn partial_cmp(&self, other: &$rhs) -> Option<Ordering> {
                self.force(Op::Cmp, |lhs| lhs.partial_cmp(other))
            }
        }

        impl<T> PartialEq<Proxy<T>> for $rhs
        where
            $rhs: PartialEq<T>,
        {
            fn eq(&self, other: &Proxy<T>) -> bool {
                other.force(Op::Eq, |rhs| self == rhs)
            }
        }

        impl<T> PartialOrd<Proxy<T>> for $rhs
        where
            $rhs: PartialOrd<T>,
        {
            fn partial_cmp(&self, other: &Proxy<T>) -> Option<Ordering> {
                other.force(Op::Cmp, |rhs| self.partial_cmp(rhs))
            }
        }
    )*};
}

forward_comparisons!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char, String,
);

impl<'a, T: PartialEq<&'a str>> PartialEq<&'a str> for Proxy<T> {
    fn eq(&self, other: &&'a str) -> bool {
        self.force(Op::Eq, |lhs| lhs == other)
    }
}

impl<'a, T: PartialOrd<&'a str>> PartialOrd<&'a str> for Proxy<T> {
    fn partial_cmp(&self, other: &&'a str) -> Option<Ordering> {
        self.force(Op::Cmp, |lhs| lhs.partial_cmp(other))
    }
}

impl<'a, T> PartialEq<Proxy<T>> for &'a str
where
    &'a str: PartialEq<T>,
{
    fn eq(&self, other: &Proxy<T>) -> bool {
        other.force(Op::Eq, |rhs| self == rhs)
    }
}

impl<T: PartialEq<Vec<U>>, U> PartialEq<Vec<U>> for Proxy<T> {
    fn eq(&self, other: &Vec<U>) -> bool {
        self.force(Op::Eq, |lhs| lhs == other)
    }
}

impl<T: PartialOrd<Vec<U>>, U> PartialOrd<Vec<U>> for Proxy<T> {
    fn partial_cmp(&self, other: &Vec<U>) -> Option<Ordering> {
        self.force(Op::Cmp, |lhs| lhs.partial_cmp(other))
    }
}

impl<T, U> PartialEq<Proxy<T>> for Vec<U>
where
    Vec<U>: PartialEq<T>,
{
    fn eq(&self, other: &Proxy<T>) -> bool {
        other.force(Op::Eq, |rhs| self == rhs)
    }
}

impl<T: Hash> Hash for Proxy<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.force(Op::Hash, |target| target.hash(state))
    }
}

macro_rules! forward_binary {
    ($($Trait:ident $method:ident),* $(,)?) => {$(
        impl<'a, T, Rhs> $Trait<Rhs> for &'a Proxy<T>
        where
            T: Clone + $Trait<Rhs>,
        {
            type Output = <T as $Trait<Rhs>>::Output;

            fn $method(self, rhs: Rhs) -> Self::Output {
                self.force(Op::$Trait, move |lhs| $Trait::$method(lhs.clone(), rhs))
            }
        }

        impl<T, Rhs> $Trait<Rhs> for Proxy<T>
        where
            T: Clone + $Trait<Rhs>,
        {
            type Output = <T as $Trait<Rhs>>::Output;

            fn $method(self, rhs: Rhs) -> Self::Output {
                $Trait::$method(&self, rhs)
            }
        }
    )*};
}

forward_binary!(
    Add add, Sub sub, Mul mul, Div div, Rem rem,
    BitAnd bitand, BitOr bitor, BitXor bitxor, Shl shl, Shr shr,
);

macro_rules! forward_reflected {
    (@ops $lhs:ty; $($Trait:ident $method:ident),*) => {$(
        impl<'a, T> $Trait<&'a Proxy<T>> for $lhs
        where
            T: Clone,
            $lhs: $Trait<T>,
        {
            type Output = <$lhs as $Trait<T>>::Output;

            fn $method(self, rhs: &'a Proxy<T>) -> Self::Output {
                rhs.force(Op::$Trait, move |value| $Trait::$method(self, value.clone()))
            }
        }

        impl<T> $Trait<Proxy<T>> for $lhs
        where
            T: Clone,
            $lhs: $Trait<T>,
        {
            type Output = <$lhs as $Trait<T>>::Output;

            fn $method(self, rhs: Proxy<T>) -> Self::Output {
                <$lhs as $Trait<&Proxy<T>>>::$method(self, &rhs)
            }
        }
    )*};
    ($($lhs:ty),* $(,)?) => {$(
        forward_reflected!(@ops $lhs;
            Add add, Sub sub, Mul mul, Div div, Rem rem,
            BitAnd bitand, BitOr bitor, BitXor bitxor, Shl shl, Shr shr);
    )*};
}

forward_reflected!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool,
);

impl<'a, T: AsRef<str>> Add<&'a Proxy<T>> for String {
    type Output = String;

    fn add(self, rhs: &'a Proxy<T>) -> String {
        rhs.force(Op::Add, move |value| {
            let mut out = self;
            out.push_str(value.as_ref());
            out
        })
    }
}

impl<T: AsRef<str>> Add<Proxy<T>> for String {
    type Output = String;

    fn add(self, rhs: Proxy<T>) -> String {
        self + &rhs
    }
}

impl<'a, 'b, T: AsRef<str>> Add<&'b Proxy<T>> for &'a str {
    type Output = String;

    fn add(self, rhs: &'b Proxy<T>) -> String {
        self.to_string() + rhs
    }
}

impl<'a, T: Clone + Neg> Neg for &'a Proxy<T> {
    type Output = T::Output;

    fn neg(self) -> T::Output {
        self.force(Op::Neg, |value| -value.clone())
    }
}

impl<T: Clone + Neg> Neg for Proxy<T> {
    type Output = T::Output;

    fn neg(self) -> T::Output {
        -&self
    }
}

impl<'a, T: Clone + Not> Not for &'a Proxy<T> {
    type Output = T::Output;

    fn not(self) -> T::Output {
        self.force(Op::Not, |value| !value.clone())
    }
}

impl<T: Clone + Not> Not for Proxy<T> {
    type Output = T::Output;

    fn not(self) -> T::Output {
        !&self
    }
}

macro_rules! forward_in_place {
    ($($Trait:ident $method:ident),* $(,)?) => {$(
        impl<T, Rhs> $Trait<Rhs> for Proxy<T>
        where
            T: $Trait<Rhs>,
        {
            fn $method(&mut self, rhs: Rhs) {
                self.force_mut(Op::$Trait, move |target| $Trait::$method(target, rhs))
            }
        }
    )*};
}

forward_in_place!(
    AddAssign add_assign, SubAssign sub_assign, MulAssign mul_assign,
    DivAssign div_assign, RemAssign rem_assign, BitAndAssign bitand_assign,
    BitOrAssign bitor_assign, BitXorAssign bitxor_assign,
    ShlAssign shl_assign, ShrAssign shr_assign,
);

impl<T> Proxy<T> {
    /// Absolute value of the target.
    pub fn abs(&self) -> Result<T::Output, LocalError>
    where
        T: Absolute,
    {
        self.apply(Op::Abs, Absolute::absolute)
    }

    /// Unary plus: a copy of the target.
    pub fn pos(&self) -> Result<T, LocalError>
    where
        T: Clone,
    {
        self.apply(Op::Pos, T::clone)
    }

    /// Replace the target with `f(target)`. The in-place fallback for
    /// targets that only implement the plain binary operator.
    pub fn assign_with(&self, f: impl FnOnce(&T) -> T) -> Result<(), LocalError> {
        self.apply_mut(Op::AssignWith, |target| {
            let next = f(target);
            *target = next;
        })
    }

    /// Fallible `==`.
    pub fn try_eq<U>(&self, other: &U) -> Result<bool, LocalError>
    where
        T: PartialEq<U>,
    {
        self.apply(Op::Eq, |target| target == other)
    }

    /// Fallible ordering.
    pub fn try_cmp<U>(&self, other: &U) -> Result<Option<Ordering>, LocalError>
    where
        T: PartialOrd<U>,
    {
        self.apply(Op::Cmp, |target| target.partial_cmp(other))
    }
}
