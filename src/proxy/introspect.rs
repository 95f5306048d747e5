//! Attribute access, class identity, documentation and copies.
//!
//! Introspection reports the target's identity while bound and the proxy's
//! own while unbound, so code inspecting an unbound proxy sees a proxy
//! rather than an error.

use super::protocol::{Attributes, DeepCopy, Documented, TypeObject};
use super::{Op, Proxy};
use crate::error::LocalError;
use crate::shared::Shared;
use std::any::{Any, TypeId};

/// Documentation reported by an unbound proxy.
pub const PROXY_DOC: &str =
    "A proxy to a value bound in the current execution context. Operations are forwarded to the value resolved at the moment of the call.";

impl<T> Proxy<T> {
    pub fn get_attr(&self, name: &str) -> Result<T::Value, LocalError>
    where
        T: Attributes,
    {
        self.apply(Op::GetAttr, |target| target.get_attr(name))?
    }

    pub fn set_attr(&self, name: &str, value: T::Value) -> Result<(), LocalError>
    where
        T: Attributes,
    {
        self.apply_mut(Op::SetAttr, |target| target.set_attr(name, value))?
    }

    pub fn del_attr(&self, name: &str) -> Result<(), LocalError>
    where
        T: Attributes,
    {
        self.apply_mut(Op::DelAttr, |target| target.del_attr(name))?
    }

    /// Attribute names of the target; empty while unbound.
    pub fn dir(&self) -> Vec<String>
    where
        T: Attributes,
    {
        self.resolve()
            .map(|cell| cell.read().dir())
            .unwrap_or_default()
    }

    /// Type name of the target, or of the proxy while unbound.
    pub fn type_name(&self) -> &'static str {
        if self.is_bound() {
            std::any::type_name::<T>()
        } else {
            self.proxy_type_name()
        }
    }

    /// Type name of the proxy itself, bound or not.
    pub fn proxy_type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// The target itself, for code that needs the real object. Reported as
    /// a missing attribute while unbound.
    pub fn wrapped(&self) -> Result<Shared<T>, LocalError> {
        self.resolve()
            .ok_or_else(|| LocalError::no_attribute("wrapped"))
    }

    /// The target's documentation while bound, [`PROXY_DOC`] otherwise.
    pub fn doc(&self) -> Option<String>
    where
        T: Documented,
    {
        match self.resolve() {
            Some(cell) => cell.read().doc(),
            None => Some(PROXY_DOC.to_string()),
        }
    }

    /// Shallow copy of the target.
    pub fn copy(&self) -> Result<T, LocalError>
    where
        T: Clone,
    {
        self.apply(Op::Copy, T::clone)
    }

    /// Deep copy of the target.
    pub fn deep_copy(&self) -> Result<T, LocalError>
    where
        T: DeepCopy,
    {
        self.apply(Op::DeepCopy, DeepCopy::deep_copy)
    }

    /// Whether `value` is an instance of the type object the proxy resolves to.
    pub fn instance_check(&self, value: &dyn Any) -> Result<bool, LocalError>
    where
        T: TypeObject,
    {
        self.apply(Op::InstanceCheck, |target| target.instance_check(value))
    }

    pub fn subclass_check(&self, name: &str) -> Result<bool, LocalError>
    where
        T: TypeObject,
    {
        self.apply(Op::SubclassCheck, |target| target.subclass_check(name))
    }

    pub fn bases(&self) -> Result<Vec<String>, LocalError>
    where
        T: TypeObject,
    {
        self.apply(Op::Bases, TypeObject::bases)
    }

    pub fn mro(&self) -> Result<Vec<String>, LocalError>
    where
        T: TypeObject,
    {
        self.apply(Op::Mro, TypeObject::mro)
    }

    pub fn subclasses(&self) -> Result<Vec<String>, LocalError>
    where
        T: TypeObject,
    {
        self.apply(Op::Subclasses, TypeObject::subclasses)
    }
}

impl<T: 'static> Proxy<T> {
    /// True when bound and the target is a `U`.
    pub fn is<U: 'static>(&self) -> bool {
        self.is_bound() && TypeId::of::<T>() == TypeId::of::<U>()
    }

    /// Type id of the target; `None` while unbound.
    pub fn target_type_id(&self) -> Option<TypeId> {
        self.is_bound().then(TypeId::of::<T>)
    }
}
