//! Transparent Proxies
//!
//! A [`Proxy`] owns nothing but a resolver. Every operation asks the resolver
//! for the current target and forwards to it, so a proxy created before any
//! value exists starts working as soon as one is bound, and a proxy shared
//! between contexts sees each context's own value.
//!
//! The forwarding surface is split by concern:
//!
//! - `ops`: comparisons, hashing, binary/reflected/unary/in-place operators
//! - `fmt`: `Debug`, `Display` and the numeric formatting traits
//! - `container`: length, membership, items, slices, iteration, numbers
//! - `introspect`: attributes, class identity, documentation, copies
//! - `scope`: the synchronous context-manager protocol
//! - `asyncs`: awaiting, streams and the asynchronous context-manager protocol
//!
//! Resolution goes through one helper. Operations that can report failure
//! return [`LocalError::Unbound`]; trait impls that cannot (operators,
//! `PartialEq`, `Hash`) panic with the same message.

mod asyncs;
mod container;
mod fmt;
mod introspect;
mod ops;
pub mod protocol;
mod scope;

pub use asyncs::{AsyncCell, Awaiting, ProxyStream};
pub use container::ProxyIter;
pub use fmt::UNBOUND_PLACEHOLDER;
pub use introspect::PROXY_DOC;
pub use scope::ContextScope;

use crate::error::LocalError;
use crate::namespace::Namespace;
use crate::shared::{ReadGuard, Shared, WriteGuard};
use crate::slot::ContextSlot;
use crate::stack::Stack;
use protocol::Truthy;
use std::sync::Arc;
use tracing::trace;

/// One entry of the forwarding table: the operation a proxy was asked to
/// perform. Carried by [`LocalError::Unbound`] and trace events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Resolve,
    Read,
    Write,
    // Comparison and hashing
    Eq,
    Cmp,
    Hash,
    // Binary
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    // Unary
    Neg,
    Not,
    Abs,
    Pos,
    // In-place
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    ShlAssign,
    ShrAssign,
    AssignWith,
    // Numeric conversion
    Int,
    Float,
    Complex,
    Round,
    Trunc,
    Floor,
    Ceil,
    Index,
    // Container
    Len,
    LengthHint,
    Contains,
    GetItem,
    SetItem,
    DelItem,
    GetSlice,
    SetSlice,
    Iter,
    IterRev,
    Next,
    // Representation
    Format,
    Bytes,
    // Attributes and class identity
    GetAttr,
    SetAttr,
    DelAttr,
    InstanceCheck,
    SubclassCheck,
    Bases,
    Mro,
    Subclasses,
    // Copies
    Copy,
    DeepCopy,
    // Context managers
    Enter,
    AsyncEnter,
    // Async
    Await,
    AsyncIter,
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Op::Resolve => "resolve",
            Op::Read => "read",
            Op::Write => "write",
            Op::Eq => "eq",
            Op::Cmp => "cmp",
            Op::Hash => "hash",
            Op::Add => "add",
            Op::Sub => "sub",
            Op::Mul => "mul",
            Op::Div => "div",
            Op::Rem => "rem",
            Op::BitAnd => "bitand",
            Op::BitOr => "bitor",
            Op::BitXor => "bitxor",
            Op::Shl => "shl",
            Op::Shr => "shr",
            Op::Neg => "neg",
            Op::Not => "not",
            Op::Abs => "abs",
            Op::Pos => "pos",
            Op::AddAssign => "add_assign",
            Op::SubAssign => "sub_assign",
            Op::MulAssign => "mul_assign",
            Op::DivAssign => "div_assign",
            Op::RemAssign => "rem_assign",
            Op::BitAndAssign => "bitand_assign",
            Op::BitOrAssign => "bitor_assign",
            Op::BitXorAssign => "bitxor_assign",
            Op::ShlAssign => "shl_assign",
            Op::ShrAssign => "shr_assign",
            Op::AssignWith => "assign_with",
            Op::Int => "int",
            Op::Float => "float",
            Op::Complex => "complex",
            Op::Round => "round",
            Op::Trunc => "trunc",
            Op::Floor => "floor",
            Op::Ceil => "ceil",
            Op::Index => "index",
            Op::Len => "len",
            Op::LengthHint => "length_hint",
            Op::Contains => "contains",
            Op::GetItem => "get_item",
            Op::SetItem => "set_item",
            Op::DelItem => "del_item",
            Op::GetSlice => "get_slice",
            Op::SetSlice => "set_slice",
            Op::Iter => "iter",
            Op::IterRev => "iter_rev",
            Op::Next => "next",
            Op::Format => "format",
            Op::Bytes => "bytes",
            Op::GetAttr => "get_attr",
            Op::SetAttr => "set_attr",
            Op::DelAttr => "del_attr",
            Op::InstanceCheck => "instance_check",
            Op::SubclassCheck => "subclass_check",
            Op::Bases => "bases",
            Op::Mro => "mro",
            Op::Subclasses => "subclasses",
            Op::Copy => "copy",
            Op::DeepCopy => "deep_copy",
            Op::Enter => "enter",
            Op::AsyncEnter => "async_enter",
            Op::Await => "await",
            Op::AsyncIter => "async_iter",
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a resolver gets its value from (introspection only)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverKind {
    Function,
    Namespace { key: String },
    Stack,
    Slot { name: Option<String> },
}

type ResolveFn<T> = dyn Fn() -> Option<Shared<T>> + Send + Sync;

/// Zero-argument lookup returning the current target, or `None` when
/// nothing is bound.
pub struct Resolver<T> {
    kind: ResolverKind,
    resolve: Arc<ResolveFn<T>>,
}

impl<T> Resolver<T> {
    pub fn from_fn<F>(resolve: F) -> Self
    where
        F: Fn() -> Option<Shared<T>> + Send + Sync + 'static,
    {
        Self {
            kind: ResolverKind::Function,
            resolve: Arc::new(resolve),
        }
    }

    pub fn kind(&self) -> &ResolverKind {
        &self.kind
    }

    pub fn resolve(&self) -> Option<Shared<T>> {
        (self.resolve)()
    }
}

impl<T: Send + Sync + 'static> Resolver<T> {
    pub fn from_namespace(namespace: &Namespace<T>, key: impl Into<String>) -> Self {
        let key = key.into();
        let namespace = namespace.clone();
        Self {
            kind: ResolverKind::Namespace { key: key.clone() },
            resolve: Arc::new(move || namespace.lookup(&key)),
        }
    }

    pub fn from_stack(stack: &Stack<T>) -> Self {
        let stack = stack.clone();
        Self {
            kind: ResolverKind::Stack,
            resolve: Arc::new(move || stack.top()),
        }
    }

    pub fn from_slot(slot: &ContextSlot<Shared<T>>) -> Self {
        let slot = slot.clone();
        Self {
            kind: ResolverKind::Slot {
                name: slot.name().map(str::to_string),
            },
            resolve: Arc::new(move || slot.get()),
        }
    }

    /// Always resolves to `cell`.
    pub fn constant(cell: Shared<T>) -> Self {
        Self::from_fn(move || Some(cell.clone()))
    }
}

impl<T> Clone for Resolver<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            resolve: Arc::clone(&self.resolve),
        }
    }
}

/// Forwards every supported operation to whatever its resolver returns at
/// the moment of the call.
///
/// Cloning a proxy clones the resolver, not the target; use
/// [`copy`](Proxy::copy) or [`deep_copy`](Proxy::deep_copy) for the value.
pub struct Proxy<T> {
    resolver: Resolver<T>,
}

impl<T> Proxy<T> {
    pub fn new<F>(resolve: F) -> Self
    where
        F: Fn() -> Option<Shared<T>> + Send + Sync + 'static,
    {
        Self::from_resolver(Resolver::from_fn(resolve))
    }

    pub fn from_resolver(resolver: Resolver<T>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &Resolver<T> {
        &self.resolver
    }

    /// Run the resolver once.
    pub fn resolve(&self) -> Option<Shared<T>> {
        self.resolver.resolve()
    }

    pub fn is_bound(&self) -> bool {
        self.resolve().is_some()
    }

    /// The live target. This is the accessor to use where code needs the
    /// real object rather than the proxy.
    pub fn target(&self) -> Result<Shared<T>, LocalError> {
        self.bound(Op::Resolve)
    }

    /// Resolve for `op`, reporting an unbound proxy as an error.
    pub(crate) fn bound(&self, op: Op) -> Result<Shared<T>, LocalError> {
        self.resolve().ok_or_else(|| {
            trace!(%op, "Proxy operation on unbound proxy");
            LocalError::Unbound { op }
        })
    }

    /// Resolve-then-apply with shared access to the target.
    pub(crate) fn apply<R>(&self, op: Op, f: impl FnOnce(&T) -> R) -> Result<R, LocalError> {
        let cell = self.bound(op)?;
        let target = cell.read();
        Ok(f(&target))
    }

    /// Resolve-then-apply with exclusive access to the target.
    pub(crate) fn apply_mut<R>(
        &self,
        op: Op,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, LocalError> {
        let cell = self.bound(op)?;
        let mut target = cell.write();
        Ok(f(&mut target))
    }

    /// [`apply`](Self::apply) for trait impls with no error channel.
    pub(crate) fn force<R>(&self, op: Op, f: impl FnOnce(&T) -> R) -> R {
        self.apply(op, f).unwrap_or_else(|err| panic!("{err}"))
    }

    pub(crate) fn force_mut<R>(&self, op: Op, f: impl FnOnce(&mut T) -> R) -> R {
        self.apply_mut(op, f).unwrap_or_else(|err| panic!("{err}"))
    }

    pub(crate) fn force_target(&self, op: Op) -> Shared<T> {
        self.bound(op).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Borrow the target.
    pub fn try_with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, LocalError> {
        self.apply(Op::Read, f)
    }

    /// Mutably borrow the target; changes land in the stored object.
    pub fn try_with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, LocalError> {
        self.apply_mut(Op::Write, f)
    }

    /// Owned read guard over the target, for borrowing iteration.
    pub fn read(&self) -> Result<ReadGuard<T>, LocalError> {
        self.bound(Op::Read).map(|cell| cell.read_owned())
    }

    pub fn write(&self) -> Result<WriteGuard<T>, LocalError> {
        self.bound(Op::Write).map(|cell| cell.write_owned())
    }

    /// Truth value of the target; `false` while unbound.
    pub fn truthy(&self) -> bool
    where
        T: Truthy,
    {
        self.resolve().is_some_and(|cell| cell.read().truthy())
    }
}

impl<T: Send + Sync + 'static> Proxy<T> {
    pub fn from_namespace(namespace: &Namespace<T>, key: impl Into<String>) -> Self {
        Self::from_resolver(Resolver::from_namespace(namespace, key))
    }

    pub fn from_stack(stack: &Stack<T>) -> Self {
        Self::from_resolver(Resolver::from_stack(stack))
    }

    pub fn from_slot(slot: &ContextSlot<Shared<T>>) -> Self {
        Self::from_resolver(Resolver::from_slot(slot))
    }

    pub fn constant(cell: Shared<T>) -> Self {
        Self::from_resolver(Resolver::constant(cell))
    }
}

impl<T> Clone for Proxy<T> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
        }
    }
}
