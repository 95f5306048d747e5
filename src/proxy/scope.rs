//! Context-manager protocol through a proxy.

use super::protocol::ContextManager;
use super::{Op, Proxy};
use crate::error::LocalError;
use crate::shared::Shared;
use std::fmt;
use tracing::debug;

/// Entered context manager. Exits the target it entered on drop, passing
/// whether the thread is unwinding.
///
/// The target is resolved once on entry; rebinding the proxy inside the
/// scope does not change which object is exited.
pub struct ContextScope<T: ContextManager> {
    target: Shared<T>,
    entered: T::Entered,
}

impl<T: ContextManager> ContextScope<T> {
    /// What the target's `enter` returned.
    pub fn entered(&self) -> &T::Entered {
        &self.entered
    }

    pub fn target(&self) -> &Shared<T> {
        &self.target
    }
}

impl<T: ContextManager> Drop for ContextScope<T> {
    fn drop(&mut self) {
        let failed = std::thread::panicking();
        debug!(failed, "Exiting context manager");
        self.target.write().exit(failed);
    }
}

impl<T: ContextManager> fmt::Debug for ContextScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextScope").finish_non_exhaustive()
    }
}

impl<T: ContextManager> Proxy<T> {
    /// Enter the target. The lock is released before returning, so the
    /// body may use the proxy freely.
    pub fn enter(&self) -> Result<ContextScope<T>, LocalError> {
        let target = self.bound(Op::Enter)?;
        let entered = target.write().enter();
        Ok(ContextScope { target, entered })
    }

    /// Run `body` between the target's enter and exit.
    pub fn with_context<R>(&self, body: impl FnOnce(&T::Entered) -> R) -> Result<R, LocalError> {
        let scope = self.enter()?;
        Ok(body(scope.entered()))
    }
}
