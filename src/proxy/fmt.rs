//! Formatting forwards to the target. `Debug` and `Display` print a
//! placeholder while unbound; the numeric formatting traits fail instead.

use super::{Op, Proxy};
use std::fmt;
use tracing::trace;

/// What `Debug` and `Display` print for an unbound proxy.
pub const UNBOUND_PLACEHOLDER: &str = "<Proxy unbound>";

impl<T: fmt::Debug> fmt::Debug for Proxy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resolve() {
            Some(cell) => fmt::Debug::fmt(&*cell.read(), f),
            None => f.write_str(UNBOUND_PLACEHOLDER),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Proxy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resolve() {
            Some(cell) => fmt::Display::fmt(&*cell.read(), f),
            None => f.write_str(UNBOUND_PLACEHOLDER),
        }
    }
}

macro_rules! forward_format {
    ($($Trait:ident),* $(,)?) => {$(
        impl<T: fmt::$Trait> fmt::$Trait for Proxy<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.resolve() {
                    Some(cell) => fmt::$Trait::fmt(&*cell.read(), f),
                    None => {
                        trace!(op = %Op::Format, "Formatting unbound proxy");
                        Err(fmt::Error)
                    }
                }
            }
        }
    )*};
}

forward_format!(Binary, Octal, LowerHex, UpperHex, LowerExp, UpperExp);
