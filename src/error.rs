//! Error types for context-scoped storage and proxies.

use crate::proxy::Op;
use thiserror::Error;

/// Errors surfaced by namespaces, proxies and the configuration layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocalError {
    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Proxy is unbound: no underlying value for {op}")]
    Unbound { op: Op },

    #[error("Value out of range for {op}")]
    OutOfRange { op: Op },

    #[error("Attribute not found: {0}")]
    NoAttribute(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl LocalError {
    pub fn not_found(key: impl Into<String>) -> Self {
        LocalError::NotFound(key.into())
    }

    pub fn no_attribute(name: impl Into<String>) -> Self {
        LocalError::NoAttribute(name.into())
    }

    /// True for the two "missing value" conditions (`NotFound`, `Unbound`).
    pub fn is_missing(&self) -> bool {
        matches!(self, LocalError::NotFound(_) | LocalError::Unbound { .. })
    }
}

impl From<config::ConfigError> for LocalError {
    fn from(err: config::ConfigError) -> Self {
        LocalError::ConfigError(err.to_string())
    }
}
