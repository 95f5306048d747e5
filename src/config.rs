//! Configuration System
//!
//! Process-wide settings: how native threads started through
//! [`spawn_thread`](crate::context::spawn_thread) treat their parent's entries,
//! and how the logging subscriber is set up. Loaded in layers by
//! [`ConfigLoader`]; nothing here is required to use the storage types.

use crate::context::{self, ThreadSpawnPolicy};
use crate::error::LocalError;
use crate::logging::{self, LoggingConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;
pub use sources::project_file::PROJECT_CONFIG_FILE;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Context propagation settings
    #[serde(default)]
    pub context: ContextConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Context propagation settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Whether threads from `spawn_thread` inherit the parent's entries
    #[serde(default)]
    pub thread_spawn: ThreadSpawnPolicy,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl LocalConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e.to_string()));
        }

        for (module, level) in &self.logging.modules {
            if module.trim().is_empty() {
                errors.push(ValidationError::Logging(format!(
                    "Empty module name for level '{}'",
                    level
                )));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, apply the thread spawn policy and install logging.
    pub fn install(&self) -> Result<(), LocalError> {
        self.validate().map_err(|errors| {
            LocalError::ConfigError(
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;
        context::set_thread_spawn_policy(self.context.thread_spawn);
        let installed = logging::init_logging(Some(&self.logging))?;
        debug!(
            thread_spawn = ?self.context.thread_spawn,
            subscriber_installed = installed,
            "Installed configuration"
        );
        Ok(())
    }

    /// Render as TOML, in the layout the config files use.
    pub fn to_toml(&self) -> Result<String, LocalError> {
        toml::to_string_pretty(self)
            .map_err(|e| LocalError::ConfigError(format!("Failed to render config: {}", e)))
    }
}
