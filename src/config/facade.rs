//! Loads [`LocalConfig`] from layered sources.

use super::merge::merge_policy;
use super::sources::{environment, global_file, project_file};
use super::LocalConfig;
use crate::error::LocalError;
use config::File;
use std::path::Path;
use tracing::debug;

/// Entry point for loading configuration.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load with every layer: defaults, global file, `<project_root>/ctxlocal.toml`,
    /// then `CTXLOCAL__*` environment variables.
    pub fn load(project_root: &Path) -> Result<LocalConfig, LocalError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = project_file::add_to_builder(builder, project_root)?;
        let builder = environment::add_to_builder(builder);
        let config: LocalConfig = builder.build()?.try_deserialize()?;
        debug!(project_root = %project_root.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load defaults plus exactly one file, which must exist.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<LocalConfig, LocalError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LocalError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config = merge_policy::builder_with_defaults()?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Defaults only.
    pub fn load_defaults() -> Result<LocalConfig, LocalError> {
        Ok(merge_policy::builder_with_defaults()?
            .build()?
            .try_deserialize()?)
    }
}
