//! Config loading entry points.

use super::merge::merge_policy;
use super::sources::{config_dir, env, global_file};
use super::PrintlinkConfig;
use crate::error::ConfigError;
use config::File;
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the layered configuration, reading files from `config_dir`.
    pub fn load(config_dir: &Path) -> Result<PrintlinkConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = config_dir::add_to_builder(builder, config_dir)?;
        let builder = env::add_to_builder(builder);
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Load a single explicit file on top of the defaults. Environment
    /// overrides still apply.
    pub fn load_from_file(path: &Path) -> Result<PrintlinkConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true));
        let builder = env::add_to_builder(builder);
        Ok(builder.build()?.try_deserialize()?)
    }
}
