//! Config directory source: {dir}/config.toml and {dir}/{PRINTLINK_PROFILE}.toml

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::{Path, PathBuf};

/// Directory the daemon reads when none is given.
pub const DEFAULT_CONFIG_DIR: &str = "/etc/printlink";

/// Selects an extra `{profile}.toml` in the config directory, e.g. per printer model.
pub const PROFILE_VAR: &str = "PRINTLINK_PROFILE";

pub fn base_config_path_in(config_dir: &Path) -> PathBuf {
    config_dir.join("config.toml")
}

/// Add config directory files to builder.
/// Precedence: config.toml (base) then {PRINTLINK_PROFILE}.toml when the profile is set.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    config_dir: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let mut builder = builder;

    let base_config_path = base_config_path_in(config_dir);
    if base_config_path.exists() {
        builder = builder.add_source(File::from(base_config_path).required(false));
    }

    if let Ok(profile) = std::env::var(PROFILE_VAR) {
        let profile_path = config_dir.join(format!("{}.toml", profile));
        if profile_path.exists() {
            builder = builder.add_source(File::from(profile_path).required(false));
        }
    }

    Ok(builder)
}
