//! Command-line interface for inspecting and validating the bridge configuration.

use crate::config::{
    base_config_path_in, global_config_path, ConfigLoader, PrintlinkConfig, DEFAULT_CONFIG_DIR,
};
use crate::error::ConfigError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "printlink", version, about = "Printer telemetry and command bridge")]
pub struct Cli {
    /// Directory holding config.toml and optional profile files
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_DIR)]
    pub config_dir: PathBuf,

    /// Explicit configuration file, replacing the global file and the config directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level override (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format override (text, json)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Configuration inspection
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Check the effective configuration and report every problem
    Validate,
    /// Print where configuration is read from
    Path,
}

impl Cli {
    /// Load the configuration the flags point at.
    pub fn load_config(&self) -> Result<PrintlinkConfig, ConfigError> {
        match &self.config {
            Some(path) => ConfigLoader::load_from_file(path),
            None => ConfigLoader::load(&self.config_dir),
        }
    }

    /// Apply logging flags on top of a loaded configuration.
    pub fn apply_logging_overrides(&self, config: &mut PrintlinkConfig) {
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
    }
}

/// Executes CLI commands against a loaded configuration.
pub struct RunContext {
    config_dir: PathBuf,
    config: PrintlinkConfig,
}

impl RunContext {
    pub fn new(config_dir: PathBuf, config: PrintlinkConfig) -> Self {
        Self { config_dir, config }
    }

    pub fn config(&self) -> &PrintlinkConfig {
        &self.config
    }

    pub fn execute(&self, command: &Commands) -> Result<String, ConfigError> {
        match command {
            Commands::Config(ConfigCommands::Show) => toml::to_string_pretty(&self.config)
                .map_err(|e| ConfigError::Render(e.to_string())),
            Commands::Config(ConfigCommands::Validate) => {
                self.config.validate().map_err(ConfigError::Invalid)?;
                Ok("Configuration is valid".to_string())
            }
            Commands::Config(ConfigCommands::Path) => {
                let global = global_config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(unavailable)".to_string());
                let directory = base_config_path_in(&self.config_dir);
                Ok(format!(
                    "global: {}\nconfig dir: {}",
                    global,
                    directory.display()
                ))
            }
        }
    }
}
