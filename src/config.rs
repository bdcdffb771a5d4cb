//! Configuration System
//!
//! Layered configuration for the telemetry passer and device commands:
//! built-in defaults, then the user's global file, then the config directory, then
//! `PRINTLINK__SECTION__FIELD` environment variables.

use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::config_dir::{base_config_path_in, DEFAULT_CONFIG_DIR};
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrintlinkConfig {
    /// Telemetry pacing and filtering
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Device command execution
    #[serde(default)]
    pub commands: CommandConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Telemetry passer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Send interval while a print is underway
    #[serde(default = "default_printing_interval_ms")]
    pub printing_interval_ms: u64,

    /// Send interval while idle but recently active
    #[serde(default = "default_idle_interval_ms")]
    pub idle_interval_ms: u64,

    /// Send interval once nothing happened for `sleep_after_secs`
    #[serde(default = "default_sleeping_interval_ms")]
    pub sleeping_interval_ms: u64,

    #[serde(default = "default_sleep_after_secs")]
    pub sleep_after_secs: u64,

    /// Period of the forced full resend
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Temperature changes up to this amount are treated as noise
    #[serde(default = "default_jitter_threshold")]
    pub jitter_threshold: f64,

    /// Outbound queue length at which sending pauses
    #[serde(default = "default_queue_length_limit")]
    pub queue_length_limit: usize,
}

fn default_printing_interval_ms() -> u64 {
    1000
}

fn default_idle_interval_ms() -> u64 {
    2500
}

fn default_sleeping_interval_ms() -> u64 {
    10_000
}

fn default_sleep_after_secs() -> u64 {
    3 * 60
}

fn default_refresh_interval_secs() -> u64 {
    5 * 60
}

fn default_jitter_threshold() -> f64 {
    0.5
}

fn default_queue_length_limit() -> usize {
    4
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            printing_interval_ms: default_printing_interval_ms(),
            idle_interval_ms: default_idle_interval_ms(),
            sleeping_interval_ms: default_sleeping_interval_ms(),
            sleep_after_secs: default_sleep_after_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            jitter_threshold: default_jitter_threshold(),
            queue_length_limit: default_queue_length_limit(),
        }
    }
}

impl TelemetryConfig {
    pub fn printing_interval(&self) -> Duration {
        Duration::from_millis(self.printing_interval_ms)
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }

    pub fn sleeping_interval(&self) -> Duration {
        Duration::from_millis(self.sleeping_interval_ms)
    }

    pub fn sleep_after(&self) -> Duration {
        Duration::from_secs(self.sleep_after_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.printing_interval_ms == 0 {
            return Err("printing_interval_ms must be greater than zero".to_string());
        }
        if self.printing_interval_ms > self.idle_interval_ms
            || self.idle_interval_ms > self.sleeping_interval_ms
        {
            return Err(format!(
                "intervals must satisfy printing <= idle <= sleeping (got {} / {} / {} ms)",
                self.printing_interval_ms, self.idle_interval_ms, self.sleeping_interval_ms
            ));
        }
        if !self.jitter_threshold.is_finite() || self.jitter_threshold < 0.0 {
            return Err(format!(
                "jitter_threshold must be a non-negative number, got {}",
                self.jitter_threshold
            ));
        }
        if self.queue_length_limit == 0 {
            return Err("queue_length_limit must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Device command configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Wait between device state observations
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Observations before a command times out
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_resume_gcode")]
    pub resume_gcode: String,

    #[serde(default = "default_pause_gcode")]
    pub pause_gcode: String,

    #[serde(default = "default_stop_gcode")]
    pub stop_gcode: String,
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_max_attempts() -> u32 {
    10
}

fn default_resume_gcode() -> String {
    "M602".to_string()
}

fn default_pause_gcode() -> String {
    "M601".to_string()
}

fn default_stop_gcode() -> String {
    "M603".to_string()
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_attempts: default_max_attempts(),
            resume_gcode: default_resume_gcode(),
            pause_gcode: default_pause_gcode(),
            stop_gcode: default_stop_gcode(),
        }
    }
}

impl CommandConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be greater than zero".to_string());
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than zero".to_string());
        }
        for (name, gcode) in [
            ("resume_gcode", &self.resume_gcode),
            ("pause_gcode", &self.pause_gcode),
            ("stop_gcode", &self.stop_gcode),
        ] {
            if gcode.trim().is_empty() {
                return Err(format!("{} cannot be empty", name));
            }
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Telemetry(String),
    Commands(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Telemetry(msg) => write!(f, "Telemetry: {}", msg),
            ValidationError::Commands(msg) => write!(f, "Commands: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl PrintlinkConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.telemetry.validate() {
            errors.push(ValidationError::Telemetry(e));
        }
        if let Err(e) = self.commands.validate() {
            errors.push(ValidationError::Commands(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration manager for runtime updates
pub struct ConfigManager {
    config: Arc<RwLock<PrintlinkConfig>>,
}

impl ConfigManager {
    /// Create a new configuration manager with the given config
    pub fn new(config: PrintlinkConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// Reload configuration from files. The active configuration is kept if
    /// the new one does not validate.
    pub fn reload(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let new_config = ConfigLoader::load(config_dir)?;
        new_config.validate().map_err(ConfigError::Invalid)?;
        *self.config.write() = new_config;
        Ok(())
    }

    /// Get current configuration (read-only)
    pub fn get(&self) -> PrintlinkConfig {
        self.config.read().clone()
    }
}
