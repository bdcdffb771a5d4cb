//! Error types for the printlink telemetry and command core.

use crate::config::ValidationError;
use crate::device::DeviceState;
use thiserror::Error;

/// Failures of the firmware command path itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("Write ignored by the printer")]
    WriteIgnored,

    #[error("Printer link disconnected: {0}")]
    Disconnected(String),
}

/// Command-level failures, surfaced to whoever invoked the command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error(
        "Timed out waiting for {command} to reach {desired} after {attempts} attempts (last seen {last_observed})"
    )]
    Timeout {
        command: String,
        desired: DeviceState,
        attempts: u32,
        last_observed: DeviceState,
    },

    #[error("Printer reported {observed} while waiting for {command} to reach {desired}")]
    DeviceFault {
        command: String,
        desired: DeviceState,
        observed: DeviceState,
    },

    #[error("Command channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Command {command} cancelled")]
    Cancelled { command: String },
}

/// Configuration and startup errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Configuration validation failed:\n{}", format_validation(.0))]
    Invalid(Vec<ValidationError>),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Failed to render configuration: {0}")]
    Render(String),
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Load(err.to_string())
    }
}
