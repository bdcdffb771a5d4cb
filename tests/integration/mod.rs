//! Integration tests for the printlink telemetry and command core

mod command_retry;
mod config_integration;
