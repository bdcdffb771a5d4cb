//! Printlink: Printer Telemetry and Command Core
//!
//! The control plane of a daemon bridging printer firmware to a cloud service:
//! adaptive telemetry pacing and filtering, and commands that are only
//! considered done once the printer reports the state they lead to.

pub mod cli;
pub mod command;
pub mod concurrency;
pub mod config;
pub mod device;
pub mod error;
pub mod logging;
pub mod telemetry;
