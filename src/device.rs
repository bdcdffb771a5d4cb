//! Device-side collaborators: the discrete printer state and the traits used to
//! observe it and to push commands at the firmware.

use crate::error::ChannelError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete printer state as reported by the firmware link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceState {
    Idle,
    Busy,
    Ready,
    Printing,
    Paused,
    Finished,
    Stopped,
    Error,
    Attention,
}

impl DeviceState {
    /// States in which a print job is underway.
    pub const PRINTING_FAMILY: [DeviceState; 2] = [DeviceState::Printing, DeviceState::Paused];

    pub fn is_printing_family(self) -> bool {
        Self::PRINTING_FAMILY.contains(&self)
    }

    /// States that mean the firmware refused or failed, as opposed to a state
    /// it is still transitioning through.
    pub fn is_fault(self) -> bool {
        matches!(self, DeviceState::Error | DeviceState::Attention)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceState::Idle => "IDLE",
            DeviceState::Busy => "BUSY",
            DeviceState::Ready => "READY",
            DeviceState::Printing => "PRINTING",
            DeviceState::Paused => "PAUSED",
            DeviceState::Finished => "FINISHED",
            DeviceState::Stopped => "STOPPED",
            DeviceState::Error => "ERROR",
            DeviceState::Attention => "ATTENTION",
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read access to the current device state.
pub trait DeviceStateSource: Send + Sync {
    fn current_state(&self) -> DeviceState;
}

/// Outbound command path to the firmware.
///
/// Sending is fire-and-forget: `Ok` only means the payload was written, not
/// that the firmware acted on it.
pub trait CommandChannel: Send + Sync {
    fn send(&self, payload: &str) -> Result<(), ChannelError>;
}
