//! Print job control: every command here is done once the printer reports the
//! state the command leads to.

use crate::command::retry::{CommandRetryExecutor, StateReached};
use crate::config::CommandConfig;
use crate::device::DeviceState;
use crate::error::CommandError;
use tracing::info;

pub struct PrintCommands {
    executor: CommandRetryExecutor,
    resume_gcode: String,
    pause_gcode: String,
    stop_gcode: String,
}

impl PrintCommands {
    pub fn new(executor: CommandRetryExecutor, config: &CommandConfig) -> Self {
        Self {
            executor,
            resume_gcode: config.resume_gcode.clone(),
            pause_gcode: config.pause_gcode.clone(),
            stop_gcode: config.stop_gcode.clone(),
        }
    }

    pub fn executor(&self) -> &CommandRetryExecutor {
        &self.executor
    }

    pub fn resume_print(&self) -> Result<StateReached, CommandError> {
        info!("Resuming print");
        self.executor
            .try_until_state(&self.resume_gcode, DeviceState::Printing)
    }

    pub fn pause_print(&self) -> Result<StateReached, CommandError> {
        info!("Pausing print");
        self.executor
            .try_until_state(&self.pause_gcode, DeviceState::Paused)
    }

    pub fn stop_print(&self) -> Result<StateReached, CommandError> {
        info!("Stopping print");
        self.executor
            .try_until_state(&self.stop_gcode, DeviceState::Stopped)
    }
}
