//! Send a command once, then poll the device until it reaches the state the
//! command is supposed to produce.

use crate::concurrency::{Signal, WaitOutcome};
use crate::config::CommandConfig;
use crate::device::{CommandChannel, DeviceState, DeviceStateSource};
use crate::error::CommandError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Polling schedule for [`CommandRetryExecutor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub fn from_config(config: &CommandConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            max_attempts: config.max_attempts,
        }
    }

    /// Longest a command can take before it times out.
    pub fn worst_case(&self) -> Duration {
        self.poll_interval * self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&CommandConfig::default())
    }
}

/// The desired state was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateReached {
    pub state: DeviceState,
    /// Observation on which the state was seen, starting at 1.
    pub attempts: u32,
}

pub struct CommandRetryExecutor {
    channel: Arc<dyn CommandChannel>,
    device: Arc<dyn DeviceStateSource>,
    policy: RetryPolicy,
    cancel: Arc<Signal>,
}

impl CommandRetryExecutor {
    pub fn new(
        channel: Arc<dyn CommandChannel>,
        device: Arc<dyn DeviceStateSource>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            channel,
            device,
            policy,
            cancel: Arc::new(Signal::new()),
        }
    }

    /// Share a stop signal, e.g. the daemon's shutdown signal.
    pub fn with_cancel_signal(mut self, cancel: Arc<Signal>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Abandon any command currently waiting, and every later one.
    pub fn cancel(&self) {
        self.cancel.stop();
    }

    /// Send `command` exactly once and wait for `desired` to be observed.
    ///
    /// Only the observation is retried. Re-sending is unsafe for commands that
    /// are not idempotent, like resuming a print.
    pub fn try_until_state(
        &self,
        command: &str,
        desired: DeviceState,
    ) -> Result<StateReached, CommandError> {
        if self.cancel.is_stopped() {
            return Err(CommandError::Cancelled {
                command: command.to_string(),
            });
        }

        debug!(command = %command, desired = %desired, "Trying to get to the desired state");
        self.channel.send(command)?;

        let mut observed = None;
        for attempt in 1..=self.policy.max_attempts {
            if self.cancel.wait_timeout(self.policy.poll_interval) == WaitOutcome::Stopped {
                info!(command = %command, "Command cancelled while waiting");
                return Err(CommandError::Cancelled {
                    command: command.to_string(),
                });
            }

            let state = self.device.current_state();
            observed = Some(state);
            if state == desired {
                debug!(command = %command, attempts = attempt, "Desired state reached");
                return Ok(StateReached {
                    state,
                    attempts: attempt,
                });
            }
            if state.is_fault() {
                warn!(command = %command, desired = %desired, observed = %state, "Printer faulted during command");
                return Err(CommandError::DeviceFault {
                    command: command.to_string(),
                    desired,
                    observed: state,
                });
            }
        }

        let observed = observed.unwrap_or_else(|| self.device.current_state());

        warn!(
            command = %command,
            desired = %desired,
            last_observed = %observed,
            attempts = self.policy.max_attempts,
            "Gave up waiting for the desired state"
        );
        Err(CommandError::Timeout {
            command: command.to_string(),
            desired,
            attempts: self.policy.max_attempts,
            last_observed: observed,
        })
    }
}
