//! Send-loop cadence and the periodic full-refresh timer.

use crate::config::TelemetryConfig;
use crate::device::DeviceState;
use crate::telemetry::activity::ActivityTracker;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

/// How often the worker hands telemetry to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Sleeping,
    Idle,
    Printing,
}

impl Cadence {
    pub fn as_str(self) -> &'static str {
        match self {
            Cadence::Sleeping => "sleeping",
            Cadence::Idle => "idle",
            Cadence::Printing => "printing",
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryScheduler {
    printing_interval: Duration,
    idle_interval: Duration,
    sleeping_interval: Duration,
    sleep_after: Duration,
    refresh_interval: Duration,
    cadence: Cadence,
    full_refresh_at: Option<Instant>,
}

impl TelemetryScheduler {
    pub fn new(config: &TelemetryConfig) -> Self {
        Self {
            printing_interval: config.printing_interval(),
            idle_interval: config.idle_interval(),
            sleeping_interval: config.sleeping_interval(),
            sleep_after: config.sleep_after(),
            refresh_interval: config.refresh_interval(),
            cadence: Cadence::Sleeping,
            full_refresh_at: None,
        }
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Wait between ticks for the current cadence.
    pub fn interval(&self) -> Duration {
        match self.cadence {
            Cadence::Sleeping => self.sleeping_interval,
            Cadence::Idle => self.idle_interval,
            Cadence::Printing => self.printing_interval,
        }
    }

    /// Pick the cadence for this tick. Sleep wins over everything else.
    pub fn recompute(
        &mut self,
        activity: &mut ActivityTracker,
        state: DeviceState,
        now: Instant,
    ) -> Cadence {
        let cadence = if activity.update_sleeping(now, self.sleep_after) {
            Cadence::Sleeping
        } else if state.is_printing_family() {
            Cadence::Printing
        } else {
            Cadence::Idle
        };
        if cadence != self.cadence {
            debug!(from = %self.cadence, to = %cadence, "Telemetry cadence changed");
        }
        self.cadence = cadence;
        self.cadence
    }

    /// True when a full resync is due. Restarts the refresh period when it is.
    pub fn refresh_due(&mut self, now: Instant) -> bool {
        let due = match self.full_refresh_at {
            None => true,
            Some(at) => now.saturating_duration_since(at) > self.refresh_interval,
        };
        if due {
            self.full_refresh_at = Some(now);
        }
        due
    }
}
