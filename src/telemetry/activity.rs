//! Tracks when something meaningful last happened on the printer.

use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ActivityTracker {
    last_activity_at: Instant,
    sleeping: bool,
}

impl ActivityTracker {
    /// Starts awake, with activity at `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            last_activity_at: now,
            sleeping: false,
        }
    }

    pub fn last_activity_at(&self) -> Instant {
        self.last_activity_at
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Record activity. Returns true when the tracker was sleeping, meaning the
    /// worker should be woken instead of waiting out its long interval.
    pub fn observed(&mut self, now: Instant) -> bool {
        self.last_activity_at = now;
        if self.sleeping {
            debug!("Telemetry passer woke up");
        }
        self.sleeping
    }

    /// Re-derive the sleeping flag from the time since the last activity.
    pub fn update_sleeping(&mut self, now: Instant, sleep_after: Duration) -> bool {
        self.sleeping = now.saturating_duration_since(self.last_activity_at) > sleep_after;
        self.sleeping
    }
}
