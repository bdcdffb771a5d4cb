//! Cancellable timed wait shared by the telemetry worker and command execution.

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// How a [`Signal::wait_timeout`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The full timeout elapsed with nothing raised.
    Elapsed,
    /// [`Signal::wake`] was called; the wake is consumed.
    Woken,
    /// [`Signal::stop`] was called; every later wait returns this immediately.
    Stopped,
}

#[derive(Debug, Default)]
struct SignalState {
    woken: bool,
    stopped: bool,
}

/// A wake/stop flag pair guarded by a condition variable.
///
/// Wakes are level-triggered and consumed by the next wait. Stop is sticky.
#[derive(Debug, Default)]
pub struct Signal {
    state: Mutex<SignalState>,
    condvar: Condvar,
}

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wake the current (or next) waiter early.
    pub fn wake(&self) {
        let mut state = self.state.lock();
        state.woken = true;
        self.condvar.notify_all();
    }

    /// Stop every current and future waiter.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        state.stopped = true;
        self.condvar.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        self.state.lock().stopped
    }

    /// Block for up to `timeout`, returning early on wake or stop.
    pub fn wait_timeout(&self, timeout: Duration) -> WaitOutcome {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            if state.stopped {
                return WaitOutcome::Stopped;
            }
            if state.woken {
                state.woken = false;
                return WaitOutcome::Woken;
            }
            // Spurious wakeups loop back; only the deadline ends the wait.
            if self.condvar.wait_until(&mut state, deadline).timed_out() {
                if state.stopped {
                    return WaitOutcome::Stopped;
                }
                if state.woken {
                    state.woken = false;
                    return WaitOutcome::Woken;
                }
                return WaitOutcome::Elapsed;
            }
        }
    }
}
