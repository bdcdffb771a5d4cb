//! Telemetry passer
//!
//! Decides how often to send telemetry and what to send. Readings come in on
//! caller threads through [`TelemetryPasser::set_telemetry`]; a dedicated
//! worker thread ticks at a cadence that depends on printer activity and hands
//! whatever changed to the [`TelemetrySink`].

use crate::concurrency::{Signal, WaitOutcome};
use crate::config::TelemetryConfig;
use crate::device::DeviceStateSource;
use crate::telemetry::activity::ActivityTracker;
use crate::telemetry::clock::{Clock, SystemClock};
use crate::telemetry::filter::{SuppressionChange, TelemetryFilter};
use crate::telemetry::keys::TelemetryKey;
use crate::telemetry::model::{Telemetry, TelemetryBatch};
use crate::telemetry::scheduler::{Cadence, TelemetryScheduler};
use crate::telemetry::sink::{PassOutcome, SkipReason, TelemetrySink};
use parking_lot::Mutex;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error, info};

const WORKER_NAME: &str = "telemetry_passer";

/// Everything the passer mutates, guarded by one lock.
struct TelemetryState {
    filter: TelemetryFilter,
    activity: ActivityTracker,
    scheduler: TelemetryScheduler,
}

struct Shared {
    state: Mutex<TelemetryState>,
    signal: Signal,
    running: AtomicBool,
    queue_length_limit: usize,
    device: Arc<dyn DeviceStateSource>,
    sink: Arc<dyn TelemetrySink>,
    clock: Arc<dyn Clock>,
}

impl Shared {
    fn skip_reason(&self) -> Option<SkipReason> {
        if !self.sink.is_configured() {
            return Some(SkipReason::NotConfigured);
        }
        if !self.sink.is_initialized() {
            return Some(SkipReason::NotInitialized);
        }
        if self.sink.setup_pending() {
            return Some(SkipReason::SetupPending);
        }
        let queued = self.sink.queue_len();
        if queued >= self.queue_length_limit {
            return Some(SkipReason::Backpressure { queued });
        }
        None
    }

    fn pass(&self) -> PassOutcome {
        if let Some(reason) = self.skip_reason() {
            debug!(reason = %reason, "No telemetry pass");
            return PassOutcome::Skipped(reason);
        }

        let mut state = self.state.lock();
        let batch = state.filter.take_pending();
        let sent = batch.len();
        self.sink.send_telemetry(batch);
        PassOutcome::Sent(sent)
    }

    fn resend_latest(&self) -> PassOutcome {
        self.state.lock().filter.queue_full_resend();
        self.pass()
    }

    fn tick(&self) -> PassOutcome {
        let now = self.clock.now();
        let device_state = self.device.current_state();
        let refresh = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            state
                .scheduler
                .recompute(&mut state.activity, device_state, now);
            state.scheduler.refresh_due(now)
        };
        if refresh {
            debug!("Full telemetry refresh");
            self.resend_latest();
        }
        self.pass()
    }

    fn interval(&self) -> std::time::Duration {
        self.state.lock().scheduler.interval()
    }

    fn run(&self) {
        info!("Telemetry passer started");
        while self.running.load(Ordering::SeqCst) {
            self.tick();
            // A wake just means tick now; the wait window starts over after.
            if self.signal.wait_timeout(self.interval()) == WaitOutcome::Stopped {
                break;
            }
        }
        info!("Telemetry passer stopped");
    }
}

/// Paces and filters telemetry on its way upstream.
pub struct TelemetryPasser {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TelemetryPasser {
    pub fn new(
        config: &TelemetryConfig,
        device: Arc<dyn DeviceStateSource>,
        sink: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self::with_clock(config, device, sink, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: &TelemetryConfig,
        device: Arc<dyn DeviceStateSource>,
        sink: Arc<dyn TelemetrySink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let now = clock.now();
        let state = TelemetryState {
            filter: TelemetryFilter::new(config.jitter_threshold, device.current_state()),
            activity: ActivityTracker::new(now),
            scheduler: TelemetryScheduler::new(config),
        };
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                signal: Signal::new(),
                running: AtomicBool::new(false),
                queue_length_limit: config.queue_length_limit,
                device,
                sink,
                clock,
            }),
            worker: Mutex::new(None),
        }
    }

    /// Spawn the worker thread. Calling it again while running does nothing,
    /// and a stopped passer stays stopped.
    pub fn start(&self) -> io::Result<()> {
        let mut worker = self.worker.lock();
        if worker.is_some() || self.shared.signal.is_stopped() {
            return Ok(());
        }
        self.shared.running.store(true, Ordering::SeqCst);
        let shared = self.shared.clone();
        let handle = thread::Builder::new()
            .name(WORKER_NAME.to_string())
            .spawn(move || shared.run())?;
        *worker = Some(handle);
        Ok(())
    }

    /// Ask the worker to stop. Interrupts a wait in progress.
    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::SeqCst);
        self.shared.signal.stop();
    }

    /// Block until the worker has exited.
    pub fn wait_stopped(&self) {
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("Telemetry passer worker panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// One worker iteration: pick the cadence, refresh everything if the
    /// refresh period ran out, then pass what is pending.
    pub fn tick(&self) -> PassOutcome {
        self.shared.tick()
    }

    /// Hand pending telemetry to the sink if it can take it.
    pub fn pass(&self) -> PassOutcome {
        self.shared.pass()
    }

    /// Mark the whole live model for sending and pass it right away.
    /// For reconnects and anything else that makes upstream forget.
    pub fn resend_latest(&self) -> PassOutcome {
        self.shared.resend_latest()
    }

    /// Filter a new reading into the model and the pending batch.
    pub fn set_telemetry(&self, telemetry: &Telemetry) {
        let device_state = self.shared.device.current_state();
        let now = self.shared.clock.now();
        let wake = {
            let mut guard = self.shared.state.lock();
            let state = &mut *guard;
            state
                .filter
                .observe(telemetry, device_state, &mut state.activity, now)
        };
        if wake {
            self.shared.signal.wake();
        }
    }

    /// Forget a key's value, e.g. after its sensor disconnected.
    pub fn reset_value(&self, key: TelemetryKey) {
        self.shared.state.lock().filter.reset(key);
    }

    /// Re-evaluate which keys are suppressed after the device state changed.
    pub fn state_changed(&self) -> SuppressionChange {
        let device_state = self.shared.device.current_state();
        let now = self.shared.clock.now();
        let change = {
            let mut guard = self.shared.state.lock();
            let state = &mut *guard;
            state
                .filter
                .recompute_suppression(device_state, &mut state.activity, now)
        };
        if !change.changed.is_empty() {
            debug!(state = %device_state, changed = ?change.changed, "Telemetry suppression changed");
        }
        if change.wake {
            self.shared.signal.wake();
        }
        change
    }

    /// Record activity that should wake the passer from its sleeping cadence.
    pub fn activity_observed(&self) {
        let now = self.shared.clock.now();
        let wake = self.shared.state.lock().activity.observed(now);
        if wake {
            self.shared.signal.wake();
        }
    }

    /// Declare all telemetry stale so that fresh values get sent no matter what.
    pub fn wipe(&self) {
        self.shared.state.lock().filter.wipe();
    }

    /// Copy of the live model, suppressed keys cleared.
    pub fn latest_telemetry(&self) -> Telemetry {
        self.shared.state.lock().filter.live().clone()
    }

    pub fn pending(&self) -> TelemetryBatch {
        self.shared.state.lock().filter.pending().clone()
    }

    pub fn last_sent(&self) -> TelemetryBatch {
        self.shared.state.lock().filter.last_sent().clone()
    }

    pub fn cadence(&self) -> Cadence {
        self.shared.state.lock().scheduler.cadence()
    }

    pub fn is_sleeping(&self) -> bool {
        self.shared.state.lock().activity.is_sleeping()
    }

    pub fn last_activity_at(&self) -> Instant {
        self.shared.state.lock().activity.last_activity_at()
    }
}

impl Drop for TelemetryPasser {
    fn drop(&mut self) {
        self.stop();
        self.wait_stopped();
    }
}
