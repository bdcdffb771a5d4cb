//! Per-key forwarding decisions: state-aware suppression, jitter filtering and
//! deduplication against what upstream was last told.

use crate::device::DeviceState;
use crate::telemetry::activity::ActivityTracker;
use crate::telemetry::keys::{changed_keys, suppressed_for, KeySet, TelemetryKey};
use crate::telemetry::model::{Telemetry, TelemetryBatch, TelemetryValue};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::trace;

/// Result of re-deriving the suppression set after a state transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuppressionChange {
    /// Keys that entered or left suppression, in key order.
    pub changed: Vec<TelemetryKey>,
    /// Whether re-observing released keys counted as activity while asleep.
    pub wake: bool,
}

/// Filter state. Not synchronised; the passer keeps it behind its lock.
#[derive(Debug, Clone)]
pub struct TelemetryFilter {
    jitter_threshold: f64,
    /// Every value ever observed, suppressed or not.
    latest_full: BTreeMap<TelemetryKey, TelemetryValue>,
    /// What readers of the model see. Suppressed keys are `None`.
    live: Telemetry,
    last_sent: TelemetryBatch,
    pending: TelemetryBatch,
    suppressed: KeySet,
}

impl TelemetryFilter {
    pub fn new(jitter_threshold: f64, state: DeviceState) -> Self {
        Self {
            jitter_threshold,
            latest_full: BTreeMap::new(),
            live: Telemetry::new(),
            last_sent: TelemetryBatch::new(),
            pending: TelemetryBatch::new(),
            suppressed: suppressed_for(state),
        }
    }

    pub fn live(&self) -> &Telemetry {
        &self.live
    }

    pub fn pending(&self) -> &TelemetryBatch {
        &self.pending
    }

    pub fn last_sent(&self) -> &TelemetryBatch {
        &self.last_sent
    }

    pub fn suppressed(&self) -> &KeySet {
        &self.suppressed
    }

    pub fn latest_full(&self, key: TelemetryKey) -> Option<TelemetryValue> {
        self.latest_full.get(&key).copied()
    }

    /// Fold a new reading in. Returns true when the worker should be woken.
    pub fn observe(
        &mut self,
        snapshot: &Telemetry,
        state: DeviceState,
        activity: &mut ActivityTracker,
        now: Instant,
    ) -> bool {
        let mut wake = false;
        for (key, value) in snapshot.present() {
            wake |= self.observe_key(key, value, state, activity, now);
        }
        wake
    }

    fn observe_key(
        &mut self,
        key: TelemetryKey,
        value: TelemetryValue,
        state: DeviceState,
        activity: &mut ActivityTracker,
        now: Instant,
    ) -> bool {
        self.latest_full.insert(key, value);

        if self.suppressed.contains(&key) {
            self.suppress_key(key);
            return false;
        }

        self.live.set(key, Some(value));

        if !self.needs_update(key, value) {
            // A value still waiting to go out (blocked pass, queued resend)
            // follows the reading instead of going out stale.
            if matches!(self.pending.get(&key), Some(Some(_))) {
                self.pending.insert(key, Some(value));
            }
            return false;
        }

        let mut wake = false;
        // Speed changes count even mid-print; other activating keys move on
        // their own while printing.
        if key.is_activating() && (!state.is_printing_family() || key == TelemetryKey::Speed) {
            wake = activity.observed(now);
        }

        trace!(key = %key, value = ?value, "telemetry queued");
        self.pending.insert(key, Some(value));
        wake
    }

    fn needs_update(&self, key: TelemetryKey, value: TelemetryValue) -> bool {
        let Some(last) = self.last_sent.get(&key) else {
            return true;
        };
        if key.is_jittery() {
            let Some(old) = last else {
                return true;
            };
            let (Some(new), Some(old)) = (value.as_f64(), old.as_f64()) else {
                panic!("jittery telemetry key {key} must hold floats, got {value:?} after {old:?}");
            };
            (new - old).abs() > self.jitter_threshold
        } else {
            *last != Some(value)
        }
    }

    /// Hide a key: null it in the live model and make sure upstream is told
    /// to forget any value it still holds.
    fn suppress_key(&mut self, key: TelemetryKey) {
        self.live.set(key, None);
        if matches!(self.last_sent.get(&key), Some(Some(_))) {
            self.pending.insert(key, None);
            self.last_sent.insert(key, None);
        } else if matches!(self.pending.get(&key), Some(Some(_))) {
            if self.last_sent.contains_key(&key) {
                // The value replaced a clear that may not have gone out yet.
                self.pending.insert(key, None);
            } else {
                self.pending.remove(&key);
            }
        }
    }

    /// Forget the value of a key, e.g. when its sensor goes away.
    pub fn reset(&mut self, key: TelemetryKey) {
        self.latest_full.remove(&key);
        self.live.set(key, None);
    }

    /// Re-derive the suppression set for `state` and resolve every key whose
    /// status changed.
    pub fn recompute_suppression(
        &mut self,
        state: DeviceState,
        activity: &mut ActivityTracker,
        now: Instant,
    ) -> SuppressionChange {
        let new_suppressed = suppressed_for(state);
        let changed = changed_keys(&self.suppressed, &new_suppressed);
        self.suppressed = new_suppressed;

        let mut wake = false;
        for &key in &changed {
            if self.suppressed.contains(&key) {
                self.suppress_key(key);
            } else if let Some(value) = self.latest_full(key) {
                wake |= self.observe_key(key, value, state, activity, now);
            }
        }
        SuppressionChange { changed, wake }
    }

    /// Hand over everything pending, recording it as sent.
    pub fn take_pending(&mut self) -> TelemetryBatch {
        let batch = std::mem::take(&mut self.pending);
        self.last_sent
            .extend(batch.iter().map(|(key, value)| (*key, *value)));
        batch
    }

    /// Queue the whole live model for sending. Pending clears of suppressed
    /// keys are kept so upstream still learns to forget them.
    pub fn queue_full_resend(&mut self) {
        let clears: Vec<TelemetryKey> = self
            .pending
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| *key)
            .collect();
        self.pending = self.live.to_batch();
        for key in clears {
            self.pending.entry(key).or_insert(None);
        }
    }

    /// Drop everything upstream is believed to know, so fresh readings are
    /// sent unconditionally.
    pub fn wipe(&mut self) {
        self.live = Telemetry::new();
        self.last_sent.clear();
        self.pending.clear();
    }
}
