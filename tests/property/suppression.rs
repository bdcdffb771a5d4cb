//! Suppressed keys never reach upstream, whatever order things happen in

use printlink::device::DeviceState;
use printlink::telemetry::keys::suppressed_for;
use printlink::telemetry::{
    ActivityTracker, Telemetry, TelemetryBatch, TelemetryFilter, TelemetryKey, ValueKind,
};
use proptest::prelude::*;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
enum Op {
    Observe(Telemetry),
    Transition(DeviceState),
    Pass,
    Reset(TelemetryKey),
    Wipe,
    Resend,
}

const STATES: [DeviceState; 9] = [
    DeviceState::Idle,
    DeviceState::Busy,
    DeviceState::Ready,
    DeviceState::Printing,
    DeviceState::Paused,
    DeviceState::Finished,
    DeviceState::Stopped,
    DeviceState::Error,
    DeviceState::Attention,
];

fn key_strategy() -> impl Strategy<Value = TelemetryKey> {
    (0..TelemetryKey::ALL.len()).prop_map(|i| TelemetryKey::ALL[i])
}

fn state_strategy() -> impl Strategy<Value = DeviceState> {
    (0..STATES.len()).prop_map(|i| STATES[i])
}

fn reading_strategy() -> impl Strategy<Value = Telemetry> {
    prop::collection::vec((key_strategy(), 0i64..300), 0..6).prop_map(|pairs| {
        let mut reading = Telemetry::new();
        for (key, raw) in pairs {
            reading = match key.kind() {
                ValueKind::Float => reading.with(key, raw as f64 / 2.0),
                ValueKind::Int => reading.with(key, raw),
                ValueKind::Bool => reading.with(key, raw % 2 == 0),
            };
        }
        reading
    })
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => reading_strategy().prop_map(Op::Observe),
        2 => state_strategy().prop_map(Op::Transition),
        2 => Just(Op::Pass),
        1 => key_strategy().prop_map(Op::Reset),
        1 => Just(Op::Wipe),
        1 => Just(Op::Resend),
    ]
}

fn holds_value(batch: &TelemetryBatch, key: TelemetryKey) -> bool {
    matches!(batch.get(&key), Some(Some(_)))
}

/// After every operation no suppressed key carries a value in the live
/// model, the pending batch, or what upstream is believed to hold.
#[test]
fn test_suppressed_keys_never_hold_values() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(state_strategy(), prop::collection::vec(op_strategy(), 1..40)),
            |(initial, ops)| {
                let start = Instant::now();
                let mut now = start;
                let mut state = initial;
                let mut filter = TelemetryFilter::new(0.5, state);
                let mut activity = ActivityTracker::new(now);
                let mut sent: TelemetryBatch = TelemetryBatch::new();

                for op in ops {
                    now += Duration::from_secs(1);
                    match op {
                        Op::Observe(reading) => {
                            filter.observe(&reading, state, &mut activity, now);
                        }
                        Op::Transition(next) => {
                            state = next;
                            filter.recompute_suppression(state, &mut activity, now);
                        }
                        Op::Pass => {
                            sent.extend(filter.take_pending());
                        }
                        Op::Reset(key) => filter.reset(key),
                        Op::Wipe => {
                            filter.wipe();
                            sent.clear();
                        }
                        Op::Resend => filter.queue_full_resend(),
                    }

                    let suppressed = suppressed_for(state);
                    prop_assert_eq!(filter.suppressed(), &suppressed);
                    for key in suppressed {
                        prop_assert!(filter.live().get(key).is_none());
                        prop_assert!(!holds_value(filter.pending(), key));
                        prop_assert!(!holds_value(filter.last_sent(), key));
                        // What the sink received, replayed in order, never
                        // leaves a suppressed value behind once pending drains.
                        if !filter.pending().contains_key(&key) {
                            prop_assert!(!holds_value(&sent, key));
                        }
                    }
                }

                Ok(())
            },
        )
        .unwrap();
}
