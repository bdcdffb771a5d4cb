//! Commands that wait for the printer to confirm the state they lead to

use crate::integration::test_utils::{FakeDevice, RecordingChannel, ScriptedDevice};
use printlink::command::{CommandRetryExecutor, PrintCommands, RetryPolicy};
use printlink::concurrency::Signal;
use printlink::config::CommandConfig;
use printlink::device::DeviceState;
use printlink::error::CommandError;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn fast_config(max_attempts: u32) -> CommandConfig {
    CommandConfig {
        poll_interval_ms: 1,
        max_attempts,
        ..CommandConfig::default()
    }
}

fn print_commands(
    states: &[DeviceState],
    max_attempts: u32,
) -> (PrintCommands, Arc<ScriptedDevice>, Arc<RecordingChannel>) {
    let config = fast_config(max_attempts);
    let device = ScriptedDevice::new(states);
    let channel = RecordingChannel::new();
    let executor = CommandRetryExecutor::new(
        channel.clone(),
        device.clone(),
        RetryPolicy::from_config(&config),
    );
    (PrintCommands::new(executor, &config), device, channel)
}

#[test]
fn test_resume_confirmed_on_second_observation() {
    let (commands, device, channel) =
        print_commands(&[DeviceState::Paused, DeviceState::Printing], 5);

    let reached = commands.resume_print().unwrap();
    assert_eq!(reached.state, DeviceState::Printing);
    assert_eq!(reached.attempts, 2);
    assert_eq!(channel.sent(), vec!["M602".to_string()]);
    assert_eq!(device.reads(), 2);
}

#[test]
fn test_resume_times_out_without_resending() {
    let (commands, device, channel) = print_commands(&[DeviceState::Paused], 5);

    let err = commands.resume_print().unwrap_err();
    assert_eq!(
        err,
        CommandError::Timeout {
            command: "M602".to_string(),
            desired: DeviceState::Printing,
            attempts: 5,
            last_observed: DeviceState::Paused,
        }
    );
    assert_eq!(channel.sent().len(), 1);
    assert_eq!(device.reads(), 5);
}

#[test]
fn test_pause_and_stop_wait_for_their_states() {
    let (commands, _, channel) = print_commands(
        &[
            DeviceState::Printing,
            DeviceState::Paused,
            DeviceState::Stopped,
        ],
        3,
    );

    assert_eq!(commands.pause_print().unwrap().state, DeviceState::Paused);
    assert_eq!(commands.stop_print().unwrap().state, DeviceState::Stopped);
    assert_eq!(channel.sent(), vec!["M601".to_string(), "M603".to_string()]);
}

#[test]
fn test_attention_aborts_resume() {
    let (commands, device, _) = print_commands(
        &[DeviceState::Paused, DeviceState::Attention, DeviceState::Printing],
        5,
    );

    let err = commands.resume_print().unwrap_err();
    assert!(matches!(
        err,
        CommandError::DeviceFault {
            observed: DeviceState::Attention,
            ..
        }
    ));
    assert_eq!(device.reads(), 2);
}

#[test]
fn test_custom_gcode_from_config() {
    let config = CommandConfig {
        resume_gcode: "M24".to_string(),
        ..fast_config(2)
    };
    let channel = RecordingChannel::new();
    let executor = CommandRetryExecutor::new(
        channel.clone(),
        FakeDevice::new(DeviceState::Printing),
        RetryPolicy::from_config(&config),
    );
    PrintCommands::new(executor, &config).resume_print().unwrap();
    assert_eq!(channel.sent(), vec!["M24".to_string()]);
}

#[test]
fn test_shared_signal_cancels_waiting_command() {
    let cancel = Arc::new(Signal::new());
    let policy = RetryPolicy {
        poll_interval: Duration::from_secs(10),
        max_attempts: 10,
    };
    let channel = RecordingChannel::new();
    let executor = CommandRetryExecutor::new(
        channel.clone(),
        FakeDevice::new(DeviceState::Paused),
        policy,
    )
    .with_cancel_signal(cancel.clone());

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        cancel.stop();
    });

    let started = Instant::now();
    let err = executor
        .try_until_state("M602", DeviceState::Printing)
        .unwrap_err();
    canceller.join().unwrap();

    assert_eq!(
        err,
        CommandError::Cancelled {
            command: "M602".to_string()
        }
    );
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(channel.sent().len(), 1);
}
