//! Outbound telemetry collaborator and the outcome of a hand-off attempt.

use crate::telemetry::model::TelemetryBatch;
use std::fmt;

/// Upstream telemetry queue, typically the cloud SDK.
///
/// `send_telemetry` is called while the passer holds its lock; it must only
/// enqueue and must never call back into the passer.
pub trait TelemetrySink: Send + Sync {
    /// Whether an upstream link is configured at all.
    fn is_configured(&self) -> bool;

    /// Whether the upstream client finished its own initialisation.
    fn is_initialized(&self) -> bool;

    /// Whether first-time setup still has to be completed by the user.
    fn setup_pending(&self) -> bool;

    /// Items currently waiting in the outbound queue.
    fn queue_len(&self) -> usize;

    fn send_telemetry(&self, batch: TelemetryBatch);
}

/// Why a pass was skipped. None of these are errors; the next tick retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotConfigured,
    NotInitialized,
    SetupPending,
    Backpressure { queued: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotConfigured => write!(f, "upstream link is not configured"),
            SkipReason::NotInitialized => write!(f, "upstream client is not initialised"),
            SkipReason::SetupPending => write!(f, "setup wizard has not been completed"),
            SkipReason::Backpressure { queued } => {
                write!(f, "outbound queue looks stuck ({queued} waiting)")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// A batch with this many keys went to the sink. Zero is still a send.
    Sent(usize),
    Skipped(SkipReason),
}

impl PassOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, PassOutcome::Sent(_))
    }
}
