//! Telemetry domain: keys and model, filtering, cadence, and the passer that
//! ties them to the outbound sink.

pub mod activity;
pub mod clock;
pub mod filter;
pub mod keys;
pub mod model;
pub mod passer;
pub mod scheduler;
pub mod sink;

pub use activity::ActivityTracker;
pub use clock::{Clock, ManualClock, SystemClock};
pub use filter::{SuppressionChange, TelemetryFilter};
pub use keys::{KeySet, TelemetryKey, ValueKind};
pub use model::{Telemetry, TelemetryBatch, TelemetryValue};
pub use passer::TelemetryPasser;
pub use scheduler::{Cadence, TelemetryScheduler};
pub use sink::{PassOutcome, SkipReason, TelemetrySink};
