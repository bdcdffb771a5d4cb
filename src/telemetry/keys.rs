//! The fixed set of telemetry keys and the key classes the filter works with.

use crate::device::DeviceState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Value kind a key is allowed to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Float,
    Int,
    Bool,
}

/// Every telemetry key known to the bridge.
///
/// Declaration order is the iteration order of key sets and batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryKey {
    TempNozzle,
    TempBed,
    TargetNozzle,
    TargetBed,
    AxisX,
    AxisY,
    AxisZ,
    FanExtruder,
    FanPrint,
    TargetFanPrint,
    Speed,
    Flow,
    Progress,
    TimePrinting,
    TimeRemaining,
    InaccurateEstimates,
}

pub type KeySet = BTreeSet<TelemetryKey>;

/// Sensor readings subject to small-amplitude noise
pub const JITTERY: [TelemetryKey; 2] = [TelemetryKey::TempNozzle, TelemetryKey::TempBed];

/// Changes that count as operator activity and wake a sleeping passer
pub const ACTIVATING: [TelemetryKey; 7] = [
    TelemetryKey::TargetNozzle,
    TelemetryKey::TargetBed,
    TelemetryKey::AxisX,
    TelemetryKey::AxisY,
    TelemetryKey::AxisZ,
    TelemetryKey::TargetFanPrint,
    TelemetryKey::Speed,
];

/// Print-job values that mean nothing outside of a print
pub const NOT_PRINTING_SUPPRESSED: [TelemetryKey; 4] = [
    TelemetryKey::TimePrinting,
    TelemetryKey::TimeRemaining,
    TelemetryKey::Progress,
    TelemetryKey::InaccurateEstimates,
];

/// Head position is noise while actively printing
pub const PRINTING_SUPPRESSED: [TelemetryKey; 2] = [TelemetryKey::AxisX, TelemetryKey::AxisY];

impl TelemetryKey {
    pub const ALL: [TelemetryKey; 16] = [
        TelemetryKey::TempNozzle,
        TelemetryKey::TempBed,
        TelemetryKey::TargetNozzle,
        TelemetryKey::TargetBed,
        TelemetryKey::AxisX,
        TelemetryKey::AxisY,
        TelemetryKey::AxisZ,
        TelemetryKey::FanExtruder,
        TelemetryKey::FanPrint,
        TelemetryKey::TargetFanPrint,
        TelemetryKey::Speed,
        TelemetryKey::Flow,
        TelemetryKey::Progress,
        TelemetryKey::TimePrinting,
        TelemetryKey::TimeRemaining,
        TelemetryKey::InaccurateEstimates,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TelemetryKey::TempNozzle => "temp_nozzle",
            TelemetryKey::TempBed => "temp_bed",
            TelemetryKey::TargetNozzle => "target_nozzle",
            TelemetryKey::TargetBed => "target_bed",
            TelemetryKey::AxisX => "axis_x",
            TelemetryKey::AxisY => "axis_y",
            TelemetryKey::AxisZ => "axis_z",
            TelemetryKey::FanExtruder => "fan_extruder",
            TelemetryKey::FanPrint => "fan_print",
            TelemetryKey::TargetFanPrint => "target_fan_print",
            TelemetryKey::Speed => "speed",
            TelemetryKey::Flow => "flow",
            TelemetryKey::Progress => "progress",
            TelemetryKey::TimePrinting => "time_printing",
            TelemetryKey::TimeRemaining => "time_remaining",
            TelemetryKey::InaccurateEstimates => "inaccurate_estimates",
        }
    }

    pub fn kind(self) -> ValueKind {
        match self {
            TelemetryKey::TempNozzle
            | TelemetryKey::TempBed
            | TelemetryKey::TargetNozzle
            | TelemetryKey::TargetBed
            | TelemetryKey::AxisX
            | TelemetryKey::AxisY
            | TelemetryKey::AxisZ => ValueKind::Float,
            TelemetryKey::InaccurateEstimates => ValueKind::Bool,
            _ => ValueKind::Int,
        }
    }

    pub fn is_jittery(self) -> bool {
        JITTERY.contains(&self)
    }

    pub fn is_activating(self) -> bool {
        ACTIVATING.contains(&self)
    }
}

impl fmt::Display for TelemetryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keys that must not be forwarded while the device is in `state`.
pub fn suppressed_for(state: DeviceState) -> KeySet {
    if !state.is_printing_family() {
        NOT_PRINTING_SUPPRESSED.into_iter().collect()
    } else if state == DeviceState::Printing {
        PRINTING_SUPPRESSED.into_iter().collect()
    } else {
        KeySet::new()
    }
}

/// Keys whose suppression status differs between `old` and `new`, in key order.
pub fn changed_keys(old: &KeySet, new: &KeySet) -> Vec<TelemetryKey> {
    old.symmetric_difference(new).copied().collect()
}
