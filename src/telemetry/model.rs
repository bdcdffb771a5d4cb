//! Fixed-schema telemetry record and the values it carries.

use crate::telemetry::keys::{TelemetryKey, ValueKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single telemetry reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TelemetryValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl TelemetryValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            TelemetryValue::Float(_) => ValueKind::Float,
            TelemetryValue::Int(_) => ValueKind::Int,
            TelemetryValue::Bool(_) => ValueKind::Bool,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TelemetryValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TelemetryValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TelemetryValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for TelemetryValue {
    fn from(v: f64) -> Self {
        TelemetryValue::Float(v)
    }
}

impl From<i64> for TelemetryValue {
    fn from(v: i64) -> Self {
        TelemetryValue::Int(v)
    }
}

impl From<i32> for TelemetryValue {
    fn from(v: i32) -> Self {
        TelemetryValue::Int(v.into())
    }
}

impl From<u32> for TelemetryValue {
    fn from(v: u32) -> Self {
        TelemetryValue::Int(v.into())
    }
}

impl From<bool> for TelemetryValue {
    fn from(v: bool) -> Self {
        TelemetryValue::Bool(v)
    }
}

/// Key to value map handed to the sink. `None` tells upstream to forget a value.
pub type TelemetryBatch = BTreeMap<TelemetryKey, Option<TelemetryValue>>;

/// Telemetry record with one optional field per known key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_nozzle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_bed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_nozzle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_bed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis_z: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_extruder: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_print: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_fan_print: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_printing: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inaccurate_estimates: Option<bool>,
}

impl Telemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, mostly for readers assembling a reading.
    pub fn with(mut self, key: TelemetryKey, value: impl Into<TelemetryValue>) -> Self {
        self.set(key, Some(value.into()));
        self
    }

    pub fn get(&self, key: TelemetryKey) -> Option<TelemetryValue> {
        match key {
            TelemetryKey::TempNozzle => self.temp_nozzle.map(TelemetryValue::Float),
            TelemetryKey::TempBed => self.temp_bed.map(TelemetryValue::Float),
            TelemetryKey::TargetNozzle => self.target_nozzle.map(TelemetryValue::Float),
            TelemetryKey::TargetBed => self.target_bed.map(TelemetryValue::Float),
            TelemetryKey::AxisX => self.axis_x.map(TelemetryValue::Float),
            TelemetryKey::AxisY => self.axis_y.map(TelemetryValue::Float),
            TelemetryKey::AxisZ => self.axis_z.map(TelemetryValue::Float),
            TelemetryKey::FanExtruder => self.fan_extruder.map(TelemetryValue::Int),
            TelemetryKey::FanPrint => self.fan_print.map(TelemetryValue::Int),
            TelemetryKey::TargetFanPrint => self.target_fan_print.map(TelemetryValue::Int),
            TelemetryKey::Speed => self.speed.map(TelemetryValue::Int),
            TelemetryKey::Flow => self.flow.map(TelemetryValue::Int),
            TelemetryKey::Progress => self.progress.map(TelemetryValue::Int),
            TelemetryKey::TimePrinting => self.time_printing.map(TelemetryValue::Int),
            TelemetryKey::TimeRemaining => self.time_remaining.map(TelemetryValue::Int),
            TelemetryKey::InaccurateEstimates => {
                self.inaccurate_estimates.map(TelemetryValue::Bool)
            }
        }
    }

    /// Set or clear one key.
    ///
    /// # Panics
    ///
    /// Panics when `value` is not of the kind the key holds.
    pub fn set(&mut self, key: TelemetryKey, value: Option<TelemetryValue>) {
        if let Some(v) = &value {
            assert_eq!(
                v.kind(),
                key.kind(),
                "telemetry key {key} cannot hold {v:?}"
            );
        }
        let float = || value.and_then(|v| v.as_f64());
        let int = || value.and_then(|v| v.as_i64());
        match key {
            TelemetryKey::TempNozzle => self.temp_nozzle = float(),
            TelemetryKey::TempBed => self.temp_bed = float(),
            TelemetryKey::TargetNozzle => self.target_nozzle = float(),
            TelemetryKey::TargetBed => self.target_bed = float(),
            TelemetryKey::AxisX => self.axis_x = float(),
            TelemetryKey::AxisY => self.axis_y = float(),
            TelemetryKey::AxisZ => self.axis_z = float(),
            TelemetryKey::FanExtruder => self.fan_extruder = int(),
            TelemetryKey::FanPrint => self.fan_print = int(),
            TelemetryKey::TargetFanPrint => self.target_fan_print = int(),
            TelemetryKey::Speed => self.speed = int(),
            TelemetryKey::Flow => self.flow = int(),
            TelemetryKey::Progress => self.progress = int(),
            TelemetryKey::TimePrinting => self.time_printing = int(),
            TelemetryKey::TimeRemaining => self.time_remaining = int(),
            TelemetryKey::InaccurateEstimates => {
                self.inaccurate_estimates = value.and_then(|v| v.as_bool())
            }
        }
    }

    /// Non-null entries in key order.
    pub fn present(&self) -> impl Iterator<Item = (TelemetryKey, TelemetryValue)> + '_ {
        TelemetryKey::ALL
            .into_iter()
            .filter_map(|key| self.get(key).map(|value| (key, value)))
    }

    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }

    /// Every non-null entry as a batch.
    pub fn to_batch(&self) -> TelemetryBatch {
        self.present().map(|(k, v)| (k, Some(v))).collect()
    }
}
