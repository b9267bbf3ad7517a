//! Actuator boundary.
//!
//! The controller computes angles as plain values and hands them to an
//! injected [`Actuator`] once per joint per tick; adapters own the
//! hardware-specific calibration map and pulse timing. The engine never
//! constructs or imports hardware handles itself.

use std::collections::BTreeMap;

use tracing::debug;

use strider_core::config::{RobotConfig, ServoCalibration};
use strider_core::types::{JointId, LegId};

/// Sink for validated, in-range joint angles.
///
/// Called for every joint on every tick, even when unchanged; writes must be
/// idempotent.
pub trait Actuator {
    fn apply(&mut self, leg: LegId, joint: JointId, angle_deg: f64);
}

// ---------------------------------------------------------------------------
// CalibrationTable
// ---------------------------------------------------------------------------

/// Per-servo calibration lookup for adapters.
#[derive(Debug, Clone, Default)]
pub struct CalibrationTable {
    entries: BTreeMap<(LegId, JointId), ServoCalibration>,
}

impl CalibrationTable {
    /// Collect every servo entry from the validated configuration.
    #[must_use]
    pub fn from_config(config: &RobotConfig) -> Self {
        let mut entries = BTreeMap::new();
        for (&leg, leg_config) in &config.legs {
            for (&joint, &servo) in &leg_config.servos {
                entries.insert((leg, joint), servo);
            }
        }
        Self { entries }
    }

    /// Channel and raw servo angle for an idealized joint angle.
    #[must_use]
    pub fn to_raw(&self, leg: LegId, joint: JointId, ideal_deg: f64) -> Option<(u8, f64)> {
        self.entries
            .get(&(leg, joint))
            .map(|servo| (servo.channel, servo.to_raw(ideal_deg)))
    }
}

// ---------------------------------------------------------------------------
// Adapters
// ---------------------------------------------------------------------------

/// Discards all writes. Placeholder when no hardware is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullActuator;

impl Actuator for NullActuator {
    fn apply(&mut self, _leg: LegId, _joint: JointId, _angle_deg: f64) {}
}

/// Records every write for inspection in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingActuator {
    pub writes: Vec<(LegId, JointId, f64)>,
}

impl RecordingActuator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write for a specific joint, if any.
    #[must_use]
    pub fn last_for(&self, leg: LegId, joint: JointId) -> Option<f64> {
        self.writes
            .iter()
            .rev()
            .find(|(l, j, _)| *l == leg && *j == joint)
            .map(|(_, _, angle)| *angle)
    }
}

impl Actuator for RecordingActuator {
    fn apply(&mut self, leg: LegId, joint: JointId, angle_deg: f64) {
        self.writes.push((leg, joint, angle_deg));
    }
}

/// Applies the calibration map and logs the resulting channel write.
///
/// Stands in for a real servo-driver adapter during headless runs.
#[derive(Debug, Clone)]
pub struct LoggingActuator {
    calibration: CalibrationTable,
}

impl LoggingActuator {
    #[must_use]
    pub fn new(calibration: CalibrationTable) -> Self {
        Self { calibration }
    }
}

impl Actuator for LoggingActuator {
    fn apply(&mut self, leg: LegId, joint: JointId, angle_deg: f64) {
        match self.calibration.to_raw(leg, joint, angle_deg) {
            Some((channel, raw)) => {
                debug!(%leg, %joint, channel, angle_deg, raw, "servo write");
            }
            None => {
                debug!(%leg, %joint, angle_deg, "servo write (uncalibrated)");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
