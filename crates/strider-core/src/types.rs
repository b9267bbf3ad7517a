//! Shared identifier and joint-state types.
//!
//! Angles are idealized joint-space degrees everywhere in the engine; the
//! hardware calibration map is applied only by actuator adapters.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CommandError;

// ---------------------------------------------------------------------------
// LegId
// ---------------------------------------------------------------------------

/// Mount quadrant of a leg.
///
/// The trot gait pairs diagonally opposite legs: front-left with back-right
/// (pair A) and front-right with back-left (pair B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegId {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

impl LegId {
    /// All legs, in fixed iteration order.
    pub const ALL: [Self; 4] = [
        Self::FrontLeft,
        Self::FrontRight,
        Self::BackLeft,
        Self::BackRight,
    ];

    /// Stable snake_case name, matching the serialized form.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FrontLeft => "front_left",
            Self::FrontRight => "front_right",
            Self::BackLeft => "back_left",
            Self::BackRight => "back_right",
        }
    }

    /// Whether the leg is mounted at the front of the body.
    #[must_use]
    pub const fn is_front(self) -> bool {
        matches!(self, Self::FrontLeft | Self::FrontRight)
    }

    /// Whether the leg is mounted on the right side of the body.
    #[must_use]
    pub const fn is_right(self) -> bool {
        matches!(self, Self::FrontRight | Self::BackRight)
    }

    /// Whether the leg belongs to diagonal pair A (front-left + back-right).
    ///
    /// Pair A reads the gait phase directly; pair B reads it offset by half
    /// a cycle.
    #[must_use]
    pub const fn in_diagonal_pair_a(self) -> bool {
        matches!(self, Self::FrontLeft | Self::BackRight)
    }

    /// Contiguous index in [0, 4), in [`ALL`](Self::ALL) order.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::FrontLeft => 0,
            Self::FrontRight => 1,
            Self::BackLeft => 2,
            Self::BackRight => 3,
        }
    }
}

impl fmt::Display for LegId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LegId {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "front_left" => Ok(Self::FrontLeft),
            "front_right" => Ok(Self::FrontRight),
            "back_left" => Ok(Self::BackLeft),
            "back_right" => Ok(Self::BackRight),
            other => Err(CommandError::UnknownLeg(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// JointId
// ---------------------------------------------------------------------------

/// One of the three actuated joints of a leg, from body outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointId {
    Shoulder,
    UpperHip,
    LowerHip,
}

impl JointId {
    /// All joints, in chain order (base to foot).
    pub const ALL: [Self; 3] = [Self::Shoulder, Self::UpperHip, Self::LowerHip];

    /// Stable snake_case name, matching the serialized form.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Shoulder => "shoulder",
            Self::UpperHip => "upper_hip",
            Self::LowerHip => "lower_hip",
        }
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for JointId {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shoulder" => Ok(Self::Shoulder),
            "upper_hip" => Ok(Self::UpperHip),
            "lower_hip" => Ok(Self::LowerHip),
            other => Err(CommandError::UnknownJoint(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// JointAngles
// ---------------------------------------------------------------------------

/// Ordered joint angle triple for one leg, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointAngles {
    pub shoulder: f64,
    pub upper_hip: f64,
    pub lower_hip: f64,
}

impl JointAngles {
    pub const fn new(shoulder: f64, upper_hip: f64, lower_hip: f64) -> Self {
        Self {
            shoulder,
            upper_hip,
            lower_hip,
        }
    }

    /// All three joints at the same angle.
    #[must_use]
    pub const fn uniform(angle: f64) -> Self {
        Self::new(angle, angle, angle)
    }

    /// Angles as an array in chain order.
    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.shoulder, self.upper_hip, self.lower_hip]
    }

    #[must_use]
    pub const fn from_array(a: [f64; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }

    /// Clamp every joint to `[min, max]` degrees.
    #[must_use]
    pub fn clamped(self, min: f64, max: f64) -> Self {
        Self::new(
            self.shoulder.clamp(min, max),
            self.upper_hip.clamp(min, max),
            self.lower_hip.clamp(min, max),
        )
    }

    /// Largest absolute per-joint difference to `other`, in degrees.
    #[must_use]
    pub fn max_abs_diff(self, other: Self) -> f64 {
        let d0 = (self.shoulder - other.shoulder).abs();
        let d1 = (self.upper_hip - other.upper_hip).abs();
        let d2 = (self.lower_hip - other.lower_hip).abs();
        d0.max(d1).max(d2)
    }
}

impl Index<JointId> for JointAngles {
    type Output = f64;

    fn index(&self, joint: JointId) -> &f64 {
        match joint {
            JointId::Shoulder => &self.shoulder,
            JointId::UpperHip => &self.upper_hip,
            JointId::LowerHip => &self.lower_hip,
        }
    }
}

impl IndexMut<JointId> for JointAngles {
    fn index_mut(&mut self, joint: JointId) -> &mut f64 {
        match joint {
            JointId::Shoulder => &mut self.shoulder,
            JointId::UpperHip => &mut self.upper_hip,
            JointId::LowerHip => &mut self.lower_hip,
        }
    }
}

impl From<[f64; 3]> for JointAngles {
    fn from(a: [f64; 3]) -> Self {
        Self::from_array(a)
    }
}

// ---------------------------------------------------------------------------
// Battery telemetry
// ---------------------------------------------------------------------------

/// Charge direction reported by the battery monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    Charging,
    Discharging,
    Idle,
    /// No monitor attached or the read failed.
    Offline,
}

/// One sample from the battery monitor.
///
/// Display-only: the control loop never gates decisions on telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryReading {
    /// Bus voltage in volts.
    pub voltage: f64,
    /// Current in amps; negative while discharging.
    pub current: f64,
    /// Power draw in watts.
    pub power: f64,
    /// Estimated charge in [0, 100].
    pub percentage: f64,
    pub status: ChargeStatus,
}

impl BatteryReading {
    /// Reading reported when no monitor is attached.
    #[must_use]
    pub const fn offline() -> Self {
        Self {
            voltage: 0.0,
            current: 0.0,
            power: 0.0,
            percentage: 0.0,
            status: ChargeStatus::Offline,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
