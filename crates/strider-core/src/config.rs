//! Robot configuration: control-loop timing, gait parameters, leg geometry
//! and per-servo calibration.
//!
//! Loaded once at startup from TOML and treated as immutable for the process
//! lifetime. The engine receives the fully parsed structure; raw
//! configuration text never crosses the boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{JointAngles, JointId, LegId};

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_rate_hz() -> f64 {
    20.0
}
const fn default_speed() -> f64 {
    0.05
}
const fn default_max_axis_speed() -> f64 {
    5.0
}
const fn default_stride_length() -> f64 {
    30.0
}
const fn default_step_height() -> f64 {
    15.0
}

// ---------------------------------------------------------------------------
// ControlConfig
// ---------------------------------------------------------------------------

/// Control-loop timing and motion smoothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Control tick rate in Hz (default: 20).
    #[serde(default = "default_rate_hz")]
    pub rate_hz: f64,

    /// Gait phase increment per tick. Must be in (0, 1) so a single wrap
    /// suffices when advancing the phase.
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Per-axis rate limit: the largest foot-position change allowed per
    /// tick, in either direction, in the same linear units as link lengths.
    #[serde(default = "default_max_axis_speed")]
    pub max_axis_speed: f64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            rate_hz: default_rate_hz(),
            speed: default_speed(),
            max_axis_speed: default_max_axis_speed(),
        }
    }
}

impl ControlConfig {
    /// Tick period in seconds.
    #[must_use]
    pub fn period_secs(&self) -> f64 {
        1.0 / self.rate_hz
    }
}

// ---------------------------------------------------------------------------
// GaitConfig
// ---------------------------------------------------------------------------

/// Trot gait shape parameters, in the same linear units as link lengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaitConfig {
    /// Full front-to-back travel of a foot over one stance (default: 30).
    #[serde(default = "default_stride_length")]
    pub stride_length: f64,

    /// Peak foot lift at mid-swing (default: 15).
    #[serde(default = "default_step_height")]
    pub step_height: f64,
}

impl Default for GaitConfig {
    fn default() -> Self {
        Self {
            stride_length: default_stride_length(),
            step_height: default_step_height(),
        }
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// DH parameters of one actuated link. `theta` is the joint variable and is
/// not part of the geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActuatedLink {
    /// Link twist in degrees.
    pub alpha: f64,
    /// Link length.
    pub a: f64,
    /// Link offset.
    pub d: f64,
}

/// DH parameters of a fixed link (base mount or foot offset).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedLink {
    /// Link twist in degrees.
    pub alpha: f64,
    /// Link length.
    pub a: f64,
    /// Link offset.
    pub d: f64,
    /// Fixed joint angle in degrees.
    pub theta: f64,
}

/// Geometry template for the canonical back-left leg.
///
/// The other three legs are derived by sign mirroring at leg construction;
/// the template itself is never duplicated per leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// Fixed transform from the body frame to the leg's shoulder axis,
    /// encoding mount position and orientation.
    pub base: FixedLink,
    pub shoulder: ActuatedLink,
    pub upper_hip: ActuatedLink,
    pub lower_hip: ActuatedLink,
    /// Fixed offset from the last joint to the foot contact point.
    pub foot: FixedLink,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            base: FixedLink {
                alpha: 90.0,
                a: -55.0,
                d: -40.0,
                theta: 90.0,
            },
            shoulder: ActuatedLink {
                alpha: 0.0,
                a: 0.0,
                d: 15.5,
            },
            upper_hip: ActuatedLink {
                alpha: -90.0,
                a: -9.3,
                d: 21.1,
            },
            lower_hip: ActuatedLink {
                alpha: 0.0,
                a: 63.25,
                d: 0.0,
            },
            foot: FixedLink {
                alpha: 0.0,
                a: 82.5,
                d: 0.0,
                theta: 0.0,
            },
        }
    }
}

impl GeometryConfig {
    /// Upper bound on the distance from the leg base to the foot,
    /// over all joint angles.
    #[must_use]
    pub fn max_reach(&self) -> f64 {
        let link = |a: f64, d: f64| a.hypot(d);
        link(self.shoulder.a, self.shoulder.d)
            + link(self.upper_hip.a, self.upper_hip.d)
            + link(self.lower_hip.a, self.lower_hip.d)
            + link(self.foot.a, self.foot.d)
    }
}

// ---------------------------------------------------------------------------
// Servo calibration
// ---------------------------------------------------------------------------

/// Linear calibration of one servo, measured at two reference poses.
///
/// `deg_45` and `deg_135` are the raw servo angles observed when the joint is
/// physically at 45 and 135 idealized degrees. The boundary map is the line
/// through those two points; the engine itself always reasons in idealized
/// degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServoCalibration {
    /// PWM channel on the servo driver board.
    pub channel: u8,
    /// Raw angle at idealized 45 degrees.
    pub deg_45: f64,
    /// Raw angle at idealized 135 degrees.
    pub deg_135: f64,
}

impl ServoCalibration {
    /// Scale `m` of the `m * ideal + b` boundary map.
    #[must_use]
    pub fn scale(&self) -> f64 {
        (self.deg_135 - self.deg_45) / 90.0
    }

    /// Offset `b` of the `m * ideal + b` boundary map.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.deg_45 - 45.0 * self.scale()
    }

    /// Map an idealized joint angle to the raw servo angle.
    #[must_use]
    pub fn to_raw(&self, ideal_deg: f64) -> f64 {
        self.scale().mul_add(ideal_deg, self.offset())
    }
}

/// Per-leg calibration: home pose plus one servo entry per joint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegConfig {
    /// Calibrated resting angles, idealized degrees.
    pub home: JointAngles,
    /// Servo calibration keyed by joint.
    pub servos: BTreeMap<JointId, ServoCalibration>,
}

// ---------------------------------------------------------------------------
// RobotConfig
// ---------------------------------------------------------------------------

/// Complete robot configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub gait: GaitConfig,
    #[serde(default)]
    pub geometry: GeometryConfig,
    #[serde(default = "default_legs")]
    pub legs: BTreeMap<LegId, LegConfig>,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            control: ControlConfig::default(),
            gait: GaitConfig::default(),
            geometry: GeometryConfig::default(),
            legs: default_legs(),
        }
    }
}

impl RobotConfig {
    /// Load from a TOML file and validate.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] on IO failure, parse failure, or any
    /// validation failure. Startup must abort on error.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field ranges and completeness.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.control.rate_hz <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "control.rate_hz",
                message: format!("{} (must be > 0)", self.control.rate_hz),
            });
        }
        if self.control.speed <= 0.0 || self.control.speed >= 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "control.speed",
                message: format!("{} (must be in (0, 1))", self.control.speed),
            });
        }
        if self.control.max_axis_speed <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "control.max_axis_speed",
                message: format!("{} (must be > 0)", self.control.max_axis_speed),
            });
        }
        if self.gait.stride_length < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "gait.stride_length",
                message: format!("{} (must be >= 0)", self.gait.stride_length),
            });
        }
        if self.gait.step_height < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "gait.step_height",
                message: format!("{} (must be >= 0)", self.gait.step_height),
            });
        }

        for leg in LegId::ALL {
            let Some(leg_config) = self.legs.get(&leg) else {
                return Err(ConfigError::MissingLeg(leg.name().to_string()));
            };
            for joint in JointId::ALL {
                let Some(servo) = leg_config.servos.get(&joint) else {
                    return Err(ConfigError::InvalidValue {
                        field: "legs",
                        message: format!("{leg} is missing servo calibration for {joint}"),
                    });
                };
                if (servo.deg_135 - servo.deg_45).abs() < f64::EPSILON {
                    return Err(ConfigError::InvalidValue {
                        field: "legs",
                        message: format!("{leg} {joint} calibration spans zero degrees"),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Factory-measured calibration of the reference robot.
fn default_legs() -> BTreeMap<LegId, LegConfig> {
    let leg = |home: [f64; 3], servos: [(u8, f64, f64); 3]| {
        let mut map = BTreeMap::new();
        for (joint, (channel, deg_45, deg_135)) in JointId::ALL.into_iter().zip(servos) {
            map.insert(
                joint,
                ServoCalibration {
                    channel,
                    deg_45,
                    deg_135,
                },
            );
        }
        LegConfig {
            home: JointAngles::from_array(home),
            servos: map,
        }
    };

    let mut legs = BTreeMap::new();
    legs.insert(
        LegId::FrontLeft,
        leg(
            [78.0, 83.0, 81.0],
            [(2, 31.0, 143.0), (1, 36.0, 148.0), (0, 41.0, 161.0)],
        ),
    );
    legs.insert(
        LegId::BackLeft,
        leg(
            [94.0, 64.0, 97.0],
            [(6, 41.0, 158.0), (5, 30.0, 145.0), (4, 36.0, 148.0)],
        ),
    );
    legs.insert(
        LegId::BackRight,
        leg(
            [97.0, 101.0, 92.0],
            [(10, 38.0, 156.0), (9, 30.0, 142.0), (8, 33.0, 143.0)],
        ),
    );
    legs.insert(
        LegId::FrontRight,
        leg(
            [77.0, 101.0, 89.0],
            [(14, 31.0, 143.0), (13, 41.0, 145.0), (12, 45.0, 152.0)],
        ),
    );
    legs
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_config_is_valid() {
        RobotConfig::default().validate().unwrap();
    }

    #[test]
    fn default_has_all_legs_and_joints() {
        let config = RobotConfig::default();
        for leg in LegId::ALL {
            let leg_config = &config.legs[&leg];
            assert_eq!(leg_config.servos.len(), 3);
        }
    }

    #[test]
    fn period_from_rate() {
        let control = ControlConfig::default();
        assert_relative_eq!(control.period_secs(), 0.05, epsilon = 1e-12);
    }

    #[test]
    fn invalid_rate_rejected() {
        let mut config = RobotConfig::default();
        config.control.rate_hz = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "control.rate_hz"
        ));
    }

    #[test]
    fn speed_of_one_rejected() {
        let mut config = RobotConfig::default();
        config.control.speed = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_leg_rejected() {
        let mut config = RobotConfig::default();
        config.legs.remove(&LegId::BackRight);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingLeg(name)) if name == "back_right"
        ));
    }

    #[test]
    fn missing_servo_rejected() {
        let mut config = RobotConfig::default();
        config
            .legs
            .get_mut(&LegId::FrontLeft)
            .unwrap()
            .servos
            .remove(&JointId::LowerHip);
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_span_calibration_rejected() {
        let mut config = RobotConfig::default();
        let servo = config
            .legs
            .get_mut(&LegId::FrontLeft)
            .unwrap()
            .servos
            .get_mut(&JointId::Shoulder)
            .unwrap();
        servo.deg_135 = servo.deg_45;
        assert!(config.validate().is_err());
    }

    #[test]
    fn calibration_linear_map() {
        let servo = ServoCalibration {
            channel: 0,
            deg_45: 41.0,
            deg_135: 161.0,
        };
        // Line through (45, 41) and (135, 161).
        assert_relative_eq!(servo.to_raw(45.0), 41.0, epsilon = 1e-12);
        assert_relative_eq!(servo.to_raw(135.0), 161.0, epsilon = 1e-12);
        assert_relative_eq!(servo.to_raw(90.0), 101.0, epsilon = 1e-12);
    }

    #[test]
    fn max_reach_sums_link_lengths() {
        let geometry = GeometryConfig::default();
        let expected = 15.5 + (9.3_f64).hypot(21.1) + 63.25 + 82.5;
        assert_relative_eq!(geometry.max_reach(), expected, epsilon = 1e-9);
    }

    #[test]
    fn toml_roundtrip() {
        let config = RobotConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: RobotConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let parsed: RobotConfig = toml::from_str(
            r#"
            [control]
            rate_hz = 50.0
            "#,
        )
        .unwrap();
        assert_relative_eq!(parsed.control.rate_hz, 50.0);
        assert_relative_eq!(parsed.control.speed, 0.05);
        parsed.validate().unwrap();
    }
}
