//! The per-tick body controller.
//!
//! Owns all four legs, the shared gait phase and the commanded targets, and
//! runs the fixed-rate control step: apply queued intents, advance the
//! phase, derive per-leg targets, rate-limit motion, resolve joint angles
//! via inverse kinematics, and push the result to the actuator boundary.
//!
//! Failure isolation: nothing in a tick panics or aborts it. An IK failure
//! on one leg holds that leg's previous pose for the tick and never blocks
//! the others.

use nalgebra::Vector3;
use tracing::warn;

use strider_core::config::RobotConfig;
use strider_core::error::ConfigError;
use strider_core::types::{BatteryReading, JointId, LegId};
use strider_gait::{GaitMode, Phase, TrotParams, trot_offset};
use strider_kinematics::{IkConfig, solve};

use crate::actuator::Actuator;
use crate::command::{Command, JointTarget};
use crate::leg::LegModel;
use crate::snapshot::{LegSnapshot, Snapshot};

/// Safe range for manually commanded joint angles, degrees. Hard invariant:
/// out-of-range requests are clamped before they are stored, never passed
/// through raw.
pub const SAFE_MIN_DEG: f64 = 45.0;
pub const SAFE_MAX_DEG: f64 = 135.0;

/// Positions closer than this count as already there; no solve is attempted.
const MOTION_EPSILON: f64 = 1e-9;

/// Move `current` toward `target` by at most `max_step`, in either
/// direction: the per-tick delta is clamped to `[-max_step, +max_step]`.
#[must_use]
pub fn step_toward(current: f64, target: f64, max_step: f64) -> f64 {
    current + (target - current).clamp(-max_step, max_step)
}

/// State machine and tick engine over all four legs.
///
/// Exactly one writer mutates a `BodyController`; readers receive cloned
/// [`Snapshot`]s.
pub struct BodyController<A> {
    /// Legs in [`LegId::ALL`] order.
    legs: [LegModel; 4],
    gait_mode: GaitMode,
    phase: Phase,
    /// Currently commanded goal of the rate limiter, per leg. Exactly one of
    /// {gait-derived, manual} produces each entry per tick.
    targets: [Vector3<f64>; 4],
    /// Legs pinned by a manual command; the gait pattern skips them until
    /// the next reset.
    manual_hold: [bool; 4],
    trot: TrotParams,
    speed: f64,
    max_axis_speed: f64,
    ik: IkConfig,
    actuator: A,
    tick_count: u64,
}

impl<A: Actuator> BodyController<A> {
    /// Build the controller from a configuration, validating it first.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when the configuration is invalid or incomplete; the
    /// control loop must not start in that case.
    pub fn new(config: &RobotConfig, actuator: A) -> Result<Self, ConfigError> {
        config.validate()?;

        let build = |id: LegId| -> Result<LegModel, ConfigError> {
            let leg_config = config
                .legs
                .get(&id)
                .ok_or_else(|| ConfigError::MissingLeg(id.name().to_string()))?;
            Ok(LegModel::new(id, &config.geometry, leg_config.home))
        };
        let legs = [
            build(LegId::FrontLeft)?,
            build(LegId::FrontRight)?,
            build(LegId::BackLeft)?,
            build(LegId::BackRight)?,
        ];
        let targets = [
            legs[0].resting_foot(),
            legs[1].resting_foot(),
            legs[2].resting_foot(),
            legs[3].resting_foot(),
        ];

        Ok(Self {
            legs,
            gait_mode: GaitMode::Idle,
            phase: Phase::ZERO,
            targets,
            manual_hold: [false; 4],
            trot: TrotParams {
                stride_length: config.gait.stride_length,
                step_height: config.gait.step_height,
            },
            speed: config.control.speed,
            max_axis_speed: config.control.max_axis_speed,
            ik: IkConfig::default(),
            actuator,
            tick_count: 0,
        })
    }

    /// Apply one discrete intent. Runs before kinematics within a tick;
    /// FIFO order across a drained queue is the caller's responsibility.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Reset => {
                self.gait_mode = GaitMode::Idle;
                self.phase = Phase::ZERO;
                for i in 0..4 {
                    self.targets[i] = self.legs[i].resting_foot();
                    self.manual_hold[i] = false;
                }
            }
            Command::StartWalk => self.gait_mode = GaitMode::Trot,
            Command::StopWalk => self.gait_mode = GaitMode::Idle,
            Command::SetJoint { leg, joint, target } => {
                let i = leg.index();
                let mut angles = self.legs[i].angles();
                let requested = match target {
                    JointTarget::Absolute(value) => value,
                    JointTarget::Delta(delta) => angles[joint] + delta,
                };
                angles[joint] = requested.clamp(SAFE_MIN_DEG, SAFE_MAX_DEG);
                // Project the joint intent into a positional target so rate
                // limiting and IK treat it like any other goal.
                self.targets[i] = self.legs[i].chain().foot_position(&angles);
                self.manual_hold[i] = true;
            }
            Command::SetFootPosition { leg, delta } => {
                let i = leg.index();
                self.targets[i] += Vector3::from(delta);
                self.manual_hold[i] = true;
            }
        }
    }

    /// One control period: advance phase, refresh targets, rate-limit,
    /// solve, actuate.
    pub fn tick(&mut self) {
        self.phase.advance(self.speed);

        for i in 0..4 {
            if self.manual_hold[i] {
                continue;
            }
            let resting = self.legs[i].resting_foot();
            self.targets[i] = match self.gait_mode {
                GaitMode::Trot => {
                    resting + trot_offset(self.phase, self.legs[i].id(), &self.trot)
                }
                GaitMode::Idle => resting,
            };
        }

        for i in 0..4 {
            let current = self.legs[i].foot();
            let target = self.targets[i];
            let limited = Vector3::new(
                step_toward(current.x, target.x, self.max_axis_speed),
                step_toward(current.y, target.y, self.max_axis_speed),
                step_toward(current.z, target.z, self.max_axis_speed),
            );
            if (limited - current).norm() <= MOTION_EPSILON {
                continue;
            }

            let solved = solve(self.legs[i].chain(), limited, self.legs[i].angles(), &self.ik);
            match solved {
                Ok(solution) => self.legs[i].set_angles(solution.angles),
                Err(failure) => warn!(
                    leg = %self.legs[i].id(),
                    target = ?(limited.x, limited.y, limited.z),
                    %failure,
                    "inverse kinematics failed; leg holds previous pose"
                ),
            }
        }

        for leg in &self.legs {
            for joint in JointId::ALL {
                self.actuator.apply(leg.id(), joint, leg.angles()[joint]);
            }
        }
        self.tick_count += 1;
    }

    /// Point-in-time copy of the body state.
    #[must_use]
    pub fn snapshot(&self, battery: BatteryReading) -> Snapshot {
        Snapshot {
            tick: self.tick_count,
            gait_mode: self.gait_mode,
            phase: self.phase.value(),
            legs: self
                .legs
                .iter()
                .enumerate()
                .map(|(i, leg)| LegSnapshot {
                    id: leg.id(),
                    angles: leg.angles(),
                    foot: leg.foot().into(),
                    target: self.targets[i].into(),
                })
                .collect(),
            battery,
        }
    }

    #[must_use]
    pub const fn gait_mode(&self) -> GaitMode {
        self.gait_mode
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn leg(&self, id: LegId) -> &LegModel {
        &self.legs[id.index()]
    }

    /// Current rate-limiter goal for a leg.
    #[must_use]
    pub fn target(&self, id: LegId) -> Vector3<f64> {
        self.targets[id.index()]
    }

    #[must_use]
    pub const fn actuator(&self) -> &A {
        &self.actuator
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
