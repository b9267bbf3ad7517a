//! Typed command set and the transport-boundary parser.
//!
//! Transports (HTTP handlers, game-controller listeners) parse their wire
//! vocabulary into [`Command`] values exactly once, at the boundary. The
//! control tick only ever sees the tagged variants; no string is interpreted
//! inside the loop.

use serde::{Deserialize, Serialize};

use strider_core::error::CommandError;
use strider_core::types::{JointId, LegId};

/// How a manual joint command specifies its angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointTarget {
    /// Absolute idealized angle, degrees.
    Absolute(f64),
    /// Offset from the joint's current angle, degrees.
    Delta(f64),
}

/// A discrete intent for the body controller.
///
/// Applied in FIFO order at the start of a tick, before any kinematics runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Stop any gait, clear manual holds, zero the phase and target the
    /// resting pose.
    Reset,
    /// Begin trotting.
    StartWalk,
    /// Stop trotting; legs return to rest.
    StopWalk,
    /// Manually command one joint. The stored target is clamped to the safe
    /// range before use.
    SetJoint {
        leg: LegId,
        joint: JointId,
        target: JointTarget,
    },
    /// Nudge one leg's target foot position by per-axis deltas.
    SetFootPosition { leg: LegId, delta: [f64; 3] },
}

/// Vertical nudge used by the `up`/`down` wire commands.
const BODY_STEP: f64 = 5.0;

impl Command {
    /// Parse one wire command into engine commands.
    ///
    /// Vocabulary: `reset`, `start_walk`, `stop_walk`, `up`, `down`, and
    /// `set_<leg>_<joint>_<delta>` (for example
    /// `set_front_left_lower_hip_-5`). The body commands `up`/`down` expand
    /// to one foot-position delta per leg: raising the body lowers every
    /// foot relative to it.
    ///
    /// # Errors
    ///
    /// [`CommandError`] for unknown verbs, legs or joints. Nothing is ever
    /// silently ignored.
    pub fn parse(input: &str) -> Result<Vec<Self>, CommandError> {
        match input {
            "reset" => return Ok(vec![Self::Reset]),
            "start_walk" => return Ok(vec![Self::StartWalk]),
            "stop_walk" => return Ok(vec![Self::StopWalk]),
            "up" => return Ok(body_shift(-BODY_STEP)),
            "down" => return Ok(body_shift(BODY_STEP)),
            _ => {}
        }

        let Some(rest) = input.strip_prefix("set_") else {
            return Err(CommandError::Unparseable(input.to_string()));
        };

        let leg = LegId::ALL
            .into_iter()
            .find(|leg| rest.starts_with(leg.name()))
            .ok_or_else(|| CommandError::UnknownLeg(rest.to_string()))?;
        let rest = rest[leg.name().len()..]
            .strip_prefix('_')
            .ok_or_else(|| CommandError::Unparseable(input.to_string()))?;

        let joint = JointId::ALL
            .into_iter()
            .find(|joint| rest.starts_with(joint.name()))
            .ok_or_else(|| CommandError::UnknownJoint(rest.to_string()))?;
        let rest = rest[joint.name().len()..]
            .strip_prefix('_')
            .ok_or_else(|| CommandError::Unparseable(input.to_string()))?;

        let delta: f64 = rest
            .parse()
            .map_err(|_| CommandError::Unparseable(input.to_string()))?;

        Ok(vec![Self::SetJoint {
            leg,
            joint,
            target: JointTarget::Delta(delta),
        }])
    }
}

fn body_shift(dz: f64) -> Vec<Command> {
    LegId::ALL
        .into_iter()
        .map(|leg| Command::SetFootPosition {
            leg,
            delta: [0.0, 0.0, dz],
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_verbs() {
        assert_eq!(Command::parse("reset").unwrap(), vec![Command::Reset]);
        assert_eq!(Command::parse("start_walk").unwrap(), vec![Command::StartWalk]);
        assert_eq!(Command::parse("stop_walk").unwrap(), vec![Command::StopWalk]);
    }

    #[test]
    fn parse_set_joint_with_negative_delta() {
        let commands = Command::parse("set_front_left_lower_hip_-5").unwrap();
        assert_eq!(
            commands,
            vec![Command::SetJoint {
                leg: LegId::FrontLeft,
                joint: JointId::LowerHip,
                target: JointTarget::Delta(-5.0),
            }]
        );
    }

    #[test]
    fn parse_set_joint_with_positive_delta() {
        let commands = Command::parse("set_back_right_shoulder_5").unwrap();
        assert_eq!(
            commands,
            vec![Command::SetJoint {
                leg: LegId::BackRight,
                joint: JointId::Shoulder,
                target: JointTarget::Delta(5.0),
            }]
        );
    }

    #[test]
    fn up_expands_to_all_legs() {
        let commands = Command::parse("up").unwrap();
        assert_eq!(commands.len(), 4);
        for command in &commands {
            let Command::SetFootPosition { delta, .. } = command else {
                panic!("expected SetFootPosition, got {command:?}");
            };
            assert_eq!(*delta, [0.0, 0.0, -BODY_STEP]);
        }
    }

    #[test]
    fn down_lifts_feet_relative_to_body() {
        let commands = Command::parse("down").unwrap();
        let Command::SetFootPosition { delta, .. } = commands[0] else {
            panic!("expected SetFootPosition");
        };
        assert_eq!(delta, [0.0, 0.0, BODY_STEP]);
    }

    #[test]
    fn unknown_verb_rejected() {
        assert!(matches!(
            Command::parse("dance"),
            Err(CommandError::Unparseable(_))
        ));
    }

    #[test]
    fn unknown_leg_rejected() {
        assert!(matches!(
            Command::parse("set_middle_left_shoulder_5"),
            Err(CommandError::UnknownLeg(_))
        ));
    }

    #[test]
    fn unknown_joint_rejected() {
        assert!(matches!(
            Command::parse("set_front_left_elbow_5"),
            Err(CommandError::UnknownJoint(_))
        ));
    }

    #[test]
    fn garbage_delta_rejected() {
        assert!(matches!(
            Command::parse("set_front_left_shoulder_much"),
            Err(CommandError::Unparseable(_))
        ));
    }

    #[test]
    fn commands_serialize() {
        let command = Command::SetJoint {
            leg: LegId::FrontLeft,
            joint: JointId::Shoulder,
            target: JointTarget::Absolute(120.0),
        };
        let json = serde_json::to_string(&command).unwrap();
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, command);
    }
}
