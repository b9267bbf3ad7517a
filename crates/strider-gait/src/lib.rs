//! Phase-driven trot pattern generation.
//!
//! A single shared [`Phase`] in `[0, 1)` drives all four legs. Diagonal
//! pairs read it half a cycle apart, which is the defining trot invariant:
//! front-left + back-right versus front-right + back-left.
//!
//! Each leg cycle is half stance, half swing:
//! - stance (`leg_phase < 0.5`): foot planted, sliding from `+stride/2` to
//!   `-stride/2` to push the body forward, zero lift;
//! - swing (`leg_phase >= 0.5`): foot airborne, returning forward along the
//!   same span with a `sin(pi * progress)` lift arc peaking at mid-swing.
//!
//! Both pieces meet at the same X at the stance/swing handover and at the
//! wraparound, so the offset is continuous over the whole cycle.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use strider_core::types::LegId;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Gait phase scalar in `[0, 1)`.
///
/// Advanced by a fixed per-tick increment and wrapped modulo 1. Owned by the
/// body controller; the gait function only ever reads it.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Phase(f64);

impl Phase {
    pub const ZERO: Self = Self(0.0);

    /// Wrap an arbitrary value into `[0, 1)`.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value.rem_euclid(1.0))
    }

    /// Raw phase value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Advance by `speed`. A single conditional wrap suffices because the
    /// per-tick increment is below 1 by construction.
    pub fn advance(&mut self, speed: f64) {
        self.0 += speed;
        if self.0 >= 1.0 {
            self.0 -= 1.0;
        }
    }

    /// Phase as seen by `leg`: diagonal pair A reads it directly, pair B
    /// offset by half a cycle.
    #[must_use]
    pub fn for_leg(self, leg: LegId) -> f64 {
        if leg.in_diagonal_pair_a() {
            self.0
        } else {
            (self.0 + 0.5) % 1.0
        }
    }
}

// ---------------------------------------------------------------------------
// GaitMode
// ---------------------------------------------------------------------------

/// Active gait of the body controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GaitMode {
    /// No pattern; legs hold their resting positions.
    #[default]
    Idle,
    /// Diagonal-pair trot.
    Trot,
}

// ---------------------------------------------------------------------------
// Trot offset
// ---------------------------------------------------------------------------

/// Trot shape parameters, linear units of the leg geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrotParams {
    /// Full front-to-back foot travel over one stance.
    pub stride_length: f64,
    /// Peak foot lift at mid-swing.
    pub step_height: f64,
}

/// Foot offset for `leg` at `phase`, relative to the leg's resting position.
///
/// X is the walking direction, Z is up; Y is always zero (no lateral
/// component in this gait). The caller adds the offset to the resting foot
/// position to obtain the absolute target.
#[must_use]
pub fn trot_offset(phase: Phase, leg: LegId, params: &TrotParams) -> Vector3<f64> {
    let leg_phase = phase.for_leg(leg);

    if leg_phase < 0.5 {
        // Stance: planted foot slides backward, pushing the body forward.
        let progress = leg_phase / 0.5;
        let x = params.stride_length / 2.0 - progress * params.stride_length;
        Vector3::new(x, 0.0, 0.0)
    } else {
        // Swing: airborne foot returns forward with a sinusoidal lift arc.
        let progress = (leg_phase - 0.5) / 0.5;
        let x = -params.stride_length / 2.0 + progress * params.stride_length;
        let z = params.step_height * (std::f64::consts::PI * progress).sin();
        Vector3::new(x, 0.0, z)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const PARAMS: TrotParams = TrotParams {
        stride_length: 30.0,
        step_height: 15.0,
    };

    #[test]
    fn phase_advance_wraps_into_unit_interval() {
        let mut phase = Phase::ZERO;
        for _ in 0..1000 {
            phase.advance(0.05);
            assert!(phase.value() >= 0.0 && phase.value() < 1.0);
        }
    }

    #[test]
    fn phase_returns_to_start_after_full_cycle() {
        let speed: f64 = 0.05;
        let mut phase = Phase::ZERO;
        let ticks = (1.0 / speed).round() as usize;
        for _ in 0..ticks {
            phase.advance(speed);
        }
        assert_relative_eq!(phase.value(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn phase_new_wraps_negative_values() {
        assert_relative_eq!(Phase::new(-0.25).value(), 0.75, epsilon = 1e-12);
        assert_relative_eq!(Phase::new(1.25).value(), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn diagonal_pairs_read_half_cycle_apart() {
        let phase = Phase::new(0.3);
        assert_relative_eq!(phase.for_leg(LegId::FrontLeft), 0.3, epsilon = 1e-12);
        assert_relative_eq!(phase.for_leg(LegId::BackRight), 0.3, epsilon = 1e-12);
        assert_relative_eq!(phase.for_leg(LegId::FrontRight), 0.8, epsilon = 1e-12);
        assert_relative_eq!(phase.for_leg(LegId::BackLeft), 0.8, epsilon = 1e-12);
    }

    #[test]
    fn paired_legs_share_the_offset_curve() {
        // trot_offset(p, front_left) == trot_offset((p + 0.5) % 1, front_right)
        for i in 0..40 {
            let p = f64::from(i) / 40.0;
            let a = trot_offset(Phase::new(p), LegId::FrontLeft, &PARAMS);
            let b = trot_offset(Phase::new((p + 0.5) % 1.0), LegId::FrontRight, &PARAMS);
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn stance_keeps_foot_on_ground() {
        for i in 0..10 {
            let p = f64::from(i) * 0.05; // leg phases 0.0 .. 0.45
            let offset = trot_offset(Phase::new(p), LegId::FrontLeft, &PARAMS);
            assert_relative_eq!(offset.z, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn stance_sweeps_front_to_back() {
        let start = trot_offset(Phase::new(0.0), LegId::FrontLeft, &PARAMS);
        let mid = trot_offset(Phase::new(0.25), LegId::FrontLeft, &PARAMS);
        let near_end = trot_offset(Phase::new(0.4999), LegId::FrontLeft, &PARAMS);
        assert_relative_eq!(start.x, 15.0, epsilon = 1e-12);
        assert_relative_eq!(mid.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(near_end.x, -15.0, epsilon = 1e-2);
    }

    #[test]
    fn swing_peaks_at_mid_swing() {
        let offset = trot_offset(Phase::new(0.75), LegId::FrontLeft, &PARAMS);
        assert_relative_eq!(offset.z, PARAMS.step_height, epsilon = 1e-9);
        assert_relative_eq!(offset.x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn no_lateral_component() {
        for i in 0..20 {
            let p = f64::from(i) / 20.0;
            for leg in LegId::ALL {
                let offset = trot_offset(Phase::new(p), leg, &PARAMS);
                assert_relative_eq!(offset.y, 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn continuous_at_swing_start() {
        let before = trot_offset(Phase::new(0.5 - 1e-9), LegId::FrontLeft, &PARAMS);
        let after = trot_offset(Phase::new(0.5), LegId::FrontLeft, &PARAMS);
        assert_relative_eq!(before.x, after.x, epsilon = 1e-6);
        assert_relative_eq!(before.z, after.z, epsilon = 1e-6);
    }

    #[test]
    fn continuous_at_wraparound() {
        let before = trot_offset(Phase::new(1.0 - 1e-9), LegId::FrontLeft, &PARAMS);
        let after = trot_offset(Phase::new(0.0), LegId::FrontLeft, &PARAMS);
        assert_relative_eq!(before.x, after.x, epsilon = 1e-6);
        assert_relative_eq!(before.z, after.z, epsilon = 1e-6);
    }

    #[test]
    fn gait_mode_defaults_to_idle() {
        assert_eq!(GaitMode::default(), GaitMode::Idle);
    }
}
