//! Kinematic chain of one leg in Denavit-Hartenberg form.
//!
//! A [`LegChain`] is five links: a fixed base transform encoding the mount
//! position and orientation in the body frame, three actuated joints
//! (shoulder, upper hip, lower hip) and a fixed foot offset. All four legs
//! share one geometry template; a leg-specific chain is derived by sign
//! mirroring exactly once, at construction.

use nalgebra::{Matrix4, Vector3};

use strider_core::config::{ActuatedLink, FixedLink, GeometryConfig};
use strider_core::types::{JointAngles, LegId};

/// One DH link: twist, length, offset, joint angle. Angles in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DhLink {
    pub alpha: f64,
    pub a: f64,
    pub d: f64,
    pub theta: f64,
}

impl DhLink {
    /// Homogeneous transform of this link.
    #[must_use]
    pub fn transform(&self) -> Matrix4<f64> {
        dh_matrix(self.alpha, self.a, self.d, self.theta)
    }
}

/// 4x4 homogeneous transform from standard DH parameters.
#[must_use]
#[rustfmt::skip]
pub fn dh_matrix(alpha: f64, a: f64, d: f64, theta: f64) -> Matrix4<f64> {
    let (s_a, c_a) = alpha.sin_cos();
    let (s_t, c_t) = theta.sin_cos();
    Matrix4::new(
        c_t,       -s_t,      0.0,  a,
        s_t * c_a, c_t * c_a, -s_a, -s_a * d,
        s_t * s_a, c_t * s_a, c_a,  c_a * d,
        0.0,       0.0,       0.0,  1.0,
    )
}

/// Kinematic chain of one leg.
#[derive(Debug, Clone, PartialEq)]
pub struct LegChain {
    /// Fixed mount transform (body frame to shoulder axis).
    base: DhLink,
    /// The three actuated links; `theta` here is unused and zero.
    joints: [DhLink; 3],
    /// Fixed offset from the last joint to the foot contact point.
    foot: DhLink,
}

impl LegChain {
    /// Build the chain for `leg` from the canonical back-left template.
    ///
    /// Mirroring: front legs negate the longitudinal (`a`) parameters of the
    /// base and shoulder links, right legs negate the lateral (`d`)
    /// parameters of the same two links. This runs once here and is never
    /// re-derived per tick.
    #[must_use]
    pub fn for_leg(leg: LegId, geometry: &GeometryConfig) -> Self {
        let mut chain = Self::canonical(geometry);
        if leg.is_front() {
            chain.base.a = -chain.base.a;
            chain.joints[0].a = -chain.joints[0].a;
        }
        if leg.is_right() {
            chain.base.d = -chain.base.d;
            chain.joints[0].d = -chain.joints[0].d;
        }
        chain
    }

    /// The unmirrored back-left chain.
    #[must_use]
    pub fn canonical(geometry: &GeometryConfig) -> Self {
        let fixed = |link: &FixedLink| DhLink {
            alpha: link.alpha.to_radians(),
            a: link.a,
            d: link.d,
            theta: link.theta.to_radians(),
        };
        let actuated = |link: &ActuatedLink| DhLink {
            alpha: link.alpha.to_radians(),
            a: link.a,
            d: link.d,
            theta: 0.0,
        };
        Self {
            base: fixed(&geometry.base),
            joints: [
                actuated(&geometry.shoulder),
                actuated(&geometry.upper_hip),
                actuated(&geometry.lower_hip),
            ],
            foot: fixed(&geometry.foot),
        }
    }

    /// The fixed base link.
    #[must_use]
    pub const fn base(&self) -> &DhLink {
        &self.base
    }

    /// The three actuated links, base to foot.
    #[must_use]
    pub const fn joints(&self) -> &[DhLink; 3] {
        &self.joints
    }

    /// The fixed foot link.
    #[must_use]
    pub const fn foot(&self) -> &DhLink {
        &self.foot
    }

    /// Position of every frame in the chain, body frame.
    ///
    /// First entry is the origin; then the translation after each cumulative
    /// link. Pure function of the inputs.
    #[must_use]
    pub fn joint_positions(&self, angles: &JointAngles) -> [Vector3<f64>; 6] {
        let q = radians(angles);
        let mut positions = [Vector3::zeros(); 6];
        let mut accumulated = Matrix4::identity();
        for (i, link) in self.links_at(&q).into_iter().enumerate() {
            accumulated *= link.transform();
            positions[i + 1] = translation(&accumulated);
        }
        positions
    }

    /// Foot contact position, body frame.
    #[must_use]
    pub fn foot_position(&self, angles: &JointAngles) -> Vector3<f64> {
        self.foot_from_radians(&radians(angles))
    }

    /// Foot position from raw joint radians. Solver-facing hot path: skips
    /// the intermediate position bookkeeping.
    #[must_use]
    pub fn foot_from_radians(&self, q: &Vector3<f64>) -> Vector3<f64> {
        let mut accumulated = self.base.transform();
        for (link, &angle) in self.joints.iter().zip(q.iter()) {
            accumulated *= dh_matrix(link.alpha, link.a, link.d, angle);
        }
        accumulated *= self.foot.transform();
        translation(&accumulated)
    }

    fn links_at(&self, q: &Vector3<f64>) -> [DhLink; 5] {
        [
            self.base,
            DhLink {
                theta: q[0],
                ..self.joints[0]
            },
            DhLink {
                theta: q[1],
                ..self.joints[1]
            },
            DhLink {
                theta: q[2],
                ..self.joints[2]
            },
            self.foot,
        ]
    }
}

/// Translation column of a homogeneous transform.
fn translation(transform: &Matrix4<f64>) -> Vector3<f64> {
    Vector3::new(transform[(0, 3)], transform[(1, 3)], transform[(2, 3)])
}

fn radians(angles: &JointAngles) -> Vector3<f64> {
    Vector3::new(
        angles.shoulder.to_radians(),
        angles.upper_hip.to_radians(),
        angles.lower_hip.to_radians(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn geometry() -> GeometryConfig {
        GeometryConfig::default()
    }

    #[test]
    fn dh_matrix_identity_for_zero_params() {
        let m = dh_matrix(0.0, 0.0, 0.0, 0.0);
        assert_relative_eq!(m, Matrix4::identity(), epsilon = 1e-12);
    }

    #[test]
    fn dh_matrix_pure_translation_along_x() {
        let m = dh_matrix(0.0, 10.0, 0.0, 0.0);
        assert_relative_eq!(m[(0, 3)], 10.0, epsilon = 1e-12);
        assert_relative_eq!(m[(1, 3)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(m[(2, 3)], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn dh_matrix_offset_along_z() {
        let m = dh_matrix(0.0, 0.0, 7.0, 0.0);
        assert_relative_eq!(m[(2, 3)], 7.0, epsilon = 1e-12);
    }

    #[test]
    fn joint_positions_start_at_origin() {
        let chain = LegChain::for_leg(LegId::BackLeft, &geometry());
        let positions = chain.joint_positions(&JointAngles::uniform(90.0));
        assert_relative_eq!(positions[0], Vector3::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn joint_positions_end_at_foot() {
        let chain = LegChain::for_leg(LegId::BackLeft, &geometry());
        let angles = JointAngles::new(92.0, 85.0, 100.0);
        let positions = chain.joint_positions(&angles);
        assert_relative_eq!(positions[5], chain.foot_position(&angles), epsilon = 1e-12);
    }

    #[test]
    fn fk_is_deterministic() {
        let chain = LegChain::for_leg(LegId::FrontRight, &geometry());
        let angles = JointAngles::new(100.0, 70.0, 110.0);
        assert_eq!(chain.foot_position(&angles), chain.foot_position(&angles));
    }

    #[test]
    fn back_left_matches_canonical() {
        let geometry = geometry();
        assert_eq!(
            LegChain::for_leg(LegId::BackLeft, &geometry),
            LegChain::canonical(&geometry)
        );
    }

    #[test]
    fn front_legs_negate_longitudinal_params() {
        let geometry = geometry();
        let canonical = LegChain::canonical(&geometry);
        let front = LegChain::for_leg(LegId::FrontLeft, &geometry);
        assert_relative_eq!(front.base().a, -canonical.base().a);
        assert_relative_eq!(front.joints()[0].a, -canonical.joints()[0].a);
        assert_relative_eq!(front.base().d, canonical.base().d);
        // Links beyond the shoulder are shared with the template.
        assert_eq!(front.joints()[1], canonical.joints()[1]);
        assert_eq!(front.joints()[2], canonical.joints()[2]);
        assert_eq!(front.foot(), canonical.foot());
    }

    #[test]
    fn right_legs_negate_lateral_params() {
        let geometry = geometry();
        let canonical = LegChain::canonical(&geometry);
        let right = LegChain::for_leg(LegId::BackRight, &geometry);
        assert_relative_eq!(right.base().d, -canonical.base().d);
        assert_relative_eq!(right.joints()[0].d, -canonical.joints()[0].d);
        assert_relative_eq!(right.base().a, canonical.base().a);
    }

    #[test]
    fn front_right_mirrors_both_axes() {
        let geometry = geometry();
        let canonical = LegChain::canonical(&geometry);
        let leg = LegChain::for_leg(LegId::FrontRight, &geometry);
        assert_relative_eq!(leg.base().a, -canonical.base().a);
        assert_relative_eq!(leg.base().d, -canonical.base().d);
    }

    #[test]
    fn foot_stays_within_reach_bound() {
        let geometry = geometry();
        let mount = geometry.base.a.hypot(geometry.base.d);
        let bound = mount + geometry.max_reach() + 1e-9;
        for leg in LegId::ALL {
            let chain = LegChain::for_leg(leg, &geometry);
            for shoulder in [50.0, 90.0, 130.0] {
                for upper in [50.0, 90.0, 130.0] {
                    for lower in [50.0, 90.0, 130.0] {
                        let foot =
                            chain.foot_position(&JointAngles::new(shoulder, upper, lower));
                        assert!(
                            foot.norm() <= bound,
                            "{leg}: |{foot:?}| exceeds reach bound {bound}"
                        );
                    }
                }
            }
        }
    }
}
