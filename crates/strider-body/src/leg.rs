//! Per-leg state: mirrored geometry, joint angles and the derived foot
//! position.

use nalgebra::Vector3;

use strider_core::config::GeometryConfig;
use strider_core::types::{JointAngles, LegId};
use strider_kinematics::LegChain;

/// One leg of the robot.
///
/// Created once at startup and mutated every tick. The foot position is
/// always the forward-kinematics result for the current angles; it is never
/// stored independently of them.
#[derive(Debug, Clone)]
pub struct LegModel {
    id: LegId,
    chain: LegChain,
    home: JointAngles,
    angles: JointAngles,
    foot: Vector3<f64>,
    resting_foot: Vector3<f64>,
}

impl LegModel {
    /// Build the leg from the shared geometry template and its calibrated
    /// home pose. Mirroring happens here, once.
    #[must_use]
    pub fn new(id: LegId, geometry: &GeometryConfig, home: JointAngles) -> Self {
        let chain = LegChain::for_leg(id, geometry);
        let foot = chain.foot_position(&home);
        Self {
            id,
            chain,
            home,
            angles: home,
            foot,
            resting_foot: foot,
        }
    }

    #[must_use]
    pub const fn id(&self) -> LegId {
        self.id
    }

    #[must_use]
    pub const fn chain(&self) -> &LegChain {
        &self.chain
    }

    /// Calibrated resting angles.
    #[must_use]
    pub const fn home(&self) -> JointAngles {
        self.home
    }

    /// Current joint angles, degrees.
    #[must_use]
    pub const fn angles(&self) -> JointAngles {
        self.angles
    }

    /// Current foot position, body frame.
    #[must_use]
    pub const fn foot(&self) -> Vector3<f64> {
        self.foot
    }

    /// Foot position at the home pose; the gait's base position.
    #[must_use]
    pub const fn resting_foot(&self) -> Vector3<f64> {
        self.resting_foot
    }

    /// Adopt a new angle set and re-derive the foot position.
    pub fn set_angles(&mut self, angles: JointAngles) {
        self.angles = angles;
        self.foot = self.chain.foot_position(&angles);
    }
}
