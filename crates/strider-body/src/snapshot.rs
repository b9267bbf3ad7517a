//! Point-in-time state export.
//!
//! The control thread is the sole writer of body state; readers get a cloned
//! [`Snapshot`] instead of a live reference. Serializable so transport
//! adapters can ship it as-is.

use serde::{Deserialize, Serialize};

use strider_core::types::{BatteryReading, JointAngles, LegId};
use strider_gait::GaitMode;

/// One leg's state at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegSnapshot {
    pub id: LegId,
    /// Current joint angles, idealized degrees.
    pub angles: JointAngles,
    /// Current foot position, body frame.
    pub foot: [f64; 3],
    /// Currently commanded goal of the rate limiter.
    pub target: [f64; 3],
}

/// Full body state at the end of a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Ticks completed since startup.
    pub tick: u64,
    pub gait_mode: GaitMode,
    /// Gait phase in [0, 1).
    pub phase: f64,
    /// Per-leg state in [`LegId::ALL`] order.
    pub legs: Vec<LegSnapshot>,
    /// Latest telemetry sample; display only.
    pub battery: BatteryReading,
}

impl Snapshot {
    /// Leg entry by id.
    #[must_use]
    pub fn leg(&self, id: LegId) -> Option<&LegSnapshot> {
        self.legs.iter().find(|leg| leg.id == id)
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            tick: 0,
            gait_mode: GaitMode::Idle,
            phase: 0.0,
            legs: Vec::new(),
            battery: BatteryReading::offline(),
        }
    }
}
