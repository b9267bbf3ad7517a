//! Telemetry boundary.
//!
//! The control loop never reads voltage hardware directly; an injected
//! [`Telemetry`] source is sampled once per tick and its reading attached to
//! the published snapshot for display. Control decisions never depend on it.

use strider_core::types::{BatteryReading, ChargeStatus};

/// Battery pack window: two 18650 cells, empty to full.
pub const PACK_EMPTY_VOLTAGE: f64 = 6.0;
pub const PACK_FULL_VOLTAGE: f64 = 8.4;

/// Current magnitude below which the pack counts as idle, amps.
const IDLE_CURRENT: f64 = 0.05;

/// Source of battery readings.
pub trait Telemetry {
    fn read(&mut self) -> BatteryReading;
}

/// No monitor attached; always reports [`ChargeStatus::Offline`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTelemetry;

impl Telemetry for NoTelemetry {
    fn read(&mut self) -> BatteryReading {
        BatteryReading::offline()
    }
}

/// Charge estimate from pack voltage, clamped to [0, 100].
#[must_use]
pub fn charge_percentage(voltage: f64) -> f64 {
    let span = PACK_FULL_VOLTAGE - PACK_EMPTY_VOLTAGE;
    ((voltage - PACK_EMPTY_VOLTAGE) / span * 100.0).clamp(0.0, 100.0)
}

/// Charge direction from signed current (negative while discharging).
#[must_use]
pub fn charge_status(current: f64) -> ChargeStatus {
    if current < -IDLE_CURRENT {
        ChargeStatus::Discharging
    } else if current > IDLE_CURRENT {
        ChargeStatus::Charging
    } else {
        ChargeStatus::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn no_telemetry_reports_offline() {
        let mut telemetry = NoTelemetry;
        assert_eq!(telemetry.read().status, ChargeStatus::Offline);
    }

    #[test]
    fn percentage_spans_the_pack_window() {
        assert_relative_eq!(charge_percentage(6.0), 0.0);
        assert_relative_eq!(charge_percentage(8.4), 100.0);
        assert_relative_eq!(charge_percentage(7.2), 50.0);
    }

    #[test]
    fn percentage_clamps_out_of_window() {
        assert_relative_eq!(charge_percentage(5.0), 0.0);
        assert_relative_eq!(charge_percentage(9.0), 100.0);
    }

    #[test]
    fn status_from_current_sign() {
        assert_eq!(charge_status(-0.5), ChargeStatus::Discharging);
        assert_eq!(charge_status(0.5), ChargeStatus::Charging);
        assert_eq!(charge_status(0.0), ChargeStatus::Idle);
        assert_eq!(charge_status(-0.04), ChargeStatus::Idle);
    }
}
