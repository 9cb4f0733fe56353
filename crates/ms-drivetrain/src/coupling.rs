//! Clutch coupling model.
//!
//! A single first-order relaxation: each tick the engine closes a fraction
//! of the gap between its free-running RPM and the RPM implied by the wheels,
//! and the same gap, scaled, is handed to the wheels as a speed change.
//! Positive gap pulls the car forward; negative gap is engine braking.

use ms_core::{CouplingConfig, Gear};

/// Result of one engaged coupling step.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CouplingOutcome {
    /// Engine RPM after coupling.
    pub rpm: f64,
    /// The RPM the engine would have if locked to the wheels (unsigned).
    pub target_rpm: f64,
    /// `free_rpm − target_rpm`.
    pub rpm_diff: f64,
    /// Speed change (km/h) delivered to the wheels this tick.
    pub torque_to_wheels: f64,
}

/// `true` when engine and wheels influence each other this tick.
#[inline]
pub fn is_coupled(gear: Gear, engagement: f64, cfg: &CouplingConfig) -> bool {
    !gear.is_neutral() && engagement >= cfg.min_engagement
}

/// Signed engine RPM implied by road speed through `ratio`.
///
/// Reverse yields a negative figure; the coupling itself works on the
/// magnitude.
#[inline]
pub fn wheel_implied_rpm(speed_kmh: f64, ratio: f64, cfg: &CouplingConfig) -> f64 {
    speed_kmh * ratio * cfg.rpm_per_kmh_ratio
}

/// Relax `free_rpm` toward the wheel-implied RPM.
///
/// `speed_kmh` is the speed at the start of the tick.  The fraction of the
/// gap closed is `engagement · gain · dt`, capped at 1 so an oversized `dt`
/// cannot push the engine past the target.
pub fn couple(
    free_rpm:   f64,
    speed_kmh:  f64,
    ratio:      f64,
    engagement: f64,
    dt:         f64,
    cfg:        &CouplingConfig,
) -> CouplingOutcome {
    let target_rpm = wheel_implied_rpm(speed_kmh, ratio, cfg).abs();
    let rpm_diff = free_rpm - target_rpm;
    let transfer_rate = (engagement * cfg.transfer_gain * dt).min(1.0);

    CouplingOutcome {
        rpm: free_rpm - rpm_diff * transfer_rate,
        target_rpm,
        rpm_diff,
        torque_to_wheels: rpm_diff * engagement * cfg.torque_gain * dt,
    }
}
