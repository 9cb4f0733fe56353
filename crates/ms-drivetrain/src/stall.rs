//! Stall condition.
//!
//! Only evaluated on ticks where the drivetrain is coupled: an open clutch
//! can never stall the engine.

use ms_core::CouplingConfig;

/// `true` when the clutch is nearly released and the post-coupling RPM is
/// too low to keep turning under load.
#[inline]
pub fn should_stall(rpm: f64, engagement: f64, cfg: &CouplingConfig) -> bool {
    rpm < cfg.stall_rpm && engagement > cfg.stall_engagement
}
