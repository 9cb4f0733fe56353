//! Free-running engine model.
//!
//! Throttle is a pure RPM-acceleration input and friction a constant
//! deceleration; there is no torque curve.  The result is the RPM the engine
//! would reach on its own, before the clutch has a say.

use ms_core::{EngineConfig, Pedal};

/// RPM after `dt` seconds with nothing attached to the crank.
pub fn free_running_rpm(rpm: f64, throttle: Pedal, dt: f64, cfg: &EngineConfig) -> f64 {
    let mut change = throttle.value() * cfg.power_factor * dt - cfg.drag * dt;
    if throttle.is_released() && rpm > cfg.idle_rpm {
        change -= cfg.idle_return_rate * dt;
    }
    rpm + change
}

/// An unloaded engine neither idles below idle nor spins past redline.
#[inline]
pub fn clamp_unloaded(rpm: f64, cfg: &EngineConfig) -> f64 {
    rpm.clamp(cfg.idle_rpm, cfg.redline_rpm)
}

/// Rev limiter: the final bound applied after every RPM update.
#[inline]
pub fn limit(rpm: f64, cfg: &EngineConfig) -> f64 {
    rpm.clamp(0.0, cfg.rpm_ceiling())
}

/// Engine switched off: exponential spin-down toward zero.
///
/// The closed form is used instead of an Euler step so that a long `dt`
/// still lands on the decay curve rather than overshooting below zero.
#[inline]
pub fn spin_down(rpm: f64, dt: f64, cfg: &EngineConfig) -> f64 {
    (rpm * (-cfg.spin_down_rate * dt).exp()).max(0.0)
}
