//! Vehicle dynamics: road speed in km/h.
//!
//! Speed is a magnitude.  Reverse gear flips the coupling direction, never
//! the sign of `speed_kmh`.

use ms_core::{Pedal, VehicleConfig};

/// Drag and braking with the engine running.
pub fn road_load(speed: f64, brake: Pedal, dt: f64, cfg: &VehicleConfig) -> f64 {
    let change = -(speed * cfg.drag * dt) - brake.value() * cfg.brake_power * dt;
    (speed + change).max(0.0)
}

/// Add the speed delivered (or removed) through the clutch this tick.
#[inline]
pub fn apply_torque(speed: f64, torque_to_wheels: f64) -> f64 {
    (speed + torque_to_wheels).max(0.0)
}

/// Engine off: lighter drag, weaker brakes, exponential decay.
pub fn coast(speed: f64, brake: Pedal, dt: f64, cfg: &VehicleConfig) -> f64 {
    let decayed = speed * (-cfg.coast_drag * dt).exp();
    (decayed - brake.value() * cfg.coast_brake_power * dt).max(0.0)
}

/// After a stall the car rolls out under friction alone.
#[inline]
pub fn stalled_roll(speed: f64, dt: f64, cfg: &VehicleConfig) -> f64 {
    speed * (1.0 - cfg.stalled_friction * dt).max(0.0)
}
