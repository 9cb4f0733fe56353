//! Derived values for renderers: gauge needles, shaft angles, clutch slip.
//!
//! None of this feeds back into the physics.  The wheel-implied RPM uses the
//! same conversion constant as the coupling model so the cutaway and the
//! tachometer never disagree about what "locked" means.

use ms_core::{DrivetrainConfig, SimulationState};

use crate::coupling;

/// Tachometer full scale.
pub const TACHOMETER_MAX_RPM: f64 = 8_000.0;

/// Speedometer full scale.
pub const SPEEDOMETER_MAX_KMH: f64 = 240.0;

/// Needle sweep either side of twelve o'clock, in degrees.
pub const NEEDLE_SWEEP_DEG: f64 = 135.0;

/// Clutch pedal travel below which the plates are considered touching.
pub const SLIP_CONTACT_PEDAL: f64 = 0.2;

/// RPM difference across touching plates that counts as slipping.
pub const SLIP_THRESHOLD_RPM: f64 = 100.0;

/// Degrees per second per RPM (360 / 60).
const DEG_PER_SEC_PER_RPM: f64 = 6.0;

/// Wheel degrees per second per km/h.
const WHEEL_DEG_PER_SEC_PER_KMH: f64 = 15.0;

// ── ShaftAngles ───────────────────────────────────────────────────────────────

/// Accumulated rotation of the three visible shafts, each in `[0, 360)`.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShaftAngles {
    pub engine_deg:      f64,
    pub input_shaft_deg: f64,
    pub wheels_deg:      f64,
}

impl ShaftAngles {
    /// Spin each shaft for `dt` seconds at the speeds in `state`.
    pub fn advance(&mut self, state: &SimulationState, dt: f64, config: &DrivetrainConfig) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        let input_rpm = effective_input_rpm(state, config);
        self.engine_deg = wrap(self.engine_deg + state.rpm * DEG_PER_SEC_PER_RPM * dt);
        self.input_shaft_deg = wrap(self.input_shaft_deg + input_rpm * DEG_PER_SEC_PER_RPM * dt);
        self.wheels_deg = wrap(self.wheels_deg + state.speed_kmh * WHEEL_DEG_PER_SEC_PER_KMH * dt);
    }
}

fn wrap(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

// ── Derived speeds ────────────────────────────────────────────────────────────

/// Transmission input shaft speed, blended by the clutch pedal: the engine
/// drives it when engaged, the wheels when disengaged.
pub fn effective_input_rpm(state: &SimulationState, config: &DrivetrainConfig) -> f64 {
    let ratio = config.gears.ratio(state.gear);
    let from_wheels = coupling::wheel_implied_rpm(state.speed_kmh, ratio, &config.coupling).abs();
    let clutch = state.clutch_pedal.value();
    state.rpm * (1.0 - clutch) + from_wheels * clutch
}

/// Map `value` on `[0, full_scale]` onto the needle sweep.
pub fn needle_deg(value: f64, full_scale: f64) -> f64 {
    let fraction = (value / full_scale).clamp(0.0, 1.0);
    -NEEDLE_SWEEP_DEG + fraction * 2.0 * NEEDLE_SWEEP_DEG
}

// ── Telemetry ─────────────────────────────────────────────────────────────────

/// Everything a gauge cluster or cutaway needs beyond the raw state.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Telemetry {
    pub shafts: ShaftAngles,
    pub effective_input_rpm: f64,
    /// `|rpm − effective_input_rpm|`.
    pub slip_rpm: f64,
    /// Plates touching and turning at different speeds.
    pub slipping: bool,
    pub tachometer_deg: f64,
    pub speedometer_deg: f64,
}

impl Telemetry {
    pub fn read(shafts: ShaftAngles, state: &SimulationState, config: &DrivetrainConfig) -> Self {
        let effective_input_rpm = effective_input_rpm(state, config);
        let slip_rpm = (state.rpm - effective_input_rpm).abs();
        Self {
            shafts,
            effective_input_rpm,
            slip_rpm,
            slipping: state.clutch_pedal.value() < SLIP_CONTACT_PEDAL
                && slip_rpm > SLIP_THRESHOLD_RPM,
            tachometer_deg: needle_deg(state.rpm, TACHOMETER_MAX_RPM),
            speedometer_deg: needle_deg(state.speed_kmh, SPEEDOMETER_MAX_KMH),
        }
    }
}
