//! Configuration tables.
//!
//! Every physics constant lives in one of three tables so an application can
//! swap in a different vehicle profile (or a test can pin exact values)
//! without touching the step logic.  `Default` reproduces the stock profile.
//!
//! With the `serde` feature, missing fields fall back to their defaults, so
//! a JSON profile only needs to list what it overrides.

use crate::{CoreError, CoreResult, GearRatioTable, Tick};

// ── EngineConfig ──────────────────────────────────────────────────────────────

/// Free-running engine behaviour.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// RPM the engine settles to unthrottled while decoupled.  Default: 800.
    pub idle_rpm: f64,

    /// Maximum sustainable RPM.  Default: 7000.
    pub redline_rpm: f64,

    /// Overshoot allowed above redline before the hard ceiling.  Default: 500.
    pub bounce_margin_rpm: f64,

    /// RPM/s gained at full throttle.  Default: 4000.
    pub power_factor: f64,

    /// Constant internal friction, RPM/s.  Default: 500.
    pub drag: f64,

    /// Extra RPM/s shed when the throttle is closed above idle.  Default: 1000.
    pub idle_return_rate: f64,

    /// Exponential spin-down rate (1/s) with the engine off.  Default: 2.
    pub spin_down_rate: f64,
}

impl EngineConfig {
    /// Hard RPM ceiling: redline plus the bounce margin.
    #[inline]
    pub fn rpm_ceiling(&self) -> f64 {
        self.redline_rpm + self.bounce_margin_rpm
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            idle_rpm:          800.0,
            redline_rpm:       7_000.0,
            bounce_margin_rpm: 500.0,
            power_factor:      4_000.0,
            drag:              500.0,
            idle_return_rate:  1_000.0,
            spin_down_rate:    2.0,
        }
    }
}

// ── CouplingConfig ────────────────────────────────────────────────────────────

/// Clutch coupling and stall thresholds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CouplingConfig {
    /// Below this engagement the drivetrain is treated as open.  Default: 0.1.
    pub min_engagement: f64,

    /// Engine RPM per km/h per unit of gear ratio.  Default: 30.
    ///
    /// A calibration constant, not a derived tyre/final-drive figure.
    pub rpm_per_kmh_ratio: f64,

    /// Fraction of the RPM gap closed per second at full engagement.
    /// Default: 5.
    pub transfer_gain: f64,

    /// km/h gained per RPM of gap per second at full engagement.
    /// Default: 0.05.
    pub torque_gain: f64,

    /// Post-coupling RPM below which a loaded engine dies.  Default: 400.
    pub stall_rpm: f64,

    /// Engagement above which low RPM stalls the engine.  Default: 0.8.
    pub stall_engagement: f64,
}

impl Default for CouplingConfig {
    fn default() -> Self {
        Self {
            min_engagement:    0.1,
            rpm_per_kmh_ratio: 30.0,
            transfer_gain:     5.0,
            torque_gain:       0.05,
            stall_rpm:         400.0,
            stall_engagement:  0.8,
        }
    }
}

// ── VehicleConfig ─────────────────────────────────────────────────────────────

/// Road-load and braking.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VehicleConfig {
    /// Proportional drag (1/s) with the engine running.  Default: 0.2.
    pub drag: f64,

    /// km/h/s removed at full brake with the engine running.  Default: 100.
    pub brake_power: f64,

    /// Proportional drag (1/s) with the engine off.  Default: 0.5.
    pub coast_drag: f64,

    /// km/h/s removed at full brake with the engine off.  Default: 50.
    pub coast_brake_power: f64,

    /// Proportional friction (1/s) after a stall.  Default: 1.
    pub stalled_friction: f64,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            drag:              0.2,
            brake_power:       100.0,
            coast_drag:        0.5,
            coast_brake_power: 50.0,
            stalled_friction:  1.0,
        }
    }
}

// ── DrivetrainConfig ──────────────────────────────────────────────────────────

/// Complete vehicle profile handed to the drivetrain step.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DrivetrainConfig {
    pub engine:   EngineConfig,
    pub coupling: CouplingConfig,
    pub vehicle:  VehicleConfig,
    pub gears:    GearRatioTable,
}

impl DrivetrainConfig {
    /// Check that every constant is finite and in range.
    ///
    /// The gear table validates itself on construction; this covers the
    /// scalar tables.
    pub fn validate(&self) -> CoreResult<()> {
        let e = &self.engine;
        non_negative("engine.idle_rpm", e.idle_rpm)?;
        positive("engine.redline_rpm", e.redline_rpm)?;
        non_negative("engine.bounce_margin_rpm", e.bounce_margin_rpm)?;
        positive("engine.power_factor", e.power_factor)?;
        non_negative("engine.drag", e.drag)?;
        non_negative("engine.idle_return_rate", e.idle_return_rate)?;
        positive("engine.spin_down_rate", e.spin_down_rate)?;
        if e.idle_rpm >= e.redline_rpm {
            return Err(CoreError::Config(format!(
                "engine.idle_rpm ({}) must be below engine.redline_rpm ({})",
                e.idle_rpm, e.redline_rpm
            )));
        }

        let c = &self.coupling;
        fraction("coupling.min_engagement", c.min_engagement)?;
        positive("coupling.rpm_per_kmh_ratio", c.rpm_per_kmh_ratio)?;
        positive("coupling.transfer_gain", c.transfer_gain)?;
        non_negative("coupling.torque_gain", c.torque_gain)?;
        non_negative("coupling.stall_rpm", c.stall_rpm)?;
        fraction("coupling.stall_engagement", c.stall_engagement)?;

        let v = &self.vehicle;
        non_negative("vehicle.drag", v.drag)?;
        non_negative("vehicle.brake_power", v.brake_power)?;
        non_negative("vehicle.coast_drag", v.coast_drag)?;
        non_negative("vehicle.coast_brake_power", v.coast_brake_power)?;
        non_negative("vehicle.stalled_friction", v.stalled_friction)?;

        Ok(())
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Integration-driver settings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Step length used by fixed-step loops.  Default: 1/60 s.
    pub fixed_dt_secs: f64,

    /// Upper bound applied to wall-clock frame deltas, so a suspended process
    /// does not resume with one enormous step.  Default: 0.1 s.
    pub max_dt_secs: f64,

    /// Ticks `Sim::run` executes before stopping.  Default: 3600 (1 min at
    /// 60 Hz).
    pub total_ticks: u64,

    /// Call `on_snapshot` every N ticks.  0 disables.  Default: 60.
    pub snapshot_interval_ticks: u64,
}

impl SimConfig {
    /// The tick at which fixed-step runs end (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    pub fn validate(&self) -> CoreResult<()> {
        positive("sim.fixed_dt_secs", self.fixed_dt_secs)?;
        positive("sim.max_dt_secs", self.max_dt_secs)?;
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_dt_secs:           1.0 / 60.0,
            max_dt_secs:             0.1,
            total_ticks:             3_600,
            snapshot_interval_ticks: 60,
        }
    }
}

// ── Validation helpers ────────────────────────────────────────────────────────

fn positive(name: &str, v: f64) -> CoreResult<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(CoreError::Config(format!("{name} must be positive and finite, got {v}")))
    }
}

fn non_negative(name: &str, v: f64) -> CoreResult<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(CoreError::Config(format!("{name} must be non-negative and finite, got {v}")))
    }
}

fn fraction(name: &str, v: f64) -> CoreResult<()> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(CoreError::Config(format!("{name} must lie in [0, 1], got {v}")))
    }
}
