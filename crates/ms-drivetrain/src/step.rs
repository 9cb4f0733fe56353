//! `Drivetrain::advance` — one physics tick.

use ms_core::{CoreResult, DrivetrainConfig, SimulationState};

use crate::{coupling, engine, stall, vehicle};

/// Which branch of the model a tick went through.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Regime {
    /// `dt` was zero, negative, or not finite: nothing changed.
    Idle,
    /// Engine stalled: rpm held at zero, car rolling out.
    Stalled,
    /// Engine switched off: coast-down.
    Coasting,
    /// Engine running, neutral or clutch open.
    Decoupled,
    /// Engine running and driving (or braking) the wheels.
    Coupled,
}

/// What happened during one call to [`Drivetrain::advance`].
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepReport {
    pub regime: Regime,

    /// `true` only on the tick where the engine stalled.
    pub stalled: bool,

    /// `true` if the rev limiter cut the RPM this tick.
    pub rpm_limited: bool,

    /// Coupling details; `None` unless `regime == Coupled`.
    pub coupling: Option<coupling::CouplingOutcome>,
}

impl StepReport {
    fn new(regime: Regime) -> Self {
        Self { regime, stalled: false, rpm_limited: false, coupling: None }
    }
}

/// The per-tick physics, parameterised by a validated vehicle profile.
///
/// `Drivetrain` holds no simulation state; it mutates the
/// [`SimulationState`] it is handed, so any driver (display-synced loop,
/// fixed-step harness, benchmark) can own the state.
#[derive(Clone, Debug)]
pub struct Drivetrain {
    config: DrivetrainConfig,
}

impl Drivetrain {
    /// Validate `config` and wrap it.
    pub fn new(config: DrivetrainConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[inline]
    pub fn config(&self) -> &DrivetrainConfig {
        &self.config
    }

    /// Advance `state` by `dt` seconds.
    ///
    /// A `dt` that is not strictly positive and finite leaves `state`
    /// untouched.  The caller is responsible for keeping `dt` reasonably
    /// small; the coupling caps its transfer fraction but large steps still
    /// coarsen the result.
    pub fn advance(&self, state: &mut SimulationState, dt: f64) -> StepReport {
        if !(dt.is_finite() && dt > 0.0) {
            return StepReport::new(Regime::Idle);
        }
        let cfg = &self.config;

        if state.is_stalled {
            state.rpm = 0.0;
            state.speed_kmh = vehicle::stalled_roll(state.speed_kmh, dt, &cfg.vehicle);
            return StepReport::new(Regime::Stalled);
        }

        if !state.engine_on {
            state.rpm = engine::spin_down(state.rpm, dt, &cfg.engine);
            state.speed_kmh = vehicle::coast(state.speed_kmh, state.brake_pedal, dt, &cfg.vehicle);
            return StepReport::new(Regime::Coasting);
        }

        let engagement = state.engagement();
        let free_rpm = engine::free_running_rpm(state.rpm, state.throttle_pedal, dt, &cfg.engine);
        let mut speed = vehicle::road_load(state.speed_kmh, state.brake_pedal, dt, &cfg.vehicle);

        let (rpm, mut report) = if coupling::is_coupled(state.gear, engagement, &cfg.coupling) {
            let ratio = cfg.gears.ratio(state.gear);
            let outcome = coupling::couple(
                free_rpm,
                state.speed_kmh,
                ratio,
                engagement,
                dt,
                &cfg.coupling,
            );
            speed = vehicle::apply_torque(speed, outcome.torque_to_wheels);

            let mut report = StepReport::new(Regime::Coupled);
            report.coupling = Some(outcome);
            if stall::should_stall(outcome.rpm, engagement, &cfg.coupling) {
                state.stall();
                report.stalled = true;
            }
            (outcome.rpm, report)
        } else {
            (engine::clamp_unloaded(free_rpm, &cfg.engine), StepReport::new(Regime::Decoupled))
        };

        let limited = engine::limit(rpm, &cfg.engine);
        report.rpm_limited = limited < rpm;

        state.rpm = limited;
        state.speed_kmh = speed.max(0.0);
        report
    }
}
