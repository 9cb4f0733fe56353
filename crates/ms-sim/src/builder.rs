//! Fluent builder for constructing a [`Sim`].

use ms_core::{DrivetrainConfig, SimConfig, SimulationState};
use ms_drivetrain::Drivetrain;

use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`]: step sizes, run length, snapshot interval
///
/// # Optional inputs (have defaults)
///
/// | Method                  | Default                              |
/// |-------------------------|--------------------------------------|
/// | `.drivetrain(cfg)`      | `DrivetrainConfig::default()`        |
/// | `.initial_state(s)`     | `SimulationState::new()` (engine off, neutral, at rest) |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(SimConfig::default())
///     .drivetrain(profile)
///     .build()?;
/// sim.run(&mut NoopObserver);
/// ```
pub struct SimBuilder {
    config:     SimConfig,
    drivetrain: Option<DrivetrainConfig>,
    initial:    Option<SimulationState>,
}

impl SimBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self { config, drivetrain: None, initial: None }
    }

    /// Supply a vehicle profile.
    pub fn drivetrain(mut self, config: DrivetrainConfig) -> Self {
        self.drivetrain = Some(config);
        self
    }

    /// Start from `state` instead of a cold, parked car.
    ///
    /// The state must satisfy the model's invariants; see [`build`][Self::build].
    pub fn initial_state(mut self, state: SimulationState) -> Self {
        self.initial = Some(state);
        self
    }

    /// Validate every input and return a ready-to-run [`Sim`].
    ///
    /// # Errors
    ///
    /// - [`SimError::Core`] if either configuration is invalid.
    /// - [`SimError::InvalidInitialState`] if the initial RPM or speed is out
    ///   of range, or the state is stalled with the engine on.
    pub fn build(self) -> SimResult<Sim> {
        self.config.validate()?;
        let drivetrain = Drivetrain::new(self.drivetrain.unwrap_or_default())?;

        let initial = self.initial.unwrap_or_default();
        let ceiling = drivetrain.config().engine.rpm_ceiling();
        if !(initial.rpm.is_finite() && (0.0..=ceiling).contains(&initial.rpm)) {
            return Err(SimError::InvalidInitialState(format!(
                "rpm {} outside [0, {ceiling}]",
                initial.rpm
            )));
        }
        if !(initial.speed_kmh.is_finite() && initial.speed_kmh >= 0.0) {
            return Err(SimError::InvalidInitialState(format!(
                "speed {} km/h must be finite and non-negative",
                initial.speed_kmh
            )));
        }
        if initial.is_stalled && initial.engine_on {
            return Err(SimError::InvalidInitialState(
                "a stalled engine cannot be running".into(),
            ));
        }

        Ok(Sim::new(self.config, drivetrain, initial))
    }
}
