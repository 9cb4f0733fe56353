//! The authoritative simulation state.

use std::fmt;

use crate::{Gear, Pedal};

// ── EngineStatus ──────────────────────────────────────────────────────────────

/// Stall state machine position, derived from `engine_on` and `is_stalled`.
///
/// ```text
///   Off ──start──▶ Running ──(low rpm, clutch engaged)──▶ Stalled
///    ▲               │                                      │
///    └─────stop──────┘◀──────────────start──────────────────┘
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EngineStatus {
    Running,
    Stalled,
    Off,
}

impl EngineStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EngineStatus::Running => "running",
            EngineStatus::Stalled => "stalled",
            EngineStatus::Off     => "off",
        }
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ── SimulationState ───────────────────────────────────────────────────────────

/// Everything the simulation knows at one instant.
///
/// The physics fields (`rpm`, `speed_kmh`) are written only by the drivetrain
/// step; the control fields (pedals, gear, engine switch) only by external
/// commands.  The struct is `Copy` so consumers always receive a detached
/// snapshot, never a live reference.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationState {
    /// Engine crank speed.  `0 ≤ rpm ≤ redline + bounce margin`.
    pub rpm: f64,

    /// Vehicle road speed in km/h.  Never negative, even in reverse.
    pub speed_kmh: f64,

    pub gear: Gear,

    /// `0` = fully engaged (pedal up), `1` = fully disengaged (pedal down).
    pub clutch_pedal: Pedal,

    pub throttle_pedal: Pedal,

    pub brake_pedal: Pedal,

    pub engine_on: bool,

    /// When `true`, `engine_on` is `false`.
    pub is_stalled: bool,
}

impl SimulationState {
    /// Session start: engine off, neutral, everything at rest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Degree of mechanical lock through the clutch: `1 − clutch_pedal`.
    #[inline]
    pub fn engagement(&self) -> f64 {
        1.0 - self.clutch_pedal.value()
    }

    pub fn status(&self) -> EngineStatus {
        if self.is_stalled {
            EngineStatus::Stalled
        } else if self.engine_on {
            EngineStatus::Running
        } else {
            EngineStatus::Off
        }
    }

    /// Turn the key: engine on at `idle_rpm`, any stall cleared.
    ///
    /// Starting an engine that is already running leaves it untouched.
    pub fn start_engine(&mut self, idle_rpm: f64) {
        if self.status() == EngineStatus::Running {
            return;
        }
        self.engine_on = true;
        self.is_stalled = false;
        self.rpm = idle_rpm;
    }

    /// Switch off.  RPM and speed are left to decay under the coast-down model.
    pub fn stop_engine(&mut self) {
        self.engine_on = false;
    }

    /// Start if not running, otherwise stop.  Returns the new status.
    pub fn toggle_engine(&mut self, idle_rpm: f64) -> EngineStatus {
        if self.engine_on {
            self.stop_engine();
        } else {
            self.start_engine(idle_rpm);
        }
        self.status()
    }

    /// Forced shutoff from load.  Only the stall detector calls this.
    pub fn stall(&mut self) {
        self.engine_on = false;
        self.is_stalled = true;
    }
}
