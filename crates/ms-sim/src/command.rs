//! External commands: pedal, gear, and ignition writes.

use ms_core::{Gear, Pedal, SimulationState};
use tokio::sync::mpsc;
use tracing::warn;

use crate::{SimError, SimResult};

/// A discrete write to the control fields of [`SimulationState`].
///
/// Values are validated when the command is built, so applying one cannot
/// fail.  Gear changes are accepted at any clutch position or RPM: there is
/// no mechanical interlock.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Command {
    SetThrottle(Pedal),
    SetBrake(Pedal),
    SetClutch(Pedal),
    SetGear(Gear),
    /// Start if off or stalled, otherwise stop.
    ToggleEngine,
    StartEngine,
    StopEngine,
}

impl Command {
    /// Write this command into `state`.  `idle_rpm` seeds a fresh start.
    pub fn apply(self, state: &mut SimulationState, idle_rpm: f64) {
        match self {
            Command::SetThrottle(p) => state.throttle_pedal = p,
            Command::SetBrake(p)    => state.brake_pedal = p,
            Command::SetClutch(p)   => state.clutch_pedal = p,
            Command::SetGear(g)     => state.gear = g,
            Command::ToggleEngine   => {
                state.toggle_engine(idle_rpm);
            }
            Command::StartEngine    => state.start_engine(idle_rpm),
            Command::StopEngine     => state.stop_engine(),
        }
    }
}

// ── ControlHandle ─────────────────────────────────────────────────────────────

/// Cloneable sender side of the simulation's command queue.
///
/// Commands are queued without blocking and applied, in send order, at the
/// start of the next tick.  Any number of handles may exist; the simulation
/// remains the only writer of its state.
#[derive(Clone, Debug)]
pub struct ControlHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl ControlHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { tx }
    }

    /// Queue `command` for the next tick.
    ///
    /// # Errors
    ///
    /// [`SimError::Disconnected`] if the simulation has been dropped.
    pub fn send(&self, command: Command) -> SimResult<()> {
        self.tx
            .send(command)
            .map_err(|rejected| SimError::Disconnected(rejected.0))
    }

    pub fn set_throttle(&self, position: f64) -> SimResult<()> {
        self.send(Command::SetThrottle(pedal("throttle", position)?))
    }

    pub fn set_brake(&self, position: f64) -> SimResult<()> {
        self.send(Command::SetBrake(pedal("brake", position)?))
    }

    pub fn set_clutch(&self, position: f64) -> SimResult<()> {
        self.send(Command::SetClutch(pedal("clutch", position)?))
    }

    pub fn set_gear(&self, gear: Gear) -> SimResult<()> {
        self.send(Command::SetGear(gear))
    }

    /// Select a gear by its knob label (`"N"`, `"R"`, `"1"` … `"5"`).
    pub fn shift(&self, label: &str) -> SimResult<()> {
        let gear = label.parse::<Gear>().inspect_err(|e| warn!(%e, "gear command rejected"))?;
        self.set_gear(gear)
    }

    pub fn toggle_engine(&self) -> SimResult<()> {
        self.send(Command::ToggleEngine)
    }

    pub fn start_engine(&self) -> SimResult<()> {
        self.send(Command::StartEngine)
    }

    pub fn stop_engine(&self) -> SimResult<()> {
        self.send(Command::StopEngine)
    }
}

fn pedal(which: &'static str, position: f64) -> SimResult<Pedal> {
    Pedal::new(position)
        .inspect_err(|e| warn!(pedal = which, %e, "pedal command rejected"))
        .map_err(SimError::from)
}
