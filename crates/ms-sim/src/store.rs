//! The `StateStore` — authoritative state, command queue, and publication.

use ms_core::{SimulationState, Tick};
use ms_drivetrain::Telemetry;
use tokio::sync::{mpsc, watch};

use crate::{Command, ControlHandle};

/// One committed simulation instant, as seen by renderers and the tutor.
///
/// `Copy`: every consumer holds its own detached value.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Ticks completed when this snapshot was committed.
    pub tick: Tick,
    /// Simulated seconds elapsed.
    pub elapsed_secs: f64,
    pub state: SimulationState,
    pub telemetry: Telemetry,
}

/// Holds the latest committed [`Snapshot`] and the receiving end of the
/// command queue.
///
/// - [`read`][Self::read] always returns a whole committed state.
/// - [`commit`][Self::commit] replaces it in one assignment and publishes
///   the new value to every `watch` subscriber.
///
/// Single writer: only the owning `Sim` commits.
pub struct StateStore {
    current:   Snapshot,
    commands:  mpsc::UnboundedReceiver<Command>,
    control:   ControlHandle,
    publisher: watch::Sender<Snapshot>,
}

impl StateStore {
    pub fn new(initial: Snapshot) -> Self {
        let (tx, commands) = mpsc::unbounded_channel();
        let (publisher, _) = watch::channel(initial);
        Self {
            current: initial,
            commands,
            control: ControlHandle::new(tx),
            publisher,
        }
    }

    /// The latest committed state.
    #[inline]
    pub fn read(&self) -> SimulationState {
        self.current.state
    }

    #[inline]
    pub fn snapshot(&self) -> Snapshot {
        self.current
    }

    /// Atomically replace the committed snapshot and publish it.
    pub fn commit(&mut self, snapshot: Snapshot) {
        self.current = snapshot;
        self.publisher.send_replace(snapshot);
    }

    /// A new handle onto the command queue.
    pub fn control(&self) -> ControlHandle {
        self.control.clone()
    }

    /// Follow committed snapshots.  The receiver starts at the current one.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.publisher.subscribe()
    }

    /// Take every command queued so far, in send order.
    pub(crate) fn drain_commands(&mut self) -> Vec<Command> {
        let mut drained = Vec::new();
        while let Ok(command) = self.commands.try_recv() {
            drained.push(command);
        }
        drained
    }
}
