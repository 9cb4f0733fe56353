//! The `Sim` struct and its fixed-step tick loops.

use std::time::Instant;

use ms_core::{FrameClock, SimClock, SimConfig, SimulationState};
use ms_drivetrain::{Drivetrain, ShaftAngles, StepReport, Telemetry};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::{Command, ControlHandle, SimObserver, Snapshot, StateStore};

/// The integration driver.
///
/// Owns the drivetrain model, the clocks, and the [`StateStore`].  Each tick
/// drains the command queue, steps the physics, and commits one snapshot.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    /// Driver configuration (step sizes, run length, snapshot interval).
    pub config: SimConfig,

    /// Tick counter and accumulated simulated time.
    pub clock: SimClock,

    /// The physics, with its validated vehicle profile.
    pub drivetrain: Drivetrain,

    pub(crate) frames: FrameClock,
    shafts: ShaftAngles,
    store: StateStore,
}

impl Sim {
    pub(crate) fn new(config: SimConfig, drivetrain: Drivetrain, initial: SimulationState) -> Self {
        let shafts = ShaftAngles::default();
        let snapshot = Snapshot {
            state: initial,
            telemetry: Telemetry::read(shafts, &initial, drivetrain.config()),
            ..Snapshot::default()
        };
        Self {
            frames: FrameClock::new(config.max_dt_secs),
            clock: SimClock::new(),
            config,
            drivetrain,
            shafts,
            store: StateStore::new(snapshot),
        }
    }

    // ── Access ────────────────────────────────────────────────────────────

    /// The latest committed state.
    #[inline]
    pub fn state(&self) -> SimulationState {
        self.store.read()
    }

    #[inline]
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// A handle for queueing commands from anywhere (another task, an input
    /// thread, a test).
    pub fn control(&self) -> ControlHandle {
        self.store.control()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.store.subscribe()
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Apply `command` immediately and commit, without advancing time.
    ///
    /// Queued commands sent earlier through a [`ControlHandle`] are applied
    /// first so ordering is preserved.
    pub fn apply(&mut self, command: Command) {
        let mut state = self.store.read();
        self.apply_queued(&mut state);
        self.apply_one(&mut state, command);
        self.commit(state);
    }

    fn apply_queued(&mut self, state: &mut SimulationState) {
        for command in self.store.drain_commands() {
            self.apply_one(state, command);
        }
    }

    fn apply_one(&self, state: &mut SimulationState, command: Command) {
        let status = state.status();
        let gear = state.gear;
        command.apply(state, self.drivetrain.config().engine.idle_rpm);

        if state.status() != status {
            info!(from = %status, to = %state.status(), rpm = state.rpm, "engine status changed");
        }
        if state.gear != gear {
            debug!(
                from = %gear,
                to = %state.gear,
                clutch = state.clutch_pedal.value(),
                rpm = state.rpm,
                "gear changed"
            );
        }
    }

    // ── Stepping ──────────────────────────────────────────────────────────

    /// Advance by `dt` seconds: apply queued commands, step, commit.
    ///
    /// A `dt` that is zero, negative, or not finite still applies commands
    /// and counts as a tick, but leaves the physics untouched.
    ///
    /// `dt` is not clamped to `config.max_dt_secs`: only
    /// [`step_wall_clock`][Self::step_wall_clock] and `run_realtime` apply
    /// that ceiling.  Callers passing their own `dt` own its size.
    pub fn advance(&mut self, dt: f64) -> StepReport {
        let mut state = self.store.read();
        self.apply_queued(&mut state);

        let report = self.drivetrain.advance(&mut state, dt);
        if report.stalled {
            info!(
                tick = self.clock.current_tick.0,
                rpm = state.rpm,
                speed_kmh = state.speed_kmh,
                gear = %state.gear,
                "engine stalled"
            );
        }

        self.shafts.advance(&state, dt, self.drivetrain.config());
        self.clock.advance(dt);
        self.commit(state);
        report
    }

    /// Advance by `config.fixed_dt_secs`.
    pub fn step_fixed(&mut self) -> StepReport {
        self.advance(self.config.fixed_dt_secs)
    }

    /// Advance by the wall-clock time since the previous call, clamped to
    /// `config.max_dt_secs`.  The first call advances by zero.
    pub fn step_wall_clock(&mut self, now: Instant) -> StepReport {
        let delta = self.frames.delta(now);
        if delta.was_clamped() {
            debug!(raw = delta.raw, dt = delta.dt, "frame delta clamped");
        }
        self.advance(delta.dt)
    }

    fn commit(&mut self, state: SimulationState) {
        let snapshot = Snapshot {
            tick: self.clock.current_tick,
            elapsed_secs: self.clock.elapsed_secs,
            state,
            telemetry: Telemetry::read(self.shafts, &state, self.drivetrain.config()),
        };
        self.store.commit(snapshot);
    }

    // ── Loops ─────────────────────────────────────────────────────────────

    /// Run fixed steps from the current tick to `config.end_tick()`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) {
        while self.clock.current_tick < self.config.end_tick() {
            self.tick(self.config.fixed_dt_secs, observer);
        }
        observer.on_sim_end(self.clock.current_tick);
    }

    /// Run exactly `n` fixed steps from the current position (ignores
    /// `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.tick(self.config.fixed_dt_secs, observer);
        }
    }

    /// One tick with observer callbacks.
    pub(crate) fn tick<O: SimObserver>(&mut self, dt: f64, observer: &mut O) -> StepReport {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        let report = self.advance(dt);
        observer.on_tick_end(now, &report);

        let snapshot = self.store.snapshot();
        if report.stalled {
            observer.on_stall(&snapshot);
        }
        if now.is_on_interval(self.config.snapshot_interval_ticks) {
            observer.on_snapshot(&snapshot);
        }
        report
    }
}
