//! Simulation observer trait for progress reporting and rendering.

use ms_core::Tick;
use ms_drivetrain::StepReport;
use tracing::{info, warn};

use crate::Snapshot;

/// Callbacks invoked by the tick loops at key points.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: gauge printer
///
/// ```rust,ignore
/// struct Gauges;
///
/// impl SimObserver for Gauges {
///     fn on_snapshot(&mut self, snap: &Snapshot) {
///         println!("{:>5.0} rpm  {:>5.1} km/h", snap.state.rpm, snap.state.speed_kmh);
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before commands are applied.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after the physics step with what it did.
    fn on_tick_end(&mut self, _tick: Tick, _report: &StepReport) {}

    /// Called every `config.snapshot_interval_ticks` ticks with the freshly
    /// committed snapshot.
    fn on_snapshot(&mut self, _snapshot: &Snapshot) {}

    /// Called on the tick the engine stalls.
    fn on_stall(&mut self, _snapshot: &Snapshot) {}

    /// Called once when a run loop returns.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// A [`SimObserver`] that reports snapshots and stalls through `tracing`.
pub struct TracingObserver;

impl SimObserver for TracingObserver {
    fn on_snapshot(&mut self, snap: &Snapshot) {
        let s = &snap.state;
        info!(
            tick = snap.tick.0,
            t = snap.elapsed_secs,
            rpm = s.rpm.round(),
            speed_kmh = (s.speed_kmh * 10.0).round() / 10.0,
            gear = %s.gear,
            clutch = s.clutch_pedal.value(),
            throttle = s.throttle_pedal.value(),
            status = %s.status(),
            slipping = snap.telemetry.slipping,
            "snapshot"
        );
    }

    fn on_stall(&mut self, snap: &Snapshot) {
        warn!(tick = snap.tick.0, gear = %snap.state.gear, "stalled");
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        info!(%final_tick, "run finished");
    }
}
