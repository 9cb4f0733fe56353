//! Real-time loop on the tokio runtime.

use std::future::Future;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::{Sim, SimObserver};

impl Sim {
    /// Tick every `period` of wall-clock time until `shutdown` resolves or
    /// `config.end_tick()` is reached.
    ///
    /// Each tick's `dt` is the measured time since the previous tick,
    /// clamped to `config.max_dt_secs`; a stalled executor therefore slows
    /// the simulation down instead of making it jump.  The first tick of a
    /// run has `dt = 0`.
    ///
    /// Commands sent through a [`ControlHandle`][crate::ControlHandle] from
    /// other tasks are picked up at the next tick.
    pub async fn run_realtime<O, F>(&mut self, period: Duration, observer: &mut O, shutdown: F)
    where
        O: SimObserver,
        F: Future<Output = ()>,
    {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);
        self.frames.reset();

        while self.clock.current_tick < self.config.end_tick() {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    debug!(tick = self.clock.current_tick.0, "real-time loop shut down");
                    break;
                }
                fired = ticker.tick() => {
                    let delta = self.frames.delta(fired.into_std());
                    if delta.was_clamped() {
                        debug!(raw = delta.raw, dt = delta.dt, "frame delta clamped");
                    }
                    self.tick(delta.dt, observer);
                }
            }
        }
        observer.on_sim_end(self.clock.current_tick);
    }
}
