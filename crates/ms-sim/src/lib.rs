//! `ms-sim` — integration driver for the `manual_sim` framework.
//!
//! # One tick
//!
//! ```text
//! ① read      — take the committed SimulationState from the StateStore
//! ② commands  — apply every queued Command (pedals, gear, ignition)
//! ③ physics   — Drivetrain::advance(state, dt)
//! ④ telemetry — spin the shaft angles, read gauges and clutch slip
//! ⑤ commit    — atomically replace the stored Snapshot and publish it
//! ```
//!
//! The driver never depends on a particular timing source.  Pick one:
//!
//! | Entry point              | `dt` comes from                                |
//! |--------------------------|------------------------------------------------|
//! | `Sim::advance(dt)`       | the caller                                     |
//! | `Sim::step_fixed()`      | `SimConfig::fixed_dt_secs`                     |
//! | `Sim::step_wall_clock`   | a `FrameClock`, clamped to `max_dt_secs`       |
//! | `Sim::run` / `run_ticks` | fixed step, with observer callbacks            |
//! | `Sim::run_realtime`      | tokio interval + wall clock, until shutdown    |
//!
//! # Concurrency
//!
//! The `Sim` is the single writer of the state.  Other tasks reach it only
//! through a [`ControlHandle`] (a single-consumer command queue drained at
//! the start of each tick) and read it only through a `watch` subscription
//! that always holds a whole committed [`Snapshot`].
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ms_core::SimConfig;
//! use ms_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(SimConfig::default()).build()?;
//! let control = sim.control();
//! control.start_engine()?;
//! sim.run_ticks(60, &mut NoopObserver);
//! println!("{:.0} rpm", sim.state().rpm);
//! ```

pub mod builder;
pub mod command;
pub mod error;
pub mod observer;
pub mod realtime;
pub mod sim;
pub mod store;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use command::{Command, ControlHandle};
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, TracingObserver};
pub use sim::Sim;
pub use store::{Snapshot, StateStore};
