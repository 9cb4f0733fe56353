//! `ms-core` — foundational types for the `manual_sim` drivetrain simulator.
//!
//! This crate is a dependency of every other `ms-*` crate.  It holds pure
//! data only: nothing here advances time or performs physics.
//!
//! # What lives here
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`gear`]    | `Gear`, `GearRatioTable`                                    |
//! | [`pedal`]   | `Pedal` — a position clamped to `[0, 1]`                    |
//! | [`state`]   | `SimulationState`, `EngineStatus`                           |
//! | [`config`]  | `EngineConfig`, `CouplingConfig`, `VehicleConfig`, …        |
//! | [`time`]    | `Tick`, `SimClock`, `FrameClock`                            |
//! | [`error`]   | `CoreError`, `CoreResult`                                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public data types.   |

pub mod config;
pub mod error;
pub mod gear;
pub mod pedal;
pub mod state;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{CouplingConfig, DrivetrainConfig, EngineConfig, SimConfig, VehicleConfig};
pub use error::{CoreError, CoreResult};
pub use gear::{Gear, GearRatioTable};
pub use pedal::Pedal;
pub use state::{EngineStatus, SimulationState};
pub use time::{FrameClock, FrameDelta, SimClock, Tick};
