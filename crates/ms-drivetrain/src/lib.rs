//! `ms-drivetrain` — the physics step of the `manual_sim` framework.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`engine`]    | Free-running RPM: throttle, drag, idle return, spin-down    |
//! | [`coupling`]  | Clutch coupling between engine RPM and wheel-implied RPM    |
//! | [`vehicle`]   | Road speed: drag, brakes, transferred torque, coast-down    |
//! | [`stall`]     | Stall condition                                             |
//! | [`step`]      | `Drivetrain::advance` — one tick, composed from the above   |
//! | [`telemetry`] | Derived values for gauges and the animated cutaway          |
//!
//! # One tick
//!
//! ```text
//! stalled?  → rpm held at 0, speed decays under friction
//! off?      → rpm and speed decay exponentially (coast-down)
//! running:
//!   ① engine   free_rpm = rpm + throttle·P·dt − drag·dt (− idle return)
//!   ② vehicle  speed   -= speed·drag·dt + brake·B·dt
//!   ③ coupling open    → free_rpm clamped to [idle, redline]
//!              engaged → rpm relaxes toward |speed·ratio·k|, torque → speed
//!   ④ stall    engaged and rpm < 400 and engagement > 0.8 → engine off
//!   ⑤ limiter  rpm ≤ redline + bounce margin
//! ```
//!
//! Nothing in this crate fails: out-of-domain values are clamped.

pub mod coupling;
pub mod engine;
pub mod stall;
pub mod step;
pub mod telemetry;
pub mod vehicle;


pub use coupling::CouplingOutcome;
pub use step::{Drivetrain, Regime, StepReport};
pub use telemetry::{ShaftAngles, Telemetry};
