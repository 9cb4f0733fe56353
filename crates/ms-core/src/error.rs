//! Core error type.
//!
//! The physics step never fails: it clamps.  Errors only arise at the edges,
//! when a configuration table or an external command is built from bad input.

use thiserror::Error;

use crate::Gear;

/// The base error type for `ms-core` and a common source for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("gear ratio table has no entry for gear {0}")]
    MissingGearRatio(Gear),

    #[error("gear {0} appears more than once in the ratio table")]
    DuplicateGearRatio(Gear),

    #[error("pedal position must be finite, got {0}")]
    NonFinitePedal(f64),

    #[error("unknown gear label {0:?}")]
    UnknownGear(String),
}

/// Shorthand result type for all `ms-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;
