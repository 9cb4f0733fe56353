use ms_core::CoreError;
use thiserror::Error;

use crate::Command;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("invalid initial state: {0}")]
    InvalidInitialState(String),

    #[error("simulation has shut down; {0:?} was not delivered")]
    Disconnected(Command),
}

pub type SimResult<T> = Result<T, SimError>;
