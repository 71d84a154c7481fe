//! Error types for fill simulation.

use thiserror::Error;

/// Errors encountered while configuring or running a fill simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    #[error(transparent)]
    Numeric(#[from] hf_core::HfError),
}

pub type SimResult<T> = Result<T, SimError>;
