//! Error types for the hf-app service layer.

use std::path::PathBuf;

/// Application error type shared by the CLI and the viewer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Project(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Degenerate model: {0}")]
    Degenerate(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Failed to write export file: {path}")]
    ExportWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for hf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<hf_project::ProjectError> for AppError {
    fn from(err: hf_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<hf_lti::LtiError> for AppError {
    fn from(err: hf_lti::LtiError) -> Self {
        match err {
            hf_lti::LtiError::Degenerate { what } => AppError::Degenerate(what),
            other => AppError::Analysis(other.to_string()),
        }
    }
}

impl From<hf_sim::SimError> for AppError {
    fn from(err: hf_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}
