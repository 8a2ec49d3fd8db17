//! Runtime error types.

use std::time::Duration;

use slackline_core::BoxError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors returned by [`Runtime`](crate::Runtime).
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The input was not a valid envelope.
    #[error("Failed to parse envelope: {0}")]
    Parse(#[from] serde_json::Error),

    /// Dispatch did not finish in time. The handler future was dropped.
    #[error("Dispatch timed out after {0:?}")]
    Timeout(Duration),

    /// The pipeline returned an error that no error handler recovered.
    #[error("Pipeline error: {0}")]
    Pipeline(#[source] BoxError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reading input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    /// The pipeline error, if this is one.
    pub fn pipeline_error(&self) -> Option<&BoxError> {
        match self {
            Self::Pipeline(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
