//! Host simulator errors

use std::path::PathBuf;

use at_core::SessionError;
use thiserror::Error;

/// Errors that can occur while running the simulator
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode run report: {0}")]
    Report(#[source] serde_json::Error),
    #[error("Console transport failed: {0}")]
    Session(SessionError),
}

impl From<SessionError> for HostError {
    fn from(err: SessionError) -> Self {
        HostError::Session(err)
    }
}
