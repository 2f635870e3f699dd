//! Sync error handling
//!
//! Provides typed errors for configuration, state, filesystem and remote
//! API failures. Every variant is fatal to a run; nothing is retried.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during a sync run
#[derive(Error, Debug)]
pub enum SyncError {
    /// Config file does not exist
    #[error("Missing config file at '{path}'")]
    MissingConfig { path: PathBuf },

    /// Config file exists but cannot be parsed
    #[error("Invalid config file '{path}': {source}")]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Config parsed but a required value is missing or empty
    #[error("Invalid configuration: {0}")]
    InvalidValue(String),

    /// API token environment variable is not set
    #[error("{var} environment variable is required")]
    MissingToken { var: &'static str },

    /// State file exists but cannot be parsed
    #[error("Invalid state file '{path}': {source}. Fix or remove it and re-run.")]
    InvalidState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to read file
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write file
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Outline API rejected a request or returned an unusable response
    #[error("Outline API error ({operation}): {detail}")]
    Remote { operation: String, detail: String },
}

impl SyncError {
    /// Create a remote error for the given API endpoint
    pub fn remote(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        SyncError::Remote {
            operation: operation.into(),
            detail: detail.into(),
        }
    }

    /// Check if this error was raised during startup, before any network activity
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SyncError::MissingConfig { .. }
                | SyncError::InvalidConfig { .. }
                | SyncError::InvalidValue(_)
                | SyncError::MissingToken { .. }
        )
    }

    /// Check if this error came from the Outline API
    pub fn is_remote(&self) -> bool {
        matches!(self, SyncError::Remote { .. })
    }
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
