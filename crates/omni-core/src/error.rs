//! Error types for the Omni Notes sync layer.

use thiserror::Error;

/// Result type alias using the sync layer's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for sync layer operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Entity absent from the active backend
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend rejected a malformed or incomplete payload
    #[error("Validation rejected: {0}")]
    Validation(String),

    /// Network or storage unreachable
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Local data unparsable (the affected collection is reset to empty)
    #[error("Storage corrupt: {0}")]
    StorageCorrupt(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e.to_string())
    }
}
