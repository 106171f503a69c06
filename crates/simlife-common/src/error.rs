//! Common error types for Simlife.

use thiserror::Error;

/// Result type alias using Simlife's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for Simlife infrastructure operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (file, network, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Create a serialization error from any displayable type.
    pub fn serialization(msg: impl std::fmt::Display) -> Self {
        Self::Serialization(msg.to_string())
    }
}
