//! Error types for tuf-types

use thiserror::Error;

/// Errors that can occur in the data model
#[derive(Error, Debug)]
pub enum Error {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Canonical serialization error
    #[error("canonical JSON error: {0}")]
    Canonical(#[from] tuf_canonical::Error),

    /// Hex or base64 decoding error
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Role definition is not acceptable
    #[error("invalid role: {0}")]
    InvalidRole(String),

    /// Role threshold below the minimum of one signature
    #[error("invalid role threshold: {0}")]
    InvalidThreshold(u32),

    /// Unsupported hash algorithm requested for file metadata
    #[error("unknown hash algorithm: {0}")]
    UnknownHashAlgorithm(String),

    /// I/O error while hashing a stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for data-model operations
pub type Result<T> = std::result::Result<T, Error>;
