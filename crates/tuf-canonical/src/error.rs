//! Error types for tuf-canonical

use thiserror::Error;

/// Errors that can occur during canonical serialization
#[derive(Error, Debug)]
pub enum Error {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Number cannot be represented in canonical form
    #[error("non-integer number cannot be canonicalized: {0}")]
    NonIntegerNumber(String),
}

/// Result type for canonical serialization
pub type Result<T> = std::result::Result<T, Error>;
