//! Error types for tuf-store

use thiserror::Error;

/// Errors that can occur in metadata and target stores
#[derive(Error, Debug)]
pub enum Error {
    /// No entry under the requested name
    #[error("not found: {0}")]
    NotFound(String),

    /// Stored data exceeds the caller's size cap
    #[error("{name}: {size} bytes exceeds maximum of {max}")]
    SizeExceeded { name: String, size: i64, max: i64 },

    /// I/O error from an underlying stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error computing metadata for staged targets
    #[error(transparent)]
    Types(#[from] tuf_types::Error),

    /// A staged-targets callback aborted the walk
    #[error("targets walk aborted: {0}")]
    WalkAborted(String),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;
