//! Error types for tuf-keydb

use thiserror::Error;

/// Errors that can occur when populating the key/role database
#[derive(Error, Debug)]
pub enum Error {
    /// Key uses an algorithm the database does not recognize
    #[error("invalid key type: {0}")]
    WrongType(String),

    /// A claimed key ID does not match the key material
    #[error("key id mismatch: given {given}, computed {computed}")]
    WrongId { given: String, computed: String },

    /// Role name is not in the allowed set
    #[error("invalid role: {0}")]
    InvalidRole(String),

    /// A key ID in a role is not a 64-character hex string
    #[error("invalid key id: {0}")]
    InvalidKeyId(String),

    /// Role threshold below the minimum of one signature
    #[error("invalid role threshold: {0}")]
    InvalidThreshold(u32),
}

/// Result type for database operations
pub type Result<T> = std::result::Result<T, Error>;
