//! Error types for tuf-repo

use thiserror::Error;

/// Errors that can occur while mutating repository state
#[derive(Error, Debug)]
pub enum Error {
    /// Data-model error (parse, canonicalize, construct)
    #[error(transparent)]
    Types(#[from] tuf_types::Error),

    /// Key/role database rejected metadata contents
    #[error(transparent)]
    KeyDb(#[from] tuf_keydb::Error),

    /// Signing failed
    #[error(transparent)]
    Crypto(#[from] tuf_crypto::Error),

    /// A required role is missing from the key/role database
    #[error("invalid role: {0}")]
    InvalidRole(String),

    /// An operation needs metadata that has not been installed
    #[error("no {0} metadata installed")]
    MissingMeta(String),

    /// No keys in the database can sign for the role
    #[error("no signing keys available for role {0}")]
    NoSigningKeys(String),
}

/// Result type for repository operations
pub type Result<T> = std::result::Result<T, Error>;
