//! Error types for tuf-verify

use thiserror::Error;

/// Verification failures
///
/// Per-signature cryptographic failures never surface here; they merely
/// fail to count toward the threshold.
#[derive(Error, Debug)]
pub enum Error {
    /// The envelope carries zero signatures
    #[error("metadata has no signatures")]
    NoSignatures,

    /// The database has no record of the requested role
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// Fewer than threshold valid distinct-key signatures
    #[error("role {role}: {valid} valid signatures, threshold is {threshold}")]
    RoleThreshold {
        role: String,
        valid: usize,
        threshold: u32,
    },

    /// The `_type` field disagrees with the role being verified
    #[error("role {role}: metadata has wrong type {actual:?}")]
    WrongType { role: String, actual: String },

    /// The metadata expired
    #[error("role {role}: metadata expired at {expires}")]
    Expired { role: String, expires: String },

    /// Anti-rollback violation
    #[error("version {actual} is lower than current version {min}")]
    LowVersion { actual: u64, min: u64 },

    /// The inner document could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The inner document could not be canonicalized
    #[error("canonical JSON error: {0}")]
    Canonical(#[from] tuf_canonical::Error),
}

/// Result type for verification
pub type Result<T> = std::result::Result<T, Error>;
