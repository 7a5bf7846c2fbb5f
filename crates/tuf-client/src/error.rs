//! Error types for tuf-client

use thiserror::Error;

/// Errors surfaced by the update pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Signature verification failed in a way a rotated Root could cure
    #[error("signature verification failed for {role}")]
    SignatureVerify { role: String },

    /// Downloaded metadata has expired
    #[error("metadata for {role} has expired")]
    MetaExpired { role: String },

    /// The locally trusted Root is past its expiry
    #[error("local root has expired")]
    LocalRootExpired,

    /// Downloaded bytes do not match the length or sha256 declared by
    /// Snapshot/Timestamp
    #[error("checksum mismatch for {name}: {reason}")]
    ChecksumMismatch { name: String, reason: String },

    /// A downloaded target does not match its Targets entry
    #[error("invalid target {path}: {reason}")]
    InvalidTarget { path: String, reason: String },

    /// Required metadata (or a meta entry for a role) is not available
    #[error("missing metadata: {0}")]
    MetaMissing(String),

    /// A verification failure that aborts the update outright
    #[error(transparent)]
    Verify(#[from] tuf_verify::Error),

    /// Remote or cache store failure
    #[error(transparent)]
    Store(#[from] tuf_store::Error),

    /// Repository state failure
    #[error(transparent)]
    Repo(#[from] tuf_repo::Error),

    /// Data-model failure
    #[error(transparent)]
    Types(#[from] tuf_types::Error),

    /// Downloaded metadata is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while streaming a target
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The three failures `update` answers with a one-shot Root refresh;
    /// everything else aborts.
    pub fn triggers_root_refresh(&self) -> bool {
        matches!(
            self,
            Error::SignatureVerify { .. } | Error::MetaExpired { .. } | Error::LocalRootExpired
        )
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, Error>;
