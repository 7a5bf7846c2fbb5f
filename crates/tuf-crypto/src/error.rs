//! Error types for tuf-crypto

use thiserror::Error;

/// Errors that can occur in cryptographic operations
#[derive(Error, Debug)]
pub enum Error {
    /// A signature failed cryptographic verification. Per-signature; the
    /// verification pipeline treats this as a skip, not a failure.
    #[error("signature verification failed")]
    Invalid,

    /// The signature method is recognized but not usable with this key
    #[error("method not valid for key type: {0}")]
    WrongMethod(String),

    /// Malformed public key material
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A requested key ID is not known to the signing service
    #[error("missing key: {0}")]
    MissingKey(String),

    /// Algorithm not supported by this backend
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Key generation failed
    #[error("key generation error: {0}")]
    KeyGeneration(String),

    /// Signing failed
    #[error("signing error: {0}")]
    Signing(String),

    /// Canonical serialization of the message to sign failed
    #[error("canonical JSON error: {0}")]
    Canonical(#[from] tuf_canonical::Error),
}

impl From<aws_lc_rs::error::Unspecified> for Error {
    fn from(_: aws_lc_rs::error::Unspecified) -> Self {
        Error::Invalid
    }
}

impl From<aws_lc_rs::error::KeyRejected> for Error {
    fn from(e: aws_lc_rs::error::KeyRejected) -> Self {
        Error::InvalidKey(e.to_string())
    }
}

/// Result type for cryptographic operations
pub type Result<T> = std::result::Result<T, Error>;
