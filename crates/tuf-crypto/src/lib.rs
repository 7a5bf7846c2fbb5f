//! Cryptographic engine for TUF metadata
//!
//! Provides the verifier registry dispatched on signature method, the
//! [`CryptoService`] seam over private-key storage with an in-memory
//! Ed25519 implementation, the [`Signer`] envelope updater, and
//! SPKI/X.509 public-key extraction.

pub mod error;
pub mod private_key;
pub mod service;
pub mod signer;
pub mod spki;
pub mod verifier;

pub use error::{Error, Result};
pub use private_key::Ed25519PrivateKey;
pub use service::{CryptoService, Ed25519Service};
pub use signer::Signer;
pub use spki::{parse_spki, spki_from_pem, spki_from_pem_cert, EcCurve, KeyKind, ParsedKey};
pub use verifier::{
    EcdsaVerifier, Ed25519Verifier, RsaPssVerifier, RsaPyCryptoVerifier, Verifier,
    VerifierRegistry, ED25519_SIGNATURE_SIZE,
};
