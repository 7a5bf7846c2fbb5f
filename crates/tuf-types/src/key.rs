//! Key primitives
//!
//! A key on the wire is `{"keytype": ..., "keyval": {"public": ..., "private": ...}}`.
//! The same structure serves public and private keys; the key ID is the
//! SHA-256 of the canonical JSON of the public-only form, so attaching
//! private material never changes a key's identity.

use crate::encoding::{base64_bytes, base64_bytes_option};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

/// Key algorithm tag carried in `keytype`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    /// Ed25519, 32 raw public bytes
    Ed25519,
    /// RSA, DER-encoded SubjectPublicKeyInfo
    Rsa,
    /// RSA behind a PEM-encoded X.509 certificate
    RsaX509,
    /// ECDSA, DER-encoded SubjectPublicKeyInfo
    Ecdsa,
    /// ECDSA behind a PEM-encoded X.509 certificate
    EcdsaX509,
    /// Unrecognized algorithm, preserved verbatim
    Other(String),
}

impl KeyAlgorithm {
    pub fn as_str(&self) -> &str {
        match self {
            KeyAlgorithm::Ed25519 => "ed25519",
            KeyAlgorithm::Rsa => "rsa",
            KeyAlgorithm::RsaX509 => "rsa-x509",
            KeyAlgorithm::Ecdsa => "ecdsa",
            KeyAlgorithm::EcdsaX509 => "ecdsa-x509",
            KeyAlgorithm::Other(s) => s,
        }
    }
}

impl From<&str> for KeyAlgorithm {
    fn from(s: &str) -> Self {
        match s {
            "ed25519" => KeyAlgorithm::Ed25519,
            "rsa" => KeyAlgorithm::Rsa,
            "rsa-x509" => KeyAlgorithm::RsaX509,
            "ecdsa" => KeyAlgorithm::Ecdsa,
            "ecdsa-x509" => KeyAlgorithm::EcdsaX509,
            other => KeyAlgorithm::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for KeyAlgorithm {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for KeyAlgorithm {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(KeyAlgorithm::from(s.as_str()))
    }
}

/// Signature algorithm tag carried in a signature's `method`
///
/// Lowercased on ingest; an unrecognized method deserializes as
/// [`SigAlgorithm::Other`] and simply never resolves to a verifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SigAlgorithm {
    /// Ed25519 over the raw message
    EdDsa,
    /// RSASSA-PSS with MGF1-SHA256
    RsaPss,
    /// ECDSA with fixed-width (r, s) encoding
    Ecdsa,
    /// Legacy PyCrypto-produced PSS signatures
    PyCrypto,
    /// Unrecognized method, preserved verbatim (already lowercased)
    Other(String),
}

impl SigAlgorithm {
    pub fn as_str(&self) -> &str {
        match self {
            SigAlgorithm::EdDsa => "eddsa",
            SigAlgorithm::RsaPss => "rsapss",
            SigAlgorithm::Ecdsa => "ecdsa",
            SigAlgorithm::PyCrypto => "pycrypto-pkcs#1 pss",
            SigAlgorithm::Other(s) => s,
        }
    }
}

impl From<&str> for SigAlgorithm {
    fn from(s: &str) -> Self {
        let lower = s.to_lowercase();
        match lower.as_str() {
            "eddsa" => SigAlgorithm::EdDsa,
            "rsapss" => SigAlgorithm::RsaPss,
            "ecdsa" => SigAlgorithm::Ecdsa,
            "pycrypto-pkcs#1 pss" => SigAlgorithm::PyCrypto,
            _ => SigAlgorithm::Other(lower),
        }
    }
}

impl std::fmt::Display for SigAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for SigAlgorithm {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SigAlgorithm {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SigAlgorithm::from(s.as_str()))
    }
}

/// Public and optional private key bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    #[serde(with = "base64_bytes")]
    pub public: Vec<u8>,
    #[serde(with = "base64_bytes_option")]
    pub private: Option<Vec<u8>>,
}

/// The wire structure shared by public and private keys
///
/// The ID is computed lazily and memoized; it only ever covers the public
/// half, so a `TufKey` with private material has the same ID as its public
/// view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TufKey {
    #[serde(rename = "keytype")]
    algorithm: KeyAlgorithm,
    #[serde(rename = "keyval")]
    value: KeyPair,
    #[serde(skip)]
    id: OnceLock<String>,
}

impl TufKey {
    /// Create a key carrying both halves
    pub fn new(algorithm: KeyAlgorithm, public: Vec<u8>, private: Option<Vec<u8>>) -> Self {
        Self {
            algorithm,
            value: KeyPair { public, private },
            id: OnceLock::new(),
        }
    }

    pub fn algorithm(&self) -> &KeyAlgorithm {
        &self.algorithm
    }

    /// The public key bytes (encoding depends on the algorithm)
    pub fn public_bytes(&self) -> &[u8] {
        &self.value.public
    }

    pub fn private_bytes(&self) -> Option<&[u8]> {
        self.value.private.as_deref()
    }

    /// The key ID: lowercase hex SHA-256 of the canonical JSON of the
    /// public-only key object
    pub fn key_id(&self) -> &str {
        self.id
            .get_or_init(|| compute_key_id(&self.algorithm, &self.value.public))
    }
}

impl PartialEq for TufKey {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm && self.value == other.value
    }
}

impl Eq for TufKey {}

fn compute_key_id(algorithm: &KeyAlgorithm, public: &[u8]) -> String {
    // Built by hand so the canonical encoding cannot fail: a flat object of
    // strings and null has no non-integer numbers.
    let tree = serde_json::json!({
        "keytype": algorithm.as_str(),
        "keyval": {
            "private": null,
            "public": STANDARD.encode(public),
        },
    });
    let bytes = tuf_canonical::value_to_canonical_json(&tree).unwrap_or_default();
    hex::encode(Sha256::digest(&bytes))
}

/// A key guaranteed to carry no private material
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PublicKey(TufKey);

impl PublicKey {
    /// Create a public key from algorithm and public bytes
    pub fn new(algorithm: KeyAlgorithm, public: Vec<u8>) -> Self {
        Self(TufKey::new(algorithm, public, None))
    }

    /// Take the public view of any key, discarding private material
    pub fn from_key(key: &TufKey) -> Self {
        Self::new(key.algorithm().clone(), key.public_bytes().to_vec())
    }

    pub fn algorithm(&self) -> &KeyAlgorithm {
        self.0.algorithm()
    }

    pub fn public_bytes(&self) -> &[u8] {
        self.0.public_bytes()
    }

    pub fn key_id(&self) -> &str {
        self.0.key_id()
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Strip any private bytes a peer may have leaked into its metadata.
        let key = TufKey::deserialize(deserializer)?;
        Ok(PublicKey::from_key(&key))
    }
}
