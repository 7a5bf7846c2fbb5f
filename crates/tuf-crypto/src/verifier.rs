//! Signature verifiers and the algorithm-dispatch registry

use crate::error::{Error, Result};
use crate::spki::{parse_spki, spki_from_pem, spki_from_pem_cert, KeyKind};
use aws_lc_rs::signature::{
    UnparsedPublicKey, VerificationAlgorithm, ECDSA_P256_SHA256_FIXED, ECDSA_P384_SHA384_FIXED,
    ED25519, RSA_PSS_2048_8192_SHA256,
};
use std::collections::HashMap;
use tracing::{debug, warn};
use tuf_types::{KeyAlgorithm, PublicKey, SigAlgorithm};

/// Expected Ed25519 signature length in bytes
pub const ED25519_SIGNATURE_SIZE: usize = 64;

/// Verifies one signature method against a public key
pub trait Verifier: Send + Sync {
    /// Check `signature` over `message` with `key`. Returns
    /// [`Error::Invalid`] when the signature does not verify.
    fn verify(&self, key: &PublicKey, signature: &[u8], message: &[u8]) -> Result<()>;
}

/// Ed25519 over the raw message
pub struct Ed25519Verifier;

impl Verifier for Ed25519Verifier {
    fn verify(&self, key: &PublicKey, signature: &[u8], message: &[u8]) -> Result<()> {
        if signature.len() != ED25519_SIGNATURE_SIZE {
            debug!(
                expected = ED25519_SIGNATURE_SIZE,
                actual = signature.len(),
                "ed25519 signature has wrong length"
            );
            return Err(Error::Invalid);
        }
        let public = UnparsedPublicKey::new(&ED25519, key.public_bytes());
        public.verify(message, signature).map_err(|_| {
            debug!("ed25519 verification failed");
            Error::Invalid
        })
    }
}

fn rsa_raw_key(key: &PublicKey) -> Result<Vec<u8>> {
    let spki_der = match key.algorithm() {
        KeyAlgorithm::Rsa => key.public_bytes().to_vec(),
        KeyAlgorithm::RsaX509 => spki_from_pem_cert(key.public_bytes())?,
        other => {
            debug!(algorithm = %other, "key type not usable with the RSA-PSS verifier");
            return Err(Error::WrongMethod(other.to_string()));
        }
    };
    let parsed = parse_spki(&spki_der)?;
    match parsed.kind {
        KeyKind::Rsa => Ok(parsed.raw),
        _ => Err(Error::InvalidKey("not an RSA key".to_string())),
    }
}

fn verify_pss(raw_key: &[u8], signature: &[u8], message: &[u8]) -> Result<()> {
    // RSASSA-PSS with MGF1-SHA256 and a 32-byte salt: the backend hashes
    // the message itself.
    let public = UnparsedPublicKey::new(&RSA_PSS_2048_8192_SHA256, raw_key);
    public.verify(message, signature).map_err(|_| {
        debug!("RSA-PSS verification failed");
        Error::Invalid
    })
}

/// RSASSA-PSS over sha256(message) for `rsa` and `rsa-x509` keys
pub struct RsaPssVerifier;

impl Verifier for RsaPssVerifier {
    fn verify(&self, key: &PublicKey, signature: &[u8], message: &[u8]) -> Result<()> {
        let raw = rsa_raw_key(key)?;
        verify_pss(&raw, signature, message)
    }
}

/// Legacy PyCrypto PSS: the same math as [`RsaPssVerifier`], but the key
/// material is a PEM block (public key or certificate) rather than raw DER.
pub struct RsaPyCryptoVerifier;

impl Verifier for RsaPyCryptoVerifier {
    fn verify(&self, key: &PublicKey, signature: &[u8], message: &[u8]) -> Result<()> {
        let spki_der = spki_from_pem(key.public_bytes())?;
        let parsed = parse_spki(&spki_der)?;
        match parsed.kind {
            KeyKind::Rsa => verify_pss(&parsed.raw, signature, message),
            _ => Err(Error::InvalidKey("not an RSA key".to_string())),
        }
    }
}

/// ECDSA with fixed-width `r || s` signatures for `ecdsa` and `ecdsa-x509`
/// keys
pub struct EcdsaVerifier;

impl Verifier for EcdsaVerifier {
    fn verify(&self, key: &PublicKey, signature: &[u8], message: &[u8]) -> Result<()> {
        let spki_der = match key.algorithm() {
            KeyAlgorithm::Ecdsa => key.public_bytes().to_vec(),
            KeyAlgorithm::EcdsaX509 => spki_from_pem_cert(key.public_bytes())?,
            other => {
                debug!(algorithm = %other, "key type not usable with the ECDSA verifier");
                return Err(Error::WrongMethod(other.to_string()));
            }
        };
        let parsed = parse_spki(&spki_der)?;
        let curve = match parsed.kind {
            KeyKind::Ec(curve) => curve,
            _ => return Err(Error::InvalidKey("not an EC key".to_string())),
        };

        let expected_len = 2 * curve.coordinate_bytes();
        if signature.len() != expected_len {
            debug!(
                expected = expected_len,
                actual = signature.len(),
                "ECDSA signature has wrong length"
            );
            return Err(Error::Invalid);
        }

        let algorithm: &'static dyn VerificationAlgorithm = match curve {
            crate::spki::EcCurve::P256 => &ECDSA_P256_SHA256_FIXED,
            crate::spki::EcCurve::P384 => &ECDSA_P384_SHA384_FIXED,
        };
        let public = UnparsedPublicKey::new(algorithm, &parsed.raw);
        public.verify(message, signature).map_err(|_| {
            debug!("ECDSA verification failed");
            Error::Invalid
        })
    }
}

/// Signature-method dispatch table
///
/// Built with the four standard verifiers; registering an algorithm that
/// is already present replaces the prior verifier. A signature whose method
/// has no registered verifier is skipped by the verification pipeline, so
/// an unknown method is never fatal on its own.
pub struct VerifierRegistry {
    verifiers: HashMap<SigAlgorithm, Box<dyn Verifier>>,
}

impl Default for VerifierRegistry {
    fn default() -> Self {
        let mut registry = VerifierRegistry {
            verifiers: HashMap::new(),
        };
        registry.register(SigAlgorithm::EdDsa, Box::new(Ed25519Verifier));
        registry.register(SigAlgorithm::RsaPss, Box::new(RsaPssVerifier));
        registry.register(SigAlgorithm::Ecdsa, Box::new(EcdsaVerifier));
        registry.register(SigAlgorithm::PyCrypto, Box::new(RsaPyCryptoVerifier));
        registry
    }
}

impl VerifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a verifier for an algorithm, replacing any existing one.
    pub fn register(&mut self, algorithm: SigAlgorithm, verifier: Box<dyn Verifier>) {
        if self.verifiers.insert(algorithm.clone(), verifier).is_some() {
            warn!(%algorithm, "replacing already registered verifier");
        }
    }

    /// Look up the verifier for an algorithm.
    pub fn get(&self, algorithm: &SigAlgorithm) -> Option<&dyn Verifier> {
        self.verifiers.get(algorithm).map(|v| v.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_lc_rs::rand::SystemRandom;
    use aws_lc_rs::signature::{Ed25519KeyPair, KeyPair as _};

    fn ed25519_pair() -> (PublicKey, Ed25519KeyPair) {
        let rng = SystemRandom::new();
        let pkcs8 = Ed25519KeyPair::generate_pkcs8(&rng).unwrap();
        let kp = Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).unwrap();
        let public = PublicKey::new(KeyAlgorithm::Ed25519, kp.public_key().as_ref().to_vec());
        (public, kp)
    }

    #[test]
    fn test_ed25519_verify_ok() {
        let (public, kp) = ed25519_pair();
        let message = b"canonical bytes";
        let sig = kp.sign(message);
        assert!(Ed25519Verifier
            .verify(&public, sig.as_ref(), message)
            .is_ok());
    }

    #[test]
    fn test_ed25519_rejects_wrong_message() {
        let (public, kp) = ed25519_pair();
        let sig = kp.sign(b"one message");
        assert!(matches!(
            Ed25519Verifier.verify(&public, sig.as_ref(), b"another message"),
            Err(Error::Invalid)
        ));
    }

    #[test]
    fn test_ed25519_rejects_bad_length() {
        let (public, _) = ed25519_pair();
        assert!(matches!(
            Ed25519Verifier.verify(&public, &[0u8; 63], b"msg"),
            Err(Error::Invalid)
        ));
    }

    #[test]
    fn test_rsa_verifier_rejects_wrong_key_type() {
        let (public, _) = ed25519_pair();
        assert!(matches!(
            RsaPssVerifier.verify(&public, &[0u8; 256], b"msg"),
            Err(Error::WrongMethod(_))
        ));
    }

    #[test]
    fn test_registry_dispatch() {
        let registry = VerifierRegistry::default();
        assert!(registry.get(&SigAlgorithm::EdDsa).is_some());
        assert!(registry.get(&SigAlgorithm::RsaPss).is_some());
        assert!(registry.get(&SigAlgorithm::Ecdsa).is_some());
        assert!(registry.get(&SigAlgorithm::PyCrypto).is_some());
        assert!(registry
            .get(&SigAlgorithm::Other("nope".to_string()))
            .is_none());
    }

    #[test]
    fn test_registry_replace() {
        struct RejectAll;
        impl Verifier for RejectAll {
            fn verify(&self, _: &PublicKey, _: &[u8], _: &[u8]) -> Result<()> {
                Err(Error::Invalid)
            }
        }

        let mut registry = VerifierRegistry::default();
        registry.register(SigAlgorithm::EdDsa, Box::new(RejectAll));

        let (public, kp) = ed25519_pair();
        let message = b"bytes";
        let sig = kp.sign(message);
        let verifier = registry.get(&SigAlgorithm::EdDsa).unwrap();
        assert!(verifier.verify(&public, sig.as_ref(), message).is_err());
    }
}
