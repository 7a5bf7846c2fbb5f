//! Private-key handles
//!
//! Public keys travel through metadata; private material stays behind a
//! handle that can only sign. Randomness comes from the backend's secure
//! RNG, never from the caller.

use crate::error::{Error, Result};
use aws_lc_rs::rand::SystemRandom;
use aws_lc_rs::signature::{Ed25519KeyPair, KeyPair as _};
use tuf_types::{KeyAlgorithm, PublicKey};

/// An in-process Ed25519 signing key
pub struct Ed25519PrivateKey {
    public: PublicKey,
    keypair: Ed25519KeyPair,
}

impl Ed25519PrivateKey {
    /// Generate a fresh key pair.
    pub fn generate() -> Result<Self> {
        let rng = SystemRandom::new();
        let pkcs8 = Ed25519KeyPair::generate_pkcs8(&rng)
            .map_err(|_| Error::KeyGeneration("failed to generate ed25519 key".to_string()))?;
        let keypair = Ed25519KeyPair::from_pkcs8(pkcs8.as_ref())?;
        let public = PublicKey::new(
            KeyAlgorithm::Ed25519,
            keypair.public_key().as_ref().to_vec(),
        );
        Ok(Self { public, keypair })
    }

    /// The public view of this key; its ID identifies the pair.
    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    pub fn key_id(&self) -> &str {
        self.public.key_id()
    }

    pub fn algorithm(&self) -> &KeyAlgorithm {
        self.public.algorithm()
    }

    /// Sign a message, returning the 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.keypair.sign(message).as_ref().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verifier::{Ed25519Verifier, Verifier};

    #[test]
    fn test_generate_and_sign() {
        let key = Ed25519PrivateKey::generate().unwrap();
        assert_eq!(key.algorithm(), &KeyAlgorithm::Ed25519);
        assert_eq!(key.public().public_bytes().len(), 32);

        let message = b"to be signed";
        let sig = key.sign(message);
        assert_eq!(sig.len(), 64);
        assert!(Ed25519Verifier.verify(key.public(), &sig, message).is_ok());
    }

    #[test]
    fn test_key_id_matches_public_view() {
        let key = Ed25519PrivateKey::generate().unwrap();
        assert_eq!(key.key_id(), key.public().key_id());
    }
}
