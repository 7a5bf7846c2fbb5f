//! Signing services
//!
//! [`CryptoService`] is the seam between the metadata machinery and
//! whatever actually holds private keys — an in-process store, an HSM, a
//! remote signer. The rest of the workspace only ever sees key IDs and
//! returned signatures; private material never crosses the trait.

use crate::error::{Error, Result};
use crate::private_key::Ed25519PrivateKey;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use tuf_types::{HexBytes, KeyAlgorithm, PublicKey, SigAlgorithm, Signature};

/// Key creation and signing behind a narrow interface
pub trait CryptoService: Send + Sync {
    /// Generate a key pair for a role, persist the private half, and
    /// return the public view.
    fn create(&self, role: &str, algorithm: &KeyAlgorithm) -> Result<PublicKey>;

    /// Look up the public views of the given key IDs. Unknown IDs are
    /// simply absent from the result.
    fn public_keys(&self, key_ids: &[String]) -> Result<HashMap<String, PublicKey>>;

    /// Sign `message` with every requested key ID the service knows.
    fn sign(&self, key_ids: &[String], message: &[u8]) -> Result<Vec<Signature>>;
}

/// In-memory Ed25519 signing service
///
/// Holds generated key pairs for the lifetime of the process. Suitable for
/// tests and for repository tooling that manages its own key storage.
#[derive(Default)]
pub struct Ed25519Service {
    keys: Mutex<HashMap<String, Ed25519PrivateKey>>,
}

impl Ed25519Service {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> Result<MutexGuard<'_, HashMap<String, Ed25519PrivateKey>>> {
        self.keys
            .lock()
            .map_err(|_| Error::Signing("key store lock poisoned".to_string()))
    }
}

impl CryptoService for Ed25519Service {
    fn create(&self, role: &str, algorithm: &KeyAlgorithm) -> Result<PublicKey> {
        if *algorithm != KeyAlgorithm::Ed25519 {
            return Err(Error::UnsupportedAlgorithm(algorithm.to_string()));
        }
        let key = Ed25519PrivateKey::generate()?;
        let public = key.public().clone();
        debug!(role, key_id = key.key_id(), "created ed25519 key");
        self.locked()?.insert(key.key_id().to_string(), key);
        Ok(public)
    }

    fn public_keys(&self, key_ids: &[String]) -> Result<HashMap<String, PublicKey>> {
        let keys = self.locked()?;
        Ok(key_ids
            .iter()
            .filter_map(|id| keys.get(id).map(|key| (id.clone(), key.public().clone())))
            .collect())
    }

    fn sign(&self, key_ids: &[String], message: &[u8]) -> Result<Vec<Signature>> {
        let keys = self.locked()?;
        let mut signatures = Vec::new();
        for id in key_ids {
            let key = match keys.get(id) {
                Some(key) => key,
                None => {
                    debug!(key_id = %id, "skipping unknown signing key");
                    continue;
                }
            };
            signatures.push(Signature {
                key_id: id.clone(),
                method: SigAlgorithm::EdDsa,
                signature: HexBytes::new(key.sign(message)),
            });
        }
        Ok(signatures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verifier::{Ed25519Verifier, Verifier};

    #[test]
    fn test_create_rejects_non_ed25519() {
        let service = Ed25519Service::new();
        assert!(matches!(
            service.create("root", &KeyAlgorithm::Rsa),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_create_and_sign_roundtrip() {
        let service = Ed25519Service::new();
        let key = service.create("root", &KeyAlgorithm::Ed25519).unwrap();
        let message = b"message bytes";
        let sigs = service
            .sign(&[key.key_id().to_string()], message)
            .unwrap();
        assert_eq!(sigs.len(), 1);
        assert_eq!(sigs[0].key_id, key.key_id());
        assert_eq!(sigs[0].method, SigAlgorithm::EdDsa);
        assert!(Ed25519Verifier
            .verify(&key, sigs[0].signature.as_bytes(), message)
            .is_ok());
    }

    #[test]
    fn test_sign_skips_unknown_ids() {
        let service = Ed25519Service::new();
        let key = service.create("root", &KeyAlgorithm::Ed25519).unwrap();
        let sigs = service
            .sign(
                &["missing".to_string(), key.key_id().to_string()],
                b"data",
            )
            .unwrap();
        assert_eq!(sigs.len(), 1);
    }

    #[test]
    fn test_public_keys_lookup() {
        let service = Ed25519Service::new();
        let a = service.create("root", &KeyAlgorithm::Ed25519).unwrap();
        let found = service
            .public_keys(&[a.key_id().to_string(), "missing".to_string()])
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[a.key_id()], a);
    }
}
