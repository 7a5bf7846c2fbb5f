//! Envelope signing
//!
//! [`Signer`] bridges a [`CryptoService`] and the [`Signed`] envelope:
//! re-signing with a key replaces that key's previous signature while
//! signatures from other keys are preserved.

use crate::error::Result;
use crate::service::CryptoService;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use tuf_types::{PublicKey, Signed};

/// Signs envelopes via a [`CryptoService`]
pub struct Signer {
    service: Arc<dyn CryptoService>,
}

impl Signer {
    pub fn new(service: Arc<dyn CryptoService>) -> Self {
        Self { service }
    }

    /// The underlying signing service
    pub fn service(&self) -> &Arc<dyn CryptoService> {
        &self.service
    }

    /// Sign the envelope's canonical document bytes with the given keys.
    ///
    /// Existing signatures by any of the given keys are dropped first, so
    /// re-signing replaces rather than accumulates; signatures by other
    /// keys are left untouched.
    pub fn sign(&self, envelope: &mut Signed, keys: &[PublicKey]) -> Result<()> {
        let key_ids: Vec<String> = keys.iter().map(|k| k.key_id().to_string()).collect();
        let replacing: HashSet<&str> = key_ids.iter().map(String::as_str).collect();

        let mut retained: Vec<_> = envelope
            .signatures
            .drain(..)
            .filter(|sig| !replacing.contains(sig.key_id.as_str()))
            .collect();

        let message = tuf_canonical::value_to_canonical_json(&envelope.signed)?;
        let fresh = self.service.sign(&key_ids, &message)?;
        debug!(count = fresh.len(), "appending new signatures");

        retained.extend(fresh);
        envelope.signatures = retained;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::Ed25519Service;
    use tuf_types::KeyAlgorithm;

    fn envelope() -> Signed {
        Signed {
            signed: serde_json::json!({"_type": "root", "version": 1}),
            signatures: Vec::new(),
        }
    }

    #[test]
    fn test_sign_appends() {
        let service = Arc::new(Ed25519Service::new());
        let key = service.create("root", &KeyAlgorithm::Ed25519).unwrap();
        let signer = Signer::new(service);

        let mut s = envelope();
        signer.sign(&mut s, &[key.clone()]).unwrap();
        assert_eq!(s.signatures.len(), 1);
        assert_eq!(s.signatures[0].key_id, key.key_id());
    }

    #[test]
    fn test_resign_replaces_own_signature() {
        let service = Arc::new(Ed25519Service::new());
        let key = service.create("root", &KeyAlgorithm::Ed25519).unwrap();
        let signer = Signer::new(service);

        let mut s = envelope();
        signer.sign(&mut s, &[key.clone()]).unwrap();
        let first = s.signatures[0].clone();
        signer.sign(&mut s, &[key]).unwrap();
        assert_eq!(s.signatures.len(), 1);
        // Ed25519 is deterministic, so the replacement is byte-identical.
        assert_eq!(s.signatures[0], first);
    }

    #[test]
    fn test_sign_preserves_other_signers() {
        let service = Arc::new(Ed25519Service::new());
        let a = service.create("root", &KeyAlgorithm::Ed25519).unwrap();
        let b = service.create("root", &KeyAlgorithm::Ed25519).unwrap();
        let signer = Signer::new(service);

        let mut s = envelope();
        signer.sign(&mut s, &[a.clone()]).unwrap();
        signer.sign(&mut s, &[b.clone()]).unwrap();
        assert_eq!(s.signatures.len(), 2);
        let ids: Vec<&str> = s.signatures.iter().map(|sig| sig.key_id.as_str()).collect();
        assert!(ids.contains(&a.key_id()));
        assert!(ids.contains(&b.key_id()));
    }
}
