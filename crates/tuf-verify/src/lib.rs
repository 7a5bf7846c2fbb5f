//! Signature verification pipeline
//!
//! Given a [`Signed`] envelope and a role, checks that enough distinct
//! role keys produced valid signatures over the canonical bytes of the
//! inner document, then that the document's `_type`, `expires`, and
//! `version` are acceptable. The message bytes are always re-derived by
//! canonicalizing the parsed document — the byte string that arrived is
//! never trusted.

mod error;

pub use error::{Error, Result};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use tuf_crypto::VerifierRegistry;
use tuf_keydb::KeyDb;
use tuf_types::{expiry, Config, PublicKey, Signed, ROLE_ROOT};

#[derive(Debug, Deserialize)]
struct SignedMeta {
    #[serde(rename = "_type", default)]
    typ: String,
    #[serde(default)]
    expires: String,
    #[serde(default)]
    version: u64,
}

/// Full verification: signatures against the role's key set in `db`, then
/// the `_type`/`expires`/`version` checks.
pub fn verify_signed(
    s: &Signed,
    role: &str,
    min_version: u64,
    db: &KeyDb,
    registry: &VerifierRegistry,
    config: &Config,
) -> Result<()> {
    verify_signatures(s, role, db, registry)?;
    verify_meta(s, role, min_version, config)
}

/// Signature-threshold verification only, for metadata that is already
/// trusted locally and whose freshness is not in question.
pub fn verify_signatures(
    s: &Signed,
    role: &str,
    db: &KeyDb,
    registry: &VerifierRegistry,
) -> Result<()> {
    if s.signatures.is_empty() {
        return Err(Error::NoSignatures);
    }
    let role_data = db
        .get_role(role)
        .ok_or_else(|| Error::UnknownRole(role.to_string()))?;

    let message = tuf_canonical::value_to_canonical_json(&s.signed)?;

    let mut valid: HashSet<&str> = HashSet::new();
    for sig in &s.signatures {
        if !role_data.valid_key(&sig.key_id) {
            debug!(role, key_id = %sig.key_id, "skipping signature: key not in role");
            continue;
        }
        let key = match db.get_key(&sig.key_id) {
            Some(key) => key,
            None => {
                debug!(key_id = %sig.key_id, "skipping signature: key not in database");
                continue;
            }
        };
        let verifier = match registry.get(&sig.method) {
            Some(verifier) => verifier,
            None => {
                debug!(method = %sig.method, "skipping signature: unsupported method");
                continue;
            }
        };
        if verifier
            .verify(key, sig.signature.as_bytes(), &message)
            .is_err()
        {
            debug!(key_id = %sig.key_id, "skipping signature: verification failed");
            continue;
        }
        valid.insert(&sig.key_id);
    }

    if valid.len() < role_data.threshold as usize {
        return Err(Error::RoleThreshold {
            role: role.to_string(),
            valid: valid.len(),
            threshold: role_data.threshold,
        });
    }
    Ok(())
}

/// Root verification against an explicit key set and threshold instead of
/// a database lookup. Used for rotation, where the same document must meet
/// the threshold of both the old and the new root key sets.
pub fn verify_root(
    s: &Signed,
    min_version: u64,
    keys: &[PublicKey],
    threshold: u32,
    registry: &VerifierRegistry,
    config: &Config,
) -> Result<()> {
    if s.signatures.is_empty() {
        return Err(Error::NoSignatures);
    }
    let by_id: HashMap<&str, &PublicKey> = keys.iter().map(|k| (k.key_id(), k)).collect();
    let message = tuf_canonical::value_to_canonical_json(&s.signed)?;

    let mut valid: HashSet<&str> = HashSet::new();
    for sig in &s.signatures {
        let key = match by_id.get(sig.key_id.as_str()) {
            Some(key) => *key,
            None => {
                debug!(key_id = %sig.key_id, "skipping signature: key not in root key set");
                continue;
            }
        };
        let verifier = match registry.get(&sig.method) {
            Some(verifier) => verifier,
            None => {
                debug!(method = %sig.method, "skipping signature: unsupported method");
                continue;
            }
        };
        if verifier
            .verify(key, sig.signature.as_bytes(), &message)
            .is_err()
        {
            debug!(key_id = %sig.key_id, "skipping signature: verification failed");
            continue;
        }
        valid.insert(&sig.key_id);
    }

    if valid.len() < threshold as usize {
        return Err(Error::RoleThreshold {
            role: ROLE_ROOT.to_string(),
            valid: valid.len(),
            threshold,
        });
    }
    verify_meta(s, ROLE_ROOT, min_version, config)
}

fn verify_meta(s: &Signed, role: &str, min_version: u64, config: &Config) -> Result<()> {
    let sm: SignedMeta = serde_json::from_value(s.signed.clone())?;
    if sm.typ != config.type_name(role) {
        return Err(Error::WrongType {
            role: role.to_string(),
            actual: sm.typ,
        });
    }
    if expiry::is_expired(&sm.expires) {
        return Err(Error::Expired {
            role: role.to_string(),
            expires: sm.expires,
        });
    }
    if sm.version < min_version {
        return Err(Error::LowVersion {
            actual: sm.version,
            min: min_version,
        });
    }
    Ok(())
}

/// Parse, verify, and decode metadata bytes in one step.
pub fn unmarshal<T: DeserializeOwned>(
    bytes: &[u8],
    role: &str,
    min_version: u64,
    db: &KeyDb,
    registry: &VerifierRegistry,
    config: &Config,
) -> Result<T> {
    let s: Signed = serde_json::from_slice(bytes)?;
    verify_signed(&s, role, min_version, db, registry, config)?;
    Ok(serde_json::from_value(s.signed)?)
}

/// Like [`unmarshal`], but with the signature check only — for locally
/// cached metadata whose meta fields were already validated when it was
/// first accepted.
pub fn unmarshal_trusted<T: DeserializeOwned>(
    bytes: &[u8],
    role: &str,
    db: &KeyDb,
    registry: &VerifierRegistry,
) -> Result<T> {
    let s: Signed = serde_json::from_slice(bytes)?;
    verify_signatures(&s, role, db, registry)?;
    Ok(serde_json::from_value(s.signed)?)
}
