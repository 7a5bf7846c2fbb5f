//! The Timestamp document: the freshness beacon

use crate::config::Config;
use crate::error::Result;
use crate::meta::{FileMeta, Files};
use crate::role::{ROLE_SNAPSHOT, ROLE_TIMESTAMP};
use crate::signed::{Signature, Signed};
use serde::{Deserialize, Serialize};

/// Timestamp is the smallest, most frequently re-issued document; it binds
/// the current Snapshot so clients can detect freeze attacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timestamp {
    #[serde(rename = "_type")]
    pub typ: String,
    pub version: u64,
    pub expires: String,
    pub meta: Files,
}

impl Timestamp {
    /// Build a Timestamp binding the canonical bytes of the given Snapshot
    /// envelope.
    pub fn new(snapshot: &Signed, config: &Config) -> Result<Self> {
        let mut meta = Files::new();
        meta.insert(
            config.meta_entry(ROLE_SNAPSHOT),
            FileMeta::from_bytes(&tuf_canonical::to_canonical_json(snapshot)?, &[])?,
        );
        Ok(Timestamp {
            typ: config.type_name(ROLE_TIMESTAMP),
            version: 1,
            expires: config.default_expires(ROLE_TIMESTAMP),
            meta,
        })
    }
}

/// A Timestamp together with its signatures
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTimestamp {
    pub signed: Timestamp,
    pub signatures: Vec<Signature>,
}

impl SignedTimestamp {
    pub fn new(signed: Timestamp) -> Self {
        Self {
            signed,
            signatures: Vec::new(),
        }
    }

    pub fn to_signed(&self) -> Result<Signed> {
        Ok(Signed {
            signed: serde_json::to_value(&self.signed)?,
            signatures: self.signatures.clone(),
        })
    }

    pub fn from_signed(s: &Signed) -> Result<Self> {
        let signed: Timestamp = serde_json::from_value(s.signed.clone())?;
        Ok(Self {
            signed,
            signatures: s.signatures.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_binds_snapshot() {
        let snapshot_envelope = Signed {
            signed: serde_json::json!({"_type": "snapshot", "version": 3}),
            signatures: Vec::new(),
        };
        let ts = Timestamp::new(&snapshot_envelope, &Config::default()).unwrap();
        assert_eq!(ts.typ, "timestamp");
        let entry = &ts.meta["snapshot.json"];
        let canonical = tuf_canonical::to_canonical_json(&snapshot_envelope).unwrap();
        assert_eq!(entry.length, canonical.len() as i64);
    }

    #[test]
    fn test_signed_roundtrip() {
        let snapshot_envelope = Signed {
            signed: serde_json::json!({"_type": "snapshot", "version": 1}),
            signatures: Vec::new(),
        };
        let ts = SignedTimestamp::new(
            Timestamp::new(&snapshot_envelope, &Config::default()).unwrap(),
        );
        let envelope = ts.to_signed().unwrap();
        let back = SignedTimestamp::from_signed(&envelope).unwrap();
        assert_eq!(ts, back);
    }
}
