//! The Snapshot document: binds the current version of every metadata file

use crate::config::Config;
use crate::encoding::HexBytes;
use crate::error::Result;
use crate::meta::{FileMeta, Files};
use crate::role::{ROLE_ROOT, ROLE_SNAPSHOT, ROLE_TARGETS};
use crate::signed::{Signature, Signed};
use serde::{Deserialize, Serialize};

/// Snapshot records the length and digests of Root and every Targets file,
/// preventing mix-and-match of metadata versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "_type")]
    pub typ: String,
    pub version: u64,
    pub expires: String,
    pub meta: Files,
}

impl Snapshot {
    /// Build a Snapshot binding the canonical bytes of the given Root and
    /// top-level Targets envelopes.
    pub fn new(root: &Signed, targets: &Signed, config: &Config) -> Result<Self> {
        let mut meta = Files::new();
        meta.insert(
            config.meta_entry(ROLE_ROOT),
            FileMeta::from_bytes(&tuf_canonical::to_canonical_json(root)?, &[])?,
        );
        meta.insert(
            config.meta_entry(ROLE_TARGETS),
            FileMeta::from_bytes(&tuf_canonical::to_canonical_json(targets)?, &[])?,
        );
        Ok(Snapshot {
            typ: config.type_name(ROLE_SNAPSHOT),
            version: 1,
            expires: config.default_expires(ROLE_SNAPSHOT),
            meta,
        })
    }

    /// Record (or replace) the entry for an additional metadata file.
    pub fn add_meta(&mut self, name: impl Into<String>, envelope: &Signed) -> Result<()> {
        let bytes = tuf_canonical::to_canonical_json(envelope)?;
        self.meta.insert(name.into(), FileMeta::from_bytes(&bytes, &[])?);
        Ok(())
    }

    /// The sha256 recorded for a metadata file, if present.
    pub fn hash_for_role(&self, name: &str) -> Option<&HexBytes> {
        self.meta.get(name).and_then(|m| m.sha256())
    }
}

/// A Snapshot together with its signatures
#[derive(Debug, Clone, PartialEq)]
pub struct SignedSnapshot {
    pub signed: Snapshot,
    pub signatures: Vec<Signature>,
}

impl SignedSnapshot {
    pub fn new(signed: Snapshot) -> Self {
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
        let signed: Snapshot = serde_json::from_value(s.signed.clone())?;
        Ok(Self {
            signed,
            signatures: s.signatures.clone(),
        })
    }
}
