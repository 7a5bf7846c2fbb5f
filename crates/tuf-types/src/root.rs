//! The Root document: the repository's trust anchor

use crate::config::Config;
use crate::error::Result;
use crate::key::PublicKey;
use crate::role::{RootRole, ROLE_ROOT};
use crate::signed::{Signature, Signed};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root lists every trusted key and the key set plus threshold of each
/// top-level role. It is the only document that carries its own trust
/// anchors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Root {
    #[serde(rename = "_type")]
    pub typ: String,
    pub version: u64,
    pub expires: String,
    pub keys: BTreeMap<String, PublicKey>,
    pub roles: BTreeMap<String, RootRole>,
    pub consistent_snapshot: bool,
}

impl Root {
    /// Build a fresh Root at version 1 with the configured type name and
    /// default expiry window.
    pub fn new(
        keys: BTreeMap<String, PublicKey>,
        roles: BTreeMap<String, RootRole>,
        consistent_snapshot: bool,
        config: &Config,
    ) -> Self {
        Root {
            typ: config.type_name(ROLE_ROOT),
            version: 1,
            expires: config.default_expires(ROLE_ROOT),
            keys,
            roles,
            consistent_snapshot,
        }
    }
}

/// A Root together with the signatures currently attached to it
#[derive(Debug, Clone, PartialEq)]
pub struct SignedRoot {
    pub signed: Root,
    pub signatures: Vec<Signature>,
}

impl SignedRoot {
    pub fn new(signed: Root) -> Self {
        Self {
            signed,
            signatures: Vec::new(),
        }
    }

    /// Wrap the document in a wire envelope, carrying the current
    /// signatures.
    pub fn to_signed(&self) -> Result<Signed> {
        Ok(Signed {
            signed: serde_json::to_value(&self.signed)?,
            signatures: self.signatures.clone(),
        })
    }

    /// Parse the typed document out of a wire envelope.
    pub fn from_signed(s: &Signed) -> Result<Self> {
        let signed: Root = serde_json::from_value(s.signed.clone())?;
        Ok(Self {
            signed,
            signatures: s.signatures.clone(),
        })
    }
}
