//! Targets documents and delegations

use crate::config::Config;
use crate::error::Result;
use crate::key::PublicKey;
use crate::meta::{FileMeta, Files};
use crate::role::{Role, ROLE_TARGETS};
use crate::signed::{Signature, Signed};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Keys and roles a Targets document delegates to
///
/// The role order is significant: it is the priority order for delegation
/// walks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delegations {
    pub keys: BTreeMap<String, PublicKey>,
    pub roles: Vec<Role>,
}

/// A Targets document: the target files a role vouches for, plus its
/// delegations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Targets {
    #[serde(rename = "_type")]
    pub typ: String,
    pub version: u64,
    pub expires: String,
    pub targets: Files,
    #[serde(default)]
    pub delegations: Delegations,
}

impl Targets {
    /// Build an empty Targets document at version 1.
    pub fn new(config: &Config) -> Self {
        Targets {
            typ: config.type_name(ROLE_TARGETS),
            version: 1,
            expires: config.default_expires(ROLE_TARGETS),
            targets: Files::new(),
            delegations: Delegations::default(),
        }
    }

    /// Direct lookup of a target path in this document.
    pub fn get_meta(&self, path: &str) -> Option<&FileMeta> {
        self.targets.get(path)
    }

    /// The delegated roles that may sign for `path`, in declared order.
    /// Roles declaring both paths and path-hash prefixes are skipped.
    pub fn get_delegations(&self, path: &str) -> Vec<&Role> {
        let path_hash = hex::encode(Sha256::digest(path.as_bytes()));
        self.delegations
            .roles
            .iter()
            .filter(|r| r.is_valid())
            .filter(|r| r.check_paths(path) || r.check_prefixes(&path_hash))
            .collect()
    }
}

/// A Targets document together with its signatures
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTargets {
    pub signed: Targets,
    pub signatures: Vec<Signature>,
}

impl SignedTargets {
    pub fn new(signed: Targets) -> Self {
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
        let signed: Targets = serde_json::from_value(s.signed.clone())?;
        Ok(Self {
            signed,
            signatures: s.signatures.clone(),
        })
    }
}
