//! In-memory key and role database
//!
//! The trust store every verification consults: public keys indexed by key
//! ID and roles indexed by lowercased name. It is rebuilt from the trusted
//! Root on each successful root install; delegation keys and roles are
//! merged in as parent Targets documents are installed.

mod error;

pub use error::{Error, Result};

use std::collections::HashMap;
use tracing::debug;
use tuf_types::{valid_role_name, KeyAlgorithm, PublicKey, Role};

/// Length of a key ID: lowercase hex SHA-256
pub const KEY_ID_LENGTH: usize = 64;

/// Keys by ID and roles by name, with threshold policy attached
#[derive(Debug, Default)]
pub struct KeyDb {
    keys: HashMap<String, PublicKey>,
    roles: HashMap<String, Role>,
}

impl KeyDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a public key, indexed by its computed ID.
    ///
    /// Keys with unrecognized algorithms are rejected: they could never
    /// contribute to a threshold, and a trust anchor must not silently
    /// carry dead weight.
    pub fn add_key(&mut self, key: PublicKey) -> Result<()> {
        if let KeyAlgorithm::Other(name) = key.algorithm() {
            return Err(Error::WrongType(name.clone()));
        }
        let id = key.key_id().to_string();
        debug!(key_id = %id, algorithm = %key.algorithm(), "adding key");
        self.keys.insert(id, key);
        Ok(())
    }

    /// Add a key whose ID was claimed by the metadata carrying it,
    /// rejecting material that does not hash to the claimed ID.
    pub fn add_key_with_id(&mut self, claimed_id: &str, key: PublicKey) -> Result<()> {
        if key.key_id() != claimed_id {
            return Err(Error::WrongId {
                given: claimed_id.to_string(),
                computed: key.key_id().to_string(),
            });
        }
        self.add_key(key)
    }

    /// Add a role. The name must be one of the four canonical roles or a
    /// `targets/<path>` delegation; it is stored lowercased. The threshold
    /// must be at least one and every key ID must look like a SHA-256 hex
    /// digest.
    pub fn add_role(&mut self, role: Role) -> Result<()> {
        let name = role.name.to_lowercase();
        if !valid_role_name(&name) {
            return Err(Error::InvalidRole(name));
        }
        if role.threshold < 1 {
            return Err(Error::InvalidThreshold(role.threshold));
        }
        for id in &role.key_ids {
            if id.len() != KEY_ID_LENGTH || !id.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(Error::InvalidKeyId(id.clone()));
            }
        }
        let mut role = role;
        role.name = name.clone();
        self.roles.insert(name, role);
        Ok(())
    }

    /// Look up a key by ID.
    pub fn get_key(&self, id: &str) -> Option<&PublicKey> {
        self.keys.get(id)
    }

    /// Look up a role by name (case-insensitive).
    pub fn get_role(&self, name: &str) -> Option<&Role> {
        self.roles.get(&name.to_lowercase())
    }

    /// Whether `id` is in the named role's key set.
    pub fn valid_key(&self, role: &str, id: &str) -> bool {
        self.get_role(role).is_some_and(|r| r.valid_key(id))
    }

    /// The public keys currently bound to a role, in the role's declared
    /// key order. IDs with no matching key in the database are skipped.
    pub fn role_keys(&self, role: &str) -> Vec<&PublicKey> {
        match self.get_role(role) {
            Some(r) => r
                .key_ids
                .iter()
                .filter_map(|id| self.keys.get(id))
                .collect(),
            None => Vec::new(),
        }
    }
}
