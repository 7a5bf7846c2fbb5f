//! Roles and role-name validation

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// The four canonical role names
pub const ROLE_ROOT: &str = "root";
pub const ROLE_TARGETS: &str = "targets";
pub const ROLE_SNAPSHOT: &str = "snapshot";
pub const ROLE_TIMESTAMP: &str = "timestamp";

/// All canonical role names in bootstrap order
pub const CANONICAL_ROLES: [&str; 4] = [ROLE_ROOT, ROLE_TARGETS, ROLE_SNAPSHOT, ROLE_TIMESTAMP];

/// Check whether a role name is acceptable: one of the four canonical
/// roles, or a delegation under `targets/` of any depth. Matching is
/// case-insensitive; callers store the lowercased form.
///
/// This only validates the name itself, not that a delegation's parent
/// exists.
pub fn valid_role_name(name: &str) -> bool {
    let name = name.to_lowercase();
    CANONICAL_ROLES.contains(&name.as_str()) || name.starts_with("targets/")
}

/// The base role a name verifies under: delegations inherit the `targets`
/// document type.
pub fn base_role(name: &str) -> &str {
    if name.starts_with("targets/") {
        ROLE_TARGETS
    } else {
        name
    }
}

/// Key set and threshold for a role as listed in a Root document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootRole {
    #[serde(rename = "keyids")]
    pub key_ids: Vec<String>,
    pub threshold: u32,
}

/// A named role, as used in delegations and in the key/role database
///
/// `paths` and `path_hash_prefixes` are mutually exclusive; a role
/// declaring both is invalid and skipped during delegation walks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "keyids")]
    pub key_ids: Vec<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path_hash_prefixes: Vec<String>,
    pub threshold: u32,
}

impl Role {
    /// Create a role, validating the name, threshold, and the
    /// paths/prefixes exclusivity rule.
    pub fn new(
        name: impl Into<String>,
        threshold: u32,
        key_ids: Vec<String>,
        paths: Vec<String>,
        path_hash_prefixes: Vec<String>,
    ) -> Result<Self> {
        let name = name.into().to_lowercase();
        if !valid_role_name(&name) {
            return Err(Error::InvalidRole(name));
        }
        if threshold < 1 {
            return Err(Error::InvalidThreshold(threshold));
        }
        let role = Role {
            key_ids,
            name,
            paths,
            path_hash_prefixes,
            threshold,
        };
        if !role.is_valid() {
            return Err(Error::InvalidRole(format!(
                "{}: both paths and path_hash_prefixes are set",
                role.name
            )));
        }
        Ok(role)
    }

    /// A role may scope itself by path prefix or by path-hash prefix, but
    /// not both.
    pub fn is_valid(&self) -> bool {
        !(!self.paths.is_empty() && !self.path_hash_prefixes.is_empty())
    }

    /// Whether the given key ID is in this role's key set
    pub fn valid_key(&self, id: &str) -> bool {
        self.key_ids.iter().any(|k| k == id)
    }

    /// Whether some declared path is a prefix of `path`
    pub fn check_paths(&self, path: &str) -> bool {
        self.paths.iter().any(|p| path.starts_with(p.as_str()))
    }

    /// Whether some declared prefix is a prefix of the hex-encoded path
    /// hash
    pub fn check_prefixes(&self, path_hash: &str) -> bool {
        self.path_hash_prefixes
            .iter()
            .any(|p| path_hash.starts_with(p.as_str()))
    }
}
