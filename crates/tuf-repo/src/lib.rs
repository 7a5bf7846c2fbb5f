//! In-memory repository state
//!
//! [`Repository`] holds the currently trusted Root, Targets (top-level and
//! delegated), Snapshot, and Timestamp, together with the key/role
//! database they imply. Installing a Root rebuilds the database from that
//! Root's keys and roles; installing a Targets document merges its
//! delegations in. The same type is used on the authoring side to
//! bootstrap a repository and sign its metadata.

mod error;

pub use error::{Error, Result};

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;
use tuf_crypto::Signer;
use tuf_keydb::KeyDb;
use tuf_types::{
    expiry, Config, FileMeta, PublicKey, Role, Root, RootRole, Signed, SignedRoot, SignedSnapshot,
    SignedTargets, SignedTimestamp, Snapshot, Targets, Timestamp, CANONICAL_ROLES, ROLE_ROOT,
    ROLE_SNAPSHOT, ROLE_TARGETS, ROLE_TIMESTAMP,
};

/// The trusted metadata set and its key/role database
pub struct Repository {
    root: Option<SignedRoot>,
    targets: HashMap<String, SignedTargets>,
    snapshot: Option<SignedSnapshot>,
    timestamp: Option<SignedTimestamp>,
    keydb: KeyDb,
    signer: Signer,
    config: Config,
}

impl Repository {
    /// Create an empty repository around a seeded key/role database and a
    /// signing service.
    pub fn new(keydb: KeyDb, signer: Signer, config: Config) -> Self {
        Repository {
            root: None,
            targets: HashMap::new(),
            snapshot: None,
            timestamp: None,
            keydb,
            signer,
            config,
        }
    }

    pub fn root(&self) -> Option<&SignedRoot> {
        self.root.as_ref()
    }

    pub fn snapshot(&self) -> Option<&SignedSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn timestamp(&self) -> Option<&SignedTimestamp> {
        self.timestamp.as_ref()
    }

    pub fn targets(&self, role: &str) -> Option<&SignedTargets> {
        self.targets.get(&role.to_lowercase())
    }

    /// Mutable access to an installed Targets document, for authoring.
    /// Re-sign and re-issue Snapshot/Timestamp after mutating.
    pub fn targets_mut(&mut self, role: &str) -> Option<&mut SignedTargets> {
        self.targets.get_mut(&role.to_lowercase())
    }

    /// Names of all installed Targets roles.
    pub fn target_roles(&self) -> Vec<String> {
        self.targets.keys().cloned().collect()
    }

    pub fn key_db(&self) -> &KeyDb {
        &self.keydb
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether the repository publishes consistent-snapshot filenames.
    /// False until a Root is installed.
    pub fn consistent_snapshot(&self) -> bool {
        self.root
            .as_ref()
            .is_some_and(|r| r.signed.consistent_snapshot)
    }

    /// Install a verified Root and rebuild the key/role database from its
    /// keys and roles. Role names may carry a legacy `.txt` suffix, which
    /// is stripped; a key listed under an ID its material does not hash to
    /// is rejected.
    pub fn set_root(&mut self, s: &Signed) -> Result<()> {
        let sr = SignedRoot::from_signed(s)?;
        let mut keydb = KeyDb::new();
        for (key_id, key) in &sr.signed.keys {
            keydb.add_key_with_id(key_id, key.clone())?;
        }
        for (name, root_role) in &sr.signed.roles {
            let name = name.strip_suffix(".txt").unwrap_or(name);
            let role = Role::new(
                name,
                root_role.threshold,
                root_role.key_ids.clone(),
                vec![],
                vec![],
            )?;
            keydb.add_role(role)?;
        }
        debug!(version = sr.signed.version, "installing root");
        self.keydb = keydb;
        self.root = Some(sr);
        Ok(())
    }

    /// Install a verified Snapshot.
    pub fn set_snapshot(&mut self, s: &Signed) -> Result<()> {
        self.snapshot = Some(SignedSnapshot::from_signed(s)?);
        Ok(())
    }

    /// Install a verified Timestamp.
    pub fn set_timestamp(&mut self, s: &Signed) -> Result<()> {
        self.timestamp = Some(SignedTimestamp::from_signed(s)?);
        Ok(())
    }

    /// Install a verified Targets document under `role`, merging its
    /// delegation keys and roles into the database.
    pub fn set_targets(&mut self, role: &str, s: &Signed) -> Result<()> {
        let st = SignedTargets::from_signed(s)?;
        for (key_id, key) in &st.signed.delegations.keys {
            self.keydb.add_key_with_id(key_id, key.clone())?;
        }
        for delegated in &st.signed.delegations.roles {
            self.keydb.add_role(delegated.clone())?;
        }
        self.targets.insert(role.to_lowercase(), st);
        Ok(())
    }

    /// Bootstrap a fresh repository: build Root from the roles and keys
    /// already in the database, an empty top-level Targets, a Snapshot
    /// binding both, and a Timestamp binding the Snapshot — each signed
    /// with its role's keys.
    pub fn init(&mut self, consistent_snapshot: bool) -> Result<()> {
        let mut root_roles = BTreeMap::new();
        let mut root_keys = BTreeMap::new();
        for role_name in CANONICAL_ROLES {
            let role = self
                .keydb
                .get_role(role_name)
                .ok_or_else(|| Error::InvalidRole(role_name.to_string()))?;
            root_roles.insert(
                role_name.to_string(),
                RootRole {
                    key_ids: role.key_ids.clone(),
                    threshold: role.threshold,
                },
            );
            for key_id in &role.key_ids {
                // Key presence was checked when the role entered the DB;
                // take the public view to be certain no private bytes leak.
                if let Some(key) = self.keydb.get_key(key_id) {
                    root_keys.insert(
                        key_id.clone(),
                        PublicKey::new(key.algorithm().clone(), key.public_bytes().to_vec()),
                    );
                }
            }
        }

        let mut signed_root = SignedRoot::new(Root::new(
            root_keys,
            root_roles,
            consistent_snapshot,
            &self.config,
        ));
        let mut root_env = signed_root.to_signed()?;
        self.sign_envelope(&mut root_env, ROLE_ROOT)?;
        signed_root.signatures = root_env.signatures.clone();

        let mut signed_targets = SignedTargets::new(Targets::new(&self.config));
        let mut targets_env = signed_targets.to_signed()?;
        self.sign_envelope(&mut targets_env, ROLE_TARGETS)?;
        signed_targets.signatures = targets_env.signatures.clone();

        let mut signed_snapshot =
            SignedSnapshot::new(Snapshot::new(&root_env, &targets_env, &self.config)?);
        let mut snapshot_env = signed_snapshot.to_signed()?;
        self.sign_envelope(&mut snapshot_env, ROLE_SNAPSHOT)?;
        signed_snapshot.signatures = snapshot_env.signatures.clone();

        let mut signed_timestamp =
            SignedTimestamp::new(Timestamp::new(&snapshot_env, &self.config)?);
        let mut timestamp_env = signed_timestamp.to_signed()?;
        self.sign_envelope(&mut timestamp_env, ROLE_TIMESTAMP)?;
        signed_timestamp.signatures = timestamp_env.signatures.clone();

        self.root = Some(signed_root);
        self.targets
            .insert(ROLE_TARGETS.to_string(), signed_targets);
        self.snapshot = Some(signed_snapshot);
        self.timestamp = Some(signed_timestamp);
        Ok(())
    }

    /// Re-sign the Root with the given expiry; returns the wire envelope.
    pub fn sign_root(&mut self, expires: DateTime<Utc>) -> Result<Signed> {
        let mut env = {
            let root = self
                .root
                .as_mut()
                .ok_or_else(|| Error::MissingMeta(ROLE_ROOT.to_string()))?;
            root.signed.expires = expiry::format(expires);
            root.to_signed()?
        };
        self.sign_envelope(&mut env, ROLE_ROOT)?;
        if let Some(root) = self.root.as_mut() {
            root.signatures = env.signatures.clone();
        }
        Ok(env)
    }

    /// Re-sign a Targets document with the given expiry.
    pub fn sign_targets(&mut self, role: &str, expires: DateTime<Utc>) -> Result<Signed> {
        let role = role.to_lowercase();
        let mut env = {
            let targets = self
                .targets
                .get_mut(&role)
                .ok_or_else(|| Error::MissingMeta(role.clone()))?;
            targets.signed.expires = expiry::format(expires);
            targets.to_signed()?
        };
        self.sign_envelope(&mut env, &role)?;
        if let Some(targets) = self.targets.get_mut(&role) {
            targets.signatures = env.signatures.clone();
        }
        Ok(env)
    }

    /// Re-sign the Snapshot with the given expiry.
    pub fn sign_snapshot(&mut self, expires: DateTime<Utc>) -> Result<Signed> {
        let mut env = {
            let snapshot = self
                .snapshot
                .as_mut()
                .ok_or_else(|| Error::MissingMeta(ROLE_SNAPSHOT.to_string()))?;
            snapshot.signed.expires = expiry::format(expires);
            snapshot.to_signed()?
        };
        self.sign_envelope(&mut env, ROLE_SNAPSHOT)?;
        if let Some(snapshot) = self.snapshot.as_mut() {
            snapshot.signatures = env.signatures.clone();
        }
        Ok(env)
    }

    /// Re-sign the Timestamp with the given expiry.
    pub fn sign_timestamp(&mut self, expires: DateTime<Utc>) -> Result<Signed> {
        let mut env = {
            let timestamp = self
                .timestamp
                .as_mut()
                .ok_or_else(|| Error::MissingMeta(ROLE_TIMESTAMP.to_string()))?;
            timestamp.signed.expires = expiry::format(expires);
            timestamp.to_signed()?
        };
        self.sign_envelope(&mut env, ROLE_TIMESTAMP)?;
        if let Some(timestamp) = self.timestamp.as_mut() {
            timestamp.signatures = env.signatures.clone();
        }
        Ok(env)
    }

    /// Re-issue the Snapshot from the currently stored Root and Targets
    /// envelopes, bumping its version. Part of every publish.
    pub fn rebuild_snapshot(&mut self) -> Result<Signed> {
        let root_env = self
            .root
            .as_ref()
            .ok_or_else(|| Error::MissingMeta(ROLE_ROOT.to_string()))?
            .to_signed()?;
        let targets_env = self
            .targets
            .get(ROLE_TARGETS)
            .ok_or_else(|| Error::MissingMeta(ROLE_TARGETS.to_string()))?
            .to_signed()?;
        let mut snapshot = Snapshot::new(&root_env, &targets_env, &self.config)?;
        for (name, delegated) in &self.targets {
            if name != ROLE_TARGETS {
                snapshot.add_meta(self.config.meta_entry(name), &delegated.to_signed()?)?;
            }
        }
        if let Some(prev) = &self.snapshot {
            snapshot.version = prev.signed.version + 1;
        }

        let mut signed_snapshot = SignedSnapshot::new(snapshot);
        let mut env = signed_snapshot.to_signed()?;
        self.sign_envelope(&mut env, ROLE_SNAPSHOT)?;
        signed_snapshot.signatures = env.signatures.clone();
        self.snapshot = Some(signed_snapshot);
        Ok(env)
    }

    /// Re-issue the Timestamp from the currently stored Snapshot, bumping
    /// its version. Part of every publish.
    pub fn rebuild_timestamp(&mut self) -> Result<Signed> {
        let snapshot_env = self
            .snapshot
            .as_ref()
            .ok_or_else(|| Error::MissingMeta(ROLE_SNAPSHOT.to_string()))?
            .to_signed()?;
        let mut timestamp = Timestamp::new(&snapshot_env, &self.config)?;
        if let Some(prev) = &self.timestamp {
            timestamp.version = prev.signed.version + 1;
        }

        let mut signed_timestamp = SignedTimestamp::new(timestamp);
        let mut env = signed_timestamp.to_signed()?;
        self.sign_envelope(&mut env, ROLE_TIMESTAMP)?;
        signed_timestamp.signatures = env.signatures.clone();
        self.timestamp = Some(signed_timestamp);
        Ok(env)
    }

    fn sign_envelope(&self, env: &mut Signed, role: &str) -> Result<()> {
        let keys: Vec<PublicKey> = self
            .keydb
            .role_keys(role)
            .into_iter()
            .cloned()
            .collect();
        if keys.is_empty() {
            return Err(Error::NoSigningKeys(role.to_string()));
        }
        self.signer.sign(env, &keys)?;
        Ok(())
    }

    /// Depth-first search for a target path, honoring delegation order.
    ///
    /// A direct entry in a role's own `targets` map wins; otherwise its
    /// matching delegations are descended in declared order, first match
    /// wins. The walk uses an explicit work list and never revisits a
    /// role, so delegation cycles terminate.
    pub fn walk_targets(&self, role: &str, path: &str) -> Option<&FileMeta> {
        let mut stack = vec![role.to_lowercase()];
        let mut visited: HashSet<String> = HashSet::new();
        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            let targets = match self.targets.get(&current) {
                Some(t) => t,
                None => continue,
            };
            if let Some(meta) = targets.signed.get_meta(path) {
                return Some(meta);
            }
            let matching = targets.signed.get_delegations(path);
            for delegated in matching.iter().rev() {
                debug!(role = %delegated.name, path, "descending into delegation");
                stack.push(delegated.name.clone());
            }
        }
        None
    }

    /// Search for a target starting from the top-level Targets role.
    pub fn find_target(&self, path: &str) -> Option<&FileMeta> {
        self.walk_targets(ROLE_TARGETS, path)
    }
}
