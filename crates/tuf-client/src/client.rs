//! The update pipeline

use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};
use tracing::{debug, warn};
use tuf_crypto::VerifierRegistry;
use tuf_repo::Repository;
use tuf_store::{LocalStore, RemoteStore};
use tuf_types::{expiry, FileMeta, PublicKey, Signed, SignedRoot, ROLE_ROOT, ROLE_SNAPSHOT, ROLE_TARGETS, ROLE_TIMESTAMP};

/// Hard size cap for the Timestamp fetch, the only metadata whose size no
/// prior document declares
pub const TIMESTAMP_SIZE_CAP: i64 = 5 << 20;

/// A TUF client: refreshes trusted metadata from an untrusted remote in
/// the mandated order, with a single Root-refresh retry
///
/// If `update` returns an error, the instance may be partially updated and
/// should be discarded.
pub struct Client {
    repo: Repository,
    remote: Box<dyn RemoteStore>,
    cache: Option<Box<dyn LocalStore>>,
    registry: VerifierRegistry,
    versions: HashMap<String, u64>,
}

impl Client {
    /// Create a client around a repository holding (at least) a trusted
    /// Root or a seeded key/role database.
    pub fn new(repo: Repository, remote: Box<dyn RemoteStore>) -> Self {
        Client {
            repo,
            remote,
            cache: None,
            registry: VerifierRegistry::default(),
            versions: HashMap::new(),
        }
    }

    /// Attach a local cache; every installed metadata file is mirrored
    /// into it, best effort.
    pub fn with_cache(mut self, cache: Box<dyn LocalStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replace the verifier registry.
    pub fn with_registry(mut self, registry: VerifierRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The trusted repository state.
    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// Refresh all trusted metadata.
    ///
    /// Runs `refresh` once; if it fails in a way a rotated Root could cure
    /// (signature verification, expired metadata, expired local root), a
    /// new Root is downloaded and `refresh` runs once more. That second
    /// result is final.
    pub fn update(&mut self) -> Result<()> {
        match self.refresh() {
            Ok(()) => Ok(()),
            Err(e) if e.triggers_root_refresh() => {
                debug!(error = %e, "refresh failed, attempting root refresh");
                self.download_root()?;
                self.refresh()
            }
            Err(e) => Err(e),
        }
    }

    /// One refresh pass in the mandated order: Timestamp, Snapshot, local
    /// root freshness, then Targets with its delegations.
    pub fn refresh(&mut self) -> Result<()> {
        self.download_timestamp()?;
        self.download_snapshot()?;
        self.check_local_root()?;
        self.download_targets(ROLE_TARGETS)
    }

    /// Look up a target's metadata in the trusted Targets tree.
    pub fn target_meta(&self, path: &str) -> Option<&FileMeta> {
        self.repo.find_target(path)
    }

    /// Stream a target into `sink`, enforcing the declared length and
    /// sha256. On failure the sink may hold partial data and must be
    /// treated as tainted.
    pub fn download_target(
        &self,
        path: &str,
        meta: &FileMeta,
        sink: &mut dyn Write,
    ) -> Result<()> {
        let reader = self.remote.get_target(path)?;
        let mut limited = reader.take(meta.length.max(0) as u64);
        let mut hasher = Sha256::new();
        let mut length: i64 = 0;
        let mut buf = [0u8; 8192];
        loop {
            let n = limited.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
            sink.write_all(&buf[..n])?;
            length += n as i64;
        }

        if length != meta.length {
            return Err(Error::InvalidTarget {
                path: path.to_string(),
                reason: format!("size {length} does not match targets entry {}", meta.length),
            });
        }
        let declared = meta.sha256().ok_or_else(|| Error::InvalidTarget {
            path: path.to_string(),
            reason: "no sha256 in targets entry".to_string(),
        })?;
        if hasher.finalize().as_slice() != declared.as_bytes() {
            return Err(Error::InvalidTarget {
                path: path.to_string(),
                reason: "sha256 does not match targets entry".to_string(),
            });
        }
        Ok(())
    }

    fn download_timestamp(&mut self) -> Result<()> {
        let raw = self.remote.get_meta(ROLE_TIMESTAMP, TIMESTAMP_SIZE_CAP)?;
        let s: Signed = serde_json::from_slice(&raw)?;
        tuf_verify::verify_signed(
            &s,
            ROLE_TIMESTAMP,
            self.min_version(ROLE_TIMESTAMP),
            self.repo.key_db(),
            &self.registry,
            self.repo.config(),
        )
        .map_err(|e| map_verify(ROLE_TIMESTAMP, e))?;
        self.repo.set_timestamp(&s)?;
        self.record_version(ROLE_TIMESTAMP, &s.signed);
        self.cache_meta(ROLE_TIMESTAMP, &raw);
        Ok(())
    }

    fn download_snapshot(&mut self) -> Result<()> {
        let meta = self.timestamp_entry()?;
        let raw = self.remote.get_meta(ROLE_SNAPSHOT, meta.length)?;
        check_fetched_bytes(ROLE_SNAPSHOT, &raw, &meta)?;
        let s: Signed = serde_json::from_slice(&raw)?;
        tuf_verify::verify_signed(
            &s,
            ROLE_SNAPSHOT,
            self.min_version(ROLE_SNAPSHOT),
            self.repo.key_db(),
            &self.registry,
            self.repo.config(),
        )
        .map_err(|e| map_verify(ROLE_SNAPSHOT, e))?;
        self.repo.set_snapshot(&s)?;
        self.record_version(ROLE_SNAPSHOT, &s.signed);
        self.cache_meta(ROLE_SNAPSHOT, &raw);
        Ok(())
    }

    fn check_local_root(&self) -> Result<()> {
        match self.repo.root() {
            Some(root) if !expiry::is_expired(&root.signed.expires) => Ok(()),
            _ => Err(Error::LocalRootExpired),
        }
    }

    /// Download and install a new Root, sized and checksummed by the
    /// current Snapshot.
    fn download_root(&mut self) -> Result<()> {
        debug!("downloading root");
        let meta = self.snapshot_entry(ROLE_ROOT)?;
        let raw = self.remote.get_meta(ROLE_ROOT, meta.length)?;
        check_fetched_bytes(ROLE_ROOT, &raw, &meta)?;
        let s: Signed = serde_json::from_slice(&raw)?;
        self.verify_root(&s)?;
        self.repo.set_root(&s)?;
        self.record_version(ROLE_ROOT, &s.signed);
        self.cache_meta(ROLE_ROOT, &raw);
        Ok(())
    }

    /// Dual-attestation Root verification: the candidate must meet the
    /// signature threshold of the root role it declares itself *and* of
    /// the previously trusted root role.
    pub fn verify_root(&self, s: &Signed) -> Result<()> {
        let candidate = SignedRoot::from_signed(s)?;
        let new_role = candidate
            .signed
            .roles
            .get(ROLE_ROOT)
            .ok_or_else(|| Error::Verify(tuf_verify::Error::UnknownRole(ROLE_ROOT.to_string())))?;
        let new_keys: Vec<PublicKey> = new_role
            .key_ids
            .iter()
            .filter_map(|id| candidate.signed.keys.get(id).cloned())
            .collect();
        tuf_verify::verify_root(
            s,
            0,
            &new_keys,
            new_role.threshold,
            &self.registry,
            self.repo.config(),
        )?;

        let old_role = self
            .repo
            .key_db()
            .get_role(ROLE_ROOT)
            .ok_or_else(|| Error::Verify(tuf_verify::Error::UnknownRole(ROLE_ROOT.to_string())))?;
        let old_keys: Vec<PublicKey> = self
            .repo
            .key_db()
            .role_keys(ROLE_ROOT)
            .into_iter()
            .cloned()
            .collect();
        tuf_verify::verify_root(
            s,
            0,
            &old_keys,
            old_role.threshold,
            &self.registry,
            self.repo.config(),
        )?;
        Ok(())
    }

    /// Download a Targets role and every delegated role below it. Children
    /// are visited depth-first in declared order, each only once.
    fn download_targets(&mut self, start_role: &str) -> Result<()> {
        let consistent = self.repo.consistent_snapshot();
        let mut stack = vec![start_role.to_lowercase()];
        let mut visited: HashSet<String> = HashSet::new();
        while let Some(role) = stack.pop() {
            if !visited.insert(role.clone()) {
                continue;
            }
            let meta = self.snapshot_entry(&role)?;
            let name = role_fetch_name(&role, consistent, &meta)?;
            let raw = self.remote.get_meta(&name, meta.length)?;
            check_fetched_bytes(&role, &raw, &meta)?;
            let s: Signed = serde_json::from_slice(&raw)?;
            tuf_verify::verify_signed(
                &s,
                &role,
                self.min_version(&role),
                self.repo.key_db(),
                &self.registry,
                self.repo.config(),
            )
            .map_err(|e| map_verify(&role, e))?;
            self.repo.set_targets(&role, &s)?;
            self.record_version(&role, &s.signed);
            self.cache_meta(&role, &raw);

            let children: Vec<String> = self
                .repo
                .targets(&role)
                .map(|t| {
                    t.signed
                        .delegations
                        .roles
                        .iter()
                        .map(|r| r.name.clone())
                        .collect()
                })
                .unwrap_or_default();
            for child in children.into_iter().rev() {
                stack.push(child);
            }
        }
        Ok(())
    }

    fn timestamp_entry(&self) -> Result<FileMeta> {
        let timestamp = self
            .repo
            .timestamp()
            .ok_or_else(|| Error::MetaMissing(ROLE_TIMESTAMP.to_string()))?;
        let key = self.repo.config().meta_entry(ROLE_SNAPSHOT);
        timestamp
            .signed
            .meta
            .get(&key)
            .or_else(|| timestamp.signed.meta.get(ROLE_SNAPSHOT))
            .cloned()
            .ok_or(Error::MetaMissing(key))
    }

    fn snapshot_entry(&self, role: &str) -> Result<FileMeta> {
        let snapshot = self
            .repo
            .snapshot()
            .ok_or_else(|| Error::MetaMissing(ROLE_SNAPSHOT.to_string()))?;
        let key = self.repo.config().meta_entry(role);
        snapshot
            .signed
            .meta
            .get(&key)
            .or_else(|| snapshot.signed.meta.get(role))
            .cloned()
            .ok_or(Error::MetaMissing(key))
    }

    fn min_version(&self, role: &str) -> u64 {
        self.versions.get(role).copied().unwrap_or(0)
    }

    fn record_version(&mut self, role: &str, signed: &serde_json::Value) {
        if let Some(version) = signed.get("version").and_then(|v| v.as_u64()) {
            self.versions.insert(role.to_string(), version);
        }
    }

    fn cache_meta(&self, name: &str, raw: &[u8]) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_meta(name, raw.to_vec()) {
                warn!(name, error = %e, "failed to cache metadata");
            }
        }
    }
}

/// Map a verification failure during refresh: failures a rotated Root
/// could plausibly cure become `SignatureVerify`, expiry becomes
/// `MetaExpired`, and everything else aborts as-is.
fn map_verify(role: &str, e: tuf_verify::Error) -> Error {
    match e {
        tuf_verify::Error::Expired { .. } => Error::MetaExpired {
            role: role.to_string(),
        },
        tuf_verify::Error::NoSignatures
        | tuf_verify::Error::UnknownRole(_)
        | tuf_verify::Error::RoleThreshold { .. } => Error::SignatureVerify {
            role: role.to_string(),
        },
        other => Error::Verify(other),
    }
}

/// Compare fetched bytes against the length and sha256 a prior document
/// declared for them. Runs before any parsing or signature work.
fn check_fetched_bytes(name: &str, raw: &[u8], meta: &FileMeta) -> Result<()> {
    if raw.len() as i64 != meta.length {
        return Err(Error::ChecksumMismatch {
            name: name.to_string(),
            reason: format!("length {} does not match declared {}", raw.len(), meta.length),
        });
    }
    let declared = meta.sha256().ok_or_else(|| Error::ChecksumMismatch {
        name: name.to_string(),
        reason: "no sha256 declared".to_string(),
    })?;
    if Sha256::digest(raw).as_slice() != declared.as_bytes() {
        return Err(Error::ChecksumMismatch {
            name: name.to_string(),
            reason: "sha256 does not match declared digest".to_string(),
        });
    }
    Ok(())
}

/// The name a Targets role is fetched under: the plain role name, or the
/// consistent-snapshot form `<dir>/<sha256hex>.<basename>.json`.
fn role_fetch_name(role: &str, consistent: bool, meta: &FileMeta) -> Result<String> {
    if !consistent {
        return Ok(role.to_string());
    }
    let hash = meta.sha256().ok_or_else(|| Error::MetaMissing(format!(
        "sha256 for {role} in snapshot meta"
    )))?;
    Ok(match role.rsplit_once('/') {
        Some((dir, base)) => format!("{dir}/{}.{base}.json", hash.to_hex()),
        None => format!("{}.{role}.json", hash.to_hex()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuf_types::Hashes;

    fn meta_for(data: &[u8]) -> FileMeta {
        FileMeta::from_bytes(data, &[]).unwrap()
    }

    #[test]
    fn test_check_fetched_bytes_ok() {
        let meta = meta_for(b"payload");
        assert!(check_fetched_bytes("snapshot", b"payload", &meta).is_ok());
    }

    #[test]
    fn test_check_fetched_bytes_length_mismatch() {
        let meta = meta_for(b"payload");
        assert!(matches!(
            check_fetched_bytes("snapshot", b"payloa", &meta),
            Err(Error::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_check_fetched_bytes_flipped_byte() {
        let meta = meta_for(b"payload");
        assert!(matches!(
            check_fetched_bytes("snapshot", b"Payload", &meta),
            Err(Error::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_check_fetched_bytes_requires_sha256() {
        let meta = FileMeta {
            length: 2,
            hashes: Hashes::new(),
            custom: None,
        };
        assert!(matches!(
            check_fetched_bytes("root", b"ab", &meta),
            Err(Error::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_role_fetch_name_plain() {
        let meta = meta_for(b"x");
        assert_eq!(
            role_fetch_name("targets", false, &meta).unwrap(),
            "targets"
        );
    }

    #[test]
    fn test_role_fetch_name_consistent() {
        let meta = meta_for(b"x");
        let hash = meta.sha256().unwrap().to_hex();
        assert_eq!(
            role_fetch_name("targets", true, &meta).unwrap(),
            format!("{hash}.targets.json")
        );
        assert_eq!(
            role_fetch_name("targets/sub/role", true, &meta).unwrap(),
            format!("targets/sub/{hash}.role.json")
        );
    }

    #[test]
    fn test_map_verify_classification() {
        assert!(map_verify(
            "timestamp",
            tuf_verify::Error::RoleThreshold {
                role: "timestamp".to_string(),
                valid: 0,
                threshold: 1,
            },
        )
        .triggers_root_refresh());
        assert!(map_verify(
            "snapshot",
            tuf_verify::Error::Expired {
                role: "snapshot".to_string(),
                expires: "2020-01-01T00:00:00Z".to_string(),
            },
        )
        .triggers_root_refresh());
        assert!(!map_verify(
            "snapshot",
            tuf_verify::Error::LowVersion { actual: 1, min: 2 },
        )
        .triggers_root_refresh());
    }
}
