//! End-to-end update scenarios against an in-memory remote

mod common;

use chrono::{Duration, Utc};
use common::TestRepo;
use tuf_client::Error;
use tuf_crypto::CryptoService;
use tuf_store::RemoteStore;
use tuf_types::{expiry, Config, FileMeta, Role, SignedTargets, Targets};

fn future() -> chrono::DateTime<Utc> {
    Utc::now() + Duration::days(30)
}

#[test]
fn test_update_from_fresh_repository() {
    let server = TestRepo::new();
    let mut client = server.client();
    client.update().unwrap();

    let repo = client.repo();
    assert!(repo.root().is_some());
    assert!(repo.snapshot().is_some());
    assert!(repo.timestamp().is_some());
    assert!(repo.targets("targets").is_some());
}

#[test]
fn test_update_is_idempotent() {
    let server = TestRepo::new();
    let mut client = server.client();
    client.update().unwrap();
    let snapshot_before = client.repo().snapshot().unwrap().clone();
    client.update().unwrap();
    assert_eq!(client.repo().snapshot().unwrap(), &snapshot_before);
}

#[test]
fn test_update_downloads_delegated_targets() {
    let mut server = TestRepo::new();
    let delegated_key = server
        .service
        .create("targets/sub", &tuf_types::KeyAlgorithm::Ed25519)
        .unwrap();

    {
        let parent = server.repo.targets_mut("targets").unwrap();
        parent
            .signed
            .delegations
            .keys
            .insert(delegated_key.key_id().to_string(), delegated_key.clone());
        parent.signed.delegations.roles.push(
            Role::new(
                "targets/sub",
                1,
                vec![delegated_key.key_id().to_string()],
                vec!["sub/".to_string()],
                vec![],
            )
            .unwrap(),
        );
    }
    let parent_env = server.repo.sign_targets("targets", future()).unwrap();
    server.repo.set_targets("targets", &parent_env).unwrap();

    let mut child = Targets::new(&Config::default());
    let payload = b"application bytes".to_vec();
    child.targets.insert(
        "sub/app.bin".to_string(),
        FileMeta::from_bytes(&payload, &[]).unwrap(),
    );
    let child_env = SignedTargets::new(child).to_signed().unwrap();
    server.repo.set_targets("targets/sub", &child_env).unwrap();
    server.repo.sign_targets("targets/sub", future()).unwrap();

    server.repo.rebuild_snapshot().unwrap();
    server.repo.rebuild_timestamp().unwrap();
    server.publish();
    server.remote.insert_target("sub/app.bin", payload.clone());

    let mut client = server.client();
    client.update().unwrap();

    let meta = client.target_meta("sub/app.bin").cloned().unwrap();
    assert_eq!(meta.length, payload.len() as i64);

    let mut sink = Vec::new();
    client
        .download_target("sub/app.bin", &meta, &mut sink)
        .unwrap();
    assert_eq!(sink, payload);
}

#[test]
fn test_update_with_consistent_snapshot_names() {
    let server = TestRepo::with_consistent(true);
    let mut client = server.client();
    client.update().unwrap();
    assert!(client.repo().targets("targets").is_some());

    // The plain role name is not served at all in this layout.
    assert!(server.remote.get_meta("targets", i64::MAX).is_err());
}

#[test]
fn test_cache_mirrors_installed_metadata() {
    let server = TestRepo::new();
    let cache = tuf_store::MemoryStore::default();
    let mut client = server.client().with_cache(Box::new(cache.clone()));
    client.update().unwrap();

    let cached = tuf_store::LocalStore::get_meta(&cache).unwrap();
    for name in ["timestamp", "snapshot", "targets"] {
        assert!(cached.contains_key(name), "{name} not cached");
    }
}

#[test]
fn test_corrupted_targets_fails_before_signature_work() {
    let server = TestRepo::new();
    let mut bytes = server.remote.get_meta("targets", i64::MAX).unwrap();
    bytes[0] ^= 0x01;
    server.remote.insert_meta("targets", bytes);

    let mut client = server.client();
    let err = client.update().unwrap_err();
    assert!(matches!(err, Error::ChecksumMismatch { .. }), "got {err}");
}

#[test]
fn test_replayed_timestamp_is_rejected() {
    let server = TestRepo::new();
    let stale = server.remote.get_meta("timestamp", i64::MAX).unwrap();

    let mut client = server.client();
    client.update().unwrap();

    // Publisher moves forward.
    let mut server = server;
    server.repo.rebuild_snapshot().unwrap();
    server.repo.rebuild_timestamp().unwrap();
    server.publish();
    client.update().unwrap();
    assert_eq!(client.repo().timestamp().unwrap().signed.version, 2);

    // An attacker replays the version-1 timestamp.
    server.remote.insert_meta("timestamp", stale);
    let err = client.update().unwrap_err();
    assert!(
        matches!(
            err,
            Error::Verify(tuf_verify::Error::LowVersion { actual: 1, min: 2 })
        ),
        "got {err}"
    );
}

#[test]
fn test_expired_local_root_triggers_root_refresh() {
    let mut server = TestRepo::new();

    // The client trusts a root that has already expired.
    let expired_env = server
        .repo
        .sign_root(Utc::now() - Duration::days(1))
        .unwrap();
    let mut client = {
        let mut client_repo = tuf_repo::Repository::new(
            tuf_keydb::KeyDb::new(),
            tuf_crypto::Signer::new(std::sync::Arc::new(tuf_crypto::Ed25519Service::new())),
            Config::default(),
        );
        client_repo.set_root(&expired_env).unwrap();
        tuf_client::Client::new(client_repo, Box::new(server.remote.clone()))
    };

    // The repository has since re-issued a fresh root and chain.
    server.repo.sign_root(Utc::now() + Duration::days(365)).unwrap();
    server.repo.rebuild_snapshot().unwrap();
    server.repo.rebuild_timestamp().unwrap();
    server.publish();

    client.update().unwrap();
    let installed = client.repo().root().unwrap();
    assert!(!expiry::is_expired(&installed.signed.expires));
}

#[test]
fn test_update_aborts_when_root_stays_expired() {
    let mut server = TestRepo::new();
    let expired_env = server
        .repo
        .sign_root(Utc::now() - Duration::days(1))
        .unwrap();
    server.repo.rebuild_snapshot().unwrap();
    server.repo.rebuild_timestamp().unwrap();
    server.publish();

    // Remote only ever serves the expired root: the one-shot root refresh
    // fetches it, installs it, and the second refresh still fails.
    let mut client = {
        let mut client_repo = tuf_repo::Repository::new(
            tuf_keydb::KeyDb::new(),
            tuf_crypto::Signer::new(std::sync::Arc::new(tuf_crypto::Ed25519Service::new())),
            Config::default(),
        );
        client_repo.set_root(&expired_env).unwrap();
        tuf_client::Client::new(client_repo, Box::new(server.remote.clone()))
    };
    let err = client.update().unwrap_err();
    assert!(
        matches!(err, Error::Verify(tuf_verify::Error::Expired { .. })),
        "got {err}"
    );
}
