//! Shared fixture: an authoring repository published into an in-memory
//! remote, and clients bootstrapped from its root.

use std::sync::Arc;
use tuf_client::Client;
use tuf_crypto::{CryptoService, Ed25519Service, Signer};
use tuf_keydb::KeyDb;
use tuf_repo::Repository;
use tuf_store::MemoryStore;
use tuf_types::{Config, KeyAlgorithm, Role, CANONICAL_ROLES};

pub struct TestRepo {
    pub service: Arc<Ed25519Service>,
    pub repo: Repository,
    pub remote: MemoryStore,
}

impl TestRepo {
    /// A repository with one Ed25519 key per canonical role, initialized
    /// and published.
    pub fn new() -> Self {
        Self::with_consistent(false)
    }

    pub fn with_consistent(consistent: bool) -> Self {
        let service = Arc::new(Ed25519Service::new());
        let mut keydb = KeyDb::new();
        for role in CANONICAL_ROLES {
            let key = service.create(role, &KeyAlgorithm::Ed25519).unwrap();
            keydb.add_key(key.clone()).unwrap();
            keydb
                .add_role(
                    Role::new(role, 1, vec![key.key_id().to_string()], vec![], vec![]).unwrap(),
                )
                .unwrap();
        }
        let mut repo = Repository::new(keydb, Signer::new(service.clone()), Config::default());
        repo.init(consistent).unwrap();

        let fixture = TestRepo {
            service,
            repo,
            remote: MemoryStore::default(),
        };
        fixture.publish();
        fixture
    }

    /// Serve the repository's current state from the in-memory remote,
    /// under the names the client will fetch.
    pub fn publish(&self) {
        let consistent = self.repo.consistent_snapshot();
        let config = self.repo.config().clone();

        let root_env = self.repo.root().unwrap().to_signed().unwrap();
        self.remote
            .insert_meta("root", tuf_canonical::to_canonical_json(&root_env).unwrap());

        for role in self.repo.target_roles() {
            let env = self.repo.targets(&role).unwrap().to_signed().unwrap();
            let bytes = tuf_canonical::to_canonical_json(&env).unwrap();
            let name = if consistent {
                let snapshot = &self.repo.snapshot().unwrap().signed;
                let hash = snapshot
                    .hash_for_role(&config.meta_entry(&role))
                    .unwrap()
                    .to_hex();
                match role.rsplit_once('/') {
                    Some((dir, base)) => format!("{dir}/{hash}.{base}.json"),
                    None => format!("{hash}.{role}.json"),
                }
            } else {
                role.clone()
            };
            self.remote.insert_meta(name, bytes);
        }

        let snapshot_env = self.repo.snapshot().unwrap().to_signed().unwrap();
        self.remote.insert_meta(
            "snapshot",
            tuf_canonical::to_canonical_json(&snapshot_env).unwrap(),
        );
        let timestamp_env = self.repo.timestamp().unwrap().to_signed().unwrap();
        self.remote.insert_meta(
            "timestamp",
            tuf_canonical::to_canonical_json(&timestamp_env).unwrap(),
        );
    }

    /// A client that trusts the repository's current root.
    pub fn client(&self) -> Client {
        let mut client_repo = Repository::new(
            KeyDb::new(),
            Signer::new(Arc::new(Ed25519Service::new())),
            Config::default(),
        );
        let root_env = self.repo.root().unwrap().to_signed().unwrap();
        client_repo.set_root(&root_env).unwrap();
        Client::new(client_repo, Box::new(self.remote.clone()))
    }
}
