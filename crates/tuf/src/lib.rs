//! The Update Framework (TUF) in Rust
//!
//! A client/repository library implementing the TUF metadata protocol:
//! threshold-signed Root/Targets/Snapshot/Timestamp documents over
//! canonical JSON, hierarchical delegated targets, and a client update
//! pipeline that is robust against single-key compromise, replay,
//! rollback, freeze, and mix-and-match attacks.
//!
//! This is the umbrella crate; each subsystem also ships on its own:
//!
//! - [`canonical`]: deterministic canonical-JSON serialization
//! - [`types`]: the wire data model and per-repository [`Config`]
//! - [`crypto`]: verifiers, signing services, and the [`Signer`]
//! - [`keydb`]: the in-memory key/role trust store
//! - [`verify`]: the signature/threshold/expiry/version pipeline
//! - [`store`]: remote and local store interfaces
//! - [`repo`]: trusted repository state and metadata authoring
//! - [`client`]: the ordered update pipeline and target download
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tuf::crypto::{CryptoService, Ed25519Service, Signer};
//! use tuf::keydb::KeyDb;
//! use tuf::repo::Repository;
//! use tuf::types::{Config, KeyAlgorithm, Role, CANONICAL_ROLES};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Seed a key and role per canonical TUF role, then bootstrap.
//! let service = Arc::new(Ed25519Service::new());
//! let mut keydb = KeyDb::new();
//! for role in CANONICAL_ROLES {
//!     let key = service.create(role, &KeyAlgorithm::Ed25519)?;
//!     let key_ids = vec![key.key_id().to_string()];
//!     keydb.add_key(key)?;
//!     keydb.add_role(Role::new(role, 1, key_ids, vec![], vec![])?)?;
//! }
//! let mut repo = Repository::new(keydb, Signer::new(service), Config::default());
//! repo.init(false)?;
//! assert!(repo.timestamp().is_some());
//! # Ok(())
//! # }
//! ```

pub use tuf_canonical as canonical;
pub use tuf_client as client;
pub use tuf_crypto as crypto;
pub use tuf_keydb as keydb;
pub use tuf_repo as repo;
pub use tuf_store as store;
pub use tuf_types as types;
pub use tuf_verify as verify;

pub use tuf_client::Client;
pub use tuf_crypto::{CryptoService, Signer, VerifierRegistry};
pub use tuf_keydb::KeyDb;
pub use tuf_repo::Repository;
pub use tuf_store::{LocalStore, MemoryStore, RemoteStore};
pub use tuf_types::{Config, FileMeta, PublicKey, Role, Signed};
