//! Wire data model for TUF metadata
//!
//! The types here mirror the JSON documents exchanged between a repository
//! and its clients: keys, roles, signatures, the [`Signed`] envelope, file
//! metadata, and the four role documents (Root, Targets, Snapshot,
//! Timestamp) with their `Signed*` wrappers. Per-repository knobs — wire
//! filenames, `_type` names, expiry windows — live in [`Config`].

pub mod config;
pub mod encoding;
pub mod error;
pub mod expiry;
pub mod key;
pub mod meta;
pub mod role;
pub mod root;
pub mod signed;
pub mod snapshot;
pub mod targets;
pub mod timestamp;

pub use config::Config;
pub use encoding::HexBytes;
pub use error::{Error, Result};
pub use key::{KeyAlgorithm, KeyPair, PublicKey, SigAlgorithm, TufKey};
pub use meta::{FileMeta, Files, Hashes, DEFAULT_HASH_ALGORITHM};
pub use role::{
    base_role, valid_role_name, Role, RootRole, CANONICAL_ROLES, ROLE_ROOT, ROLE_SNAPSHOT,
    ROLE_TARGETS, ROLE_TIMESTAMP,
};
pub use root::{Root, SignedRoot};
pub use signed::{Signature, Signed};
pub use snapshot::{SignedSnapshot, Snapshot};
pub use targets::{Delegations, SignedTargets, Targets};
pub use timestamp::{SignedTimestamp, Timestamp};
