//! Store interfaces
//!
//! The update machinery talks to the outside world through two narrow,
//! synchronous traits: [`RemoteStore`] for the untrusted repository being
//! consumed and [`LocalStore`] for an optional trusted cache.
//! Implementations translate logical names ("root", "targets/foo") to
//! URLs, files, or rows; [`MemoryStore`] is the in-process reference
//! implementation used by tests and tooling.

mod error;
mod memory;

pub use error::{Error, Result};
pub use memory::MemoryStore;

use std::collections::HashMap;
use std::io::Read;
use tuf_types::{FileMeta, Hashes};

/// Callback for [`LocalStore::walk_staged_targets`]
pub type TargetsWalkFn<'a> = dyn FnMut(&str, &FileMeta) -> Result<()> + 'a;

/// An untrusted remote repository
pub trait RemoteStore: Send + Sync {
    /// Fetch a metadata file by logical role name, reading at most
    /// `max_size` bytes.
    fn get_meta(&self, name: &str, max_size: i64) -> Result<Vec<u8>>;

    /// Open a read stream for a target file.
    fn get_target(&self, path: &str) -> Result<Box<dyn Read + Send>>;
}

/// An optional local cache of trusted metadata plus staged targets
pub trait LocalStore: Send + Sync {
    /// All cached metadata, keyed by logical name.
    fn get_meta(&self) -> Result<HashMap<String, Vec<u8>>>;

    /// Store one metadata file.
    fn set_meta(&self, name: &str, blob: Vec<u8>) -> Result<()>;

    /// Atomically replace the cached metadata set.
    fn commit(
        &self,
        meta: HashMap<String, Vec<u8>>,
        consistent: bool,
        hashes: HashMap<String, Hashes>,
    ) -> Result<()>;

    /// Drop everything cached.
    fn clean(&self) -> Result<()>;

    /// Visit staged target files. An empty `paths` slice visits all of
    /// them; the callback may abort the walk by returning an error.
    fn walk_staged_targets(&self, paths: &[String], f: &mut TargetsWalkFn) -> Result<()>;
}
