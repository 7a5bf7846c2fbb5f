//! In-memory metadata and target store

use crate::error::{Error, Result};
use crate::{LocalStore, RemoteStore, TargetsWalkFn};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex, MutexGuard};
use tuf_types::{FileMeta, Hashes};

#[derive(Default)]
struct Inner {
    meta: HashMap<String, Vec<u8>>,
    targets: HashMap<String, Vec<u8>>,
}

/// An in-process store implementing both [`RemoteStore`] and
/// [`LocalStore`]
///
/// Clones share the same underlying maps, so a test can keep a handle to
/// the "remote" it handed to a client and republish metadata between
/// update rounds.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Create a store seeded with the given metadata and target files.
    pub fn new(
        meta: Option<HashMap<String, Vec<u8>>>,
        targets: Option<HashMap<String, Vec<u8>>>,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                meta: meta.unwrap_or_default(),
                targets: targets.unwrap_or_default(),
            })),
        }
    }

    fn locked(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::Io(std::io::Error::other("store lock poisoned")))
    }

    /// Insert or replace a metadata file.
    pub fn insert_meta(&self, name: impl Into<String>, blob: Vec<u8>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.meta.insert(name.into(), blob);
        }
    }

    /// Insert or replace a target file.
    pub fn insert_target(&self, path: impl Into<String>, data: Vec<u8>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.targets.insert(path.into(), data);
        }
    }
}

impl RemoteStore for MemoryStore {
    fn get_meta(&self, name: &str, max_size: i64) -> Result<Vec<u8>> {
        let inner = self.locked()?;
        let blob = inner
            .meta
            .get(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        if blob.len() as i64 > max_size {
            return Err(Error::SizeExceeded {
                name: name.to_string(),
                size: blob.len() as i64,
                max: max_size,
            });
        }
        Ok(blob.clone())
    }

    fn get_target(&self, path: &str) -> Result<Box<dyn Read + Send>> {
        let inner = self.locked()?;
        let data = inner
            .targets
            .get(path)
            .ok_or_else(|| Error::NotFound(path.to_string()))?;
        Ok(Box::new(Cursor::new(data.clone())))
    }
}

impl LocalStore for MemoryStore {
    fn get_meta(&self) -> Result<HashMap<String, Vec<u8>>> {
        Ok(self.locked()?.meta.clone())
    }

    fn set_meta(&self, name: &str, blob: Vec<u8>) -> Result<()> {
        self.locked()?.meta.insert(name.to_string(), blob);
        Ok(())
    }

    fn commit(
        &self,
        meta: HashMap<String, Vec<u8>>,
        _consistent: bool,
        _hashes: HashMap<String, Hashes>,
    ) -> Result<()> {
        let mut inner = self.locked()?;
        inner.meta = meta;
        Ok(())
    }

    fn clean(&self) -> Result<()> {
        let mut inner = self.locked()?;
        inner.meta.clear();
        inner.targets.clear();
        Ok(())
    }

    fn walk_staged_targets(&self, paths: &[String], f: &mut TargetsWalkFn) -> Result<()> {
        let inner = self.locked()?;
        if paths.is_empty() {
            for (path, data) in &inner.targets {
                let meta = FileMeta::from_bytes(data, &[])?;
                f(path, &meta)?;
            }
            return Ok(());
        }
        for path in paths {
            let data = inner
                .targets
                .get(path)
                .ok_or_else(|| Error::NotFound(path.clone()))?;
            let meta = FileMeta::from_bytes(data, &[])?;
            f(path, &meta)?;
        }
        Ok(())
    }
}
