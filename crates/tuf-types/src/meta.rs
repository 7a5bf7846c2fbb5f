//! File metadata: length plus one or more content hashes

use crate::encoding::HexBytes;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use std::collections::BTreeMap;
use std::io::Read;

/// Default hash algorithm for new file metadata
pub const DEFAULT_HASH_ALGORITHM: &str = "sha256";

/// Hash algorithm name → digest bytes
pub type Hashes = BTreeMap<String, HexBytes>;

/// File or metadata name → its metadata
pub type Files = BTreeMap<String, FileMeta>;

/// Length and digests of a file, as recorded in Targets/Snapshot/Timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMeta {
    pub length: i64,
    pub hashes: Hashes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<serde_json::Value>,
}

impl FileMeta {
    /// Hash a byte slice with the given algorithms (`sha256` when none are
    /// given).
    pub fn from_bytes(data: &[u8], hash_algorithms: &[&str]) -> Result<Self> {
        Self::from_reader(data, hash_algorithms)
    }

    /// Stream a reader to completion, recording its length and digests.
    pub fn from_reader(mut r: impl Read, hash_algorithms: &[&str]) -> Result<Self> {
        let algorithms = if hash_algorithms.is_empty() {
            &[DEFAULT_HASH_ALGORITHM]
        } else {
            hash_algorithms
        };

        let mut sha256 = None;
        let mut sha512 = None;
        for algorithm in algorithms {
            match *algorithm {
                "sha256" => sha256 = Some(Sha256::new()),
                "sha512" => sha512 = Some(Sha512::new()),
                other => return Err(Error::UnknownHashAlgorithm(other.to_string())),
            }
        }

        let mut length: i64 = 0;
        let mut buf = [0u8; 8192];
        loop {
            let n = r.read(&mut buf)?;
            if n == 0 {
                break;
            }
            length += n as i64;
            if let Some(h) = sha256.as_mut() {
                h.update(&buf[..n]);
            }
            if let Some(h) = sha512.as_mut() {
                h.update(&buf[..n]);
            }
        }

        let mut hashes = Hashes::new();
        if let Some(h) = sha256 {
            hashes.insert(
                "sha256".to_string(),
                HexBytes::new(h.finalize().to_vec()),
            );
        }
        if let Some(h) = sha512 {
            hashes.insert(
                "sha512".to_string(),
                HexBytes::new(h.finalize().to_vec()),
            );
        }

        Ok(FileMeta {
            length,
            hashes,
            custom: None,
        })
    }

    /// The sha256 digest, if recorded
    pub fn sha256(&self) -> Option<&HexBytes> {
        self.hashes.get("sha256")
    }
}
