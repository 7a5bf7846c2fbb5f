//! TUF client
//!
//! [`Client`] refreshes trusted metadata from an untrusted
//! [`RemoteStore`](tuf_store::RemoteStore) in the protocol-mandated order
//! — Timestamp, Snapshot, local-root freshness, Targets with delegations —
//! verifying each document against the key/role database before it is
//! installed. A refresh failure that a rotated Root could cure triggers a
//! single Root download (verified against both the old and the new root
//! key sets) and one more refresh attempt. Targets are downloaded through
//! a length-capped, hash-checked stream.

mod client;
mod error;

pub use client::{Client, TIMESTAMP_SIZE_CAP};
pub use error::{Error, Result};
