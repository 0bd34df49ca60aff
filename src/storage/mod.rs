// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Keyed byte storage abstraction.
//!
//! A [`ByteStorage`] is a content-addressed blob store: put a byte array
//! under a string key, get it back, enumerate keys. The tree treats storage
//! as an opaque capability and never matches on the concrete backend type.
//!
//! Two backends are provided: [`memory::MemoryStorage`] for tests and
//! ephemeral trees, and [`fs::FsStorage`] for one-file-per-key persistence.

pub mod fs;
pub mod memory;

use crate::error::DriftResult;

/// Keyed capability for storing and retrieving byte blobs.
///
/// `put` overwriting the same key with identical bytes is expected to be a
/// no-op in practice, because keys are content hashes of those bytes.
/// Implementations must be `Send + Sync` so a tree handle's storage can be
/// shared across a process.
pub trait ByteStorage: Send + Sync {
    /// Stores `bytes` under `key`, replacing any prior value.
    fn put(&self, key: &str, bytes: &[u8]) -> DriftResult<()>;

    /// Retrieves the bytes stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> DriftResult<Option<Vec<u8>>>;

    /// Enumerates every key currently present in this storage.
    fn keys(&self) -> DriftResult<Vec<String>>;

    /// Removes the value stored under `key`, if any.
    ///
    /// Garbage collection is not forced by the core; this is exposed so a
    /// caller can act on [`crate::btree::Tree::unused_storage_keys`]. The
    /// default implementation is a no-op for backends that do not support
    /// removal.
    fn remove(&self, _key: &str) -> DriftResult<()> {
        Ok(())
    }
}
