// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Root registry and garbage-collection bookkeeping.
//!
//! Every stored root is a [`RootSnapshot`] appended to the well-known
//! `:roots` key in metadata storage. Each node written to storage carries a
//! [`NodeMetadata`] record alongside its payload, cheap enough that the
//! live-set walk used to find unused storage keys never has to decompress
//! a node's actual values.

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::DriftResult;
use crate::storage::ByteStorage;

/// Well-known metadata-storage key under which every stored root is kept.
pub const ROOTS_KEY: &str = ":roots";

/// A stored root: the storage key of the root node at the time it was
/// stored, when it was stored, and whatever the caller wants to remember
/// about that point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootSnapshot {
    pub storage_key: String,
    pub stored_time_nanos: u128,
    pub user_metadata: serde_json::Value,
}

impl RootSnapshot {
    pub fn new(storage_key: String, user_metadata: serde_json::Value) -> Self {
        let stored_time_nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before unix epoch")
            .as_nanos();
        Self {
            storage_key,
            stored_time_nanos,
            user_metadata,
        }
    }
}

/// Metadata recorded alongside a node's payload when it is unloaded.
///
/// Recording `child_ids` here (rather than requiring a full decode of the
/// node's payload) is what lets the live-set walk in
/// [`live_storage_keys`] stay metadata-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub child_ids: Option<Vec<String>>,
    pub value_count: usize,
    pub storage_byte_count: usize,
}

/// Reads every stored root, oldest first.
pub fn read_roots(metadata: &dyn ByteStorage) -> DriftResult<Vec<RootSnapshot>> {
    match metadata.get(ROOTS_KEY)? {
        Some(bytes) => {
            let mut roots: Vec<RootSnapshot> = codec::decode(ROOTS_KEY, &bytes)?;
            roots.sort_by_key(|r| r.stored_time_nanos);
            Ok(roots)
        }
        None => Ok(Vec::new()),
    }
}

/// Appends `snapshot` to the root registry and persists it.
pub fn append_root(metadata: &dyn ByteStorage, mut roots: Vec<RootSnapshot>, snapshot: RootSnapshot) -> DriftResult<Vec<RootSnapshot>> {
    roots.push(snapshot);
    let bytes = codec::encode(&roots)?;
    metadata.put(ROOTS_KEY, &bytes)?;
    Ok(roots)
}

/// The most recently stored root, by `stored_time_nanos`.
pub fn latest_root(roots: &[RootSnapshot]) -> Option<&RootSnapshot> {
    roots.iter().max_by_key(|r| r.stored_time_nanos)
}

/// Reads a node's metadata record.
pub fn read_metadata(metadata: &dyn ByteStorage, key: &str) -> DriftResult<Option<NodeMetadata>> {
    match metadata.get(key)? {
        Some(bytes) => Ok(Some(codec::decode(key, &bytes)?)),
        None => Ok(None),
    }
}

/// Writes a node's metadata record.
pub fn write_metadata(metadata: &dyn ByteStorage, key: &str, record: &NodeMetadata) -> DriftResult<()> {
    let bytes = codec::encode(record)?;
    metadata.put(key, &bytes)
}

/// Computes the transitive closure of storage keys reachable from every
/// root in `roots`, by walking `child_ids` alone. Never decompresses a
/// node's actual value payload.
pub fn live_storage_keys(metadata: &dyn ByteStorage, roots: &[RootSnapshot]) -> DriftResult<HashSet<String>> {
    let mut live = HashSet::new();
    let mut stack: Vec<String> = roots.iter().map(|r| r.storage_key.clone()).collect();
    while let Some(key) = stack.pop() {
        if !live.insert(key.clone()) {
            continue;
        }
        if let Some(record) = read_metadata(metadata, &key)? {
            if let Some(children) = record.child_ids {
                stack.extend(children);
            }
        }
    }
    Ok(live)
}

/// Every key present in `node_storage` that is not reachable from any root
/// currently in the registry.
pub fn unused_storage_keys(
    node_storage: &dyn ByteStorage,
    metadata: &dyn ByteStorage,
    roots: &[RootSnapshot],
) -> DriftResult<Vec<String>> {
    let live = live_storage_keys(metadata, roots)?;
    let all = node_storage.keys()?;
    Ok(all.into_iter().filter(|k| !live.contains(k)).collect())
}
