// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! In-memory byte storage backend.

use std::collections::HashMap;
use std::sync::RwLock;

use super::ByteStorage;
use crate::error::DriftResult;

/// A `ByteStorage` backed by a `HashMap`, guarded by a `RwLock`.
///
/// Suitable for tests and for trees that never need to outlive the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently stored. Mainly useful in tests.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ByteStorage for MemoryStorage {
    fn put(&self, key: &str, bytes: &[u8]) -> DriftResult<()> {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> DriftResult<Option<Vec<u8>>> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn keys(&self) -> DriftResult<Vec<String>> {
        Ok(self.entries.read().unwrap().keys().cloned().collect())
    }

    fn remove(&self, key: &str) -> DriftResult<()> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let storage = MemoryStorage::new();
        storage.put("abc", b"hello").unwrap();
        assert_eq!(storage.get("abc").unwrap(), Some(b"hello".to_vec()));
    }

    #[test]
    fn get_missing_key_is_none() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("missing").unwrap(), None);
    }

    #[test]
    fn keys_lists_every_entry() {
        let storage = MemoryStorage::new();
        storage.put("a", b"1").unwrap();
        storage.put("b", b"2").unwrap();
        let mut keys = storage.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn remove_drops_entry() {
        let storage = MemoryStorage::new();
        storage.put("a", b"1").unwrap();
        storage.remove("a").unwrap();
        assert_eq!(storage.get("a").unwrap(), None);
    }
}
