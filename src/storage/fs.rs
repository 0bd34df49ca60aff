// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Filesystem-backed byte storage: one file per key, named by the key.

use std::fs;
use std::path::{Path, PathBuf};

use super::ByteStorage;
use crate::error::{DriftError, DriftResult};

/// A `ByteStorage` that keeps one file per key inside a directory.
///
/// The directory is created on construction if it does not already exist.
/// Keys are storage-key hex strings and are used verbatim as file names, so
/// no escaping is required for the key shapes this crate produces.
#[derive(Debug, Clone)]
pub struct FsStorage {
    base_dir: PathBuf,
}

impl FsStorage {
    /// Opens (creating if necessary) a directory-backed store at `base_dir`.
    pub fn new(base_dir: impl AsRef<Path>) -> DriftResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(|e| {
            DriftError::storage("create_dir_all", format!("{}: {}", base_dir.display(), e))
        })?;
        Ok(Self { base_dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir.join(key)
    }
}

impl ByteStorage for FsStorage {
    fn put(&self, key: &str, bytes: &[u8]) -> DriftResult<()> {
        let path = self.path_for(key);
        // Write to a temp file then rename, so a crash never leaves a
        // partially written blob under the final key.
        let tmp_path = self.base_dir.join(format!(".{}.tmp", key));
        fs::write(&tmp_path, bytes)
            .map_err(|e| DriftError::storage("write", format!("{}: {}", tmp_path.display(), e)))?;
        fs::rename(&tmp_path, &path)
            .map_err(|e| DriftError::storage("rename", format!("{}: {}", path.display(), e)))?;
        Ok(())
    }

    fn get(&self, key: &str) -> DriftResult<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DriftError::storage(
                "read",
                format!("{}: {}", path.display(), e),
            )),
        }
    }

    fn keys(&self) -> DriftResult<Vec<String>> {
        let mut keys = Vec::new();
        let entries = fs::read_dir(&self.base_dir).map_err(|e| {
            DriftError::storage("read_dir", format!("{}: {}", self.base_dir.display(), e))
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| DriftError::storage("read_dir_entry", e.to_string()))?;
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    keys.push(name.to_string());
                }
            }
        }
        Ok(keys)
    }

    fn remove(&self, key: &str) -> DriftResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DriftError::storage(
                "remove",
                format!("{}: {}", path.display(), e),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path()).unwrap();
        storage.put("abc", b"hello").unwrap();
        assert_eq!(storage.get("abc").unwrap(), Some(b"hello".to_vec()));
    }

    #[test]
    fn get_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path()).unwrap();
        assert_eq!(storage.get("missing").unwrap(), None);
    }

    #[test]
    fn keys_lists_every_file_and_skips_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path()).unwrap();
        storage.put("a", b"1").unwrap();
        storage.put("b", b"2").unwrap();
        let mut keys = storage.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path()).unwrap();
        storage.put("a", b"1").unwrap();
        storage.remove("a").unwrap();
        storage.remove("a").unwrap();
        assert_eq!(storage.get("a").unwrap(), None);
    }
}
