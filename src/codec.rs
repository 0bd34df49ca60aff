// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Node encoding: self-describing serialization, DEFLATE compression, and
//! content hashing.
//!
//! A node becomes a storage key through `hash(encode(node))`. The encoding
//! step must be self-describing (so a decoder never needs a schema version
//! out of band), which is why this crate reaches for `serde_json` rather
//! than a positional format like `bincode`.

use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{DriftError, DriftResult};

/// Serializes `value` to JSON and DEFLATE-compresses the result.
pub fn encode<T: Serialize>(value: &T) -> DriftResult<Vec<u8>> {
    let json = serde_json::to_vec(value)?;
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&json)
        .map_err(|e| DriftError::storage("deflate write", e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| DriftError::storage("deflate finish", e.to_string()))
}

/// Inflates `bytes` and deserializes the JSON payload into `T`.
///
/// `key` is used only to annotate a failure; pass the storage key the bytes
/// came from, or an empty string if there is none yet.
pub fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> DriftResult<T> {
    let mut decoder = DeflateDecoder::new(bytes);
    let mut json = Vec::new();
    decoder
        .read_to_end(&mut json)
        .map_err(|e| DriftError::decode_failure(key, format!("inflate failed: {}", e)))?;
    serde_json::from_slice(&json).map_err(|e| DriftError::decode_failure(key, e.to_string()))
}

/// Computes the storage key for a byte blob: uppercase hex SHA-256.
pub fn storage_key(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02X}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        a: u32,
        b: String,
    }

    #[test]
    fn encode_decode_round_trips() {
        let value = Sample {
            a: 7,
            b: "hello".to_string(),
        };
        let bytes = encode(&value).unwrap();
        let decoded: Sample = decode("test-key", &bytes).unwrap();
        assert_eq!(value, decoded);
    }

    #[test]
    fn storage_key_is_deterministic_and_uppercase_hex() {
        let bytes = b"some node payload";
        let key1 = storage_key(bytes);
        let key2 = storage_key(bytes);
        assert_eq!(key1, key2);
        assert_eq!(key1.len(), 64);
        assert!(key1.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(key1.chars().all(|c| !c.is_ascii_lowercase()));
    }

    #[test]
    fn different_payloads_hash_differently() {
        assert_ne!(storage_key(b"a"), storage_key(b"b"));
    }

    #[test]
    fn decode_of_garbage_is_decode_failure() {
        let err = decode::<Sample>("bad-key", b"not deflate data").unwrap_err();
        match err {
            DriftError::DecodeFailure { key, .. } => assert_eq!(key, "bad-key"),
            other => panic!("expected DecodeFailure, got {:?}", other),
        }
    }
}
