// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Error types for driftbase operations.
//!
//! Errors are grouped by kind rather than by call site: invariant violations
//! (programmer errors; the handle should be torn down), not-found (storage
//! and metadata disagree), decode failures (corrupt or foreign bytes), and
//! concurrent-modification (best-effort detection only). Nothing in this
//! crate writes to stdout; every failure is returned to the caller.

use thiserror::Error;

/// Standard result type for all driftbase operations.
pub type DriftResult<T> = Result<T, DriftError>;

/// Error types for driftbase operations.
#[derive(Debug, Error)]
pub enum DriftError {
    /// A structural invariant was violated (even fullness max, unloading a
    /// node that still has resident children, a parent pointing at a child
    /// that is neither resident nor in storage, ...). These are fatal
    /// programmer errors, not recoverable input errors.
    #[error("invariant violation: {reason}")]
    InvariantViolation { reason: String },

    /// `storage.get` returned nothing for a key the tree believed in.
    /// Indicates storage corruption or a mismatch between node storage and
    /// metadata storage.
    #[error("storage key not found: {key}")]
    NotFound { key: String },

    /// Bytes at a given key failed to parse or decompress.
    #[error("failed to decode node at key '{key}': {reason}")]
    DecodeFailure { key: String, reason: String },

    /// The underlying byte storage reported an I/O failure.
    #[error("storage error during '{operation}': {reason}")]
    StorageError { operation: String, reason: String },

    /// Two writers touched the same handle. Detection is best-effort; the
    /// only guarantee is that storage integrity is not lost.
    #[error("concurrent modification detected: {reason}")]
    ConcurrentModification { reason: String },
}

impl DriftError {
    pub fn invariant(reason: impl Into<String>) -> Self {
        DriftError::InvariantViolation {
            reason: reason.into(),
        }
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        DriftError::NotFound { key: key.into() }
    }

    pub fn decode_failure(key: impl Into<String>, reason: impl Into<String>) -> Self {
        DriftError::DecodeFailure {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn storage(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        DriftError::StorageError {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for DriftError {
    fn from(err: std::io::Error) -> Self {
        DriftError::StorageError {
            operation: "io".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for DriftError {
    fn from(err: serde_json::Error) -> Self {
        DriftError::DecodeFailure {
            key: String::new(),
            reason: err.to_string(),
        }
    }
}
