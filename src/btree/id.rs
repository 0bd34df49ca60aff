// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Node identity.
//!
//! A node is addressed one of two ways: [`NodeId::Resident`] while it lives
//! in memory, or [`NodeId::Persisted`] once it has been written to storage
//! under its content hash. A single tree mixes both freely: a parent can
//! point at a resident child while its sibling has been unloaded to a
//! storage key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonic identifier handed to newly allocated in-memory nodes.
///
/// Never reused within a tree's lifetime, even after the node it named is
/// unloaded; this keeps stale references detectable rather than silently
/// aliased onto an unrelated node.
pub type ResidentId = u64;

/// Where a node currently lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeId {
    /// Lives in memory under this resident id.
    Resident(ResidentId),
    /// Lives in storage under this content-hash key.
    Persisted(String),
}

impl NodeId {
    pub fn as_resident(&self) -> Option<ResidentId> {
        match self {
            NodeId::Resident(id) => Some(*id),
            NodeId::Persisted(_) => None,
        }
    }

    pub fn as_storage_key(&self) -> Option<&str> {
        match self {
            NodeId::Resident(_) => None,
            NodeId::Persisted(key) => Some(key.as_str()),
        }
    }

    pub fn is_resident(&self) -> bool {
        matches!(self, NodeId::Resident(_))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Resident(id) => write!(f, "resident:{}", id),
            NodeId::Persisted(key) => write!(f, "persisted:{}", key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resident_and_persisted_round_trip_accessors() {
        let resident = NodeId::Resident(42);
        assert_eq!(resident.as_resident(), Some(42));
        assert_eq!(resident.as_storage_key(), None);
        assert!(resident.is_resident());

        let persisted = NodeId::Persisted("ABCD".to_string());
        assert_eq!(persisted.as_resident(), None);
        assert_eq!(persisted.as_storage_key(), Some("ABCD"));
        assert!(!persisted.is_resident());
    }

    #[test]
    fn display_distinguishes_kinds() {
        assert_eq!(NodeId::Resident(1).to_string(), "resident:1");
        assert_eq!(NodeId::Persisted("X".into()).to_string(), "persisted:X");
    }
}
