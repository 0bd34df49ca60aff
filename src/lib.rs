// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! driftbase - a persistent, content-addressed B-tree index.
//!
//! A `Tree` holds its values sorted under an injected [`Comparator`], splits
//! nodes only on insertion (there is no deletion), and can be partially or
//! fully unloaded to byte storage at any time: an unloaded node is addressed
//! by the SHA-256 hash of its compressed encoding, so two trees that share
//! structure share storage too. A tree keeps a registry of every root it has
//! ever stored, which doubles as the starting point for reachability-based
//! garbage collection.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use driftbase::btree::{Tree, TreeConfig};
//! use driftbase::storage::memory::MemoryStorage;
//!
//! let config: TreeConfig<i32> = TreeConfig::natural().unwrap();
//! let mut tree = Tree::new(
//!     config,
//!     Arc::new(MemoryStorage::new()),
//!     Arc::new(MemoryStorage::new()),
//! );
//!
//! tree.add(1).unwrap();
//! tree.add(2).unwrap();
//! assert!(tree.contains(&1).unwrap());
//! ```
//!
//! ## Modules
//!
//! - [`btree`]: node identity, payloads, the tree handle, range iteration
//! - [`storage`]: the [`storage::ByteStorage`] capability and its backends
//! - [`registry`]: root snapshots and reachability-based garbage collection
//! - [`codec`]: node (de)serialization, compression, content hashing
//! - [`value`]: the injected-comparator abstraction values are ordered under
//! - [`metrics`]: per-tree structural counters and latency sampling
//! - [`error`]: the crate's error type

pub mod btree;
pub mod codec;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod storage;
pub mod value;

pub use btree::{NodeId, Tree, TreeConfig};
pub use error::{DriftError, DriftResult};
pub use registry::{NodeMetadata, RootSnapshot};
pub use storage::ByteStorage;
pub use value::Comparator;
