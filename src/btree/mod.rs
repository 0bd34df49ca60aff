// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Persistent B-tree internals: node identity, payloads, recency tracking,
//! configuration, the tree handle itself, and range iteration.

pub mod config;
pub mod id;
pub mod iter;
pub mod node;
pub mod tree;
pub mod usage;

pub use config::TreeConfig;
pub use id::{NodeId, ResidentId};
pub use iter::InclusiveSubsequence;
pub use node::Node;
pub use tree::Tree;
