// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! The tree handle: insertion, faulting, eviction, and root persistence.
//!
//! A `Tree` owns a resident node table and a usage clock on top of two byte
//! stores (node payloads and node/root metadata). Any operation that can
//! fault a persisted node into memory takes `&mut self`, matching the
//! single-writer-per-handle concurrency model this crate assumes: nothing
//! here is internally synchronized.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec;
use crate::error::{DriftError, DriftResult};
use crate::metrics::{Operation, Timer, TreeMetrics};
use crate::registry::{self, NodeMetadata, RootSnapshot};
use crate::storage::ByteStorage;
use crate::value::{lower_bound, Comparator};

use super::config::TreeConfig;
use super::id::{NodeId, ResidentId};
use super::iter::InclusiveSubsequence;
use super::node::Node;
use super::usage::UsageClock;

/// Picks which child of an internal node a search for `value` should
/// descend into.
///
/// Splitters are scanned in order. Equality with a splitter means `value`
/// already lives in this node, so there is nothing below to descend into:
/// callers treat `None` as "found here, stop descending".
pub(crate) fn child_index<V>(node: &Node<V>, value: &V, cmp: &dyn Comparator<V>) -> Option<usize> {
    for (i, splitter) in node.values.iter().enumerate() {
        match cmp.compare(value, splitter) {
            Ordering::Equal => return None,
            Ordering::Less => return Some(i),
            Ordering::Greater => continue,
        }
    }
    Some(node.values.len())
}

/// A persistent, content-addressed B-tree.
pub struct Tree<V> {
    pub(crate) config: TreeConfig<V>,
    pub(crate) node_storage: Arc<dyn ByteStorage>,
    pub(crate) metadata_storage: Arc<dyn ByteStorage>,
    pub(crate) nodes: HashMap<ResidentId, Node<V>>,
    pub(crate) usage: UsageClock,
    next_resident_id: ResidentId,
    pub(crate) root: NodeId,
    metrics: TreeMetrics,
}

impl<V> Tree<V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    /// Creates a brand new tree with a single empty resident leaf as its
    /// root.
    pub fn new(
        config: TreeConfig<V>,
        node_storage: Arc<dyn ByteStorage>,
        metadata_storage: Arc<dyn ByteStorage>,
    ) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(0, Node::leaf(Vec::new()));
        let mut usage = UsageClock::new();
        usage.touch(0);
        Self {
            config,
            node_storage,
            metadata_storage,
            nodes,
            usage,
            next_resident_id: 1,
            root: NodeId::Resident(0),
            metrics: TreeMetrics::new(),
        }
    }

    /// Opens a tree whose root is the node stored under `storage_key`.
    ///
    /// Nothing is faulted until an operation needs it.
    pub fn open_root(
        config: TreeConfig<V>,
        node_storage: Arc<dyn ByteStorage>,
        metadata_storage: Arc<dyn ByteStorage>,
        storage_key: String,
    ) -> Self {
        Self {
            config,
            node_storage,
            metadata_storage,
            nodes: HashMap::new(),
            usage: UsageClock::new(),
            next_resident_id: 0,
            root: NodeId::Persisted(storage_key),
            metrics: TreeMetrics::new(),
        }
    }

    /// Opens the most recently stored root, or `None` if the root registry
    /// is empty (a caller should fall back to [`Tree::new`] in that case).
    pub fn open_latest(
        config: TreeConfig<V>,
        node_storage: Arc<dyn ByteStorage>,
        metadata_storage: Arc<dyn ByteStorage>,
    ) -> DriftResult<Option<Self>> {
        let roots = registry::read_roots(metadata_storage.as_ref())?;
        match registry::latest_root(&roots) {
            Some(snapshot) => Ok(Some(Self::open_root(
                config,
                node_storage,
                metadata_storage,
                snapshot.storage_key.clone(),
            ))),
            None => Ok(None),
        }
    }

    pub fn resident_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn root_is_resident(&self) -> bool {
        self.root.is_resident()
    }

    /// Structural counters and recent operation latencies for this handle.
    pub fn metrics(&self) -> &TreeMetrics {
        &self.metrics
    }

    fn alloc_resident_id(&mut self) -> ResidentId {
        let id = self.next_resident_id;
        self.next_resident_id += 1;
        id
    }

    /// Faults the root into memory if it is currently a storage key, and
    /// returns its resident id either way.
    pub(crate) fn fault_root(&mut self) -> DriftResult<ResidentId> {
        if let NodeId::Resident(id) = self.root {
            return Ok(id);
        }
        let key = match &self.root {
            NodeId::Persisted(k) => k.clone(),
            NodeId::Resident(_) => unreachable!(),
        };
        let bytes = self
            .node_storage
            .get(&key)?
            .ok_or_else(|| DriftError::not_found(key.clone()))?;
        let node: Node<V> = codec::decode(&key, &bytes)?;
        let id = self.alloc_resident_id();
        self.nodes.insert(id, node);
        self.usage.touch(id);
        self.root = NodeId::Resident(id);
        self.metrics.record(Operation::Fault);
        Ok(id)
    }

    /// Faults `parent`'s child at `idx` into memory if needed, rewrites the
    /// parent's pointer to the new resident id, and returns that id.
    pub(crate) fn fault_child(&mut self, parent: ResidentId, idx: usize) -> DriftResult<ResidentId> {
        let key = {
            let parent_node = self
                .nodes
                .get(&parent)
                .ok_or_else(|| DriftError::invariant(format!("node {} not resident", parent)))?;
            let children = parent_node
                .children
                .as_ref()
                .ok_or_else(|| DriftError::invariant("fault_child called on a leaf"))?;
            match &children[idx] {
                NodeId::Resident(id) => return Ok(*id),
                NodeId::Persisted(key) => key.clone(),
            }
        };
        let bytes = self
            .node_storage
            .get(&key)?
            .ok_or_else(|| DriftError::not_found(key.clone()))?;
        let node: Node<V> = codec::decode(&key, &bytes)?;
        let id = self.alloc_resident_id();
        self.nodes.insert(id, node);
        self.usage.touch(id);
        let parent_node = self.nodes.get_mut(&parent).expect("parent resident");
        parent_node.children.as_mut().unwrap()[idx] = NodeId::Resident(id);
        self.metrics.record(Operation::Fault);
        Ok(id)
    }

    /// Splits a full child of a resident parent into two nodes, promoting
    /// the true median into the parent at `idx`.
    fn split_child(&mut self, parent: ResidentId, idx: usize) -> DriftResult<()> {
        let child_id = match self.nodes[&parent].children.as_ref().unwrap()[idx] {
            NodeId::Resident(id) => id,
            NodeId::Persisted(_) => {
                return Err(DriftError::invariant("split_child requires a resident child"))
            }
        };
        let child = self
            .nodes
            .remove(&child_id)
            .expect("child just verified resident");

        let median_idx = self.config.median_index();
        let mut values = child.values;
        let median = values.remove(median_idx);
        let greater_values = values.split_off(median_idx);
        let lesser_values = values;

        let (lesser_children, greater_children) = match child.children {
            None => (None, None),
            Some(mut children) => {
                let mid = children.len() / 2;
                let greater_children = children.split_off(mid);
                (Some(children), Some(greater_children))
            }
        };

        let new_id = self.alloc_resident_id();
        self.nodes.insert(
            child_id,
            Node {
                values: lesser_values,
                children: lesser_children,
            },
        );
        self.usage.touch(child_id);
        self.nodes.insert(
            new_id,
            Node {
                values: greater_values,
                children: greater_children,
            },
        );
        self.usage.touch(new_id);

        let parent_node = self.nodes.get_mut(&parent).expect("parent resident");
        parent_node.values.insert(idx, median);
        parent_node
            .children
            .as_mut()
            .unwrap()
            .insert(idx + 1, NodeId::Resident(new_id));
        self.usage.touch(parent);
        self.metrics.record(Operation::Split);
        Ok(())
    }

    /// Wraps a full root in a fresh, empty root and splits it from there.
    fn split_root(&mut self, root_id: ResidentId) -> DriftResult<()> {
        let new_root_id = self.alloc_resident_id();
        self.nodes.insert(
            new_root_id,
            Node {
                values: Vec::new(),
                children: Some(vec![NodeId::Resident(root_id)]),
            },
        );
        self.usage.touch(new_root_id);
        self.root = NodeId::Resident(new_root_id);
        self.split_child(new_root_id, 0)
    }

    /// Inserts `value` if it is not already present. A no-op otherwise.
    pub fn add(&mut self, value: V) -> DriftResult<()> {
        let timer = Timer::start();
        let result = self.add_inner(value);
        timer.stop(&mut self.metrics);
        self.metrics.record(Operation::Add);
        result
    }

    fn add_inner(&mut self, value: V) -> DriftResult<()> {
        let root_id = self.fault_root()?;
        if self.config.is_full(&self.nodes[&root_id]) {
            self.split_root(root_id)?;
        }

        let mut current_id = self.fault_root()?;
        loop {
            if self.nodes[&current_id].is_leaf() {
                self.insert_into_leaf(current_id, value);
                return Ok(());
            }

            let idx = match child_index(&self.nodes[&current_id], &value, self.config.comparator()) {
                None => return Ok(()),
                Some(idx) => idx,
            };

            let mut child_id = self.fault_child(current_id, idx)?;
            if self.config.is_full(&self.nodes[&child_id]) {
                self.split_child(current_id, idx)?;
                match child_index(&self.nodes[&current_id], &value, self.config.comparator()) {
                    None => return Ok(()),
                    Some(new_idx) => child_id = self.fault_child(current_id, new_idx)?,
                }
            }
            self.usage.touch(current_id);
            current_id = child_id;
        }
    }

    fn insert_into_leaf(&mut self, id: ResidentId, value: V) {
        let node = self.nodes.get_mut(&id).expect("leaf resident");
        let idx = lower_bound(&node.values, &value, self.config.comparator());
        let already_present =
            idx < node.values.len() && self.config.comparator().compare(&node.values[idx], &value) == Ordering::Equal;
        if !already_present {
            node.values.insert(idx, value);
        }
        self.usage.touch(id);
    }

    /// Whether `value` is present anywhere in the tree, faulting as needed.
    pub fn contains(&mut self, value: &V) -> DriftResult<bool> {
        let mut current_id = self.fault_root()?;
        loop {
            if self.nodes[&current_id].is_leaf() {
                let node = &self.nodes[&current_id];
                let idx = lower_bound(&node.values, value, self.config.comparator());
                return Ok(idx < node.values.len()
                    && self.config.comparator().compare(&node.values[idx], value) == Ordering::Equal);
            }
            match child_index(&self.nodes[&current_id], value, self.config.comparator()) {
                None => return Ok(true),
                Some(idx) => current_id = self.fault_child(current_id, idx)?,
            }
        }
    }

    /// A lazy, in-order view of every value in `[start, end]`.
    ///
    /// The returned iterator borrows this tree exclusively: range reads can
    /// fault nodes into memory just like writes can.
    pub fn inclusive_subsequence<'a>(
        &'a mut self,
        start: &V,
        end: &V,
    ) -> DriftResult<InclusiveSubsequence<'a, V>> {
        InclusiveSubsequence::new(self, start, Some(end))
    }

    /// A lazy, in-order view of every value `>= start`, with no upper bound.
    ///
    /// This is the tree's core read operation: an arbitrary injected
    /// comparator has no analogue of `i32::MAX` to pass as a closed upper
    /// bound, so the unbounded tail needs its own entry point rather than
    /// relying on a caller-supplied sentinel.
    pub fn inclusive_subsequence_from<'a>(&'a mut self, start: &V) -> DriftResult<InclusiveSubsequence<'a, V>> {
        InclusiveSubsequence::new(self, start, None)
    }

    /// Descends from the root following the least-recently-used resident
    /// child at each step, stopping at a leaf or at a node with no
    /// resident children. Bottom-up eviction order falls out automatically.
    fn least_used_path(&self) -> Vec<ResidentId> {
        let mut path = Vec::new();
        let mut current = match self.root {
            NodeId::Resident(id) => id,
            NodeId::Persisted(_) => return path,
        };
        path.push(current);
        loop {
            let node = &self.nodes[&current];
            let resident_children: Vec<ResidentId> = node.resident_children().map(|(_, r)| r).collect();
            match self.usage.least_used(resident_children) {
                Some(next) => {
                    path.push(next);
                    current = next;
                }
                None => break,
            }
        }
        path
    }

    fn unload_node(&mut self, id: ResidentId, parent: Option<ResidentId>) -> DriftResult<String> {
        let node = self
            .nodes
            .get(&id)
            .ok_or_else(|| DriftError::invariant(format!("node {} not resident", id)))?;
        if node.has_resident_children() {
            return Err(DriftError::invariant(format!(
                "cannot unload node {}: it still has resident children",
                id
            )));
        }

        let bytes = codec::encode(node)?;
        let key = codec::storage_key(&bytes);
        self.node_storage.put(&key, &bytes)?;

        let child_ids = node.children.as_ref().map(|children| {
            children
                .iter()
                .map(|c| match c {
                    NodeId::Persisted(key) => key.clone(),
                    NodeId::Resident(_) => unreachable!("has_resident_children checked above"),
                })
                .collect()
        });
        let record = NodeMetadata {
            child_ids,
            value_count: node.value_count(),
            storage_byte_count: bytes.len(),
        };
        registry::write_metadata(self.metadata_storage.as_ref(), &key, &record)?;

        match parent {
            Some(parent_id) => {
                let parent_node = self.nodes.get_mut(&parent_id).expect("parent resident");
                let children = parent_node.children.as_mut().expect("parent is internal");
                let pos = children
                    .iter()
                    .position(|c| matches!(c, NodeId::Resident(rid) if *rid == id))
                    .expect("unloaded node is a child of its recorded parent");
                children[pos] = NodeId::Persisted(key.clone());
            }
            None => self.root = NodeId::Persisted(key.clone()),
        }

        self.nodes.remove(&id);
        self.usage.forget(id);
        self.metrics.record(Operation::Unload);
        Ok(key)
    }

    fn unload_least_used(&mut self) -> DriftResult<Option<String>> {
        let path = self.least_used_path();
        if path.is_empty() {
            return Ok(None);
        }
        let target = *path.last().unwrap();
        let parent = if path.len() >= 2 {
            Some(path[path.len() - 2])
        } else {
            None
        };
        Ok(Some(self.unload_node(target, parent)?))
    }

    /// Evicts least-recently-used nodes, bottom-up, until at most
    /// `max_resident` nodes remain in memory.
    pub fn unload_excess(&mut self, max_resident: usize) -> DriftResult<()> {
        while self.nodes.len() > max_resident {
            if self.unload_least_used()?.is_none() {
                break;
            }
        }
        Ok(())
    }

    /// Unloads every resident node, leaving the root as a storage key.
    pub fn unload_tree(&mut self) -> DriftResult<()> {
        self.unload_excess(0)
    }

    /// Unloads the entire tree and appends a new snapshot to the root
    /// registry, returning the storage key of the new root.
    pub fn store_root(&mut self, user_metadata: serde_json::Value) -> DriftResult<String> {
        self.unload_tree()?;
        let key = match &self.root {
            NodeId::Persisted(key) => key.clone(),
            NodeId::Resident(_) => {
                return Err(DriftError::invariant(
                    "unload_tree left a resident root; cannot store it",
                ))
            }
        };
        let roots = registry::read_roots(self.metadata_storage.as_ref())?;
        let snapshot = RootSnapshot::new(key.clone(), user_metadata);
        registry::append_root(self.metadata_storage.as_ref(), roots, snapshot)?;
        Ok(key)
    }

    /// Every root ever stored for this tree, oldest first.
    pub fn roots(&self) -> DriftResult<Vec<RootSnapshot>> {
        registry::read_roots(self.metadata_storage.as_ref())
    }

    /// Node-storage keys not reachable from any currently stored root.
    pub fn unused_storage_keys(&self) -> DriftResult<Vec<String>> {
        let roots = self.roots()?;
        registry::unused_storage_keys(self.node_storage.as_ref(), self.metadata_storage.as_ref(), &roots)
    }
}
