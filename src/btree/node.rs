// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Node payloads.

use serde::{Deserialize, Serialize};

use super::id::NodeId;

/// One tree node: a sorted run of values and, for internal nodes, the child
/// pointers that fall between them.
///
/// `children.is_none()` marks a leaf. When present, `children.len() ==
/// values.len() + 1` always holds: `children[i]` holds every value less
/// than `values[i]` (and greater than `values[i-1]`), with `children[i+1]`
/// holding everything greater than `values[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node<V> {
    pub values: Vec<V>,
    pub children: Option<Vec<NodeId>>,
}

impl<V> Node<V> {
    pub fn leaf(values: Vec<V>) -> Self {
        Self {
            values,
            children: None,
        }
    }

    pub fn internal(values: Vec<V>, children: Vec<NodeId>) -> Self {
        debug_assert_eq!(children.len(), values.len() + 1);
        Self {
            values,
            children: Some(children),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Resident child ids, in splitter order. Empty for a leaf.
    pub fn resident_children(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.children
            .iter()
            .flatten()
            .enumerate()
            .filter_map(|(i, id)| id.as_resident().map(|r| (i, r)))
    }

    pub fn has_resident_children(&self) -> bool {
        self.resident_children().next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_has_no_children() {
        let node = Node::leaf(vec![1, 2, 3]);
        assert!(node.is_leaf());
        assert_eq!(node.value_count(), 3);
    }

    #[test]
    fn internal_node_tracks_resident_children() {
        let node = Node::internal(
            vec![10],
            vec![NodeId::Resident(1), NodeId::Persisted("AA".into())],
        );
        assert!(!node.is_leaf());
        let resident: Vec<_> = node.resident_children().collect();
        assert_eq!(resident, vec![(0, 1)]);
        assert!(node.has_resident_children());
    }

    #[test]
    fn node_with_only_persisted_children_reports_none_resident() {
        let node = Node::internal(
            vec![10],
            vec![
                NodeId::Persisted("AA".into()),
                NodeId::Persisted("BB".into()),
            ],
        );
        assert!(!node.has_resident_children());
    }
}
