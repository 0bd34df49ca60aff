// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Tree configuration: value ordering and the fullness threshold that
//! triggers a split.

use std::sync::Arc;

use crate::error::{DriftError, DriftResult};
use crate::value::{natural_order, Comparator, SharedComparator};

use super::node::Node;

/// Default fullness threshold for production trees.
///
/// Chosen so splits are infrequent in the common case while keeping node
/// payloads small enough to encode and hash cheaply.
pub const DEFAULT_MAX_VALUES: usize = 1001;

/// Fullness threshold used by this crate's own tests, small enough to
/// exercise splitting and eviction without generating thousands of values.
pub const TEST_MAX_VALUES: usize = 3;

/// Tree-wide configuration: how values compare, and how full a node may get
/// before it is split.
///
/// `max_values` must be odd. An even threshold has no true median: splitting
/// a full node partitions its values into a lesser half, a median, and a
/// greater half, and an even count would leave the two halves unequal by
/// one. Validated once at construction so every split downstream can assume
/// it.
pub struct TreeConfig<V> {
    comparator: SharedComparator<V>,
    max_values: usize,
}

impl<V> TreeConfig<V> {
    /// Builds a configuration from an explicit comparator and threshold.
    pub fn new(comparator: SharedComparator<V>, max_values: usize) -> DriftResult<Self> {
        if max_values < 3 || max_values % 2 == 0 {
            return Err(DriftError::invariant(format!(
                "max_values must be odd and >= 3, got {}",
                max_values
            )));
        }
        Ok(Self {
            comparator,
            max_values,
        })
    }

    /// Builds a configuration using the default production threshold.
    pub fn with_comparator(comparator: SharedComparator<V>) -> DriftResult<Self> {
        Self::new(comparator, DEFAULT_MAX_VALUES)
    }

    pub fn comparator(&self) -> &dyn Comparator<V> {
        self.comparator.as_ref()
    }

    pub fn max_values(&self) -> usize {
        self.max_values
    }

    /// Index of the true median within a full node's values.
    pub fn median_index(&self) -> usize {
        self.max_values / 2
    }

    pub fn is_full(&self, node: &Node<V>) -> bool {
        node.value_count() >= self.max_values
    }
}

impl<V: Ord + Send + Sync + 'static> TreeConfig<V> {
    /// Builds a configuration using `V`'s natural `Ord` and the default
    /// production threshold.
    pub fn natural() -> DriftResult<Self> {
        Self::with_comparator(natural_order::<V>())
    }
}

impl<V> TreeConfig<V> {
    /// Builds a configuration from a plain comparison closure.
    pub fn from_fn<F>(cmp: F, max_values: usize) -> DriftResult<Self>
    where
        F: Fn(&V, &V) -> std::cmp::Ordering + Send + Sync + 'static,
    {
        Self::new(Arc::new(cmp), max_values)
    }
}
