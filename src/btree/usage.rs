// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Recency tracking for resident nodes.
//!
//! Every insertion into a node bumps its priority to the current clock
//! value; eviction always picks the resident node with the smallest
//! priority still in memory. Ties cannot occur because the clock is
//! strictly increasing.

use std::collections::HashMap;

use super::id::ResidentId;

#[derive(Debug, Default)]
pub struct UsageClock {
    priorities: HashMap<ResidentId, u64>,
    next: u64,
}

impl UsageClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `id` as most-recently-used.
    pub fn touch(&mut self, id: ResidentId) {
        self.priorities.insert(id, self.next);
        self.next += 1;
    }

    pub fn priority(&self, id: ResidentId) -> Option<u64> {
        self.priorities.get(&id).copied()
    }

    /// Forgets `id`. Called once a node is unloaded or reclaimed.
    pub fn forget(&mut self, id: ResidentId) {
        self.priorities.remove(&id);
    }

    /// Picks the least-recently-touched id among `candidates`.
    ///
    /// Candidates not yet touched are treated as if touched before every
    /// recorded id (priority `0`), so a freshly split node with no
    /// recorded usage is evicted before anything actually touched.
    pub fn least_used(&self, candidates: impl IntoIterator<Item = ResidentId>) -> Option<ResidentId> {
        candidates
            .into_iter()
            .min_by_key(|id| self.priority(*id).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_touch_wins_higher_priority() {
        let mut clock = UsageClock::new();
        clock.touch(1);
        clock.touch(2);
        assert!(clock.priority(2).unwrap() > clock.priority(1).unwrap());
    }

    #[test]
    fn least_used_picks_smallest_priority() {
        let mut clock = UsageClock::new();
        clock.touch(1);
        clock.touch(2);
        clock.touch(3);
        clock.touch(1);
        assert_eq!(clock.least_used([1, 2, 3]), Some(2));
    }

    #[test]
    fn untouched_candidate_counts_as_oldest() {
        let mut clock = UsageClock::new();
        clock.touch(1);
        clock.touch(2);
        assert_eq!(clock.least_used([1, 2, 99]), Some(99));
    }

    #[test]
    fn forget_removes_priority() {
        let mut clock = UsageClock::new();
        clock.touch(1);
        clock.forget(1);
        assert_eq!(clock.priority(1), None);
    }
}
