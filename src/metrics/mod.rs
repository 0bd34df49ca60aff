// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Tree-scoped observability.
//!
//! Each [`crate::btree::Tree`] carries a `TreeMetrics` instance: structural
//! counters (faults, unloads, splits, inserts) plus a rolling window of
//! operation latencies, summarized on demand through
//! [`aggregator::calculate_stats`]. There is no global collector, and
//! nothing is written to disk: a caller that wants durable metrics reads
//! `Tree::metrics()` and persists it however its own logging stack does.

pub mod aggregator;

pub use aggregator::{calculate_stats, p50, p95, p99, MetricStats};

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How many recent operation latencies are kept for `latency_stats`.
const LATENCY_WINDOW: usize = 256;

/// A kind of operation a `Tree` can report metrics for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Fault,
    Unload,
    Split,
}

/// Structural counters and latency samples for one tree handle.
#[derive(Debug, Default)]
pub struct TreeMetrics {
    pub fault_count: u64,
    pub unload_count: u64,
    pub split_count: u64,
    pub insert_count: u64,
    latencies_micros: VecDeque<f64>,
}

impl TreeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, op: Operation) {
        match op {
            Operation::Fault => self.fault_count += 1,
            Operation::Unload => self.unload_count += 1,
            Operation::Split => self.split_count += 1,
            Operation::Add => self.insert_count += 1,
        }
    }

    pub(crate) fn record_latency(&mut self, duration: Duration) {
        if self.latencies_micros.len() == LATENCY_WINDOW {
            self.latencies_micros.pop_front();
        }
        self.latencies_micros.push_back(duration.as_secs_f64() * 1_000_000.0);
    }

    /// Percentile/mean/stddev summary over the retained latency window, in
    /// microseconds. `None` if no operation has been timed yet.
    pub fn latency_stats(&self) -> Option<MetricStats> {
        let samples: Vec<f64> = self.latencies_micros.iter().copied().collect();
        calculate_stats(&samples)
    }
}

/// A simple RAII stopwatch for timing one operation.
pub(crate) struct Timer(Instant);

impl Timer {
    pub(crate) fn start() -> Self {
        Timer(Instant::now())
    }

    pub(crate) fn stop(self, metrics: &mut TreeMetrics) {
        metrics.record_latency(self.0.elapsed());
    }
}
