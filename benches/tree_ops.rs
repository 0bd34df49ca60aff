// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use driftbase::btree::{Tree, TreeConfig};
use driftbase::storage::memory::MemoryStorage;

fn filled_tree(count: i64) -> Tree<i64> {
    let config = TreeConfig::natural().unwrap();
    let mut tree = Tree::new(
        config,
        Arc::new(MemoryStorage::new()),
        Arc::new(MemoryStorage::new()),
    );
    for v in 0..count {
        tree.add(v).unwrap();
    }
    tree
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("add");
    for &count in &[1_000i64, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                || filled_tree(count),
                |mut tree| {
                    tree.add(black_box(count)).unwrap();
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_inclusive_subsequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("inclusive_subsequence");
    for &count in &[1_000i64, 10_000, 100_000] {
        let mut tree = filled_tree(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let values: Vec<i64> = tree
                    .inclusive_subsequence(&0, &count)
                    .unwrap()
                    .filter_map(Result::ok)
                    .collect();
                black_box(values.len())
            })
        });
    }
    group.finish();
}

fn bench_unload_excess(c: &mut Criterion) {
    let mut group = c.benchmark_group("unload_excess");
    for &count in &[1_000i64, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                || filled_tree(count),
                |mut tree| {
                    tree.unload_excess(black_box(1)).unwrap();
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_add, bench_inclusive_subsequence, bench_unload_excess);
criterion_main!(benches);
