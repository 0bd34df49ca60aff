// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Value comparison.
//!
//! A tree does not require `V: Ord`. Ordering is injected at construction
//! time through a [`Comparator`], because some callers (notably the test
//! suite here) need to compare across value shapes that have no natural
//! total order of their own.

use std::cmp::Ordering;
use std::sync::Arc;

/// An injected total order over a tree's value type.
///
/// Implemented for any `Fn(&V, &V) -> Ordering + Send + Sync`, so a plain
/// closure (or `Ord::cmp` wrapped in one) is usually all a caller needs to
/// provide.
pub trait Comparator<V>: Send + Sync {
    fn compare(&self, a: &V, b: &V) -> Ordering;
}

impl<V, F> Comparator<V> for F
where
    F: Fn(&V, &V) -> Ordering + Send + Sync,
{
    fn compare(&self, a: &V, b: &V) -> Ordering {
        self(a, b)
    }
}

/// A shareable, type-erased comparator handle.
pub type SharedComparator<V> = Arc<dyn Comparator<V>>;

/// Builds a [`SharedComparator`] from any type implementing `Ord`.
pub fn natural_order<V: Ord + Send + Sync + 'static>() -> SharedComparator<V> {
    Arc::new(|a: &V, b: &V| a.cmp(b))
}

/// Finds the insertion index of `target` in `values` under `cmp`, i.e. the
/// first index whose element is not less than `target`.
pub fn lower_bound<V>(values: &[V], target: &V, cmp: &dyn Comparator<V>) -> usize {
    let mut lo = 0;
    let mut hi = values.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if cmp.compare(&values[mid], target) == Ordering::Less {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// A heterogeneous test value: numbers, strings, keywords, and tuples of the
/// same, ordered by a fixed type-rank and then structurally within a type.
///
/// This exists to exercise comparator injection; production callers use
/// their own domain type with `natural_order` or a custom closure.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Value {
    Int(i64),
    Keyword(String),
    Str(String),
    Tuple(Vec<Value>),
}

impl Value {
    fn type_rank(&self) -> u8 {
        match self {
            Value::Int(_) => 0,
            Value::Keyword(_) => 1,
            Value::Str(_) => 2,
            Value::Tuple(_) => 3,
        }
    }
}

/// Cross-type comparator for [`Value`]: orders by type rank first, then
/// structurally within a type (numerically for ints, lexically for
/// strings/keywords, element-wise then by length for tuples).
pub fn cross_type_compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Keyword(x), Value::Keyword(y)) => x.cmp(y),
        (Value::Str(x), Value::Str(y)) => x.cmp(y),
        (Value::Tuple(x), Value::Tuple(y)) => {
            for (xi, yi) in x.iter().zip(y.iter()) {
                let ord = cross_type_compare(xi, yi);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => a.type_rank().cmp(&b.type_rank()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_order_orders_integers() {
        let cmp = natural_order::<i32>();
        assert_eq!(cmp.compare(&1, &2), Ordering::Less);
        assert_eq!(cmp.compare(&2, &2), Ordering::Equal);
        assert_eq!(cmp.compare(&3, &2), Ordering::Greater);
    }

    #[test]
    fn lower_bound_finds_first_not_less() {
        let cmp = natural_order::<i32>();
        let values = vec![1, 3, 3, 5, 7];
        assert_eq!(lower_bound(&values, &3, cmp.as_ref()), 1);
        assert_eq!(lower_bound(&values, &4, cmp.as_ref()), 3);
        assert_eq!(lower_bound(&values, &0, cmp.as_ref()), 0);
        assert_eq!(lower_bound(&values, &8, cmp.as_ref()), 5);
    }

    #[test]
    fn cross_type_compare_orders_by_type_rank_first() {
        assert_eq!(
            cross_type_compare(&Value::Int(1_000_000), &Value::Keyword("a".into())),
            Ordering::Less
        );
        assert_eq!(
            cross_type_compare(&Value::Str("a".into()), &Value::Keyword("z".into())),
            Ordering::Greater
        );
    }

    #[test]
    fn cross_type_compare_orders_tuples_element_wise() {
        let a = Value::Tuple(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::Tuple(vec![Value::Int(1), Value::Int(3)]);
        assert_eq!(cross_type_compare(&a, &b), Ordering::Less);

        let short = Value::Tuple(vec![Value::Int(1)]);
        let long = Value::Tuple(vec![Value::Int(1), Value::Int(0)]);
        assert_eq!(cross_type_compare(&short, &long), Ordering::Less);
    }
}
