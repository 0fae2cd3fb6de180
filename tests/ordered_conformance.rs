//! Conformance test suite for the ordered collections.
//!
//! Every `OrderedCollection` must pass these tests. They cover:
//!
//! 1. Basic operations: add, contains, remove, clear
//! 2. Multiset behavior: duplicates kept, one copy removed per call
//! 3. Iteration: ascending, restartable, matches `len`
//! 4. Edge cases: empty collections, missing values, large inputs
//!
//! # Usage
//!
//! To test a new implementation, add it to the `run_conformance_tests!`
//! invocations at the bottom of this file.

use canopy::AvlTree;
use canopy::BTree;
use canopy::OrderedCollection;
use canopy::SkipList;

fn contents<C: OrderedCollection<i64>>(collection: &C) -> Vec<i64> {
    return collection.iter().copied().collect();
}

// =============================================================================
// Basic Operation Tests
// =============================================================================

pub fn test_empty<C: OrderedCollection<i64>>(make_empty: impl Fn() -> C) {
    let collection = make_empty();
    assert_eq!(collection.len(), 0);
    assert!(collection.is_empty());
    assert!(!collection.contains(&0));
    assert_eq!(collection.iter().next(), None);
}

pub fn test_add_then_contains<C: OrderedCollection<i64>>(make_empty: impl Fn() -> C) {
    let mut collection = make_empty();
    for value in [5, -3, 12, 0] {
        collection.add(value);
    }
    assert_eq!(collection.len(), 4);
    for value in [5, -3, 12, 0] {
        assert!(collection.contains(&value), "missing {value}");
    }
    assert!(!collection.contains(&1));
    assert!(!collection.contains(&-4));
}

pub fn test_remove_present<C: OrderedCollection<i64>>(make_empty: impl Fn() -> C) {
    let mut collection = make_empty();
    for value in 1..=5 {
        collection.add(value);
    }
    assert!(collection.remove(&3));
    assert_eq!(collection.len(), 4);
    assert!(!collection.contains(&3));
    assert_eq!(contents(&collection), vec![1, 2, 4, 5]);
}

pub fn test_remove_missing<C: OrderedCollection<i64>>(make_empty: impl Fn() -> C) {
    let mut collection = make_empty();
    assert!(!collection.remove(&1));
    collection.add(1);
    assert!(!collection.remove(&2));
    assert_eq!(collection.len(), 1);
}

pub fn test_clear<C: OrderedCollection<i64>>(make_empty: impl Fn() -> C) {
    let mut collection = make_empty();
    for value in 0..100 {
        collection.add(value);
    }
    collection.clear();
    assert!(collection.is_empty());
    assert!(!collection.contains(&50));
    assert_eq!(collection.iter().count(), 0);

    collection.add(7);
    assert_eq!(contents(&collection), vec![7]);
}

// =============================================================================
// Multiset Tests
// =============================================================================

pub fn test_duplicates_kept<C: OrderedCollection<i64>>(make_empty: impl Fn() -> C) {
    let mut collection = make_empty();
    for value in [2, 1, 2, 3, 2] {
        collection.add(value);
    }
    assert_eq!(collection.len(), 5);
    assert_eq!(contents(&collection), vec![1, 2, 2, 2, 3]);
}

pub fn test_remove_one_copy<C: OrderedCollection<i64>>(make_empty: impl Fn() -> C) {
    let mut collection = make_empty();
    for _ in 0..3 {
        collection.add(9);
    }
    assert!(collection.remove(&9));
    assert_eq!(collection.len(), 2);
    assert!(collection.contains(&9));
    assert!(collection.remove(&9));
    assert!(collection.remove(&9));
    assert!(!collection.contains(&9));
    assert!(!collection.remove(&9));
}

// =============================================================================
// Iteration Tests
// =============================================================================

pub fn test_iteration_sorted<C: OrderedCollection<i64>>(make_empty: impl Fn() -> C) {
    let mut collection = make_empty();
    for i in 0..200 {
        collection.add((i * 7919) % 200);
    }
    assert_eq!(contents(&collection), (0..200).collect::<Vec<_>>());
}

pub fn test_iteration_restartable<C: OrderedCollection<i64>>(make_empty: impl Fn() -> C) {
    let mut collection = make_empty();
    for value in [3, 1, 2] {
        collection.add(value);
    }
    let mut first = collection.iter();
    assert_eq!(first.next(), Some(&1));
    let second: Vec<i64> = collection.iter().copied().collect();
    assert_eq!(second, vec![1, 2, 3]);
    assert_eq!(first.next(), Some(&2));
}

pub fn test_iteration_len_matches<C: OrderedCollection<i64>>(make_empty: impl Fn() -> C) {
    let mut collection = make_empty();
    for value in 0..64 {
        collection.add(value % 8);
    }
    assert_eq!(collection.iter().count(), collection.len());
}

// =============================================================================
// Edge Case Tests
// =============================================================================

pub fn test_extreme_values<C: OrderedCollection<i64>>(make_empty: impl Fn() -> C) {
    let mut collection = make_empty();
    for value in [i64::MAX, i64::MIN, 0, -1, 1] {
        collection.add(value);
    }
    assert_eq!(contents(&collection), vec![i64::MIN, -1, 0, 1, i64::MAX]);
    assert!(collection.remove(&i64::MIN));
    assert!(collection.remove(&i64::MAX));
    assert_eq!(contents(&collection), vec![-1, 0, 1]);
}

pub fn test_large_add_remove<C: OrderedCollection<i64>>(make_empty: impl Fn() -> C) {
    let mut collection = make_empty();
    for i in 0..5000 {
        collection.add((i * 31) % 5000);
    }
    for i in (0..5000).filter(|i| i % 3 != 0) {
        assert!(collection.remove(&i), "missing {i}");
    }
    let expected: Vec<i64> = (0..5000).filter(|i| i % 3 == 0).collect();
    assert_eq!(contents(&collection), expected);
    assert_eq!(collection.len(), expected.len());
}

pub fn test_drain_to_empty<C: OrderedCollection<i64>>(make_empty: impl Fn() -> C) {
    let mut collection = make_empty();
    for value in (0..300).rev() {
        collection.add(value);
    }
    for value in 0..300 {
        assert!(collection.remove(&value));
    }
    assert!(collection.is_empty());
    collection.add(1);
    assert_eq!(contents(&collection), vec![1]);
}

// =============================================================================
// Test Runner Macro
// =============================================================================

macro_rules! run_conformance_tests {
    ($impl_name:ident, $make_empty:expr) => {
        mod $impl_name {
            use super::*;

            #[test]
            fn empty() {
                test_empty($make_empty);
            }

            #[test]
            fn add_then_contains() {
                test_add_then_contains($make_empty);
            }

            #[test]
            fn remove_present() {
                test_remove_present($make_empty);
            }

            #[test]
            fn remove_missing() {
                test_remove_missing($make_empty);
            }

            #[test]
            fn clear() {
                test_clear($make_empty);
            }

            #[test]
            fn duplicates_kept() {
                test_duplicates_kept($make_empty);
            }

            #[test]
            fn remove_one_copy() {
                test_remove_one_copy($make_empty);
            }

            #[test]
            fn iteration_sorted() {
                test_iteration_sorted($make_empty);
            }

            #[test]
            fn iteration_restartable() {
                test_iteration_restartable($make_empty);
            }

            #[test]
            fn iteration_len_matches() {
                test_iteration_len_matches($make_empty);
            }

            #[test]
            fn extreme_values() {
                test_extreme_values($make_empty);
            }

            #[test]
            fn large_add_remove() {
                test_large_add_remove($make_empty);
            }

            #[test]
            fn drain_to_empty() {
                test_drain_to_empty($make_empty);
            }
        }
    };
}

run_conformance_tests!(avl_tree, || AvlTree::<i64>::new());
run_conformance_tests!(btree, || BTree::<i64>::new());
run_conformance_tests!(btree_degree_4, || BTree::<i64>::with_min_degree(4).unwrap());
run_conformance_tests!(skip_list, || SkipList::<i64>::with_seed(0x5eed));
