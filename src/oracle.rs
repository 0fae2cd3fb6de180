//! Differential oracle for the collections.
//!
//! Replays a stream of operations against every container at once and
//! against a `BTreeMap` multiset model, panicking on the first disagreement.
//! Operations are decoded from raw bytes so the same driver serves the AFL
//! harness, the crash reproducer and the property tests.
//!
//! The hash table has no duplicate keys, so it stores a count per value and
//! is checked against the model's counts.

use std::collections::BTreeMap;

use crate::collection::OrderedCollection;
use crate::collections::AvlTree;
use crate::collections::BTree;
use crate::collections::HashTable;
use crate::collections::SkipList;
use crate::config::HashTableConfig;
use crate::config::SkipListConfig;
use crate::error::Result;

/// One operation applied to every container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add(u8),
    Remove(u8),
    Contains(u8),
    Clear,
}

impl Op {
    /// Decode one operation from the front of `bytes`, returning it with the
    /// unread tail. `None` once the input is exhausted or truncated.
    ///
    /// The tag byte is weighted so adds outnumber removes and `Clear` is rare.
    pub fn from_bytes(bytes: &[u8]) -> Option<(Op, &[u8])> {
        let (&tag, rest) = bytes.split_first()?;
        if tag % 16 == 15 {
            return Some((Op::Clear, rest));
        }
        let (&value, rest) = rest.split_first()?;
        let op = match tag % 16 {
            0..=6 => Op::Add(value),
            7..=10 => Op::Remove(value),
            _ => Op::Contains(value),
        };
        return Some((op, rest));
    }
}

/// Every container plus the reference model, kept in lockstep.
pub struct Oracle {
    avl: AvlTree<u8>,
    btree: BTree<u8>,
    /// A wider tree so merges and rotations move more than one value.
    wide_btree: BTree<u8>,
    skip_list: SkipList<u8>,
    /// Value -> number of copies stored.
    table: HashTable<u8, usize>,
    model: BTreeMap<u8, usize>,
    len: usize,
}

impl Oracle {
    pub fn new() -> Result<Oracle> {
        return Ok(Oracle {
            avl: AvlTree::new(),
            btree: BTree::new(),
            wide_btree: BTree::with_min_degree(3)?,
            skip_list: SkipList::with_config(SkipListConfig::default().with_seed(0))?,
            // Small enough that a short input crosses several growth steps.
            table: HashTable::with_config(HashTableConfig::default().with_initial_capacity(2))?,
            model: BTreeMap::new(),
            len: 0,
        });
    }

    /// Number of values the model holds.
    pub fn len(&self) -> usize {
        return self.len;
    }

    pub fn is_empty(&self) -> bool {
        return self.len == 0;
    }

    /// Run `op` everywhere and panic if any container disagrees with the
    /// model.
    pub fn apply(&mut self, op: Op) -> Result<()> {
        match op {
            Op::Add(value) => {
                self.avl.add(value);
                self.btree.add(value);
                self.wide_btree.add(value);
                self.skip_list.add(value);
                match self.table.get_mut(&value) {
                    Some(count) => *count += 1,
                    None => self.table.add(value, 1)?,
                }
                *self.model.entry(value).or_insert(0) += 1;
                self.len += 1;
            }

            Op::Remove(value) => {
                let expected = self.model.contains_key(&value);
                assert_eq!(self.avl.remove(&value), expected, "avl remove {value}");
                assert_eq!(self.btree.remove(&value), expected, "btree remove {value}");
                assert_eq!(self.wide_btree.remove(&value), expected, "wide btree remove {value}");
                assert_eq!(self.skip_list.remove(&value), expected, "skip list remove {value}");

                if !expected {
                    assert!(!self.table.remove(&value), "hash table remove {value}");
                    return Ok(());
                }
                let count = *self.table.value(&value)?;
                if count == 1 {
                    assert_eq!(self.table.take(&value), Some(1));
                } else {
                    self.table.update(&value, count - 1)?;
                }
                if let Some(copies) = self.model.get_mut(&value) {
                    *copies -= 1;
                    if *copies == 0 {
                        self.model.remove(&value);
                    }
                }
                self.len -= 1;
            }

            Op::Contains(value) => {
                let expected = self.model.contains_key(&value);
                assert_eq!(self.avl.contains(&value), expected, "avl contains {value}");
                assert_eq!(self.btree.contains(&value), expected, "btree contains {value}");
                assert_eq!(
                    self.wide_btree.contains(&value),
                    expected,
                    "wide btree contains {value}"
                );
                assert_eq!(
                    self.skip_list.contains(&value),
                    expected,
                    "skip list contains {value}"
                );
                assert_eq!(
                    self.table.contains_key(&value),
                    expected,
                    "hash table contains {value}"
                );
            }

            Op::Clear => {
                self.avl.clear();
                self.btree.clear();
                self.wide_btree.clear();
                self.skip_list.clear();
                self.table.clear();
                self.model.clear();
                self.len = 0;
            }
        }
        return Ok(());
    }

    /// Check every container's structural invariants and compare full
    /// contents against the model.
    pub fn check(&self) {
        self.avl.check_invariants();
        self.btree.check_invariants();
        self.wide_btree.check_invariants();
        self.skip_list.check_invariants();
        self.table.check_invariants();

        let expected: Vec<u8> = self
            .model
            .iter()
            .flat_map(|(&value, &copies)| std::iter::repeat_n(value, copies))
            .collect();
        assert_ordered_matches("avl", &self.avl, &expected);
        assert_ordered_matches("btree", &self.btree, &expected);
        assert_ordered_matches("wide btree", &self.wide_btree, &expected);
        assert_ordered_matches("skip list", &self.skip_list, &expected);

        let mut counts: Vec<(u8, usize)> = self.table.iter().map(|(&k, &v)| (k, v)).collect();
        counts.sort_unstable();
        let model_counts: Vec<(u8, usize)> = self.model.iter().map(|(&k, &v)| (k, v)).collect();
        assert_eq!(counts, model_counts, "hash table counts");
    }
}

fn assert_ordered_matches<C: OrderedCollection<u8>>(name: &str, collection: &C, expected: &[u8]) {
    assert_eq!(collection.len(), expected.len(), "{name} len");
    let actual: Vec<u8> = collection.iter().copied().collect();
    assert_eq!(actual, expected, "{name} contents");
}

/// Decode and apply every operation in `bytes`, checking invariants after
/// each one. Returns the number of operations applied.
pub fn run(bytes: &[u8]) -> Result<usize> {
    let mut oracle = Oracle::new()?;
    let mut remaining = bytes;
    let mut applied = 0;
    while let Some((op, rest)) = Op::from_bytes(remaining) {
        remaining = rest;
        oracle.apply(op)?;
        oracle.check();
        applied += 1;
    }
    return Ok(applied);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_ops() {
        let empty: &[u8] = &[];
        assert_eq!(Op::from_bytes(&[]), None);
        assert_eq!(Op::from_bytes(&[0]), None);
        assert_eq!(Op::from_bytes(&[0, 9, 1]), Some((Op::Add(9), &[1u8][..])));
        assert_eq!(Op::from_bytes(&[7, 3]), Some((Op::Remove(3), empty)));
        assert_eq!(Op::from_bytes(&[12, 4]), Some((Op::Contains(4), empty)));
        assert_eq!(Op::from_bytes(&[15, 4]), Some((Op::Clear, &[4u8][..])));
        assert_eq!(Op::from_bytes(&[31]), Some((Op::Clear, empty)));
    }

    #[test]
    fn scripted_run() {
        let mut oracle = Oracle::new().unwrap();
        for value in [5, 1, 5, 9, 5, 200, 0] {
            oracle.apply(Op::Add(value)).unwrap();
        }
        oracle.check();
        assert_eq!(oracle.len(), 7);

        oracle.apply(Op::Remove(5)).unwrap();
        oracle.apply(Op::Remove(42)).unwrap();
        oracle.apply(Op::Contains(5)).unwrap();
        oracle.check();
        assert_eq!(oracle.len(), 6);

        oracle.apply(Op::Clear).unwrap();
        oracle.check();
        assert!(oracle.is_empty());
    }

    #[test]
    fn run_counts_applied_ops() {
        let bytes: Vec<u8> = (0..=255u8).flat_map(|b| [b, b.wrapping_mul(7)]).collect();
        let applied = run(&bytes).unwrap();
        assert!(applied > 0);
    }
}
