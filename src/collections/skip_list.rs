//! Skip List
//!
//! An ordered multiset built from a sorted linked list plus a tower of
//! sparser "express lane" lists above it. Every node is on level 0; a node
//! sampled at height `h` is also linked on levels `1..h`. A search starts on
//! the highest active level of the head sentinel and drops a level whenever
//! the next step would overshoot, giving expected O(log n) operations.
//!
//! ```text
//! level 2: HEAD ----------------------> 30 ----------------> NONE
//! level 1: HEAD --------> 10 ---------> 30 ------> 50 -----> NONE
//! level 0: HEAD --> 5 --> 10 --> 20 --> 30 --> 40 --> 50 --> NONE
//! ```
//!
//! # Levels
//!
//! Node heights come from [`pick_height`] over one random word per insert.
//! The number of active levels starts at one, grows by at most one per
//! insert up to `max_levels`, and never shrinks, not even on `clear`.
//!
//! The random source is a type parameter so tests can pin every height with
//! a deterministic generator.

use std::cmp::Ordering;
use std::fmt;

use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::StdRng;
use smallvec::SmallVec;
use smallvec::smallvec;
use tracing::trace;

use super::primitives::Arena;
use super::primitives::Idx;
use super::primitives::NONE;
use super::primitives::SENTINEL;
use super::primitives::pick_height;
use crate::collection::OrderedCollection;
use crate::config::SkipListConfig;
use crate::error::Result;

/// Link position of the head sentinel. Never allocated in the arena.
const HEAD: Idx = SENTINEL;

/// Per-level predecessor positions collected during a search.
type Path = SmallVec<[Idx; 16]>;

#[derive(Clone, Debug)]
struct SkipNode<T> {
    value: T,
    /// Forward links, one per level the node is on.
    next: SmallVec<[Idx; 4]>,
}

/// An ordered multiset with randomized level towers.
pub struct SkipList<T, R = StdRng> {
    nodes: Arena<SkipNode<T>>,
    /// Head sentinel forward links. One per possible level.
    head: Vec<Idx>,
    /// Levels currently in use, `1..=max_levels`.
    levels: usize,
    max_levels: usize,
    len: usize,
    rng: R,
}

impl<T: Ord> SkipList<T, StdRng> {
    /// An empty list with 33 levels, seeded from OS entropy.
    pub fn new() -> SkipList<T, StdRng> {
        return SkipList::from_parts(SkipListConfig::default().max_levels, StdRng::from_entropy());
    }

    /// An empty list whose level sequence is fixed by `seed`.
    pub fn with_seed(seed: u64) -> SkipList<T, StdRng> {
        return SkipList::from_parts(SkipListConfig::default().max_levels, StdRng::seed_from_u64(seed));
    }

    pub fn with_config(config: SkipListConfig) -> Result<SkipList<T, StdRng>> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        return SkipList::with_config_and_rng(config, rng);
    }
}

impl<T: Ord, R: RngCore> SkipList<T, R> {
    /// An empty list drawing levels from `rng`.
    pub fn with_rng(rng: R) -> SkipList<T, R> {
        return SkipList::from_parts(SkipListConfig::default().max_levels, rng);
    }

    /// An empty list with the level cap from `config` drawing levels from
    /// `rng`. The config's seed is ignored.
    pub fn with_config_and_rng(config: SkipListConfig, rng: R) -> Result<SkipList<T, R>> {
        config.validate()?;
        return Ok(SkipList::from_parts(config.max_levels, rng));
    }

    fn from_parts(max_levels: usize, rng: R) -> SkipList<T, R> {
        return SkipList {
            nodes: Arena::new(),
            head: vec![NONE; max_levels],
            levels: 1,
            max_levels,
            len: 0,
            rng,
        };
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        return self.len;
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        return self.len == 0;
    }

    /// Levels currently in use.
    pub fn levels(&self) -> usize {
        return self.levels;
    }

    pub fn max_levels(&self) -> usize {
        return self.max_levels;
    }

    pub fn first(&self) -> Option<&T> {
        let first = self.head[0];
        if first == NONE {
            return None;
        }
        return Some(&self.nodes[first].value);
    }

    // --- Link helpers ---

    #[inline]
    fn forward(&self, at: Idx, level: usize) -> Idx {
        if at == HEAD {
            return self.head[level];
        }
        return self.nodes[at].next[level];
    }

    #[inline]
    fn set_forward(&mut self, at: Idx, level: usize, to: Idx) {
        if at == HEAD {
            self.head[level] = to;
        } else {
            self.nodes[at].next[level] = to;
        }
    }

    /// For each active level, the last position whose successor fails
    /// `advance`.
    fn search_path(&self, advance: impl Fn(&T) -> bool) -> Path {
        let mut path: Path = smallvec![HEAD; self.levels];
        let mut current = HEAD;
        for level in (0..self.levels).rev() {
            loop {
                let next = self.forward(current, level);
                if next == NONE || !advance(&self.nodes[next].value) {
                    break;
                }
                current = next;
            }
            path[level] = current;
        }
        return path;
    }

    fn sample_height(&mut self) -> usize {
        let before = self.levels;
        let height = pick_height(self.rng.next_u64(), &mut self.levels, self.max_levels);
        if self.levels > before {
            trace!(levels = self.levels, "skiplist level growth");
        }
        return height;
    }

    /// Insert a value after any equal values already stored.
    pub fn add(&mut self, value: T) {
        let height = self.sample_height();
        let path = self.search_path(|stored| *stored <= value);

        let mut next = SmallVec::with_capacity(height);
        for (level, &before) in path.iter().enumerate().take(height) {
            next.push(self.forward(before, level));
        }
        let idx = self.nodes.alloc(SkipNode { value, next });
        for (level, &before) in path.iter().enumerate().take(height) {
            self.set_forward(before, level, idx);
        }
        self.len += 1;
    }

    pub fn contains(&self, value: &T) -> bool {
        let mut current = HEAD;
        for level in (0..self.levels).rev() {
            loop {
                let next = self.forward(current, level);
                if next == NONE {
                    break;
                }
                match self.nodes[next].value.cmp(value) {
                    Ordering::Less => current = next,
                    Ordering::Equal => return true,
                    Ordering::Greater => break,
                }
            }
        }
        return false;
    }

    /// Remove one value equal to `value`. Returns false if none was stored.
    pub fn remove(&mut self, value: &T) -> bool {
        return self.take(value).is_some();
    }

    /// Unlink the first node equal to `value` from every level it is on and
    /// return its value.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let path = self.search_path(|stored| stored < value);
        let target = self.forward(path[0], 0);
        if target == NONE || self.nodes[target].value != *value {
            return None;
        }

        let height = self.nodes[target].next.len();
        for (level, &before) in path.iter().enumerate().take(height) {
            debug_assert_eq!(self.forward(before, level), target);
            let after = self.nodes[target].next[level];
            self.set_forward(before, level, after);
        }

        let node = self.nodes.free(target);
        self.len -= 1;
        return Some(node.value);
    }

    /// Remove every value. The active level count is kept.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head.fill(NONE);
        self.len = 0;
    }

    /// Ascending traversal along level 0. Each call starts fresh.
    pub fn iter(&self) -> Iter<'_, T> {
        return Iter {
            nodes: &self.nodes,
            current: self.head[0],
            remaining: self.len,
        };
    }

    // --- Invariant checking ---

    /// Walk every level and panic if a structural invariant is broken.
    ///
    /// Checks the level bounds, ordering on level 0, that each higher level
    /// is exactly the ordered sub-list of nodes tall enough to be on it, and
    /// the element count. O(n * levels).
    pub fn check_invariants(&self) {
        assert!(
            (1..=self.max_levels).contains(&self.levels),
            "INVARIANT VIOLATED: levels={} outside 1..={}",
            self.levels,
            self.max_levels
        );
        assert_eq!(self.head.len(), self.max_levels, "INVARIANT VIOLATED: head width");
        for level in self.levels..self.max_levels {
            assert_eq!(
                self.head[level], NONE,
                "INVARIANT VIOLATED: inactive level {} is linked",
                level
            );
        }

        let mut base: Vec<Idx> = Vec::with_capacity(self.len);
        let mut current = self.head[0];
        while current != NONE {
            let node = &self.nodes[current];
            assert!(
                (1..=self.levels).contains(&node.next.len()),
                "INVARIANT VIOLATED: node {} has height {} with {} levels",
                current,
                node.next.len(),
                self.levels
            );
            if let Some(&previous) = base.last() {
                assert!(
                    self.nodes[previous].value <= node.value,
                    "INVARIANT VIOLATED: level 0 out of order at node {}",
                    current
                );
            }
            base.push(current);
            current = node.next[0];
        }
        assert_eq!(
            base.len(),
            self.len,
            "INVARIANT VIOLATED: level 0 nodes={} != len()={}",
            base.len(),
            self.len
        );
        assert_eq!(
            self.nodes.len(),
            self.len,
            "INVARIANT VIOLATED: live arena nodes={} != len()={}",
            self.nodes.len(),
            self.len
        );

        for level in 1..self.levels {
            let expected: Vec<Idx> = base
                .iter()
                .copied()
                .filter(|&idx| self.nodes[idx].next.len() > level)
                .collect();
            let mut actual = Vec::with_capacity(expected.len());
            let mut current = self.head[level];
            while current != NONE {
                actual.push(current);
                current = self.nodes[current].next[level];
            }
            assert_eq!(
                actual, expected,
                "INVARIANT VIOLATED: level {} is not the sub-list of tall nodes",
                level
            );
        }
    }
}

impl<T: Ord> Default for SkipList<T, StdRng> {
    fn default() -> Self {
        return Self::new();
    }
}

impl<T: Ord + fmt::Debug, R: RngCore> fmt::Debug for SkipList<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.debug_set().entries(self.iter()).finish();
    }
}

impl<T: Ord, R: RngCore> Extend<T> for SkipList<T, R> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<T: Ord> FromIterator<T> for SkipList<T, StdRng> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = SkipList::new();
        list.extend(iter);
        return list;
    }
}

impl<'a, T: Ord, R: RngCore> IntoIterator for &'a SkipList<T, R> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        return self.iter();
    }
}

impl<T: Ord, R: RngCore> OrderedCollection<T> for SkipList<T, R> {
    type Iter<'a>
        = Iter<'a, T>
    where
        T: 'a,
        R: 'a;

    fn add(&mut self, value: T) {
        SkipList::add(self, value);
    }

    fn contains(&self, value: &T) -> bool {
        return SkipList::contains(self, value);
    }

    fn remove(&mut self, value: &T) -> bool {
        return SkipList::remove(self, value);
    }

    fn clear(&mut self) {
        SkipList::clear(self);
    }

    fn len(&self) -> usize {
        return self.len;
    }

    fn iter(&self) -> Iter<'_, T> {
        return SkipList::iter(self);
    }
}

/// Ascending iterator over a [`SkipList`].
pub struct Iter<'a, T> {
    nodes: &'a Arena<SkipNode<T>>,
    current: Idx,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.current == NONE {
            return None;
        }
        let nodes = self.nodes;
        let node = &nodes[self.current];
        self.current = node.next[0];
        self.remaining -= 1;
        return Some(&node.value);
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        return (self.remaining, Some(self.remaining));
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rand::rngs::mock::StepRng;

    /// Every sample is all heads: each insert opens a new level.
    fn all_heads() -> StepRng {
        return StepRng::new(u64::MAX, 0);
    }

    /// Every sample is tails: every node has height one.
    fn all_tails() -> StepRng {
        return StepRng::new(0, 0);
    }

    fn collect<R: RngCore>(list: &SkipList<i32, R>) -> Vec<i32> {
        return list.iter().copied().collect();
    }

    #[test]
    fn empty_list() {
        let list: SkipList<i32> = SkipList::with_seed(1);
        assert!(list.is_empty());
        assert_eq!(list.levels(), 1);
        assert_eq!(list.max_levels(), 33);
        assert!(!list.contains(&0));
        assert_eq!(list.first(), None);
        list.check_invariants();
    }

    #[test]
    fn add_contains_remove() {
        let mut list = SkipList::with_seed(7);
        for i in 0..10 {
            list.add(i);
        }
        list.check_invariants();
        assert_eq!(list.len(), 10);
        assert!(list.contains(&5));

        assert!(list.remove(&5));
        list.check_invariants();
        assert_eq!(list.len(), 9);
        assert!(!list.contains(&5));
        assert!(!list.remove(&5));
    }

    #[test]
    fn tails_keep_one_level() {
        let mut list = SkipList::with_rng(all_tails());
        for i in (0..20).rev() {
            list.add(i);
        }
        list.check_invariants();
        assert_eq!(list.levels(), 1);
        assert_eq!(collect(&list), (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn heads_grow_one_level_per_insert() {
        let mut list = SkipList::with_rng(all_heads());
        for i in 0..5 {
            list.add(i);
            assert_eq!(list.levels(), i as usize + 2);
        }
        list.check_invariants();

        // The last node is the only one on the top level.
        let top = list.levels() - 1;
        let last = list.head[top];
        assert_eq!(list.nodes[last].value, 4);
        assert_eq!(list.nodes[last].next[top], NONE);
    }

    #[test]
    fn levels_capped_by_config() {
        let config = SkipListConfig::default().with_max_levels(3);
        let mut list = SkipList::with_config_and_rng(config, all_heads()).unwrap();
        for i in 0..10 {
            list.add(i);
        }
        list.check_invariants();
        assert_eq!(list.levels(), 3);
    }

    #[test]
    fn removal_unlinks_every_level() {
        let mut list = SkipList::with_rng(all_heads());
        for i in 0..6 {
            list.add(i);
        }
        for i in [5, 0, 3] {
            assert!(list.remove(&i));
            list.check_invariants();
        }
        assert_eq!(collect(&list), vec![1, 2, 4]);
    }

    #[test]
    fn duplicates_are_kept() {
        let mut list = SkipList::with_seed(3);
        for value in [4, 2, 4, 4, 1] {
            list.add(value);
        }
        list.check_invariants();
        assert_eq!(collect(&list), vec![1, 2, 4, 4, 4]);

        assert!(list.remove(&4));
        list.check_invariants();
        assert_eq!(collect(&list), vec![1, 2, 4, 4]);
    }

    #[test]
    fn clear_keeps_levels() {
        let mut list = SkipList::with_rng(all_heads());
        for i in 0..4 {
            list.add(i);
        }
        let levels = list.levels();
        list.clear();
        list.check_invariants();
        assert!(list.is_empty());
        assert_eq!(list.levels(), levels);
        assert!(!list.contains(&1));

        list.add(1);
        list.check_invariants();
        assert_eq!(collect(&list), vec![1]);
    }

    #[test]
    fn same_seed_same_shape() {
        let a: SkipList<i32> = {
            let mut list = SkipList::with_seed(99);
            list.extend(0..200);
            list
        };
        let b: SkipList<i32> = {
            let mut list = SkipList::with_seed(99);
            list.extend(0..200);
            list
        };
        assert_eq!(a.levels(), b.levels());
        for (x, y) in a.head.iter().zip(b.head.iter()) {
            assert_eq!(x, y);
        }
    }

    #[test]
    fn invalid_max_levels_rejected() {
        let config = SkipListConfig::default().with_max_levels(0);
        assert_eq!(
            SkipList::<i32>::with_config(config).unwrap_err(),
            Error::InvalidMaxLevels { got: 0, max: 64 }
        );
        let config = SkipListConfig::default().with_max_levels(65);
        assert!(SkipList::<i32>::with_config(config).is_err());
    }

    #[test]
    fn first_is_smallest() {
        let list: SkipList<i32> = [9, 4, 6].into_iter().collect();
        assert_eq!(list.first(), Some(&4));
        assert_eq!(list.iter().len(), 3);
    }

    fn drain_sorted<C: OrderedCollection<i32>>(collection: &mut C) -> Vec<i32> {
        let sorted: Vec<i32> = collection.iter().copied().collect();
        for value in &sorted {
            assert!(collection.remove(value));
        }
        return sorted;
    }

    #[test]
    fn ordered_collection_with_custom_rng() {
        let mut list = SkipList::with_rng(all_heads());
        for value in [3, 1, 2, 1] {
            OrderedCollection::add(&mut list, value);
        }
        assert_eq!(OrderedCollection::len(&list), 4);
        assert_eq!(drain_sorted(&mut list), vec![1, 1, 2, 3]);
        assert!(list.is_empty());
        list.check_invariants();
    }
}
