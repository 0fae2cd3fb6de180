//! B-Tree
//!
//! A multi-way search tree with minimum degree `t`. Every node except the
//! root holds between `t - 1` and `2t - 1` values in non-decreasing order,
//! an internal node has exactly one more child than it has values, and every
//! leaf sits at the same depth.
//!
//! # Insertion
//!
//! Top-down with eager splitting: a full node is split before the descent
//! enters it, so the leaf that finally receives the value always has room.
//! Splitting a full root is the only way the tree grows taller.
//!
//! ```text
//!            [2 | 4 | 6]                     [4]
//!           /   |   |   \       split      /     \
//!                              ======>  [2]       [6]
//!                                      /   \     /   \
//! ```
//!
//! # Removal
//!
//! Also top-down. Before descending into a child that holds only `t - 1`
//! values, the child is topped up, either by rotating a value through the
//! parent from a sibling that can spare one, or by merging it with a sibling
//! and the separating parent value ("push down"). When a merge empties the
//! root, its single remaining child becomes the new root.
//!
//! Nodes live in an [`Arena`]; children are indices. No node stores a link
//! to its parent since every operation carries the path it came down.

use std::fmt;

use smallvec::SmallVec;
use tracing::trace;

use super::primitives::Arena;
use super::primitives::Idx;
use super::primitives::NONE;
use crate::collection::OrderedCollection;
use crate::config::BTreeConfig;
use crate::error::Error;
use crate::error::Result;

/// Values held by a node. Sized for the default 2-3-4 shape.
type Values<T> = SmallVec<[T; 3]>;
/// Child indices held by an internal node.
type Children = SmallVec<[Idx; 4]>;

/// A single B-tree node.
#[derive(Clone, Debug)]
pub struct BTreeNode<T> {
    values: Values<T>,
    /// Empty for leaves, `values.len() + 1` entries otherwise.
    children: Children,
    leaf: bool,
}

impl<T: Ord> BTreeNode<T> {
    /// Build a node, rejecting any shape a B-tree of `min_degree` could not
    /// contain.
    pub fn new(
        leaf: bool,
        is_root: bool,
        min_degree: usize,
        values: Values<T>,
        children: Children,
    ) -> Result<BTreeNode<T>> {
        if min_degree < 2 {
            return Err(Error::InvalidDegree(min_degree));
        }
        if values.is_empty() && !children.is_empty() {
            return Err(Error::InvalidNode("node without values has children"));
        }
        if values.len() > 2 * min_degree - 1 {
            return Err(Error::InvalidNode("node holds more than 2t-1 values"));
        }
        if !is_root && values.len() < min_degree - 1 {
            return Err(Error::InvalidNode("non-root node holds fewer than t-1 values"));
        }
        if leaf && !children.is_empty() {
            return Err(Error::InvalidNode("leaf node has children"));
        }
        if !leaf && !values.is_empty() && children.len() != values.len() + 1 {
            return Err(Error::InvalidNode("internal node needs one more child than values"));
        }
        if !is_sorted(&values) {
            return Err(Error::InvalidNode("node values out of order"));
        }
        return Ok(BTreeNode {
            values,
            children,
            leaf,
        });
    }
}

fn is_sorted<T: Ord>(values: &[T]) -> bool {
    return values.windows(2).all(|pair| pair[0] <= pair[1]);
}

/// An ordered multiset stored as a B-tree.
#[derive(Clone)]
pub struct BTree<T> {
    nodes: Arena<BTreeNode<T>>,
    /// Always allocated. An empty tree is a single empty leaf.
    root: Idx,
    len: usize,
    min_degree: usize,
}

impl<T: Ord> BTree<T> {
    /// An empty 2-3-4 tree (minimum degree 2).
    pub fn new() -> BTree<T> {
        let mut nodes = Arena::new();
        let root = nodes.alloc(empty_leaf());
        return BTree {
            nodes,
            root,
            len: 0,
            min_degree: BTreeConfig::default().min_degree,
        };
    }

    pub fn with_min_degree(min_degree: usize) -> Result<BTree<T>> {
        return Self::with_config(BTreeConfig::default().with_min_degree(min_degree));
    }

    pub fn with_config(config: BTreeConfig) -> Result<BTree<T>> {
        config.validate()?;
        let mut tree = Self::new();
        tree.min_degree = config.min_degree;
        return Ok(tree);
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        return self.len;
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        return self.len == 0;
    }

    pub fn min_degree(&self) -> usize {
        return self.min_degree;
    }

    /// Number of node levels. Zero when empty.
    pub fn height(&self) -> usize {
        if self.len == 0 {
            return 0;
        }
        let mut height = 1;
        let mut current = self.root;
        while !self.nodes[current].leaf {
            current = self.nodes[current].children[0];
            height += 1;
        }
        return height;
    }

    pub fn first(&self) -> Option<&T> {
        let mut current = self.root;
        while !self.nodes[current].leaf {
            current = self.nodes[current].children[0];
        }
        return self.nodes[current].values.first();
    }

    pub fn last(&self) -> Option<&T> {
        let mut current = self.root;
        while !self.nodes[current].leaf {
            let node = &self.nodes[current];
            current = node.children[node.children.len() - 1];
        }
        return self.nodes[current].values.last();
    }

    /// Whether `idx` holds the `2t - 1` values a node may hold.
    #[inline]
    fn is_full(&self, idx: Idx) -> bool {
        return self.nodes[idx].values.len() == 2 * self.min_degree - 1;
    }

    /// Insert a value. Equal values are placed after existing ones.
    pub fn add(&mut self, value: T) {
        if self.is_full(self.root) {
            let old_root = self.root;
            let (median, right) = self.split_node(old_root);
            let mut values = Values::new();
            values.push(median);
            let mut children = Children::new();
            children.push(old_root);
            children.push(right);
            let new_root = self.build(false, true, values, children);
            self.root = self.nodes.alloc(new_root);
            trace!(height = self.height(), "btree root split");
        }
        self.insert_non_full(self.root, value);
        self.len += 1;
    }

    /// Split the full node at `idx` around its median. The node keeps the
    /// lower half; the upper half moves to a new node. Returns the median and
    /// the new node.
    fn split_node(&mut self, idx: Idx) -> (T, Idx) {
        let t = self.min_degree;
        let node = &mut self.nodes[idx];
        let right_values: Values<T> = node.values.drain(t..).collect();
        let right_children: Children = if node.leaf {
            Children::new()
        } else {
            node.children.drain(t..).collect()
        };
        let Some(median) = node.values.pop() else {
            panic!("INVARIANT VIOLATED: split of node {idx} without a median");
        };
        let leaf = node.leaf;
        self.debug_assert_sorted(idx);

        let right = self.build(leaf, false, right_values, right_children);
        return (median, self.nodes.alloc(right));
    }

    /// Split the full child at `position` of `parent`, lifting its median
    /// into `parent`.
    fn split_child(&mut self, parent: Idx, position: usize) {
        let child = self.nodes[parent].children[position];
        let (median, right) = self.split_node(child);
        let node = &mut self.nodes[parent];
        node.values.insert(position, median);
        node.children.insert(position + 1, right);
        self.debug_assert_sorted(parent);
    }

    fn insert_non_full(&mut self, idx: Idx, value: T) {
        let mut current = idx;
        loop {
            let node = &self.nodes[current];
            let position = node.values.partition_point(|v| v <= &value);
            if node.leaf {
                self.nodes[current].values.insert(position, value);
                self.debug_assert_sorted(current);
                return;
            }

            let mut child = node.children[position];
            if self.is_full(child) {
                self.split_child(current, position);
                let node = &self.nodes[current];
                if value >= node.values[position] {
                    child = node.children[position + 1];
                } else {
                    child = node.children[position];
                }
            }
            current = child;
        }
    }

    pub fn contains(&self, value: &T) -> bool {
        let mut current = self.root;
        loop {
            let node = &self.nodes[current];
            let position = node.values.partition_point(|v| v < value);
            if position < node.values.len() && node.values[position] == *value {
                return true;
            }
            if node.leaf {
                return false;
            }
            current = node.children[position];
        }
    }

    /// Remove one value equal to `value`. Returns false if none was stored.
    pub fn remove(&mut self, value: &T) -> bool {
        return self.take(value).is_some();
    }

    /// Remove one value equal to `value` and return it.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let taken = self.take_from(self.root, value);
        self.collapse_root();
        if taken.is_some() {
            self.len -= 1;
        }
        return taken;
    }

    /// Remove `value` from the subtree at `idx`. The caller guarantees `idx`
    /// is the root or holds at least `t` values.
    fn take_from(&mut self, idx: Idx, value: &T) -> Option<T> {
        let t = self.min_degree;
        let node = &self.nodes[idx];
        let position = node.values.partition_point(|v| v < value);
        let found = position < node.values.len() && node.values[position] == *value;

        if node.leaf {
            if !found {
                return None;
            }
            return Some(self.nodes[idx].values.remove(position));
        }

        if found {
            let left = node.children[position];
            let right = node.children[position + 1];
            if self.nodes[left].values.len() >= t {
                let predecessor = self.take_extreme(left, true);
                let taken = std::mem::replace(&mut self.nodes[idx].values[position], predecessor);
                self.debug_assert_sorted(idx);
                return Some(taken);
            }
            if self.nodes[right].values.len() >= t {
                let successor = self.take_extreme(right, false);
                let taken = std::mem::replace(&mut self.nodes[idx].values[position], successor);
                self.debug_assert_sorted(idx);
                return Some(taken);
            }
            let merged = self.push_down(idx, position);
            return self.take_from(merged, value);
        }

        let mut position = position;
        if self.nodes[node.children[position]].values.len() < t {
            position = self.fill_child(idx, position);
        }
        let child = self.nodes[idx].children[position];
        return self.take_from(child, value);
    }

    /// Remove the largest (`max`) or smallest value from the subtree at
    /// `idx`, topping up each child before entering it.
    fn take_extreme(&mut self, idx: Idx, max: bool) -> T {
        let t = self.min_degree;
        let mut current = idx;
        loop {
            let node = &self.nodes[current];
            if node.leaf {
                break;
            }
            let mut position = if max { node.children.len() - 1 } else { 0 };
            if self.nodes[node.children[position]].values.len() < t {
                position = self.fill_child(current, position);
            }
            current = self.nodes[current].children[position];
        }

        let values = &mut self.nodes[current].values;
        if values.is_empty() {
            panic!("INVARIANT VIOLATED: empty leaf {current} below the root");
        }
        if max {
            let last = values.len() - 1;
            return values.remove(last);
        }
        return values.remove(0);
    }

    /// Bring the child at `position` of `parent` up to at least `t` values.
    /// Returns the position the child's contents occupy afterwards.
    ///
    /// Borrows from the sibling with more values when it can spare one,
    /// otherwise merges with a neighbour.
    fn fill_child(&mut self, parent: Idx, position: usize) -> usize {
        let t = self.min_degree;
        let node = &self.nodes[parent];
        let last = node.children.len() - 1;
        let size_at = |pos: usize| self.nodes[node.children[pos]].values.len();

        let left_size = if position > 0 { size_at(position - 1) } else { 0 };
        let right_size = if position < last { size_at(position + 1) } else { 0 };

        if right_size >= t && right_size >= left_size {
            self.rotate_from_right(parent, position);
            return position;
        }
        if left_size >= t {
            self.rotate_from_left(parent, position);
            return position;
        }
        if position < last {
            self.push_down(parent, position);
            return position;
        }
        self.push_down(parent, position - 1);
        return position - 1;
    }

    /// Move the separator at `position - 1` down into the child at
    /// `position`, and the left sibling's last value up to replace it.
    fn rotate_from_left(&mut self, parent: Idx, position: usize) {
        let sibling = self.nodes[parent].children[position - 1];
        let child = self.nodes[parent].children[position];

        let node = &mut self.nodes[sibling];
        let Some(lifted) = node.values.pop() else {
            panic!("INVARIANT VIOLATED: rotation from empty sibling {sibling}");
        };
        let moved_child = if node.leaf { None } else { node.children.pop() };

        let separator = std::mem::replace(&mut self.nodes[parent].values[position - 1], lifted);
        self.debug_assert_sorted(parent);

        let node = &mut self.nodes[child];
        node.values.insert(0, separator);
        if let Some(moved) = moved_child {
            node.children.insert(0, moved);
        }
        self.debug_assert_sorted(child);
    }

    /// Move the separator at `position` down into the child at `position`,
    /// and the right sibling's first value up to replace it.
    fn rotate_from_right(&mut self, parent: Idx, position: usize) {
        let sibling = self.nodes[parent].children[position + 1];
        let child = self.nodes[parent].children[position];

        let node = &mut self.nodes[sibling];
        let lifted = node.values.remove(0);
        let moved_child = if node.leaf {
            None
        } else {
            Some(node.children.remove(0))
        };

        let separator = std::mem::replace(&mut self.nodes[parent].values[position], lifted);
        self.debug_assert_sorted(parent);

        let node = &mut self.nodes[child];
        node.values.push(separator);
        if let Some(moved) = moved_child {
            node.children.push(moved);
        }
        self.debug_assert_sorted(child);
    }

    /// Merge `children[position]`, `values[position]` and
    /// `children[position + 1]` of `parent` into one node that takes the
    /// place of both children. Returns the merged node.
    fn push_down(&mut self, parent: Idx, position: usize) -> Idx {
        let node = &mut self.nodes[parent];
        let separator = node.values.remove(position);
        let right_idx = node.children.remove(position + 1);
        let left_idx = node.children[position];

        let left = self.nodes.free(left_idx);
        let right = self.nodes.free(right_idx);
        let leaf = left.leaf;

        let mut values = left.values;
        values.push(separator);
        values.extend(right.values);
        let mut children = left.children;
        children.extend(right.children);

        let merged = self.build(leaf, false, values, children);
        let merged_idx = self.nodes.alloc(merged);
        self.nodes[parent].children[position] = merged_idx;
        return merged_idx;
    }

    /// Replace an emptied internal root with its only child.
    fn collapse_root(&mut self) {
        let root = &self.nodes[self.root];
        if !root.values.is_empty() || root.leaf {
            return;
        }
        let child = root.children[0];
        self.nodes.free(self.root);
        self.root = child;
        trace!(height = self.height(), "btree root collapse");
    }

    /// Remove every value.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.alloc(empty_leaf());
        self.len = 0;
    }

    /// Ascending in-order traversal. Each call starts fresh.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            nodes: &self.nodes,
            stack: SmallVec::new(),
            remaining: self.len,
        };
        iter.push_leftmost(self.root);
        return iter;
    }

    // --- Node helpers ---

    /// Construct a node the tree itself has shaped. A rejection here is a
    /// defect in the split/merge logic.
    fn build(&self, leaf: bool, is_root: bool, values: Values<T>, children: Children) -> BTreeNode<T> {
        match BTreeNode::new(leaf, is_root, self.min_degree, values, children) {
            Ok(node) => return node,
            Err(err) => panic!("INVARIANT VIOLATED: {err}"),
        }
    }

    #[inline]
    fn debug_assert_sorted(&self, idx: Idx) {
        debug_assert!(
            is_sorted(&self.nodes[idx].values),
            "node {idx} values out of order"
        );
    }

    // --- Invariant checking ---

    /// Walk the whole tree and panic if any structural invariant is broken.
    ///
    /// Checks per-node value counts, child counts, ordering within and across
    /// nodes, uniform leaf depth and the element count. O(n).
    pub fn check_invariants(&self) {
        let mut leaf_depth = None;
        let count = self.check_node(self.root, true, 0, None, None, &mut leaf_depth);
        assert_eq!(
            count, self.len,
            "INVARIANT VIOLATED: reachable values={} != len()={}",
            count, self.len
        );
        if self.len == 0 {
            assert!(
                self.nodes[self.root].leaf,
                "INVARIANT VIOLATED: empty tree has an internal root"
            );
        }
    }

    fn check_node(
        &self,
        idx: Idx,
        is_root: bool,
        depth: usize,
        lower: Option<&T>,
        upper: Option<&T>,
        leaf_depth: &mut Option<usize>,
    ) -> usize {
        assert!(idx != NONE, "INVARIANT VIOLATED: null child link");
        let t = self.min_degree;
        let node = &self.nodes[idx];
        let count = node.values.len();

        assert!(
            count <= 2 * t - 1,
            "INVARIANT VIOLATED: node {} holds {} values, max {}",
            idx,
            count,
            2 * t - 1
        );
        if !is_root {
            assert!(
                count >= t - 1,
                "INVARIANT VIOLATED: node {} holds {} values, min {}",
                idx,
                count,
                t - 1
            );
        }
        assert!(is_sorted(&node.values), "INVARIANT VIOLATED: node {} values out of order", idx);
        if let (Some(low), Some(first)) = (lower, node.values.first()) {
            assert!(low <= first, "INVARIANT VIOLATED: node {} below its lower bound", idx);
        }
        if let (Some(high), Some(last)) = (upper, node.values.last()) {
            assert!(last <= high, "INVARIANT VIOLATED: node {} above its upper bound", idx);
        }

        if node.leaf {
            assert!(
                node.children.is_empty(),
                "INVARIANT VIOLATED: leaf {} has children",
                idx
            );
            match *leaf_depth {
                None => *leaf_depth = Some(depth),
                Some(expected) => assert_eq!(
                    depth, expected,
                    "INVARIANT VIOLATED: leaf {} at depth {} != {}",
                    idx, depth, expected
                ),
            }
            return count;
        }

        assert_eq!(
            node.children.len(),
            count + 1,
            "INVARIANT VIOLATED: node {} has {} children for {} values",
            idx,
            node.children.len(),
            count
        );
        let mut total = count;
        for (i, &child) in node.children.iter().enumerate() {
            let low = if i == 0 { lower } else { Some(&node.values[i - 1]) };
            let high = if i == count { upper } else { Some(&node.values[i]) };
            total += self.check_node(child, false, depth + 1, low, high, leaf_depth);
        }
        return total;
    }
}

fn empty_leaf<T>() -> BTreeNode<T> {
    return BTreeNode {
        values: Values::new(),
        children: Children::new(),
        leaf: true,
    };
}

impl<T: Ord> Default for BTree<T> {
    fn default() -> Self {
        return Self::new();
    }
}

impl<T: Ord + fmt::Debug> fmt::Debug for BTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.debug_set().entries(self.iter()).finish();
    }
}

impl<T: Ord> Extend<T> for BTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<T: Ord> FromIterator<T> for BTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = BTree::new();
        tree.extend(iter);
        return tree;
    }
}

impl<'a, T: Ord> IntoIterator for &'a BTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        return self.iter();
    }
}

impl<T: Ord> OrderedCollection<T> for BTree<T> {
    type Iter<'a>
        = Iter<'a, T>
    where
        T: 'a;

    fn add(&mut self, value: T) {
        BTree::add(self, value);
    }

    fn contains(&self, value: &T) -> bool {
        return BTree::contains(self, value);
    }

    fn remove(&mut self, value: &T) -> bool {
        return BTree::remove(self, value);
    }

    fn clear(&mut self) {
        BTree::clear(self);
    }

    fn len(&self) -> usize {
        return self.len;
    }

    fn iter(&self) -> Iter<'_, T> {
        return BTree::iter(self);
    }
}

/// In-order iterator over a [`BTree`].
pub struct Iter<'a, T> {
    nodes: &'a Arena<BTreeNode<T>>,
    /// (node, index of the next value to yield from it)
    stack: SmallVec<[(Idx, usize); 16]>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    fn push_leftmost(&mut self, mut idx: Idx) {
        loop {
            self.stack.push((idx, 0));
            let node = &self.nodes[idx];
            if node.leaf {
                return;
            }
            idx = node.children[0];
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let nodes = self.nodes;
        loop {
            let (idx, position) = *self.stack.last()?;
            let node = &nodes[idx];
            if position >= node.values.len() {
                self.stack.pop();
                continue;
            }

            if let Some(top) = self.stack.last_mut() {
                top.1 += 1;
            }
            if !node.leaf {
                self.push_leftmost(node.children[position + 1]);
            }
            self.remaining -= 1;
            return Some(&node.values[position]);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        return (self.remaining, Some(self.remaining));
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(tree: &BTree<i32>) -> Vec<i32> {
        return tree.iter().copied().collect();
    }

    fn root_values(tree: &BTree<i32>) -> Vec<i32> {
        return tree.nodes[tree.root].values.to_vec();
    }

    #[test]
    fn empty_tree() {
        let tree: BTree<i32> = BTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.min_degree(), 2);
        assert!(!tree.contains(&0));
        assert_eq!(tree.iter().next(), None);
        assert_eq!(tree.first(), None);
        assert_eq!(tree.last(), None);
        tree.check_invariants();
    }

    #[test]
    fn full_root_splits_on_next_add() {
        let mut tree = BTree::new();
        tree.add(1);
        tree.add(2);
        tree.add(3);
        assert_eq!(tree.height(), 1);
        assert!(tree.is_full(tree.root));

        tree.add(4);
        tree.check_invariants();
        assert_eq!(tree.height(), 2);
        assert_eq!(root_values(&tree), vec![2]);
        assert_eq!(collect(&tree), vec![1, 2, 3, 4]);
    }

    #[test]
    fn sequential_adds_and_remove() {
        let mut tree: BTree<i32> = (0..10).collect();
        tree.check_invariants();
        assert_eq!(tree.len(), 10);

        assert!(tree.remove(&5));
        tree.check_invariants();
        assert!(!tree.contains(&5));
        assert_eq!(tree.len(), 9);
        assert_eq!(collect(&tree), vec![0, 1, 2, 3, 4, 6, 7, 8, 9]);
    }

    #[test]
    fn remove_every_value_in_each_order() {
        let orders: [Vec<i32>; 3] = [
            (0..64).collect(),
            (0..64).rev().collect(),
            (0..64).map(|i| (i * 37) % 64).collect(),
        ];
        for order in orders {
            let mut tree: BTree<i32> = (0..64).collect();
            for value in &order {
                assert!(tree.remove(value), "missing {value}");
                tree.check_invariants();
            }
            assert!(tree.is_empty());
            assert_eq!(tree.height(), 0);
        }
    }

    #[test]
    fn remove_missing_keeps_count() {
        let mut tree: BTree<i32> = (0..20).map(|i| i * 2).collect();
        assert!(!tree.remove(&7));
        assert!(!tree.remove(&100));
        tree.check_invariants();
        assert_eq!(tree.len(), 20);
    }

    #[test]
    fn duplicates_are_kept() {
        let mut tree = BTree::new();
        for _ in 0..10 {
            tree.add(4);
        }
        tree.add(1);
        tree.add(9);
        tree.check_invariants();
        assert_eq!(tree.len(), 12);

        for remaining in (0..10).rev() {
            assert!(tree.remove(&4));
            tree.check_invariants();
            assert_eq!(tree.iter().filter(|&&v| v == 4).count(), remaining);
        }
        assert!(!tree.contains(&4));
        assert_eq!(collect(&tree), vec![1, 9]);
    }

    #[test]
    fn larger_degree() {
        let mut tree = BTree::with_min_degree(5).unwrap();
        for i in (0..500).rev() {
            tree.add(i);
        }
        tree.check_invariants();
        assert!(tree.height() <= 4);

        for i in (0..500).step_by(3) {
            assert!(tree.remove(&i));
        }
        tree.check_invariants();
        assert_eq!(tree.len(), 500 - 167);
    }

    #[test]
    fn invalid_degree_rejected() {
        assert_eq!(BTree::<i32>::with_min_degree(1).unwrap_err(), Error::InvalidDegree(1));
        assert_eq!(BTree::<i32>::with_min_degree(0).unwrap_err(), Error::InvalidDegree(0));
    }

    #[test]
    fn node_constructor_validates() {
        let values = |v: &[i32]| -> Values<i32> { v.iter().copied().collect() };
        let children = |c: &[Idx]| -> Children { c.iter().copied().collect() };

        assert!(BTreeNode::new(true, true, 2, values(&[]), children(&[])).is_ok());
        assert!(BTreeNode::new(true, false, 2, values(&[1, 2, 3]), children(&[])).is_ok());
        let node = BTreeNode::new(false, true, 2, values(&[5]), children(&[0, 1])).unwrap();
        assert!(!node.leaf);
        assert_eq!(node.values.as_slice(), &[5]);
        assert_eq!(node.children.as_slice(), &[0, 1]);

        assert_eq!(
            BTreeNode::new(true, true, 1, values(&[1]), children(&[])).unwrap_err(),
            Error::InvalidDegree(1)
        );
        assert!(matches!(
            BTreeNode::new(false, true, 2, values(&[]), children(&[0])),
            Err(Error::InvalidNode(_))
        ));
        assert!(matches!(
            BTreeNode::new(true, true, 2, values(&[1, 2, 3, 4]), children(&[])),
            Err(Error::InvalidNode(_))
        ));
        assert!(matches!(
            BTreeNode::new(true, false, 3, values(&[1]), children(&[])),
            Err(Error::InvalidNode(_))
        ));
        assert!(matches!(
            BTreeNode::new(true, true, 2, values(&[1]), children(&[0, 1])),
            Err(Error::InvalidNode(_))
        ));
        assert!(matches!(
            BTreeNode::new(false, true, 2, values(&[1, 2]), children(&[0, 1])),
            Err(Error::InvalidNode(_))
        ));
        assert!(matches!(
            BTreeNode::new(true, true, 2, values(&[2, 1]), children(&[])),
            Err(Error::InvalidNode(_))
        ));
    }

    #[test]
    fn first_last_and_clear() {
        let mut tree: BTree<i32> = [8, 3, 5, 1, 9, 7].into_iter().collect();
        assert_eq!(tree.first(), Some(&1));
        assert_eq!(tree.last(), Some(&9));

        tree.clear();
        tree.check_invariants();
        assert!(tree.is_empty());
        tree.add(2);
        assert_eq!(collect(&tree), vec![2]);
    }

    #[test]
    fn take_returns_stored_value() {
        let mut tree: BTree<i32> = (0..30).collect();
        assert_eq!(tree.take(&12), Some(12));
        assert_eq!(tree.take(&12), None);
        tree.check_invariants();
    }

    #[test]
    fn iterator_len_matches() {
        let tree: BTree<i32> = (0..100).collect();
        let mut iter = tree.iter();
        assert_eq!(iter.len(), 100);
        iter.next();
        assert_eq!(iter.len(), 99);
    }
}
