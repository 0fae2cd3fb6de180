//! AVL Tree
//!
//! A self-balancing binary search tree. Values smaller than a node go left,
//! equal or larger values go right, and after every structural change the
//! heights of each node's two subtrees are brought back within one of each
//! other by rotations.
//!
//! # Structure
//!
//! Nodes live in an [`Arena`] and link to their children and parent by index.
//! The parent link is only used to walk back up for rebalancing and to
//! repoint a parent's child slot during rotations and splices.
//!
//! ```text
//!     a (node)                b
//!      \                     / \
//!       b       rotate     a    c
//!        \      left  =>
//!         c
//! ```
//!
//! # Rebalancing
//!
//! Heights are cached per node and refreshed bottom-up on the way back to the
//! root. Both `add` and `remove` walk from the lowest changed node to the
//! root, so the balance invariant holds after every operation.
//!
//! # Operations
//!
//! - `add(value)`: O(log n)
//! - `contains(value)`: O(log n)
//! - `remove(value)` / `take(value)`: O(log n)
//! - `iter()`: O(n) total, O(height) extra space

use std::cmp::Ordering;
use std::fmt;

use smallvec::SmallVec;
use tracing::trace;

use super::primitives::Arena;
use super::primitives::Idx;
use super::primitives::NONE;
use crate::collection::OrderedCollection;

/// A node in the AVL tree.
#[derive(Clone, Debug)]
struct AvlNode<T> {
    value: T,
    left: Idx,
    right: Idx,
    /// Non-owning back link. `NONE` for the root.
    parent: Idx,
    /// Height of the subtree rooted here. A leaf has height 1.
    height: u32,
}

impl<T> AvlNode<T> {
    fn leaf(value: T, parent: Idx) -> AvlNode<T> {
        return AvlNode {
            value,
            left: NONE,
            right: NONE,
            parent,
            height: 1,
        };
    }
}

/// An ordered multiset kept height-balanced by rotations.
#[derive(Clone)]
pub struct AvlTree<T> {
    nodes: Arena<AvlNode<T>>,
    root: Idx,
    len: usize,
}

impl<T: Ord> AvlTree<T> {
    pub fn new() -> AvlTree<T> {
        return AvlTree {
            nodes: Arena::new(),
            root: NONE,
            len: 0,
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

    /// Height of the whole tree. Zero when empty.
    pub fn height(&self) -> usize {
        return self.height_of(self.root) as usize;
    }

    /// Smallest stored value.
    pub fn first(&self) -> Option<&T> {
        if self.root == NONE {
            return None;
        }
        let mut current = self.root;
        while self.nodes[current].left != NONE {
            current = self.nodes[current].left;
        }
        return Some(&self.nodes[current].value);
    }

    /// Largest stored value.
    pub fn last(&self) -> Option<&T> {
        if self.root == NONE {
            return None;
        }
        let mut current = self.root;
        while self.nodes[current].right != NONE {
            current = self.nodes[current].right;
        }
        return Some(&self.nodes[current].value);
    }

    /// Insert a value, then rebalance every ancestor of the new leaf.
    /// Duplicates are accepted and routed right.
    pub fn add(&mut self, value: T) {
        if self.root == NONE {
            self.root = self.nodes.alloc(AvlNode::leaf(value, NONE));
            self.len += 1;
            return;
        }

        let mut current = self.root;
        loop {
            let go_left = value < self.nodes[current].value;
            let next = if go_left {
                self.nodes[current].left
            } else {
                self.nodes[current].right
            };
            if next == NONE {
                let leaf = self.nodes.alloc(AvlNode::leaf(value, current));
                if go_left {
                    self.nodes[current].left = leaf;
                } else {
                    self.nodes[current].right = leaf;
                }
                break;
            }
            current = next;
        }

        self.len += 1;
        self.rebalance_to_root(current);
    }

    /// Whether an equal value is stored.
    pub fn contains(&self, value: &T) -> bool {
        return self.find(value) != NONE;
    }

    /// Remove one value equal to `value`. Returns false if none was stored.
    pub fn remove(&mut self, value: &T) -> bool {
        return self.take(value).is_some();
    }

    /// Remove one value equal to `value` and return it.
    ///
    /// The node is spliced out by one of three cases, chosen by the shape of
    /// its right subtree:
    /// 1. no right child: the left child takes its place
    /// 2. right child has no left child: the right child takes its place and
    ///    adopts the left subtree
    /// 3. otherwise: the in-order successor is detached and takes its place
    pub fn take(&mut self, value: &T) -> Option<T> {
        let target = self.find(value);
        if target == NONE {
            return None;
        }

        let parent = self.nodes[target].parent;
        let left = self.nodes[target].left;
        let right = self.nodes[target].right;

        let lowest_changed = if right == NONE {
            self.replace_child(parent, target, left);
            self.set_parent(left, parent);
            parent
        } else if self.nodes[right].left == NONE {
            self.nodes[right].left = left;
            self.set_parent(left, right);
            self.replace_child(parent, target, right);
            self.set_parent(right, parent);
            right
        } else {
            let mut successor = self.nodes[right].left;
            while self.nodes[successor].left != NONE {
                successor = self.nodes[successor].left;
            }

            // Detach the successor, handing its right subtree to its parent.
            let successor_parent = self.nodes[successor].parent;
            let successor_right = self.nodes[successor].right;
            self.nodes[successor_parent].left = successor_right;
            self.set_parent(successor_right, successor_parent);

            self.nodes[successor].left = left;
            self.set_parent(left, successor);
            self.nodes[successor].right = right;
            self.set_parent(right, successor);
            self.replace_child(parent, target, successor);
            self.set_parent(successor, parent);
            successor_parent
        };

        let node = self.nodes.free(target);
        self.len -= 1;
        self.rebalance_to_root(lowest_changed);
        return Some(node.value);
    }

    /// Remove every value.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = NONE;
        self.len = 0;
    }

    /// Ascending in-order traversal.
    ///
    /// Each call starts fresh. The iterator borrows the tree, so the tree
    /// cannot be modified while a traversal is open.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            nodes: &self.nodes,
            stack: SmallVec::new(),
            remaining: self.len,
        };
        iter.push_left_spine(self.root);
        return iter;
    }

    // --- Search ---

    fn find(&self, value: &T) -> Idx {
        let mut current = self.root;
        while current != NONE {
            let node = &self.nodes[current];
            match value.cmp(&node.value) {
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
                Ordering::Equal => return current,
            }
        }
        return NONE;
    }

    // --- Link helpers ---

    #[inline]
    fn set_parent(&mut self, child: Idx, parent: Idx) {
        if child != NONE {
            self.nodes[child].parent = parent;
        }
    }

    /// Point whichever slot held `old` (a child slot of `parent`, or the root
    /// handle) at `new`.
    fn replace_child(&mut self, parent: Idx, old: Idx, new: Idx) {
        if parent == NONE {
            self.root = new;
        } else if self.nodes[parent].left == old {
            self.nodes[parent].left = new;
        } else {
            self.nodes[parent].right = new;
        }
    }

    // --- Balance ---

    #[inline]
    fn height_of(&self, idx: Idx) -> u32 {
        if idx == NONE {
            return 0;
        }
        return self.nodes[idx].height;
    }

    fn update_height(&mut self, idx: Idx) {
        let left = self.height_of(self.nodes[idx].left);
        let right = self.height_of(self.nodes[idx].right);
        self.nodes[idx].height = 1 + left.max(right);
    }

    /// Right height minus left height.
    fn balance_factor(&self, idx: Idx) -> i64 {
        let node = &self.nodes[idx];
        return self.height_of(node.right) as i64 - self.height_of(node.left) as i64;
    }

    /// Refresh heights and rebalance from `start` up to the root.
    fn rebalance_to_root(&mut self, start: Idx) {
        let mut current = start;
        while current != NONE {
            self.update_height(current);
            let subtree_root = self.balance(current);
            current = self.nodes[subtree_root].parent;
        }
    }

    /// Rotate `idx` if its subtrees differ in height by more than one.
    /// Returns the root of the (possibly rotated) subtree.
    fn balance(&mut self, idx: Idx) -> Idx {
        let factor = self.balance_factor(idx);
        if factor > 1 {
            let right = self.nodes[idx].right;
            if self.balance_factor(right) < 0 {
                // Right child is left-heavy: right-left double rotation.
                self.rotate_right(right);
            }
            return self.rotate_left(idx);
        }
        if factor < -1 {
            let left = self.nodes[idx].left;
            if self.balance_factor(left) > 0 {
                self.rotate_left(left);
            }
            return self.rotate_right(idx);
        }
        return idx;
    }

    /// Promote the right child of `idx`. Returns the new subtree root.
    fn rotate_left(&mut self, idx: Idx) -> Idx {
        let pivot = self.nodes[idx].right;
        let parent = self.nodes[idx].parent;
        let inner = self.nodes[pivot].left;

        self.nodes[idx].right = inner;
        self.set_parent(inner, idx);

        self.nodes[pivot].left = idx;
        self.nodes[idx].parent = pivot;

        self.replace_child(parent, idx, pivot);
        self.nodes[pivot].parent = parent;

        self.update_height(idx);
        self.update_height(pivot);
        trace!(node = idx, pivot, "avl rotate left");
        return pivot;
    }

    /// Promote the left child of `idx`. Returns the new subtree root.
    fn rotate_right(&mut self, idx: Idx) -> Idx {
        let pivot = self.nodes[idx].left;
        let parent = self.nodes[idx].parent;
        let inner = self.nodes[pivot].right;

        self.nodes[idx].left = inner;
        self.set_parent(inner, idx);

        self.nodes[pivot].right = idx;
        self.nodes[idx].parent = pivot;

        self.replace_child(parent, idx, pivot);
        self.nodes[pivot].parent = parent;

        self.update_height(idx);
        self.update_height(pivot);
        trace!(node = idx, pivot, "avl rotate right");
        return pivot;
    }

    // --- Invariant checking ---

    /// Walk the whole tree and panic if any structural invariant is broken.
    ///
    /// Checks parent links, cached heights, the balance bound, in-order
    /// ordering and the element count. O(n).
    pub fn check_invariants(&self) {
        if self.root != NONE {
            assert_eq!(
                self.nodes[self.root].parent, NONE,
                "INVARIANT VIOLATED: root has a parent"
            );
        }
        let (count, _) = self.check_subtree(self.root);
        assert_eq!(
            count, self.len,
            "INVARIANT VIOLATED: reachable nodes={} != len()={}",
            count, self.len
        );
        assert_eq!(
            self.nodes.len(),
            self.len,
            "INVARIANT VIOLATED: live arena nodes={} != len()={}",
            self.nodes.len(),
            self.len
        );

        let mut previous: Option<&T> = None;
        for value in self.iter() {
            if let Some(prev) = previous {
                assert!(prev <= value, "INVARIANT VIOLATED: in-order traversal not sorted");
            }
            previous = Some(value);
        }
    }

    /// Returns (node count, height) of the subtree at `idx`.
    fn check_subtree(&self, idx: Idx) -> (usize, u32) {
        if idx == NONE {
            return (0, 0);
        }
        let node = &self.nodes[idx];
        for child in [node.left, node.right] {
            if child != NONE {
                assert_eq!(
                    self.nodes[child].parent, idx,
                    "INVARIANT VIOLATED: child {} does not link back to parent {}",
                    child, idx
                );
            }
        }

        let (left_count, left_height) = self.check_subtree(node.left);
        let (right_count, right_height) = self.check_subtree(node.right);
        let height = 1 + left_height.max(right_height);
        assert_eq!(
            node.height, height,
            "INVARIANT VIOLATED: cached height={} != actual height={} at node {}",
            node.height, height, idx
        );
        assert!(
            left_height.abs_diff(right_height) <= 1,
            "INVARIANT VIOLATED: node {} unbalanced (left={}, right={})",
            idx,
            left_height,
            right_height
        );
        return (left_count + right_count + 1, height);
    }
}

impl<T: Ord> Default for AvlTree<T> {
    fn default() -> Self {
        return Self::new();
    }
}

impl<T: Ord + fmt::Debug> fmt::Debug for AvlTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.debug_set().entries(self.iter()).finish();
    }
}

impl<T: Ord> Extend<T> for AvlTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<T: Ord> FromIterator<T> for AvlTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = AvlTree::new();
        tree.extend(iter);
        return tree;
    }
}

impl<'a, T: Ord> IntoIterator for &'a AvlTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        return self.iter();
    }
}

impl<T: Ord> OrderedCollection<T> for AvlTree<T> {
    type Iter<'a>
        = Iter<'a, T>
    where
        T: 'a;

    fn add(&mut self, value: T) {
        AvlTree::add(self, value);
    }

    fn contains(&self, value: &T) -> bool {
        return AvlTree::contains(self, value);
    }

    fn remove(&mut self, value: &T) -> bool {
        return AvlTree::remove(self, value);
    }

    fn clear(&mut self) {
        AvlTree::clear(self);
    }

    fn len(&self) -> usize {
        return self.len;
    }

    fn iter(&self) -> Iter<'_, T> {
        return AvlTree::iter(self);
    }
}

/// In-order iterator over an [`AvlTree`], driven by an explicit stack.
pub struct Iter<'a, T> {
    nodes: &'a Arena<AvlNode<T>>,
    /// Nodes whose left subtree is being visited, innermost on top.
    stack: SmallVec<[Idx; 32]>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    fn push_left_spine(&mut self, mut idx: Idx) {
        while idx != NONE {
            self.stack.push(idx);
            idx = self.nodes[idx].left;
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let idx = self.stack.pop()?;
        let nodes = self.nodes;
        let node = &nodes[idx];
        self.push_left_spine(node.right);
        self.remaining -= 1;
        return Some(&node.value);
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        return (self.remaining, Some(self.remaining));
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
