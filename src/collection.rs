//! The interface shared by the ordered collections.
//!
//! `AvlTree`, `BTree` and `SkipList` all store values under a total order and
//! iterate them ascending. The trait lets the conformance tests, the
//! benchmarks and the differential oracle drive any of them the same way.

/// An ordered multiset of `T`.
///
/// Implementors must:
/// - accept duplicates in `add`
/// - remove exactly one equal value per successful `remove`
/// - yield every stored value in non-decreasing order from `iter`
pub trait OrderedCollection<T: Ord> {
    /// Ascending iterator over stored values.
    type Iter<'a>: Iterator<Item = &'a T>
    where
        Self: 'a,
        T: 'a;

    /// Insert a value. Never fails.
    fn add(&mut self, value: T);

    /// Whether an equal value is stored.
    fn contains(&self, value: &T) -> bool;

    /// Remove one equal value. Returns false if none was stored.
    fn remove(&mut self, value: &T) -> bool;

    /// Remove every value.
    fn clear(&mut self);

    /// Number of stored values, counting duplicates.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        return self.len() == 0;
    }

    /// Start a fresh ascending traversal.
    fn iter(&self) -> Self::Iter<'_>;
}
