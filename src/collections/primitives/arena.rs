//! Index arena for node-based collections.
//!
//! Nodes live in a `Vec` and refer to each other by `u32` index instead of
//! by reference, so parent back-links and shared forward pointers need no
//! `Rc`, `RefCell` or `unsafe`. Freed slots go on a free list and are reused
//! by the next allocation.

use std::ops::Index;
use std::ops::IndexMut;

/// Index of a node in an [`Arena`].
pub type Idx = u32;

/// Null link marker.
pub const NONE: Idx = Idx::MAX;

/// Reserved for a collection's own sentinel link. Never handed out by
/// [`Arena::alloc`].
pub const SENTINEL: Idx = NONE - 1;

/// Index for a slot pushed onto a `Vec` of `len` slots.
///
/// # Panics
/// Panics if the index would collide with [`SENTINEL`] or [`NONE`].
fn fresh_index(len: usize) -> Idx {
    assert!(len < SENTINEL as usize, "arena exhausted the u32 index space");
    return len as Idx;
}

/// Growable node storage with slot reuse.
#[derive(Clone, Debug)]
pub struct Arena<T> {
    /// Node slots. `None` marks a freed slot waiting on the free list.
    slots: Vec<Option<T>>,
    /// Indices of freed slots.
    free_list: Vec<Idx>,
    /// Number of live nodes.
    len: usize,
}

impl<T> Arena<T> {
    pub fn new() -> Arena<T> {
        return Arena {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        };
    }

    /// Number of live nodes.
    #[inline(always)]
    pub fn len(&self) -> usize {
        return self.len;
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        return self.len == 0;
    }

    /// Store a node, reusing a freed slot if one is available.
    pub fn alloc(&mut self, value: T) -> Idx {
        self.len += 1;
        if let Some(idx) = self.free_list.pop() {
            self.slots[idx as usize] = Some(value);
            return idx;
        }
        let idx = fresh_index(self.slots.len());
        self.slots.push(Some(value));
        return idx;
    }

    /// Remove a node and hand back its value.
    ///
    /// # Panics
    /// Panics if the slot is already free.
    pub fn free(&mut self, idx: Idx) -> T {
        let Some(value) = self.slots.get_mut(idx as usize).and_then(Option::take) else {
            panic!("free of vacant arena slot {idx}");
        };
        self.free_list.push(idx);
        self.len -= 1;
        return value;
    }

    pub fn get(&self, idx: Idx) -> Option<&T> {
        return self.slots.get(idx as usize).and_then(Option::as_ref);
    }

    pub fn get_mut(&mut self, idx: Idx) -> Option<&mut T> {
        return self.slots.get_mut(idx as usize).and_then(Option::as_mut);
    }

    /// Drop every node and forget all slots.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.len = 0;
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        return Self::new();
    }
}

impl<T> Index<Idx> for Arena<T> {
    type Output = T;

    #[inline]
    fn index(&self, idx: Idx) -> &T {
        match self.get(idx) {
            Some(value) => return value,
            None => panic!("use of vacant arena slot {idx}"),
        }
    }
}

impl<T> IndexMut<Idx> for Arena<T> {
    #[inline]
    fn index_mut(&mut self, idx: Idx) -> &mut T {
        match self.get_mut(idx) {
            Some(value) => return value,
            None => panic!("use of vacant arena slot {idx}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_index() {
        let mut arena = Arena::new();
        let a = arena.alloc("a");
        let b = arena.alloc("b");
        assert_eq!(arena[a], "a");
        assert_eq!(arena[b], "b");
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn free_returns_value_and_reuses_slot() {
        let mut arena = Arena::new();
        let a = arena.alloc(1);
        let _b = arena.alloc(2);
        assert_eq!(arena.free(a), 1);
        assert_eq!(arena.len(), 1);
        assert!(arena.get(a).is_none());

        let c = arena.alloc(3);
        assert_eq!(c, a, "freed slot should be reused");
        assert_eq!(arena[c], 3);
    }

    #[test]
    #[should_panic(expected = "free of vacant arena slot")]
    fn double_free_panics() {
        let mut arena = Arena::new();
        let a = arena.alloc(1);
        arena.free(a);
        arena.free(a);
    }

    #[test]
    #[should_panic(expected = "use of vacant arena slot")]
    fn index_after_free_panics() {
        let mut arena = Arena::new();
        let a = arena.alloc(1);
        arena.free(a);
        let _value = arena[a];
    }

    #[test]
    fn fresh_index_below_reserved_links() {
        assert_eq!(fresh_index(0), 0);
        assert_eq!(fresh_index(SENTINEL as usize - 1), SENTINEL - 1);
    }

    #[test]
    #[should_panic(expected = "arena exhausted")]
    fn fresh_index_never_returns_sentinel() {
        fresh_index(SENTINEL as usize);
    }

    #[test]
    #[should_panic(expected = "arena exhausted")]
    fn fresh_index_never_returns_none() {
        fresh_index(NONE as usize);
    }

    #[test]
    fn clear_resets() {
        let mut arena = Arena::new();
        for i in 0..10 {
            arena.alloc(i);
        }
        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.alloc(42), 0);
    }
}
