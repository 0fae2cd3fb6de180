//! Hash Table
//!
//! A key-value map using separate chaining. Each bucket slot holds an
//! optional singly linked chain of entries, allocated the first time a key
//! lands in that slot. A key's bucket is `hash(key) % capacity`.
//!
//! # Growth
//!
//! The table tracks `max_items = floor(capacity * fill_factor) + 1`. An
//! `add` that finds the table already holding `max_items` entries first
//! doubles the bucket array and relinks every entry into its new bucket.
//! Entries are moved, not reallocated.
//!
//! # Errors
//!
//! `add` on a stored key fails with [`Error::KeyExists`] and leaves the table
//! untouched. `value` and `update` on a missing key fail with
//! [`Error::KeyNotFound`]. `Index` panics on a missing key.

use std::borrow::Borrow;
use std::fmt;
use std::hash::BuildHasher;
use std::hash::Hash;
use std::ops::Index;
use std::ops::IndexMut;

use rustc_hash::FxBuildHasher;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::config::HashTableConfig;
use crate::error::Error;
use crate::error::Result;

/// One key-value entry in a bucket chain.
struct Link<K, V> {
    key: K,
    value: V,
    next: Option<Box<Link<K, V>>>,
}

/// Singly linked list of entries sharing a bucket.
struct Chain<K, V> {
    head: Option<Box<Link<K, V>>>,
}

impl<K, V> Chain<K, V> {
    fn new() -> Chain<K, V> {
        return Chain { head: None };
    }

    fn push_front(&mut self, mut link: Box<Link<K, V>>) {
        link.next = self.head.take();
        self.head = Some(link);
    }

    fn pop_front(&mut self) -> Option<Box<Link<K, V>>> {
        let mut link = self.head.take()?;
        self.head = link.next.take();
        return Some(link);
    }

    fn find<Q>(&self, key: &Q) -> Option<&Link<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut cursor = self.head.as_deref();
        while let Some(link) = cursor {
            if key_matches(&link.key, key) {
                return Some(link);
            }
            cursor = link.next.as_deref();
        }
        return None;
    }

    fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut Link<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut cursor = self.head.as_deref_mut();
        while let Some(link) = cursor {
            if key_matches(&link.key, key) {
                return Some(link);
            }
            cursor = link.next.as_deref_mut();
        }
        return None;
    }

    /// Unlink the entry for `key`.
    fn remove<Q>(&mut self, key: &Q) -> Option<Box<Link<K, V>>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut cursor = &mut self.head;
        while cursor.as_ref().is_some_and(|link| !key_matches(&link.key, key)) {
            cursor = &mut cursor.as_mut()?.next;
        }
        let mut removed = cursor.take()?;
        *cursor = removed.next.take();
        return Some(removed);
    }
}

impl<K, V> Drop for Chain<K, V> {
    // Unlink one entry at a time so a long chain cannot overflow the stack
    // through recursive `Box` drops.
    fn drop(&mut self) {
        let mut cursor = self.head.take();
        while let Some(mut link) = cursor {
            cursor = link.next.take();
        }
    }
}

#[inline]
fn key_matches<K, Q>(stored: &K, key: &Q) -> bool
where
    K: Borrow<Q>,
    Q: ?Sized + Eq,
{
    return key.eq(stored.borrow());
}

fn max_items_for(capacity: usize, fill_factor: f64) -> usize {
    return (capacity as f64 * fill_factor) as usize + 1;
}

/// A chained hash map with doubling growth.
pub struct HashTable<K, V, S = FxBuildHasher> {
    buckets: Vec<Option<Chain<K, V>>>,
    hasher: S,
    len: usize,
    fill_factor: f64,
    /// Entry count at which the next `add` grows the table.
    max_items: usize,
}

impl<K: Hash + Eq, V> HashTable<K, V, FxBuildHasher> {
    /// An empty table with 1000 buckets and a 0.75 fill factor.
    pub fn new() -> HashTable<K, V, FxBuildHasher> {
        let config = HashTableConfig::default();
        return HashTable::from_parts(config.initial_capacity, config.fill_factor, FxBuildHasher);
    }

    pub fn with_capacity(capacity: usize) -> Result<HashTable<K, V, FxBuildHasher>> {
        return Self::with_config(HashTableConfig::default().with_initial_capacity(capacity));
    }

    pub fn with_config(config: HashTableConfig) -> Result<HashTable<K, V, FxBuildHasher>> {
        return Self::with_config_and_hasher(config, FxBuildHasher);
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> HashTable<K, V, S> {
    pub fn with_config_and_hasher(config: HashTableConfig, hasher: S) -> Result<HashTable<K, V, S>> {
        config.validate()?;
        return Ok(HashTable::from_parts(config.initial_capacity, config.fill_factor, hasher));
    }

    fn from_parts(capacity: usize, fill_factor: f64, hasher: S) -> HashTable<K, V, S> {
        let mut buckets = Vec::with_capacity(capacity);
        buckets.resize_with(capacity, || None);
        return HashTable {
            buckets,
            hasher,
            len: 0,
            fill_factor,
            max_items: max_items_for(capacity, fill_factor),
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

    /// Number of bucket slots.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        return self.buckets.len();
    }

    #[inline]
    fn bucket_index<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized + Hash,
    {
        return (self.hasher.hash_one(key) % self.buckets.len() as u64) as usize;
    }

    fn chain<Q>(&self, key: &Q) -> Option<&Chain<K, V>>
    where
        Q: ?Sized + Hash,
    {
        return self.buckets[self.bucket_index(key)].as_ref();
    }

    fn chain_mut<Q>(&mut self, key: &Q) -> Option<&mut Chain<K, V>>
    where
        Q: ?Sized + Hash,
    {
        let index = self.bucket_index(key);
        return self.buckets[index].as_mut();
    }

    /// Insert a new entry. Fails without touching the table if `key` is
    /// already stored.
    pub fn add(&mut self, key: K, value: V) -> Result<()> {
        if self.contains_key(&key) {
            return Err(Error::KeyExists);
        }
        if self.len >= self.max_items {
            self.grow();
        }

        let index = self.bucket_index(&key);
        let link = Box::new(Link {
            key,
            value,
            next: None,
        });
        self.buckets[index].get_or_insert_with(Chain::new).push_front(link);
        self.len += 1;
        return Ok(());
    }

    /// Double the bucket array and relink every entry.
    fn grow(&mut self) {
        let old_capacity = self.buckets.len();
        let new_capacity = old_capacity * 2;
        let mut buckets = Vec::with_capacity(new_capacity);
        buckets.resize_with(new_capacity, || None);
        let old_buckets = std::mem::replace(&mut self.buckets, buckets);

        for mut chain in old_buckets.into_iter().flatten() {
            while let Some(link) = chain.pop_front() {
                let index = self.bucket_index(&link.key);
                self.buckets[index].get_or_insert_with(Chain::new).push_front(link);
            }
        }

        self.max_items = max_items_for(new_capacity, self.fill_factor);
        debug!(old_capacity, new_capacity, len = self.len, "hash table grow");
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let link = self.chain(key)?.find(key)?;
        return Some(&link.value);
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let link = self.chain_mut(key)?.find_mut(key)?;
        return Some(&mut link.value);
    }

    /// The value stored for `key`, or [`Error::KeyNotFound`].
    pub fn value<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        return self.get(key).ok_or(Error::KeyNotFound);
    }

    /// Overwrite the value of an existing entry. Never inserts.
    pub fn update<Q>(&mut self, key: &Q, value: V) -> Result<()>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let slot = self.get_mut(key).ok_or(Error::KeyNotFound)?;
        *slot = value;
        return Ok(());
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        return self.get(key).is_some();
    }

    /// Linear scan over every stored value.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        return self.values().any(|stored| stored == value);
    }

    /// Remove the entry for `key`. Returns false if none was stored.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        return self.take(key).is_some();
    }

    /// Remove the entry for `key` and return its value.
    pub fn take<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let link = self.chain_mut(key)?.remove(key)?;
        self.len -= 1;
        return Some(link.value);
    }

    /// Drop every entry. The bucket array keeps its current size.
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            *bucket = None;
        }
        self.len = 0;
    }

    /// Entries in bucket order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        return Iter {
            buckets: self.buckets.iter(),
            link: None,
            remaining: self.len,
        };
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        return self.iter().map(|(key, _)| key);
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        return self.iter().map(|(_, value)| value);
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        return ValuesMut {
            buckets: self.buckets.iter_mut(),
            link: None,
            remaining: self.len,
        };
    }

    // --- Invariant checking ---

    /// Walk every bucket and panic if an entry sits in the wrong bucket, a
    /// key is stored twice, or the count is off. O(n).
    pub fn check_invariants(&self) {
        assert!(!self.buckets.is_empty(), "INVARIANT VIOLATED: zero buckets");
        assert_eq!(
            self.max_items,
            max_items_for(self.buckets.len(), self.fill_factor),
            "INVARIANT VIOLATED: stale growth threshold"
        );

        let mut seen = FxHashSet::default();
        let mut count = 0;
        for (index, bucket) in self.buckets.iter().enumerate() {
            let Some(chain) = bucket else {
                continue;
            };
            let mut cursor = chain.head.as_deref();
            while let Some(link) = cursor {
                assert_eq!(
                    self.bucket_index(&link.key),
                    index,
                    "INVARIANT VIOLATED: entry stored in the wrong bucket"
                );
                assert!(seen.insert(&link.key), "INVARIANT VIOLATED: duplicate key");
                count += 1;
                cursor = link.next.as_deref();
            }
        }

        assert_eq!(
            count, self.len,
            "INVARIANT VIOLATED: stored entries={} != len()={}",
            count, self.len
        );
        assert!(
            self.len <= self.max_items,
            "INVARIANT VIOLATED: len()={} past growth threshold {}",
            self.len,
            self.max_items
        );
    }
}

impl<K: Hash + Eq, V, S: BuildHasher + Default> Default for HashTable<K, V, S> {
    fn default() -> Self {
        let config = HashTableConfig::default();
        return HashTable::from_parts(config.initial_capacity, config.fill_factor, S::default());
    }
}

impl<K, V, S> fmt::Debug for HashTable<K, V, S>
where
    K: Hash + Eq + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.debug_map().entries(self.iter()).finish();
    }
}

impl<K, Q, V, S> Index<&Q> for HashTable<K, V, S>
where
    K: Hash + Eq + Borrow<Q>,
    Q: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    type Output = V;

    /// # Panics
    /// Panics if `key` is not stored.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(value) => return value,
            None => panic!("{}", Error::KeyNotFound),
        }
    }
}

impl<K, Q, V, S> IndexMut<&Q> for HashTable<K, V, S>
where
    K: Hash + Eq + Borrow<Q>,
    Q: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    fn index_mut(&mut self, key: &Q) -> &mut V {
        match self.get_mut(key) {
            Some(value) => return value,
            None => panic!("{}", Error::KeyNotFound),
        }
    }
}

impl<'a, K: Hash + Eq, V, S: BuildHasher> IntoIterator for &'a HashTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        return self.iter();
    }
}

/// Iterator over the entries of a [`HashTable`], in bucket order.
pub struct Iter<'a, K, V> {
    buckets: std::slice::Iter<'a, Option<Chain<K, V>>>,
    link: Option<&'a Link<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        loop {
            if let Some(link) = self.link {
                self.link = link.next.as_deref();
                self.remaining -= 1;
                return Some((&link.key, &link.value));
            }
            let bucket = self.buckets.next()?;
            self.link = bucket.as_ref().and_then(|chain| chain.head.as_deref());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        return (self.remaining, Some(self.remaining));
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Mutable iterator over the values of a [`HashTable`].
pub struct ValuesMut<'a, K, V> {
    buckets: std::slice::IterMut<'a, Option<Chain<K, V>>>,
    link: Option<&'a mut Link<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<&'a mut V> {
        loop {
            if let Some(link) = self.link.take() {
                let Link { value, next, .. } = link;
                self.link = next.as_deref_mut();
                self.remaining -= 1;
                return Some(value);
            }
            let bucket = self.buckets.next()?;
            self.link = bucket.as_mut().and_then(|chain| chain.head.as_deref_mut());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        return (self.remaining, Some(self.remaining));
    }
}
