//! Canopy - classic in-memory collections.
//!
//! Four standalone generic containers:
//!
//! - [`AvlTree`]: height-balanced binary search tree
//! - [`BTree`]: multi-way search tree, 2-3-4 shaped by default
//! - [`HashTable`]: chained hash map with doubling growth
//! - [`SkipList`]: randomized multi-level linked list
//!
//! The three ordered containers are multisets and share the
//! [`OrderedCollection`] trait.
//!
//! # Quick Start
//!
//! ```
//! use canopy::AvlTree;
//! use canopy::HashTable;
//!
//! let mut tree: AvlTree<i32> = [1, 2, 3, 4, 5].into_iter().collect();
//! assert!(tree.remove(&3));
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![1, 2, 4, 5]);
//!
//! let mut table = HashTable::new();
//! table.add("one", 1).unwrap();
//! assert_eq!(table.get("one"), Some(&1));
//! assert!(table.add("one", 2).is_err());
//! ```

pub mod collection;
pub mod collections;
pub mod config;
pub mod error;
pub mod oracle;

pub use collection::OrderedCollection;
pub use collections::AvlTree;
pub use collections::BTree;
pub use collections::HashTable;
pub use collections::SkipList;
pub use config::BTreeConfig;
pub use config::HashTableConfig;
pub use config::SkipListConfig;
pub use error::Error;
pub use error::Result;
