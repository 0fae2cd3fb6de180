//! The container implementations.
//!
//! - `avl`: height-balanced binary search tree
//! - `btree`: multi-way search tree with configurable minimum degree
//! - `hash_table`: chained hash map with doubling growth
//! - `skip_list`: randomized multi-level linked list
//!
//! The node-based containers share the index arena in `primitives`.

pub mod avl;
pub mod btree;
pub mod hash_table;
pub mod primitives;
pub mod skip_list;

pub use avl::AvlTree;
pub use btree::BTree;
pub use hash_table::HashTable;
pub use skip_list::SkipList;
