//! Shared building blocks for the node-based collections.
//!
//! - `Arena`: index-linked node storage with a free list
//! - `pick_height`: coin-flip level sampling for the skip list

pub mod arena;
pub mod level;

pub use arena::Arena;
pub use arena::Idx;
pub use arena::NONE;
pub use arena::SENTINEL;
pub use level::pick_height;
