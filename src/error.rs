//! Error type shared by every collection.
//!
//! Not-found conditions are never errors: `contains`, `remove` and the
//! lookup methods report them through `bool` or `Option`. `Error` covers
//! rejected arguments and keyed operations whose precondition failed.

/// Unified error type for the collections.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// `HashTable::add` was called with a key that is already stored.
    #[error("key already exists")]
    KeyExists,

    /// A keyed read or update named a key that is not stored.
    #[error("key not found")]
    KeyNotFound,

    /// Hash table capacity must be at least one bucket.
    #[error("capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),

    /// Fill factor must be a finite number in `(0, 1]`.
    #[error("fill factor must be in (0, 1], got {0}")]
    InvalidFillFactor(f64),

    /// B-tree minimum degree must be at least 2.
    #[error("minimum degree must be at least 2, got {0}")]
    InvalidDegree(usize),

    /// Skip list level cap must fit in the 64 coin flips of one sample.
    #[error("max levels must be in 1..={max}, got {got}")]
    InvalidMaxLevels { got: usize, max: usize },

    /// A B-tree node was built in a state that breaks its structural rules.
    #[error("invalid b-tree node: {0}")]
    InvalidNode(&'static str),
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
