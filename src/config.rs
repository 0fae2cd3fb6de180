//! Construction options for the configurable collections.
//!
//! Each config has defaults matching the classic parameters (1000 buckets
//! at a 0.75 fill factor, minimum degree 2, 33 skip list levels) and is
//! checked by `validate` before a collection is built from it.

use crate::error::Error;
use crate::error::Result;

/// Largest level cap a skip list accepts: one coin flip per bit of a `u64`.
pub const MAX_SKIP_LEVELS: usize = 64;

/// Options for [`HashTable`](crate::HashTable).
#[derive(Clone, Debug, PartialEq)]
pub struct HashTableConfig {
    /// Number of buckets allocated up front.
    pub initial_capacity: usize,
    /// Fraction of `capacity` that may be filled before the table doubles.
    pub fill_factor: f64,
}

impl HashTableConfig {
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> HashTableConfig {
        self.initial_capacity = initial_capacity;
        return self;
    }

    pub fn with_fill_factor(mut self, fill_factor: f64) -> HashTableConfig {
        self.fill_factor = fill_factor;
        return self;
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity < 1 {
            return Err(Error::InvalidCapacity(self.initial_capacity));
        }
        if !self.fill_factor.is_finite() || self.fill_factor <= 0.0 || self.fill_factor > 1.0 {
            return Err(Error::InvalidFillFactor(self.fill_factor));
        }
        return Ok(());
    }
}

impl Default for HashTableConfig {
    fn default() -> Self {
        return HashTableConfig {
            initial_capacity: 1000,
            fill_factor: 0.75,
        };
    }
}

/// Options for [`BTree`](crate::BTree).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BTreeConfig {
    /// Minimum degree `t`: non-root nodes hold `t - 1 ..= 2t - 1` values.
    pub min_degree: usize,
}

impl BTreeConfig {
    pub fn with_min_degree(mut self, min_degree: usize) -> BTreeConfig {
        self.min_degree = min_degree;
        return self;
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_degree < 2 {
            return Err(Error::InvalidDegree(self.min_degree));
        }
        return Ok(());
    }
}

impl Default for BTreeConfig {
    fn default() -> Self {
        return BTreeConfig { min_degree: 2 };
    }
}

/// Options for [`SkipList`](crate::SkipList).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkipListConfig {
    /// Number of forward-pointer levels on the head sentinel.
    pub max_levels: usize,
    /// Seed for the level sampler. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl SkipListConfig {
    pub fn with_max_levels(mut self, max_levels: usize) -> SkipListConfig {
        self.max_levels = max_levels;
        return self;
    }

    pub fn with_seed(mut self, seed: u64) -> SkipListConfig {
        self.seed = Some(seed);
        return self;
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_levels < 1 || self.max_levels > MAX_SKIP_LEVELS {
            return Err(Error::InvalidMaxLevels {
                got: self.max_levels,
                max: MAX_SKIP_LEVELS,
            });
        }
        return Ok(());
    }
}

impl Default for SkipListConfig {
    fn default() -> Self {
        return SkipListConfig {
            max_levels: 33,
            seed: None,
        };
    }
}
