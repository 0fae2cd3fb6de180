//! Skip list level sampling.
//!
//! A node's height is one plus the number of consecutive heads in a run of
//! fair coin flips, read from the low bits of a random word. The height may
//! exceed the list's current level count by at most one, and the level count
//! grows to match. Kept free of any RNG so tests can feed exact bit patterns.

/// Sample a node height from `bits`, growing `levels` when a new top level
/// is reached.
///
/// Returns a height in `1..=levels` (after any growth). `levels` never
/// exceeds `max_levels`.
pub fn pick_height(bits: u64, levels: &mut usize, max_levels: usize) -> usize {
    let mut bits = bits;
    let mut height = 1;

    while bits & 1 == 1 && height < max_levels {
        if height == *levels {
            // One level above the current top: open it and stop flipping.
            *levels += 1;
            height += 1;
            break;
        }
        bits >>= 1;
        height += 1;
    }

    return height;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tails_first_gives_height_one() {
        let mut levels = 5;
        assert_eq!(pick_height(0b0, &mut levels, 33), 1);
        assert_eq!(pick_height(0b110, &mut levels, 33), 1);
        assert_eq!(levels, 5);
    }

    #[test]
    fn heads_run_counts_levels() {
        let mut levels = 10;
        assert_eq!(pick_height(0b0111, &mut levels, 33), 4);
        assert_eq!(levels, 10);
    }

    #[test]
    fn grows_by_at_most_one() {
        let mut levels = 1;
        assert_eq!(pick_height(u64::MAX, &mut levels, 33), 2);
        assert_eq!(levels, 2);
        assert_eq!(pick_height(u64::MAX, &mut levels, 33), 3);
        assert_eq!(levels, 3);
    }

    #[test]
    fn capped_by_max_levels() {
        let mut levels = 4;
        assert_eq!(pick_height(u64::MAX, &mut levels, 4), 4);
        assert_eq!(levels, 4);

        let mut levels = 1;
        assert_eq!(pick_height(u64::MAX, &mut levels, 1), 1);
        assert_eq!(levels, 1);
    }
}
