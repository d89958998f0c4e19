//! In-place block-swap rotation used to linearize a wrapped ring.

/// Where the live run of a ring sits inside its block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Split {
    /// Index of the first live slot.
    pub front: usize,
    /// Number of live slots.
    pub len: usize,
    /// Number of slots in the block.
    pub cap: usize,
}

impl Split {
    /// Length of the span running from `front` towards the end of the block.
    pub const fn one(&self) -> usize {
        let to_end = self.cap - self.front;
        if self.len < to_end {
            self.len
        } else {
            to_end
        }
    }

    /// Length of the span that wrapped around to the start of the block.
    pub const fn two(&self) -> usize {
        self.len - self.one()
    }

    pub const fn is_linear(&self) -> bool {
        self.front + self.len <= self.cap
    }
}

/// Rotates `slots` so that the live run described by `split` starts at index 0 and returns the
/// new, single-span layout.
///
/// The free slots between the two spans travel with the rotation and end up after the run.
/// Uses O(1) extra memory and at most `slots.len()` swaps.
pub(crate) fn linearize<T>(slots: &mut [T], split: Split) -> Split {
    debug_assert_eq!(slots.len(), split.cap);
    if split.len == 0 || split.is_linear() {
        return split;
    }

    // [two | free | one] -> [one | two | free]
    block_swap_left(slots, split.front);
    Split {
        front: 0,
        len: split.len,
        cap: split.cap,
    }
}

/// Rotates `slots` left by `mid` by repeatedly exchanging equal-length blocks
/// between the shorter side and the far end of the longer side.
pub(crate) fn block_swap_left<T>(slots: &mut [T], mid: usize) {
    debug_assert!(mid <= slots.len());
    if mid == 0 || mid == slots.len() {
        return;
    }

    // `left` and `right` are the lengths of the two blocks that still need to change places;
    // they always meet at `mid`
    let mut left = mid;
    let mut right = slots.len() - mid;
    while left != right {
        if left < right {
            swap_blocks(slots, mid - left, mid + right - left, left);
            right -= left;
        } else {
            swap_blocks(slots, mid - left, mid, right);
            left -= right;
        }
    }
    swap_blocks(slots, mid - left, mid, left);
}

/// Exchanges `slots[a..a + n]` with `slots[b..b + n]`.
#[inline]
fn swap_blocks<T>(slots: &mut [T], a: usize, b: usize, n: usize) {
    debug_assert!(a + n <= b);
    let (lo, hi) = slots.split_at_mut(b);
    lo[a..a + n].swap_with_slice(&mut hi[..n]);
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    /// Lays out `0..len` the way a ring with the given split stores it, marking free slots with `None`.
    fn ring(split: Split) -> Vec<Option<usize>> {
        let mut slots = vec![None; split.cap];
        for i in 0..split.len {
            slots[(split.front + i) % split.cap] = Some(i);
        }
        slots
    }

    #[test]
    fn test_split_spans() {
        let split = Split {
            front: 3,
            len: 4,
            cap: 5,
        };
        assert_eq!((split.one(), split.two()), (2, 2));
        assert!(!split.is_linear());

        let split = Split {
            front: 1,
            len: 3,
            cap: 5,
        };
        assert_eq!((split.one(), split.two()), (3, 0));
        assert!(split.is_linear());
    }

    #[test]
    fn test_linearize_longer_first_span() {
        let split = Split {
            front: 2,
            len: 6,
            cap: 7,
        };
        let mut slots = ring(split);
        assert_eq!(slots, [Some(5), None, Some(0), Some(1), Some(2), Some(3), Some(4)]);

        let linear = linearize(&mut slots, split);
        assert_eq!(linear, Split { front: 0, ..split });
        assert_eq!(slots, [Some(0), Some(1), Some(2), Some(3), Some(4), Some(5), None]);
    }

    #[test]
    fn test_linearize_longer_second_span() {
        let split = Split {
            front: 6,
            len: 5,
            cap: 7,
        };
        let mut slots = ring(split);
        let linear = linearize(&mut slots, split);
        assert_eq!(linear.front, 0);
        assert_eq!(
            slots,
            [Some(0), Some(1), Some(2), Some(3), Some(4), None, None]
        );
    }

    #[test]
    fn test_linearize_full() {
        let split = Split {
            front: 3,
            len: 8,
            cap: 8,
        };
        let mut slots = ring(split);
        linearize(&mut slots, split);
        assert_eq!(slots, (0..8).map(Some).collect::<Vec<_>>());
    }

    #[test]
    fn test_linearize_noop() {
        let split = Split {
            front: 2,
            len: 3,
            cap: 6,
        };
        let mut slots = ring(split);
        let before = slots.clone();
        assert_eq!(linearize(&mut slots, split), split);
        assert_eq!(slots, before);

        let empty = Split {
            front: 4,
            len: 0,
            cap: 6,
        };
        assert_eq!(linearize(&mut slots, empty), empty);
    }

    proptest! {
        #[test]
        fn prop_block_swap_matches_rotate_left(len in 0usize..64, mid in 0usize..64) {
            let mid = mid % (len + 1);
            let mut slots: Vec<usize> = (0..len).collect();
            let mut expected = slots.clone();
            expected.rotate_left(mid);

            block_swap_left(&mut slots, mid);
            prop_assert_eq!(slots, expected);
        }

        #[test]
        fn prop_linearize_any_split(cap in 1usize..48, front in 0usize..48, len in 0usize..48) {
            let split = Split { front: front % cap, len: len % (cap + 1), cap };
            let mut slots = ring(split);

            let linear = linearize(&mut slots, split);
            prop_assert!(linear.is_linear());
            prop_assert_eq!(linear.len, split.len);
            let run: Vec<_> = slots[linear.front..linear.front + linear.len].to_vec();
            prop_assert_eq!(run, (0..split.len).map(Some).collect::<Vec<_>>());
        }
    }
}
