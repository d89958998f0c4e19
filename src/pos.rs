/// A slot index interpreted modulo the capacity of the block it points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pos {
    // Invariant: `at` < `cap` (or `cap` == 0 and `at` == 0)
    at: usize,
    cap: usize,
}

impl Pos {
    /// Returns the first slot of a block with `cap` slots.
    pub const fn origin(cap: usize) -> Self {
        Self { at: 0, cap }
    }

    /// # Safety
    /// The following invariant must be held:
    /// - `at` < `cap` (or `cap` == 0 and `at` == 0)
    pub const unsafe fn new_unchecked(at: usize, cap: usize) -> Self {
        debug_assert!(at < cap || (cap == 0 && at == 0));
        Self { at, cap }
    }

    #[inline(always)]
    pub const fn at(&self) -> usize {
        self.at
    }

    #[inline(always)]
    pub const fn cap(&self) -> usize {
        self.cap
    }

    #[inline(always)]
    pub fn incr(&mut self) {
        self.at += 1;
        if self.at >= self.cap {
            self.at = 0;
        }
    }

    #[inline(always)]
    pub fn decr(&mut self) {
        if self.at == 0 {
            self.at = self.cap.saturating_sub(1);
        } else {
            self.at -= 1;
        }
    }

    /// Returns the position `n` slots further, wrapping at the end of the block.
    #[inline]
    pub const fn add(self, n: usize) -> Self {
        if self.cap == 0 {
            return self;
        }
        // both terms are < `cap`, so the sum cannot overflow
        let at = self.at + n % self.cap;
        Self {
            at: if at >= self.cap { at - self.cap } else { at },
            cap: self.cap,
        }
    }

    /// Returns the position `n` slots back, wrapping at the start of the block.
    #[inline]
    pub const fn sub(self, n: usize) -> Self {
        if self.cap == 0 {
            return self;
        }
        self.add(self.cap - n % self.cap)
    }

    /// Returns the logical index of this position in a sequence starting at `front`.
    ///
    /// The result is always < `cap` (or 0 if `cap` == 0).
    #[inline]
    pub const fn offset_from(self, front: Pos) -> usize {
        debug_assert!(self.cap == front.cap);
        if self.at >= front.at {
            self.at - front.at
        } else {
            self.cap - front.at + self.at
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Pos;

    #[test]
    fn test_incr_decr_wrap() {
        let mut pos = Pos::origin(3);
        pos.decr();
        assert_eq!(pos.at(), 2);
        pos.incr();
        assert_eq!(pos.at(), 0);
        pos.incr();
        pos.incr();
        assert_eq!(pos.at(), 2);
        pos.incr();
        assert_eq!(pos, Pos::origin(3));
    }

    #[test]
    fn test_add_sub() {
        let pos = unsafe { Pos::new_unchecked(3, 5) };
        assert_eq!(pos.add(0).at(), 3);
        assert_eq!(pos.add(2).at(), 0);
        assert_eq!(pos.add(4).at(), 2);
        assert_eq!(pos.add(5).at(), 3);
        assert_eq!(pos.add(13).at(), 1);
        assert_eq!(pos.sub(3).at(), 0);
        assert_eq!(pos.sub(4).at(), 4);
        assert_eq!(pos.sub(5).at(), 3);
        assert_eq!(pos.sub(0).at(), 3);
    }

    #[test]
    fn test_offset_from_across_wrap() {
        let front = unsafe { Pos::new_unchecked(3, 5) };
        assert_eq!(front.offset_from(front), 0);
        assert_eq!(front.add(1).offset_from(front), 1);
        // slot 0 comes after slots 3 and 4
        assert_eq!(Pos::origin(5).offset_from(front), 2);
        assert_eq!(front.add(4).offset_from(front), 4);
    }

    #[test]
    fn test_zero_cap() {
        let mut pos = Pos::origin(0);
        assert_eq!(pos.add(7), pos);
        assert_eq!(pos.sub(7), pos);
        assert_eq!(pos.offset_from(pos), 0);
        pos.decr();
        pos.incr();
        assert_eq!(pos.at(), 0);
    }
}
