use crate::{storage::Storage, RingBuffer};

/// One of the two ends of a ring buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum End {
    Front,
    Back,
}

/// A free slot at one end of a ring buffer that is not full.
///
/// Obtained from [`RingBuffer::with_vacancy_back`] or [`RingBuffer::with_vacancy_front`].
pub struct VacantEntry<'buf, T, S: Storage<T>> {
    // Invariant: `buf.has_remaining()`
    buf: &'buf mut RingBuffer<T, S>,
    end: End,
}

impl<'buf, T, S: Storage<T>> VacantEntry<'buf, T, S> {
    pub(super) unsafe fn new_unchecked(buf: &'buf mut RingBuffer<T, S>, end: End) -> Self {
        debug_assert!(buf.has_remaining());
        Self { buf, end }
    }

    /// Returns the end of the ring buffer this entry writes to.
    pub fn end(&self) -> End {
        self.end
    }

    /// Writes the item into the free slot and returns a reference to it.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let mut buf = RingBuffer::with_capacity(2);
    /// *buf.with_vacancy_back().unwrap().write(1) += 10;
    /// buf.with_vacancy_front().unwrap().write(0);
    /// assert_eq!(buf, [0, 11]);
    /// assert!(buf.with_vacancy_back().is_none());
    /// ```
    pub fn write(self, item: T) -> &'buf mut T {
        let buf = self.buf;
        // SAFETY: the invariant of `Self` is that `buf.has_remaining()`, and the item written
        // is at index 0 or `len - 1` afterwards
        unsafe {
            match self.end {
                End::Back => {
                    buf.push_back_unchecked(item);
                    let index = buf.len() - 1;
                    buf.get_unchecked_mut(index)
                }
                End::Front => {
                    buf.push_front_unchecked(item);
                    buf.get_unchecked_mut(0)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{End, RingBuffer};

    #[test]
    fn test_entry_ends() {
        let mut arr = RingBuffer::with_capacity(3);
        let entry = arr.with_vacancy_front().unwrap();
        assert_eq!(entry.end(), End::Front);
        assert_eq!(*entry.write('b'), 'b');

        let entry = arr.with_vacancy_back().unwrap();
        assert_eq!(entry.end(), End::Back);
        entry.write('c');
        arr.with_vacancy_front().unwrap().write('a');

        assert_eq!(arr, ['a', 'b', 'c']);
        assert!(arr.with_vacancy_front().is_none());
    }

    #[test]
    fn test_entry_reference_points_at_written_slot() {
        let mut arr = RingBuffer::from([0, 1, 2]);
        arr.pop_front();
        // the free slot is now at the start of the block, behind the back
        *arr.with_vacancy_back().unwrap().write(3) *= 10;
        assert_eq!(arr, [1, 2, 30]);
        assert!(!arr.is_linearized());

        arr.pop_back();
        *arr.with_vacancy_front().unwrap().write(0) -= 1;
        assert_eq!(arr, [-1, 1, 2]);
    }
}
