use std::{
    fmt::{self, Debug, Formatter},
    ptr,
};

use crate::{
    pos::Pos,
    storage::{Heap, Storage},
    RingBuffer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    At(Pos),
    // one past the back item
    End,
}

/// A read-only cursor over a ring buffer.
///
/// A cursor points either at an item or at the "end" position past the back item. Moving forward
/// from the back item reaches the end; moving forward from the end wraps to the front item.
/// Moving backward works the other way around.
///
/// # Examples
/// ```
/// # use bounded_ring::RingBuffer;
/// let mut buf = RingBuffer::from([0, 1, 2]);
/// buf.push_back(3);
///
/// let mut cursor = buf.cursor_front();
/// assert_eq!(cursor.current(), Some(&1));
/// cursor.move_next();
/// cursor.move_next();
/// assert_eq!(cursor.current(), Some(&3));
/// cursor.move_next();
/// assert_eq!(cursor, buf.cursor_end());
/// cursor.move_prev();
/// assert_eq!(cursor.current(), Some(&3));
/// ```
pub struct Cursor<'buf, T, S: Storage<T> = Heap> {
    buf: &'buf RingBuffer<T, S>,
    // Invariant: an `At` slot lies within the live range of `buf`
    slot: Slot,
}

impl<T, S: Storage<T>> Clone for Cursor<'_, T, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, S: Storage<T>> Copy for Cursor<'_, T, S> {}

impl<'buf, T, S: Storage<T>> Cursor<'buf, T, S> {
    /// Creates a cursor at the given logical index, or at the end if it is out of bounds.
    pub(crate) fn new(buf: &'buf RingBuffer<T, S>, index: usize) -> Self {
        Self {
            buf,
            slot: Self::slot_at(buf, index),
        }
    }

    fn slot_at(buf: &RingBuffer<T, S>, index: usize) -> Slot {
        if index < buf.len {
            Slot::At(buf.front.add(index))
        } else {
            Slot::End
        }
    }

    /// Returns the ring buffer the cursor walks over.
    pub fn as_ring(&self) -> &'buf RingBuffer<T, S> {
        self.buf
    }

    /// Returns the logical index of the cursor, which is `len()` at the end position.
    pub fn index(&self) -> usize {
        match self.slot {
            Slot::At(pos) => pos.offset_from(self.buf.front),
            Slot::End => self.buf.len,
        }
    }

    /// Returns `true` if the cursor is past the back item.
    pub fn is_end(&self) -> bool {
        self.slot == Slot::End
    }

    /// Returns the item the cursor points at, or `None` at the end position.
    pub fn current(&self) -> Option<&'buf T> {
        match self.slot {
            Slot::At(pos) => {
                debug_assert!(pos.offset_from(self.buf.front) < self.buf.len);
                // SAFETY: the invariant of `Self` is that an `At` slot holds a live item
                Some(unsafe { &*self.buf.slot(pos) })
            }
            Slot::End => None,
        }
    }

    /// Moves to the next item, or to the end position after the back item.
    ///
    /// From the end position, moves to the front item.
    pub fn move_next(&mut self) {
        self.slot = match self.slot {
            Slot::At(mut pos) => {
                pos.incr();
                if pos == self.buf.back {
                    Slot::End
                } else {
                    Slot::At(pos)
                }
            }
            Slot::End => Self::slot_at(self.buf, 0),
        };
    }

    /// Moves to the previous item, or to the end position before the front item.
    ///
    /// From the end position, moves to the back item.
    pub fn move_prev(&mut self) {
        self.slot = match self.slot {
            Slot::At(pos) if pos == self.buf.front => Slot::End,
            Slot::At(mut pos) => {
                pos.decr();
                Slot::At(pos)
            }
            Slot::End => match self.buf.len.checked_sub(1) {
                Some(last) => Slot::At(self.buf.front.add(last)),
                None => Slot::End,
            },
        };
    }

    /// Moves the cursor by `offset` logical positions, where the end position counts as index `len()`.
    ///
    /// # Panics
    /// Panics if the target index is negative or greater than `len()`.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let buf = RingBuffer::from(['a', 'b', 'c', 'd']);
    /// let mut cursor = buf.cursor_end();
    /// cursor.seek(-3);
    /// assert_eq!(cursor.current(), Some(&'b'));
    /// cursor.seek(2);
    /// assert_eq!(cursor.index(), 3);
    /// cursor.seek(1);
    /// assert!(cursor.is_end());
    /// ```
    #[track_caller]
    pub fn seek(&mut self, offset: isize) {
        let len = self.buf.len;
        match self.index().checked_add_signed(offset) {
            Some(index) if index <= len => self.slot = Self::slot_at(self.buf, index),
            _ => panic!(
                "cursor moved out of range: index {} offset {offset} with len {len}",
                self.index()
            ),
        }
    }

    /// Returns how many positions `self` is ahead of `other`.
    ///
    /// # Panics
    /// Panics if the cursors walk over different ring buffers.
    #[track_caller]
    pub fn distance(&self, other: &Self) -> isize {
        assert!(
            ptr::eq(self.buf, other.buf),
            "cursors belong to different ring buffers"
        );
        self.index() as isize - other.index() as isize
    }
}

impl<T, S: Storage<T>> PartialEq for Cursor<'_, T, S> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.buf, other.buf) && self.slot == other.slot
    }
}

impl<T, S: Storage<T>> Eq for Cursor<'_, T, S> {}

impl<T: Debug, S: Storage<T>> Debug for Cursor<'_, T, S> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("index", &self.index())
            .field("current", &self.current())
            .finish()
    }
}
