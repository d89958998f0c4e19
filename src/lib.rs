pub mod cursor;
pub mod entry;
pub mod error;
pub mod iter;
mod pos;
mod rotate;
#[cfg(feature = "serde")]
mod serde_impl;
pub mod storage;

use std::{
    cmp::Ordering,
    fmt::{Debug, Formatter},
    hash::{Hash, Hasher},
    iter::FromIterator,
    marker::PhantomData,
    mem::{self, MaybeUninit},
    ops::{Index, IndexMut},
    ptr::{self, NonNull},
    slice,
};

pub use self::{
    cursor::Cursor,
    entry::{End, VacantEntry},
    error::{BufferFullError, StorageError},
    iter::{IntoIter, Iter, IterMut},
    storage::{Block, Heap, HeapBlock, Inline, InlineBlock, Reallocate, Storage},
};

use self::{pos::Pos, rotate::Split};

/// Fixed-capacity double-ended ring buffer over a single block of slots.
///
/// The block is supplied by a [`Storage`] strategy: [`Heap`] by default, or [`Inline`] for a
/// block embedded in the buffer itself. Pushing to a full buffer with [`push_back`](Self::push_back)
/// or [`push_front`](Self::push_front) evicts the item at the opposite end; the `try_` variants
/// reject the item instead.
pub struct RingBuffer<T, S: Storage<T> = Heap> {
    storage: S,
    // `None` until storage is first acquired
    block: Option<S::Block>,
    // Invariant: exactly `len` items are initialized, starting from `front` and
    // circling back to the beginning of the block if overflowing its capacity
    front: Pos,
    // Invariant: `back == front.add(len)`
    back: Pos,
    len: usize,
    _marker: PhantomData<T>,
}

/// A ring buffer of `N` slots embedded in the value itself.
pub type InlineRingBuffer<T, const N: usize> = RingBuffer<T, Inline<N>>;

impl<T> RingBuffer<T, Heap> {
    /// Creates a new ring buffer without any storage.
    ///
    /// Its capacity is 0 until [`set_capacity`](Self::set_capacity) or [`resize`](Self::resize)
    /// is called.
    pub const fn new() -> Self {
        Self {
            storage: Heap,
            block: None,
            front: Pos::origin(0),
            back: Pos::origin(0),
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Creates a new empty ring buffer that can hold exactly `capacity` items.
    ///
    /// # Panics
    /// Panics if the allocation fails or `capacity` overflows.
    #[track_caller]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Heap)
    }

    /// Like [`with_capacity`](Self::with_capacity), but returns an error instead of panicking.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, StorageError> {
        Self::try_with_capacity_in(capacity, Heap)
    }

    /// Creates a full ring buffer of `n` clones of `value`.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let buf = RingBuffer::from_elem(7, 3);
    /// assert_eq!(buf, [7, 7, 7]);
    /// assert!(buf.is_full());
    /// ```
    #[track_caller]
    pub fn from_elem(value: T, n: usize) -> Self
    where
        T: Clone,
    {
        Self::with_capacity_filled(n, n, value)
    }

    /// Creates a ring buffer that can hold `capacity` items, with its first `len` slots holding clones of `value`.
    ///
    /// # Panics
    /// Panics if `len > capacity`, or if the allocation fails.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let buf = RingBuffer::with_capacity_filled(4, 2, 'x');
    /// assert_eq!(buf, ['x', 'x']);
    /// assert_eq!(buf.capacity(), 4);
    /// ```
    #[track_caller]
    pub fn with_capacity_filled(capacity: usize, len: usize, value: T) -> Self
    where
        T: Clone,
    {
        assert!(len <= capacity, "initial length exceeds capacity");
        let mut buf = Self::with_capacity(capacity);
        for _ in 0..len {
            // SAFETY: fewer than `len <= capacity` items were written so far
            unsafe { buf.push_back_unchecked(value.clone()) };
        }
        buf
    }

    /// Creates a full ring buffer out of the items of an iterator that knows its length.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let buf = RingBuffer::from_iter_exact((0..4).map(|i| i * i));
    /// assert_eq!(buf, [0, 1, 4, 9]);
    /// assert_eq!(buf.capacity(), 4);
    /// ```
    #[track_caller]
    pub fn from_iter_exact<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let items = items.into_iter();
        let mut buf = Self::with_capacity(items.len());
        buf.insert_back(items);
        buf
    }
}

impl<T, const N: usize> RingBuffer<T, Inline<N>> {
    /// Creates a new empty ring buffer holding up to `N` items without touching the heap.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::InlineRingBuffer;
    /// let mut buf = InlineRingBuffer::<u8, 2>::inline();
    /// buf.push_back(1);
    /// buf.push_back(2);
    /// assert_eq!(buf.push_back(3), Some(1));
    /// assert_eq!(buf, [2, 3]);
    /// ```
    pub fn inline() -> Self {
        Self::from_block(Inline, InlineBlock::uninit(N))
    }
}

impl<T, S: Storage<T>> RingBuffer<T, S> {
    /// Creates a new ring buffer without any storage, using the given strategy once storage is needed.
    pub fn new_in(storage: S) -> Self {
        Self {
            storage,
            block: None,
            front: Pos::origin(0),
            back: Pos::origin(0),
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Creates a new empty ring buffer with a block of `capacity` slots acquired from `storage`.
    ///
    /// # Panics
    /// Panics if the strategy cannot provide the block.
    #[track_caller]
    pub fn with_capacity_in(capacity: usize, storage: S) -> Self {
        Self::try_with_capacity_in(capacity, storage).unwrap_or_else(|err| err.handle())
    }

    /// Like [`with_capacity_in`](Self::with_capacity_in), but returns an error instead of panicking.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::{Inline, RingBuffer, StorageError};
    /// let buf = RingBuffer::<u32, _>::try_with_capacity_in(3, Inline::<4>).unwrap();
    /// assert_eq!(buf.capacity(), 3);
    /// assert!(matches!(
    ///     RingBuffer::<u32, _>::try_with_capacity_in(5, Inline::<4>),
    ///     Err(StorageError::InlineExceeded { requested: 5, limit: 4 })
    /// ));
    /// ```
    pub fn try_with_capacity_in(capacity: usize, storage: S) -> Result<Self, StorageError> {
        let block = storage.acquire(capacity)?;
        Ok(Self::from_block(storage, block))
    }

    fn from_block(storage: S, block: S::Block) -> Self {
        let mut buf = Self::new_in(storage);
        buf.install(block, 0);
        buf
    }

    /// Swaps in `block`, whose first `len` slots must already hold the items of the buffer,
    /// and releases the previous block without dropping anything left in it.
    fn install(&mut self, block: S::Block, len: usize) {
        let cap = block.capacity();
        debug_assert!(len <= cap);
        let old = self.block.replace(block);
        self.front = Pos::origin(cap);
        self.back = self.front.add(len);
        self.len = len;
        if let Some(old) = old {
            self.storage.release(old);
        }
    }

    #[inline(always)]
    fn base(&self) -> *const T {
        match &self.block {
            Some(block) => block.as_ptr(),
            None => NonNull::dangling().as_ptr(),
        }
    }

    #[inline(always)]
    fn base_mut(&mut self) -> *mut T {
        match &mut self.block {
            Some(block) => block.as_mut_ptr(),
            None => NonNull::dangling().as_ptr(),
        }
    }

    /// Returns a pointer to the slot at `pos`, possibly uninitialized.
    ///
    /// # Safety
    /// `pos` must belong to the current block.
    #[inline(always)]
    unsafe fn slot(&self, pos: Pos) -> *const T {
        debug_assert_eq!(pos.cap(), self.capacity());
        self.base().add(pos.at())
    }

    /// # Safety
    /// `pos` must belong to the current block.
    #[inline(always)]
    unsafe fn slot_mut(&mut self, pos: Pos) -> *mut T {
        debug_assert_eq!(pos.cap(), self.capacity());
        self.base_mut().add(pos.at())
    }

    #[inline(always)]
    fn split(&self) -> Split {
        Split {
            front: self.front.at(),
            len: self.len,
            cap: self.capacity(),
        }
    }

    /// Drops the items in the slots covered by `stale`.
    ///
    /// # Safety
    /// The slots must hold initialized items that are no longer part of the live range, so that
    /// nothing is dropped twice if a destructor panics.
    unsafe fn drop_stale(&mut self, stale: Split) {
        /// Drops the rest of the items even if an earlier destructor panicked.
        struct Dropper<T>(*mut [T]);

        impl<T> Drop for Dropper<T> {
            fn drop(&mut self) {
                unsafe { ptr::drop_in_place(self.0) }
            }
        }

        let base = self.base_mut();
        let _two = Dropper(ptr::slice_from_raw_parts_mut(base, stale.two()));
        ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
            base.add(stale.front),
            stale.one(),
        ));
    }

    /// Drops the `n` oldest items.
    fn discard_front(&mut self, n: usize) {
        debug_assert!(n <= self.len);
        let stale = Split {
            front: self.front.at(),
            len: n,
            cap: self.capacity(),
        };
        self.front = self.front.add(n);
        self.len -= n;
        // SAFETY: the `n` items after the old `front` were live and are now outside the live range
        unsafe { self.drop_stale(stale) };
    }

    /// Drops the `n` newest items.
    fn discard_back(&mut self, n: usize) {
        debug_assert!(n <= self.len);
        self.back = self.back.sub(n);
        self.len -= n;
        let stale = Split {
            front: self.back.at(),
            len: n,
            cap: self.capacity(),
        };
        // SAFETY: the `n` items before the old `back` were live and are now outside the live range
        unsafe { self.drop_stale(stale) };
    }

    /// Returns the storage strategy of the ring buffer.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the number of slots in the ring buffer's block, or 0 if it has none.
    pub fn capacity(&self) -> usize {
        self.block.as_ref().map_or(0, |block| block.capacity())
    }

    /// Returns the number of items in the ring buffer.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the ring buffer is empty.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the ring buffer is full.
    ///
    /// Note that it is equivalent to `!self.has_remaining()`, except that a ring buffer without capacity is both full and empty.
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Returns the number of items that can be added to the ring buffer before it is full.
    ///
    /// Same as `self.capacity() - self.len()`.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let mut buf = RingBuffer::with_capacity(3);
    /// assert_eq!(buf.remaining(), 3);
    /// buf.extend([0, 1]);
    /// assert_eq!(buf.remaining(), 1);
    /// buf.push_back(2);
    /// assert_eq!(buf.remaining(), 0);
    /// assert_eq!(buf.pop_front(), Some(0));
    /// assert_eq!(buf.remaining(), 1);
    /// ```
    pub fn remaining(&self) -> usize {
        self.capacity() - self.len
    }

    /// Returns `true` if the ring buffer has capacity for at least one more item.
    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    /// Returns `true` if the items are laid out in a single contiguous span of the block.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let mut buf = RingBuffer::from([0, 1, 2]);
    /// assert!(buf.is_linearized());
    /// buf.push_back(3);
    /// assert!(!buf.is_linearized());
    /// buf.linearize();
    /// assert!(buf.is_linearized());
    /// ```
    pub fn is_linearized(&self) -> bool {
        self.split().is_linear()
    }

    /// Returns a reference to the item at the given index without doing bounds checks.
    ///
    /// # Safety
    /// The given index must be less than `self.len()`.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len);
        &*self.slot(self.front.add(index))
    }

    /// Returns a mutable reference to the item at the given index without doing bounds checks.
    ///
    /// # Safety
    /// The given index must be less than `self.len()`.
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len);
        &mut *self.slot_mut(self.front.add(index))
    }

    /// Returns a reference to the item at the given index, or `None` if the index is out of bounds.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let buf = RingBuffer::from([0, 1]);
    /// assert_eq!(buf.get(0), Some(&0));
    /// assert_eq!(buf.get(1), Some(&1));
    /// assert_eq!(buf.get(2), None);
    /// ```
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            None
        } else {
            Some(unsafe { self.get_unchecked(index) })
        }
    }

    /// Returns a mutable reference to the item at the given index, or `None` if the index is out of bounds.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let mut buf = RingBuffer::from([1, 2]);
    /// *buf.get_mut(0).unwrap() *= 2;
    /// *buf.get_mut(1).unwrap() *= 3;
    /// assert_eq!(buf.get_mut(2), None);
    /// assert_eq!(buf, [2, 6]);
    /// ```
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            None
        } else {
            Some(unsafe { self.get_unchecked_mut(index) })
        }
    }

    /// Returns a reference to the oldest item.
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns a mutable reference to the oldest item.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    /// Returns a reference to the newest item.
    pub fn back(&self) -> Option<&T> {
        self.get(self.len.checked_sub(1)?)
    }

    /// Returns a mutable reference to the newest item.
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.get_mut(self.len.checked_sub(1)?)
    }

    /// Adds an item to the back of the ring buffer, removing the front item if the buffer [is full](Self::is_full).
    /// Returns the removed item if the buffer was full, otherwise `None`.
    ///
    /// # Panics
    /// Panics if the ring buffer has no capacity.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let mut buf = RingBuffer::with_capacity(3);
    /// assert_eq!(buf.push_back(0), None);
    /// assert_eq!(buf.push_back(1), None);
    /// assert_eq!(buf.push_back(2), None);
    /// assert_eq!(buf, [0, 1, 2]);
    /// assert_eq!(buf.push_back(3), Some(0));
    /// assert_eq!(buf, [1, 2, 3]);
    /// assert_eq!(buf.push_back(4), Some(1));
    /// assert_eq!(buf, [2, 3, 4]);
    /// ```
    #[track_caller]
    #[inline]
    pub fn push_back(&mut self, item: T) -> Option<T> {
        assert!(self.capacity() > 0, "ring buffer has no capacity");

        if self.is_full() {
            // SAFETY: the buffer is full, so the slot at `front` holds the oldest item, and
            // it is also the slot right after the newest one
            let evicted = unsafe { ptr::replace(self.slot_mut(self.front), item) };
            self.front.incr();
            self.back = self.front;
            Some(evicted)
        } else {
            // SAFETY: `self.is_full()` returned false
            unsafe { self.push_back_unchecked(item) };
            None
        }
    }

    /// Adds an item to the front of the ring buffer, removing the back item if the buffer [is full](Self::is_full).
    /// Returns the removed item if the buffer was full, otherwise `None`.
    ///
    /// # Panics
    /// Panics if the ring buffer has no capacity.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let mut buf = RingBuffer::from([1, 2, 3]);
    /// assert_eq!(buf.push_front(0), Some(3));
    /// assert_eq!(buf, [0, 1, 2]);
    /// ```
    #[track_caller]
    #[inline]
    pub fn push_front(&mut self, item: T) -> Option<T> {
        assert!(self.capacity() > 0, "ring buffer has no capacity");

        if self.is_full() {
            self.front.decr();
            self.back = self.front;
            // SAFETY: the buffer is full, so the slot before the old `front` holds the newest item
            Some(unsafe { ptr::replace(self.slot_mut(self.front), item) })
        } else {
            // SAFETY: `self.is_full()` returned false
            unsafe { self.push_front_unchecked(item) };
            None
        }
    }

    /// Like [`push_back`](Self::push_back), but the item is constructed by calling the given closure.
    ///
    /// The closure runs before the ring buffer is touched, so if it panics the buffer is left as it was.
    #[track_caller]
    pub fn push_back_with<F: FnOnce() -> T>(&mut self, f: F) -> Option<T> {
        let item = f();
        self.push_back(item)
    }

    /// Like [`push_front`](Self::push_front), but the item is constructed by calling the given closure.
    ///
    /// The closure runs before the ring buffer is touched, so if it panics the buffer is left as it was.
    #[track_caller]
    pub fn push_front_with<F: FnOnce() -> T>(&mut self, f: F) -> Option<T> {
        let item = f();
        self.push_front(item)
    }

    /// Adds an item to the back of the ring buffer, assuming the buffer [has remaining capacity](Self::has_remaining).
    ///
    /// # Safety
    /// The following invariant must be held:
    /// - `self.has_remaining()` (which implies `self.capacity() > 0`)
    #[inline]
    pub unsafe fn push_back_unchecked(&mut self, item: T) {
        debug_assert!(self.has_remaining());
        self.slot_mut(self.back).write(item);
        self.back.incr();
        self.len += 1;
    }

    /// Adds an item to the front of the ring buffer, assuming the buffer [has remaining capacity](Self::has_remaining).
    ///
    /// # Safety
    /// The following invariant must be held:
    /// - `self.has_remaining()` (which implies `self.capacity() > 0`)
    #[inline]
    pub unsafe fn push_front_unchecked(&mut self, item: T) {
        debug_assert!(self.has_remaining());
        let mut front = self.front;
        front.decr();
        self.slot_mut(front).write(item);
        self.front = front;
        self.len += 1;
    }

    /// If the ring [has remaining capacity](Self::has_remaining), returns a [`VacantEntry`] that can be used to push a new item to the back of the ring buffer.
    ///
    /// See also [`try_push_back`](Self::try_push_back) and [`try_push_back_with`](Self::try_push_back_with).
    pub fn with_vacancy_back(&mut self) -> Option<VacantEntry<'_, T, S>> {
        if self.has_remaining() {
            // SAFETY: `self.has_remaining()` returned `true`
            Some(unsafe { VacantEntry::new_unchecked(self, End::Back) })
        } else {
            None
        }
    }

    /// If the ring [has remaining capacity](Self::has_remaining), returns a [`VacantEntry`] that can be used to push a new item to the front of the ring buffer.
    pub fn with_vacancy_front(&mut self) -> Option<VacantEntry<'_, T, S>> {
        if self.has_remaining() {
            // SAFETY: `self.has_remaining()` returned `true`
            Some(unsafe { VacantEntry::new_unchecked(self, End::Front) })
        } else {
            None
        }
    }

    /// Tries to add an item to the back of the ring buffer, if the buffer [has remaining capacity](Self::has_remaining).
    /// Otherwise hands the item back inside a [`BufferFullError`], leaving the buffer unchanged.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let mut buf = RingBuffer::with_capacity(3);
    /// buf.extend([1, 2]);
    /// assert_eq!(buf.try_push_back(3), Ok(()));
    /// assert_eq!(buf, [1, 2, 3]);
    /// assert_eq!(buf.try_push_back(4).unwrap_err().into_inner(), 4);
    /// assert_eq!(buf, [1, 2, 3]);
    /// ```
    #[inline]
    pub fn try_push_back(&mut self, item: T) -> Result<(), BufferFullError<T>> {
        match self.with_vacancy_back() {
            Some(entry) => {
                entry.write(item);
                Ok(())
            }
            None => Err(BufferFullError(item)),
        }
    }

    /// Tries to add an item to the front of the ring buffer, if the buffer [has remaining capacity](Self::has_remaining).
    #[inline]
    pub fn try_push_front(&mut self, item: T) -> Result<(), BufferFullError<T>> {
        match self.with_vacancy_front() {
            Some(entry) => {
                entry.write(item);
                Ok(())
            }
            None => Err(BufferFullError(item)),
        }
    }

    /// Tries to add an item to the back of the ring buffer, if the buffer [has remaining capacity](Self::has_remaining).
    ///
    /// The item is constructed by calling the given closure, which is only called if the buffer has remaining capacity.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let mut buf = RingBuffer::with_capacity(3);
    /// buf.extend([0, 1]);
    /// let mut call_count = 0;
    /// assert!(
    ///     buf.try_push_back_with(|| {
    ///         call_count += 1;
    ///         2
    ///     }
    /// ).is_ok());
    /// assert_eq!(call_count, 1);
    /// assert_eq!(buf, [0, 1, 2]);
    /// assert!(
    ///     buf.try_push_back_with(|| {
    ///         call_count += 1;
    ///         3
    ///     }
    /// ).is_err());
    /// assert_eq!(call_count, 1);
    /// ```
    #[inline]
    pub fn try_push_back_with<F: FnOnce() -> T>(&mut self, f: F) -> Result<(), BufferFullError> {
        self.with_vacancy_back()
            .ok_or(BufferFullError::new())?
            .write(f());
        Ok(())
    }

    /// Tries to add an item to the front of the ring buffer, constructing it only if there is room.
    #[inline]
    pub fn try_push_front_with<F: FnOnce() -> T>(&mut self, f: F) -> Result<(), BufferFullError> {
        self.with_vacancy_front()
            .ok_or(BufferFullError::new())?
            .write(f());
        Ok(())
    }

    /// Removes the front item from the ring buffer and returns it, or `None` if the buffer [is empty](Self::is_empty).
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let mut buf = RingBuffer::with_capacity(3);
    /// assert_eq!(buf.pop_front(), None);
    /// buf.extend([0, 1]);
    /// assert_eq!(buf.pop_front(), Some(0));
    /// assert_eq!(buf.pop_front(), Some(1));
    /// assert_eq!(buf.pop_front(), None);
    /// ```
    #[inline]
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the buffer is non-empty
        Some(unsafe { self.pop_front_unchecked() })
    }

    /// Removes the back item from the ring buffer and returns it, or `None` if the buffer [is empty](Self::is_empty).
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let mut buf = RingBuffer::from([0, 1]);
    /// assert_eq!(buf.pop_back(), Some(1));
    /// assert_eq!(buf.pop_back(), Some(0));
    /// assert_eq!(buf.pop_back(), None);
    /// ```
    #[inline]
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the buffer is non-empty
        Some(unsafe { self.pop_back_unchecked() })
    }

    /// Removes the front item, assuming the buffer is not empty.
    ///
    /// # Safety
    /// The following invariant must be held:
    /// - `!self.is_empty()`
    #[inline]
    pub unsafe fn pop_front_unchecked(&mut self) -> T {
        debug_assert!(!self.is_empty());
        let item = self.slot(self.front).read();
        self.front.incr();
        self.len -= 1;
        item
    }

    /// Removes the back item, assuming the buffer is not empty.
    ///
    /// # Safety
    /// The following invariant must be held:
    /// - `!self.is_empty()`
    #[inline]
    pub unsafe fn pop_back_unchecked(&mut self) -> T {
        debug_assert!(!self.is_empty());
        let mut back = self.back;
        back.decr();
        let item = self.slot(back).read();
        self.back = back;
        self.len -= 1;
        item
    }

    /// Moves up to `n` items from the front of the ring buffer into `dest`, oldest first.
    /// Returns the number of items moved.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let mut buf = RingBuffer::from([0, 1, 2, 3]);
    /// let mut out = Vec::new();
    /// assert_eq!(buf.pop_front_into(&mut out, 3), 3);
    /// assert_eq!(out, [0, 1, 2]);
    /// assert_eq!(buf.pop_front_into(&mut out, 3), 1);
    /// assert_eq!(out, [0, 1, 2, 3]);
    /// ```
    pub fn pop_front_into<E: Extend<T>>(&mut self, dest: &mut E, n: usize) -> usize {
        let before = self.len;
        let n = n.min(before);
        dest.extend(std::iter::from_fn(|| self.pop_front()).take(n));
        before - self.len
    }

    /// Moves up to `n` items from the back of the ring buffer into `dest`, newest first.
    /// Returns the number of items moved.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let mut buf = RingBuffer::from([0, 1, 2, 3]);
    /// let mut out = Vec::new();
    /// assert_eq!(buf.pop_back_into(&mut out, 2), 2);
    /// assert_eq!(out, [3, 2]);
    /// assert_eq!(buf, [0, 1]);
    /// ```
    pub fn pop_back_into<E: Extend<T>>(&mut self, dest: &mut E, n: usize) -> usize {
        let before = self.len;
        let n = n.min(before);
        dest.extend(std::iter::from_fn(|| self.pop_back()).take(n));
        before - self.len
    }

    /// Appends all items of an iterator that knows its length to the back of the ring buffer,
    /// dropping the oldest items if there is not enough room.
    ///
    /// If the iterator has at least as many items as the ring buffer has capacity, only its last
    /// `capacity` items are kept, written from the start of the block.
    ///
    /// # Panics
    /// Panics if the ring buffer has no capacity and the iterator is not empty.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let mut buf = RingBuffer::with_capacity(4);
    /// buf.insert_back([1, 2, 3]);
    /// buf.insert_back([4, 5, 6, 7, 8]);
    /// assert_eq!(buf, [5, 6, 7, 8]);
    /// assert!(buf.is_full());
    ///
    /// let mut buf = RingBuffer::with_capacity(3);
    /// buf.insert_back([1, 2, 3, 4, 5]);
    /// assert_eq!(buf.as_slice(), Some(&[3, 4, 5][..]));
    /// ```
    #[track_caller]
    pub fn insert_back<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let mut items = items.into_iter();
        let range = items.len();
        if range == 0 {
            return;
        }
        let cap = self.capacity();
        assert!(cap > 0, "ring buffer has no capacity");
        let free = self.remaining();

        if range >= cap {
            self.clear();
            if range > cap {
                items.nth(range - cap - 1);
            }
        } else if range > free {
            // the stale items may run up to the end of the block and continue from its start
            self.discard_front(range - free);
        }

        for item in items.take(range.min(cap)) {
            // SAFETY: room was made above for every item the iterator reported
            unsafe { self.push_back_unchecked(item) };
        }
    }

    /// Shortens the ring buffer to `len` items, dropping the newest ones.
    ///
    /// Has no effect if the buffer holds `len` items or fewer. The capacity is unchanged.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let mut buf = RingBuffer::from([0, 1, 2, 3]);
    /// buf.truncate(2);
    /// assert_eq!(buf, [0, 1]);
    /// assert_eq!(buf.capacity(), 4);
    /// ```
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.discard_back(self.len - len);
        }
    }

    /// Removes all items from the ring buffer.
    pub fn clear(&mut self) {
        self.discard_front(self.len);
        self.front = Pos::origin(self.capacity());
        self.back = self.front;
    }

    /// Rotates the items in place so they occupy a single span starting at the beginning of the
    /// block, and returns that span.
    ///
    /// Does not move anything if the buffer is empty or already [linearized](Self::is_linearized).
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let mut buf = RingBuffer::from([0, 1, 2, 3, 4]);
    /// buf.pop_front();
    /// buf.pop_front();
    /// buf.extend([5, 6]);
    /// assert_eq!(buf.as_slices(), (&[2, 3, 4][..], &[5, 6][..]));
    /// assert_eq!(buf.linearize(), &mut [2, 3, 4, 5, 6]);
    /// assert!(buf.array_two().is_empty());
    /// ```
    pub fn linearize(&mut self) -> &mut [T] {
        let split = self.split();
        if !split.is_linear() {
            log::debug!(
                "linearizing ring buffer: front {} len {} capacity {}",
                split.front,
                split.len,
                split.cap
            );
            // SAFETY: the block holds `cap` slots; rotating them moves the items and the
            // uninitialized slots as raw memory without reading them as `T`
            let slots = unsafe {
                slice::from_raw_parts_mut(self.base_mut().cast::<MaybeUninit<T>>(), split.cap)
            };
            let linear = rotate::linearize(slots, split);
            // SAFETY: `linear.front` is 0, which is < `cap` since the buffer is not empty
            self.front = unsafe { Pos::new_unchecked(linear.front, linear.cap) };
            self.back = self.front.add(linear.len);
        }
        // SAFETY: the buffer is linearized at this point
        unsafe { self.as_slice_unchecked_mut() }
    }

    /// Returns a slice containing the contents of the ring buffer, assuming ring buffer is laid out contiguously in memory.
    ///
    /// # Safety
    /// The following invariant must be held:
    /// - `self.is_linearized()`
    #[inline]
    pub unsafe fn as_slice_unchecked(&self) -> &[T] {
        debug_assert!(self.is_linearized());
        slice::from_raw_parts(self.slot(self.front), self.len)
    }

    /// Returns a mutable slice containing the contents of the ring buffer, assuming ring buffer is laid out contiguously in memory.
    ///
    /// # Safety
    /// The following invariant must be held:
    /// - `self.is_linearized()`
    #[inline]
    pub unsafe fn as_slice_unchecked_mut(&mut self) -> &mut [T] {
        debug_assert!(self.is_linearized());
        slice::from_raw_parts_mut(self.slot_mut(self.front), self.len)
    }

    /// Returns a slice reference containing the contents of the ring buffer, if the ring buffer is laid out contiguously in memory.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let mut buf = RingBuffer::with_capacity(3);
    /// buf.extend([0, 1]);
    /// assert_eq!(buf.as_slice(), Some(&[0, 1][..]));
    /// buf.push_back(2);
    /// assert_eq!(buf.as_slice(), Some(&[0, 1, 2][..]));
    /// buf.pop_front();
    /// assert_eq!(buf.as_slice(), Some(&[1, 2][..]));
    /// buf.push_back(3);
    /// assert_eq!(buf.as_slice(), None);
    /// buf.extend([4, 5]);
    /// assert_eq!(buf.as_slice(), Some(&[3, 4, 5][..]));
    /// ```
    #[inline]
    pub fn as_slice(&self) -> Option<&[T]> {
        self.is_linearized().then(|| {
            // SAFETY: `self.is_linearized()` returned `true`
            unsafe { self.as_slice_unchecked() }
        })
    }

    /// Returns a mutable slice containing the contents of the ring buffer, if the ring buffer is laid out contiguously in memory.
    #[inline]
    pub fn as_mut_slice(&mut self) -> Option<&mut [T]> {
        if self.is_linearized() {
            // SAFETY: `self.is_linearized()` returned `true`
            Some(unsafe { self.as_slice_unchecked_mut() })
        } else {
            None
        }
    }

    /// Returns the span running from the front item towards the end of the block.
    ///
    /// If the ring buffer is wrapped, the rest of the items are in [`array_two`](Self::array_two).
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let mut buf = RingBuffer::from([0, 1, 2]);
    /// assert_eq!(buf.array_one(), &[0, 1, 2]);
    /// assert_eq!(buf.pop_front(), Some(0));
    /// assert_eq!(buf.array_one(), &[1, 2]);
    /// buf.push_back(3);
    /// assert_eq!(buf.array_one(), &[1, 2]);
    /// buf.push_back(4);
    /// assert_eq!(buf.array_one(), &[2]);
    /// ```
    pub fn array_one(&self) -> &[T] {
        self.as_slices().0
    }

    /// Returns the span that wrapped around to the start of the block.
    ///
    /// Empty exactly when the ring buffer [is linearized](Self::is_linearized).
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let mut buf = RingBuffer::from([0, 1, 2]);
    /// assert!(buf.array_two().is_empty());
    /// assert_eq!(buf.push_back(3), Some(0));
    /// assert_eq!(buf.array_two(), &[3]);
    /// ```
    pub fn array_two(&self) -> &[T] {
        self.as_slices().1
    }

    /// Mutable version of [`array_one`](Self::array_one).
    pub fn array_one_mut(&mut self) -> &mut [T] {
        self.as_mut_slices().0
    }

    /// Mutable version of [`array_two`](Self::array_two).
    pub fn array_two_mut(&mut self) -> &mut [T] {
        self.as_mut_slices().1
    }

    /// Returns both spans of the ring buffer. Concatenated, they hold every item from front to back.
    pub fn as_slices(&self) -> (&[T], &[T]) {
        let split = self.split();
        let base = self.base();
        // SAFETY: both spans lie within the block and hold initialized items
        unsafe {
            (
                slice::from_raw_parts(base.add(split.front), split.one()),
                slice::from_raw_parts(base, split.two()),
            )
        }
    }

    /// Splits the ring buffer into two mutable spans, see [`as_slices`](Self::as_slices).
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let mut buf = RingBuffer::from([0, 1, 2]);
    /// buf.push_back(3);
    /// let (one, two) = buf.as_mut_slices();
    /// one.copy_from_slice(&[4, 5]);
    /// two.copy_from_slice(&[6]);
    /// assert_eq!(buf, [4, 5, 6]);
    /// ```
    pub fn as_mut_slices(&mut self) -> (&mut [T], &mut [T]) {
        let split = self.split();
        let base = self.base_mut();
        // SAFETY: the spans are disjoint, lie within the block and hold initialized items
        unsafe {
            (
                slice::from_raw_parts_mut(base.add(split.front), split.one()),
                slice::from_raw_parts_mut(base, split.two()),
            )
        }
    }

    /// Returns an iterator over the items in the ring buffer, front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        // SAFETY: the `len` slots starting from `front` are initialized
        unsafe { Iter::new(self.base(), self.front, self.len) }
    }

    /// Returns an iterator over the mutable references to the items in the ring buffer.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let (front, len) = (self.front, self.len);
        // SAFETY: the `len` slots starting from `front` are initialized
        unsafe { IterMut::new(self.base_mut(), front, len) }
    }

    /// Returns a cursor pointing at the front item, or at the end if the buffer is empty.
    pub fn cursor_front(&self) -> Cursor<'_, T, S> {
        Cursor::new(self, 0)
    }

    /// Returns a cursor pointing at the back item, or at the end if the buffer is empty.
    pub fn cursor_back(&self) -> Cursor<'_, T, S> {
        Cursor::new(self, self.len.wrapping_sub(1))
    }

    /// Returns a cursor pointing past the back item.
    pub fn cursor_end(&self) -> Cursor<'_, T, S> {
        Cursor::new(self, self.len)
    }

    /// Swaps the storage and contents of two ring buffers. No item is cloned or dropped.
    ///
    /// With [`Heap`] storage only the block pointers change hands, so this is O(1). With
    /// [`Inline`] storage the blocks live inside the buffers, so all `N` slots of both are moved
    /// and the cost is O(N).
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Copies the contents of the ring buffer into a `Vec`, front to back.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        let (one, two) = self.as_slices();
        let mut vec = Vec::with_capacity(self.len);
        vec.extend_from_slice(one);
        vec.extend_from_slice(two);
        vec
    }
}

impl<T, S: Reallocate<T>> RingBuffer<T, S> {
    /// Drops all items and replaces the block with an empty one of `capacity` slots.
    ///
    /// # Panics
    /// Panics if the new block cannot be acquired.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let mut buf = RingBuffer::from([0, 1, 2]);
    /// buf.set_capacity(5);
    /// assert!(buf.is_empty());
    /// assert_eq!(buf.capacity(), 5);
    /// ```
    #[track_caller]
    pub fn set_capacity(&mut self, capacity: usize) {
        self.try_set_capacity(capacity)
            .unwrap_or_else(|err| err.handle())
    }

    /// Like [`set_capacity`](Self::set_capacity), but returns an error instead of panicking.
    ///
    /// The items are kept if the new block cannot be acquired.
    pub fn try_set_capacity(&mut self, capacity: usize) -> Result<(), StorageError> {
        let block = self.storage.acquire(capacity)?;
        log::debug!(
            "resetting ring buffer storage: {} -> {capacity} slots",
            self.capacity()
        );
        self.clear();
        self.install(block, 0);
        Ok(())
    }

    /// Makes the ring buffer hold exactly `new_len` items in a block of exactly `new_len` slots.
    ///
    /// Existing items keep their order and are moved to the start of the block. If there are more
    /// than `new_len`, the newest ones are dropped; the free slots are then filled with clones of
    /// `value`. Use [`truncate`](Self::truncate) to drop items without reallocating.
    ///
    /// # Panics
    /// Panics if a new block is needed and cannot be acquired.
    ///
    /// # Examples
    /// ```
    /// # use bounded_ring::RingBuffer;
    /// let mut buf = RingBuffer::with_capacity(3);
    /// buf.extend([1, 2, 3, 4]);
    /// buf.resize(5, 0);
    /// assert_eq!(buf, [2, 3, 4, 0, 0]);
    /// assert_eq!(buf.capacity(), 5);
    ///
    /// buf.resize(2, 0);
    /// assert_eq!(buf, [2, 3]);
    /// assert_eq!(buf.capacity(), 2);
    /// ```
    #[track_caller]
    pub fn resize(&mut self, new_len: usize, value: T)
    where
        T: Clone,
    {
        self.resize_with(new_len, || value.clone())
    }

    /// Like [`resize`](Self::resize), but fills free slots by calling `f`.
    #[track_caller]
    pub fn resize_with<F: FnMut() -> T>(&mut self, new_len: usize, f: F) {
        self.try_resize_with(new_len, f)
            .unwrap_or_else(|err| err.handle())
    }

    /// Like [`resize`](Self::resize), but returns an error instead of panicking.
    pub fn try_resize(&mut self, new_len: usize, value: T) -> Result<(), StorageError>
    where
        T: Clone,
    {
        self.try_resize_with(new_len, || value.clone())
    }

    /// Like [`resize_with`](Self::resize_with), but returns an error instead of panicking.
    ///
    /// The new block is acquired before anything else happens, so on error the ring buffer is unchanged.
    pub fn try_resize_with<F: FnMut() -> T>(
        &mut self,
        new_len: usize,
        mut f: F,
    ) -> Result<(), StorageError> {
        if new_len != self.capacity() {
            let mut block = self.storage.acquire(new_len)?;
            self.truncate(new_len);
            log::debug!(
                "reallocating ring buffer: {} -> {new_len} slots, moving {} items",
                self.capacity(),
                self.len
            );

            let (one, two) = self.as_slices();
            let dst = block.as_mut_ptr();
            // SAFETY: `block` holds at least `self.len` slots and is a different allocation
            unsafe {
                ptr::copy_nonoverlapping(one.as_ptr(), dst, one.len());
                ptr::copy_nonoverlapping(two.as_ptr(), dst.add(one.len()), two.len());
            }
            // the items now live in `block`; the old block only holds moved-out slots
            self.install(block, self.len);
        }

        while self.has_remaining() {
            // SAFETY: `self.has_remaining()` returned `true`
            unsafe { self.push_back_unchecked(f()) };
        }
        Ok(())
    }
}

impl<T, S: Storage<T>> Drop for RingBuffer<T, S> {
    fn drop(&mut self) {
        let live = self.split();
        self.len = 0;
        // SAFETY: the live items are dropped exactly once, and the buffer is no longer usable afterwards
        unsafe { self.drop_stale(live) };
        if let Some(block) = self.block.take() {
            self.storage.release(block);
        }
    }
}

impl<T, S: Storage<T> + Default> Default for RingBuffer<T, S> {
    fn default() -> Self {
        Self::new_in(S::default())
    }
}

/// Deep copies the items into a fresh block of the same capacity, keeping the same layout.
///
/// # Examples
/// ```
/// # use bounded_ring::RingBuffer;
/// let mut buf = RingBuffer::from([0, 1, 2]);
/// buf.push_back(3);
/// let copy = buf.clone();
/// assert_eq!(copy.as_slices(), buf.as_slices());
/// assert_eq!(copy.capacity(), 3);
/// ```
impl<T: Clone, S: Storage<T> + Clone> Clone for RingBuffer<T, S> {
    #[track_caller]
    fn clone(&self) -> Self {
        let mut copy = Self::new_in(self.storage.clone());
        if let Some(block) = &self.block {
            let fresh = self
                .storage
                .acquire(block.capacity())
                .unwrap_or_else(|err| err.handle());
            copy.install(fresh, 0);
            copy.front = self.front;
            copy.back = self.front;
            for item in self {
                // SAFETY: `copy` has the same capacity as `self`, which holds `self.len` items
                unsafe { copy.push_back_unchecked(item.clone()) };
            }
        }
        copy
    }
}

/// # Examples
///
/// ```rust
/// # use bounded_ring::RingBuffer;
/// let buf = RingBuffer::from([0, 1, 2]);
/// assert!(buf.iter().eq(&[0, 1, 2]));
/// assert_eq!(buf.capacity(), 3);
/// ```
impl<T, const N: usize> From<[T; N]> for RingBuffer<T, Heap> {
    fn from(arr: [T; N]) -> Self {
        Self::from_iter_exact(arr)
    }
}

impl<T> From<Vec<T>> for RingBuffer<T, Heap> {
    fn from(vec: Vec<T>) -> Self {
        Self::from_iter_exact(vec)
    }
}

/// Extends the ring buffer with the contents of the given iterator, popping items from the front
/// of the ring buffer if necessary.
///
/// # Panics
/// Panics if the ring buffer has no capacity and the iterator is not empty.
///
/// # Examples
/// ```
/// # use bounded_ring::RingBuffer;
/// let mut buf = RingBuffer::with_capacity(3);
/// buf.extend([0, 1]);
/// assert_eq!(buf, [0, 1]);
/// buf.extend([2, 3]);
/// assert_eq!(buf, [1, 2, 3]);
/// ```
impl<T, S: Storage<T>> Extend<T> for RingBuffer<T, S> {
    #[track_caller]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push_back(item);
        }
    }
}

impl<'a, T: Copy + 'a, S: Storage<T>> Extend<&'a T> for RingBuffer<T, S> {
    #[track_caller]
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

/// Creates a full ring buffer with exactly as much capacity as the iterator yields items.
///
/// # Examples
/// ```
/// # use bounded_ring::RingBuffer;
/// let buf: RingBuffer<_> = (0..3).filter(|i| i % 2 == 0).collect();
/// assert_eq!(buf, [0, 2]);
/// assert!(buf.is_full());
/// ```
impl<T> FromIterator<T> for RingBuffer<T, Heap> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Vec::from_iter(iter).into()
    }
}

impl<T, S: Storage<T>> Index<usize> for RingBuffer<T, S> {
    type Output = T;

    #[track_caller]
    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(item) => item,
            None => panic!(
                "index out of bounds: the len is {} but the index is {index}",
                self.len
            ),
        }
    }
}

impl<T, S: Storage<T>> IndexMut<usize> for RingBuffer<T, S> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        match self.get_mut(index) {
            Some(item) => item,
            None => panic!("index out of bounds: the len is {len} but the index is {index}"),
        }
    }
}

impl<T: PartialEq, S: Storage<T>> PartialEq for RingBuffer<T, S> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq, S: Storage<T>> Eq for RingBuffer<T, S> {}

impl<T: PartialOrd, S: Storage<T>> PartialOrd for RingBuffer<T, S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, S: Storage<T>> Ord for RingBuffer<T, S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash, S: Storage<T>> Hash for RingBuffer<T, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len);
        self.iter().for_each(|item| item.hash(state))
    }
}

impl<T: PartialEq, S: Storage<T>, B: AsRef<[T]> + ?Sized> PartialEq<B> for RingBuffer<T, S> {
    fn eq(&self, other: &B) -> bool {
        self.iter().eq(other.as_ref())
    }
}

impl<T: Debug, S: Storage<T>> Debug for RingBuffer<T, S> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'buf, T, S: Storage<T>> IntoIterator for &'buf RingBuffer<T, S> {
    type Item = &'buf T;
    type IntoIter = Iter<'buf, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'buf, T, S: Storage<T>> IntoIterator for &'buf mut RingBuffer<T, S> {
    type Item = &'buf mut T;
    type IntoIter = IterMut<'buf, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, S: Storage<T>> IntoIterator for RingBuffer<T, S> {
    type Item = T;
    type IntoIter = IntoIter<T, S>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}
