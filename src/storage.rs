//! Storage strategies that supply the raw block of slots a [`RingBuffer`](crate::RingBuffer) lives in.
//!
//! A strategy only hands out and takes back blocks. It never constructs or drops the items
//! stored in them; that is the ring buffer's job.

use std::{
    alloc::{self, Layout},
    mem::{self, MaybeUninit},
    ptr::NonNull,
};

use crate::error::StorageError;

/// A contiguous region of `capacity` slots of type `T`.
///
/// Dropping a block releases its memory but never drops the contents of its slots.
///
/// # Safety
/// Implementors must guarantee that `as_ptr` and `as_mut_ptr` point to `capacity()` properly
/// aligned slots that stay valid for reads and writes for as long as the block is neither moved
/// nor dropped, and that `capacity()` never changes.
pub unsafe trait Block<T> {
    /// Returns the number of slots in the block.
    fn capacity(&self) -> usize;

    /// Returns a pointer to the first slot.
    fn as_ptr(&self) -> *const T;

    /// Returns a mutable pointer to the first slot.
    fn as_mut_ptr(&mut self) -> *mut T;
}

/// A strategy for acquiring and releasing [`Block`]s.
pub trait Storage<T> {
    type Block: Block<T>;

    /// Acquires a block of exactly `capacity` slots, all uninitialized.
    fn acquire(&self, capacity: usize) -> Result<Self::Block, StorageError>;

    /// Releases a block previously returned by [`acquire`](Self::acquire).
    ///
    /// Any items still stored in the block are leaked, not dropped.
    fn release(&self, block: Self::Block) {
        log::trace!("releasing block of {} slots", block.capacity());
        drop(block);
    }
}

/// Marker for strategies whose blocks can be swapped for blocks of a different capacity
/// after construction.
pub trait Reallocate<T>: Storage<T> {}

/// Allocates blocks from the global allocator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Heap;

/// A block allocated by [`Heap`].
pub struct HeapBlock<T> {
    ptr: NonNull<T>,
    cap: usize,
}

// SAFETY: `HeapBlock` owns its allocation exclusively, like `Box<[MaybeUninit<T>]>`
unsafe impl<T: Send> Send for HeapBlock<T> {}
unsafe impl<T: Sync> Sync for HeapBlock<T> {}

impl<T> HeapBlock<T> {
    fn layout(cap: usize) -> Result<Layout, StorageError> {
        Layout::array::<T>(cap).map_err(|_| StorageError::CapacityOverflow)
    }
}

unsafe impl<T> Block<T> for HeapBlock<T> {
    #[inline(always)]
    fn capacity(&self) -> usize {
        self.cap
    }

    #[inline(always)]
    fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline(always)]
    fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }
}

impl<T> Drop for HeapBlock<T> {
    fn drop(&mut self) {
        // the layout was validated when the block was acquired
        if let Ok(layout) = Self::layout(self.cap) {
            if layout.size() != 0 {
                // SAFETY: `ptr` was returned by `alloc::alloc` with this exact layout
                unsafe { alloc::dealloc(self.ptr.as_ptr().cast(), layout) };
            }
        }
    }
}

impl<T> Storage<T> for Heap {
    type Block = HeapBlock<T>;

    fn acquire(&self, capacity: usize) -> Result<HeapBlock<T>, StorageError> {
        let layout = HeapBlock::<T>::layout(capacity)?;
        let ptr = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            // SAFETY: `layout` has a non-zero size
            let raw = unsafe { alloc::alloc(layout) };
            NonNull::new(raw.cast::<T>()).ok_or(StorageError::AllocFailed { layout })?
        };
        log::trace!("acquired heap block of {capacity} slots ({} bytes)", layout.size());
        Ok(HeapBlock { ptr, cap: capacity })
    }
}

impl<T> Reallocate<T> for Heap {}

/// Hands out a single block of `N` slots embedded in the ring buffer itself.
///
/// Buffers using this strategy never touch the heap, and cannot change capacity after
/// construction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Inline<const N: usize>;

/// A block embedded by [`Inline`].
pub struct InlineBlock<T, const N: usize> {
    slots: [MaybeUninit<T>; N],
    // Invariant: `cap` <= `N`
    cap: usize,
}

impl<T, const N: usize> InlineBlock<T, N> {
    pub(crate) fn uninit(cap: usize) -> Self {
        debug_assert!(cap <= N);
        Self {
            // SAFETY: an array of `MaybeUninit` needs no initialization
            slots: unsafe { MaybeUninit::<[MaybeUninit<T>; N]>::uninit().assume_init() },
            cap,
        }
    }
}

unsafe impl<T, const N: usize> Block<T> for InlineBlock<T, N> {
    #[inline(always)]
    fn capacity(&self) -> usize {
        self.cap
    }

    #[inline(always)]
    fn as_ptr(&self) -> *const T {
        self.slots.as_ptr().cast()
    }

    #[inline(always)]
    fn as_mut_ptr(&mut self) -> *mut T {
        self.slots.as_mut_ptr().cast()
    }
}

impl<T, const N: usize> Storage<T> for Inline<N> {
    type Block = InlineBlock<T, N>;

    fn acquire(&self, capacity: usize) -> Result<InlineBlock<T, N>, StorageError> {
        if capacity > N {
            return Err(StorageError::InlineExceeded {
                requested: capacity,
                limit: N,
            });
        }
        log::trace!(
            "acquired inline block of {capacity} slots ({} bytes)",
            capacity * mem::size_of::<T>()
        );
        Ok(InlineBlock::uninit(capacity))
    }
}
