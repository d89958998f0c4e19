use std::{
    alloc::Layout,
    fmt::{self, Debug, Formatter},
};

use thiserror::Error;

/// Error returned when trying to push to a full ring buffer.
///
/// Carries the rejected item back to the caller, see [`into_inner`](Self::into_inner).
#[derive(Clone, Copy, PartialEq, Eq, Error)]
#[error("BufferFullError")]
pub struct BufferFullError<T = ()>(pub(crate) T);

impl<T> Debug for BufferFullError<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "ring buffer is full")
    }
}

impl BufferFullError {
    pub(crate) const fn new() -> Self {
        Self(())
    }
}

impl<T> BufferFullError<T> {
    /// Returns the item that could not be pushed.
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Error returned when a storage strategy cannot provide a block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The requested number of slots does not fit in `isize::MAX` bytes.
    #[error("capacity overflow")]
    CapacityOverflow,
    /// The global allocator returned null.
    #[error("memory allocation of {} bytes failed", .layout.size())]
    AllocFailed { layout: Layout },
    /// The request is larger than a fixed embedded block.
    #[error("requested capacity {requested} exceeds the inline block of {limit} slots")]
    InlineExceeded { requested: usize, limit: usize },
}

impl StorageError {
    /// Diverges the way `Vec` does when it cannot allocate.
    #[track_caller]
    pub(crate) fn handle(self) -> ! {
        match self {
            Self::AllocFailed { layout } => std::alloc::handle_alloc_error(layout),
            err => panic!("{err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_full_messages() {
        let err = BufferFullError(7);
        assert_eq!(format!("{err:?}"), "ring buffer is full");
        assert_eq!(err.to_string(), "BufferFullError");
        assert_eq!(err.into_inner(), 7);
    }

    #[test]
    fn test_storage_error_messages() {
        let layout = Layout::array::<u64>(4).unwrap();
        assert_eq!(
            StorageError::AllocFailed { layout }.to_string(),
            "memory allocation of 32 bytes failed"
        );
        assert_eq!(
            StorageError::InlineExceeded {
                requested: 9,
                limit: 8
            }
            .to_string(),
            "requested capacity 9 exceeds the inline block of 8 slots"
        );
    }

    #[test]
    #[should_panic = "capacity overflow"]
    fn test_handle_panics() {
        StorageError::CapacityOverflow.handle();
    }
}
