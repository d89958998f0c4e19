use std::{
    fmt::{self, Debug, Formatter},
    iter::FusedIterator,
    marker::PhantomData,
};

use crate::{
    pos::Pos,
    storage::{Heap, Storage},
    RingBuffer,
};

macro_rules! iter {
    ($name:ident(*$raw_mut:tt T, {$( $mut_:tt )?})) => {
        pub struct $name<'buf, T> {
            base: *$raw_mut T,
            // Invariant: the `len` slots starting from `front` hold initialized items
            front: Pos,
            len: usize,
            _marker: PhantomData<&'buf $($mut_)? T>,
        }

        impl<'buf, T> $name<'buf, T> {
            /// # Safety
            /// `base` must point to a block of `front.cap()` slots, of which the `len` slots
            /// starting from `front` hold initialized items that outlive `'buf`.
            pub(crate) unsafe fn new(base: *$raw_mut T, front: Pos, len: usize) -> Self {
                Self {
                    base,
                    front,
                    len,
                    _marker: PhantomData,
                }
            }

            /// Returns a pointer to the item at the given index without doing bounds checks.
            #[inline(always)]
            fn slot(&self, index: usize) -> *$raw_mut T {
                self.base.wrapping_add(self.front.add(index).at())
            }
        }

        impl<'buf, T> Iterator for $name<'buf, T> {
            type Item = &'buf $($mut_)? T;

            fn next(&mut self) -> Option<Self::Item> {
                self.len = self.len.checked_sub(1)?;
                let item = self.slot(0);
                self.front.incr();
                // SAFETY: `item` was the first slot of the initialized run
                Some(unsafe { & $($mut_)? *item })
            }

            fn size_hint(&self) -> (usize, Option<usize>) {
                (self.len, Some(self.len))
            }

            fn count(self) -> usize {
                self.len
            }

            fn nth(&mut self, n: usize) -> Option<Self::Item> {
                if n >= self.len {
                    self.front = self.front.add(self.len);
                    self.len = 0;
                    return None;
                }
                self.front = self.front.add(n);
                self.len -= n;
                self.next()
            }

            fn last(mut self) -> Option<Self::Item> {
                self.next_back()
            }
        }

        impl<T> DoubleEndedIterator for $name<'_, T> {
            fn next_back(&mut self) -> Option<Self::Item> {
                self.len = self.len.checked_sub(1)?;
                let item = self.slot(self.len);
                // SAFETY: `item` was the last slot of the initialized run
                Some(unsafe { & $($mut_)? *item })
            }

            fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
                if n >= self.len {
                    self.len = 0;
                    return None;
                }
                self.len -= n;
                self.next_back()
            }
        }

        impl<T> FusedIterator for $name<'_, T> {}

        impl<T> ExactSizeIterator for $name<'_, T> {
            fn len(&self) -> usize {
                self.len
            }
        }
    };
}

iter!(Iter(*const T, {/* no mut */}));
iter!(IterMut(*mut T, {mut}));

unsafe impl<T: Sync> Sync for Iter<'_, T> {}
unsafe impl<T: Sync> Send for Iter<'_, T> {}

unsafe impl<T: Sync> Sync for IterMut<'_, T> {}
unsafe impl<T: Send> Send for IterMut<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            base: self.base,
            front: self.front,
            len: self.len,
            _marker: PhantomData,
        }
    }
}

impl<T: Debug> Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_tuple("Iter")
            .field(&self.clone().collect::<Vec<_>>())
            .finish()
    }
}

/// An owning iterator over the items of a ring buffer, front to back.
pub struct IntoIter<T, S: Storage<T> = Heap> {
    buf: RingBuffer<T, S>,
}

impl<T, S: Storage<T>> IntoIter<T, S> {
    pub(crate) fn new(buf: RingBuffer<T, S>) -> Self {
        Self { buf }
    }

    /// Returns the items not yet yielded.
    pub fn as_ring(&self) -> &RingBuffer<T, S> {
        &self.buf
    }
}

impl<T, S: Storage<T>> Iterator for IntoIter<T, S> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.buf.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.buf.len(), Some(self.buf.len()))
    }

    fn count(self) -> usize {
        self.buf.len()
    }
}

impl<T, S: Storage<T>> DoubleEndedIterator for IntoIter<T, S> {
    fn next_back(&mut self) -> Option<T> {
        self.buf.pop_back()
    }
}

impl<T, S: Storage<T>> FusedIterator for IntoIter<T, S> {}

impl<T, S: Storage<T>> ExactSizeIterator for IntoIter<T, S> {
    fn len(&self) -> usize {
        self.buf.len()
    }
}

impl<T: Debug, S: Storage<T>> Debug for IntoIter<T, S> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.buf).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::RingBuffer;

    fn wrapped() -> RingBuffer<i32> {
        let mut arr = RingBuffer::from([0, 1, 2, 3, 4]);
        assert_eq!(arr.pop_front(), Some(0));
        assert_eq!(arr.pop_front(), Some(1));
        arr.with_vacancy_back().unwrap().write(5);
        arr.with_vacancy_back().unwrap().write(6);
        assert_ne!(arr.front.at(), 0);
        arr
    }

    #[test]
    fn test_iter_nth() {
        // test non-overflowing buffer

        let mut arr = RingBuffer::with_capacity(5);
        arr.extend([0, 1, 2]);
        let mut iter = arr.iter();

        assert_eq!(iter.len(), 3);
        assert!(iter.clone().eq(&[0, 1, 2]));

        assert_eq!(iter.nth(0), Some(&0));
        assert_eq!(iter.len(), 2);
        assert!(iter.clone().eq(&[1, 2]));

        assert_eq!(iter.nth(1), Some(&2));
        assert_eq!(iter.len(), 0);
        assert!(iter.next().is_none());
        assert!(iter.nth(0).is_none());

        assert_eq!(arr.iter().nth(2), Some(&2));
        assert_eq!(arr.iter().nth(3), None);

        // test overflowing buffer

        let arr = wrapped();
        let mut iter = arr.iter();

        assert_eq!(iter.len(), 5);
        assert!(iter.clone().eq(&[2, 3, 4, 5, 6]));

        assert_eq!(iter.nth(0), Some(&2));
        assert_eq!(iter.len(), 4);
        assert!(iter.clone().eq(&[3, 4, 5, 6]));

        // crosses the end of the block
        assert_eq!(iter.nth(2), Some(&5));
        assert_eq!(iter.len(), 1);
        assert!(iter.clone().eq(&[6]));

        assert_eq!(iter.nth(5), None);
        assert_eq!(iter.len(), 0);
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_iter_double_ended() {
        let arr = wrapped();

        assert!(arr.iter().rev().eq(&[6, 5, 4, 3, 2]));

        let mut iter = arr.iter();

        assert_eq!(iter.next_back(), Some(&6));
        assert_eq!(iter.len(), 4);
        assert!(iter.clone().eq(&[2, 3, 4, 5]));

        assert_eq!(iter.next(), Some(&2));
        assert_eq!(iter.next_back(), Some(&5));
        assert_eq!(iter.len(), 2);
        assert!(iter.clone().eq(&[3, 4]));

        assert_eq!(iter.next(), Some(&3));
        assert_eq!(iter.next_back(), Some(&4));
        assert!(iter.next().is_none());
        assert!(iter.next_back().is_none());

        // test nth_back

        let mut iter = arr.iter();
        assert_eq!(iter.nth_back(1), Some(&5));
        assert_eq!(iter.len(), 3);
        assert!(iter.clone().eq(&[2, 3, 4]));

        assert_eq!(iter.nth_back(0), Some(&4));
        assert_eq!(iter.len(), 2);
        assert!(iter.clone().eq(&[2, 3]));

        assert_eq!(iter.nth_back(2), None);
        assert_eq!(iter.len(), 0);
        assert!(iter.next().is_none());
        assert!(iter.next_back().is_none());

        assert_eq!(arr.iter().nth_back(4), Some(&2));
        assert_eq!(arr.iter().nth_back(5), None);
        assert_eq!(arr.iter().last(), Some(&6));
    }

    #[test]
    fn test_iter_mut() {
        let mut arr = wrapped();

        arr.iter_mut()
            .zip(&[1, 2, 3, 4, 5])
            .for_each(|(a, b)| *a *= b);

        assert!(arr.iter().eq(&[2, 6, 12, 20, 30]));

        for item in &mut arr {
            *item += 1;
        }
        assert_eq!(arr, [3, 7, 13, 21, 31]);
        assert_eq!(arr.iter_mut().rev().nth(1).map(|item| *item), Some(21));
    }

    #[test]
    fn test_into_iter() {
        let arr = wrapped();
        let mut iter = arr.into_iter();
        assert_eq!(iter.len(), 5);
        assert_eq!(iter.next(), Some(2));
        assert_eq!(iter.next_back(), Some(6));
        assert_eq!(iter.as_ring(), &[3, 4, 5]);
        assert_eq!(iter.collect::<Vec<_>>(), [3, 4, 5]);
    }

    #[test]
    fn test_into_iter_drops_rest() {
        let shared = Rc::new(());
        let mut arr = RingBuffer::with_capacity(3);
        for _ in 0..4 {
            arr.push_back(Rc::clone(&shared));
        }
        assert_eq!(Rc::strong_count(&shared), 4);

        let mut iter = arr.into_iter();
        drop(iter.next());
        assert_eq!(Rc::strong_count(&shared), 3);
        drop(iter);
        assert_eq!(Rc::strong_count(&shared), 1);
    }

    #[test]
    fn test_iter_debug() {
        let arr = wrapped();
        let mut iter = arr.iter();
        iter.next();
        assert_eq!(format!("{iter:?}"), "Iter([3, 4, 5, 6])");
        assert_eq!(format!("{:?}", arr.into_iter()), "IntoIter([2, 3, 4, 5, 6])");
    }
}
