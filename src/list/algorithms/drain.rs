use crate::list::{UnrolledList, DEFAULT_NODE_CAPACITY};
use allocator_api2::alloc::{Allocator, Global};
use std::fmt;
use std::iter::FusedIterator;

/// A draining iterator over the elements of an `UnrolledList`.
///
/// This `struct` is created by [`UnrolledList::drain`]. Elements are removed
/// as they are yielded, and the ones left are dropped along with the `Drain`.
pub struct Drain<'a, T: 'a, const N: usize = { DEFAULT_NODE_CAPACITY }, A: Allocator = Global> {
    list: &'a mut UnrolledList<T, N, A>,
}

impl<'a, T: 'a, const N: usize, A: Allocator> Drain<'a, T, N, A> {
    pub(crate) fn new(list: &'a mut UnrolledList<T, N, A>) -> Self {
        Self { list }
    }
}

impl<T, const N: usize, A: Allocator> Iterator for Drain<'_, T, N, A> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.list.len();
        (len, Some(len))
    }
}

impl<T, const N: usize, A: Allocator> DoubleEndedIterator for Drain<'_, T, N, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.list.pop_back()
    }
}

impl<T, const N: usize, A: Allocator> ExactSizeIterator for Drain<'_, T, N, A> {}

impl<T, const N: usize, A: Allocator> FusedIterator for Drain<'_, T, N, A> {}

impl<T, const N: usize, A: Allocator> Drop for Drain<'_, T, N, A> {
    fn drop(&mut self) {
        self.list.clear();
    }
}

impl<T: fmt::Debug, const N: usize, A: Allocator> fmt::Debug for Drain<'_, T, N, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Drain").field(&*self.list).finish()
    }
}
