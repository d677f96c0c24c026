use crate::list::node::{Node, NodePtr};
use crate::list::{UnrolledList, DEFAULT_NODE_CAPACITY};
use allocator_api2::alloc::{Allocator, Global};
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::slice;

/// An iterator over the nodes of an `UnrolledList`, yielding the elements of
/// each node as one slice.
///
/// It walks the nodes from both ends and stops when the two ends meet,
/// which is tracked by the number of elements not yet yielded.
///
/// # Examples
///
/// ```
/// use unrolled_list::UnrolledList;
///
/// let mut list = UnrolledList::<i32, 4>::default();
/// list.extend(0..4);
/// list.push_front(-1); // splits the full node
///
/// let mut chunks = list.chunks();
/// assert_eq!(chunks.next(), Some(&[-1, 0, 1][..]));
/// assert_eq!(chunks.next_back(), Some(&[2, 3][..]));
/// assert_eq!(chunks.next(), None);
/// ```
pub struct Chunks<'a, T: 'a, const N: usize = { DEFAULT_NODE_CAPACITY }> {
    head: Option<NodePtr<T, N>>,
    tail: Option<NodePtr<T, N>>,
    len: usize,
    _marker: PhantomData<&'a Node<T, N>>,
}

impl<'a, T: 'a, const N: usize> Chunks<'a, T, N> {
    pub(crate) fn new(head: Option<NodePtr<T, N>>, tail: Option<NodePtr<T, N>>, len: usize) -> Self {
        Self {
            head,
            tail,
            len,
            _marker: PhantomData,
        }
    }
}

impl<T, const N: usize> Clone for Chunks<'_, T, N> {
    fn clone(&self) -> Self {
        Self::new(self.head, self.tail, self.len)
    }
}

impl<'a, T: fmt::Debug + 'a, const N: usize> fmt::Debug for Chunks<'a, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T: 'a, const N: usize> Iterator for Chunks<'a, T, N> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let node = self.head?;
        // SAFETY: the nodes between `head` and `tail` are alive and borrowed
        // immutably for `'a`.
        let node = unsafe { &*node.as_ptr() };
        self.head = node.next;
        self.len -= node.len();
        Some(node.as_slice())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        ((self.len + N - 1) / N, Some(self.len))
    }
}

impl<'a, T: 'a, const N: usize> DoubleEndedIterator for Chunks<'a, T, N> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let node = self.tail?;
        // SAFETY: see `Chunks::next`.
        let node = unsafe { &*node.as_ptr() };
        self.tail = node.prev;
        self.len -= node.len();
        Some(node.as_slice())
    }
}

impl<'a, T: 'a, const N: usize> FusedIterator for Chunks<'a, T, N> {}

/// A mutable iterator over the nodes of an `UnrolledList`, yielding the
/// elements of each node as one mutable slice.
///
/// # Examples
///
/// ```
/// use unrolled_list::UnrolledList;
///
/// let mut list = UnrolledList::<i32, 3>::from_iter(0..7);
/// for chunk in list.chunks_mut() {
///     chunk.reverse();
/// }
/// assert_eq!(list.iter().filter(|&&x| x == 0).count(), 1);
/// ```
pub struct ChunksMut<'a, T: 'a, const N: usize = { DEFAULT_NODE_CAPACITY }> {
    head: Option<NodePtr<T, N>>,
    tail: Option<NodePtr<T, N>>,
    len: usize,
    _marker: PhantomData<&'a mut Node<T, N>>,
}

impl<'a, T: 'a, const N: usize> ChunksMut<'a, T, N> {
    pub(crate) fn new(head: Option<NodePtr<T, N>>, tail: Option<NodePtr<T, N>>, len: usize) -> Self {
        Self {
            head,
            tail,
            len,
            _marker: PhantomData,
        }
    }
}

impl<'a, T: 'a, const N: usize> fmt::Debug for ChunksMut<'a, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunksMut").field("len", &self.len).finish()
    }
}

impl<'a, T: 'a, const N: usize> Iterator for ChunksMut<'a, T, N> {
    type Item = &'a mut [T];

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let node = self.head?;
        // SAFETY: the nodes between `head` and `tail` are alive and borrowed
        // mutably for `'a`, and each of them is yielded at most once.
        let node = unsafe { &mut *node.as_ptr() };
        self.head = node.next;
        self.len -= node.len();
        Some(node.as_mut_slice())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        ((self.len + N - 1) / N, Some(self.len))
    }
}

impl<'a, T: 'a, const N: usize> DoubleEndedIterator for ChunksMut<'a, T, N> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let node = self.tail?;
        // SAFETY: see `ChunksMut::next`.
        let node = unsafe { &mut *node.as_ptr() };
        self.tail = node.prev;
        self.len -= node.len();
        Some(node.as_mut_slice())
    }
}

impl<'a, T: 'a, const N: usize> FusedIterator for ChunksMut<'a, T, N> {}

/// An iterator over the elements of an `UnrolledList`.
///
/// It flattens [`Chunks`], keeping the partially consumed node at each end as
/// a slice iterator, so stepping inside a node is as cheap as for a slice.
///
/// Though the `Iter` does not hold a reference from the list,
/// it actually *borrows* (immutably) from the list.
///
/// # Examples
///
/// ```compile_fail
/// use unrolled_list::UnrolledList;
///
/// let mut list = UnrolledList::from([1, 2, 3]);
/// let mut iter = list.iter();
///
/// // Won't compile, because list is already borrowed immutably.
/// list.push_back(4);
/// println!("{:?}", iter.next());
/// ```
pub struct Iter<'a, T: 'a, const N: usize = { DEFAULT_NODE_CAPACITY }> {
    chunks: Chunks<'a, T, N>,
    front: slice::Iter<'a, T>,
    back: slice::Iter<'a, T>,
    len: usize,
}

impl<'a, T: 'a, const N: usize> Iter<'a, T, N> {
    pub(crate) fn new(chunks: Chunks<'a, T, N>) -> Self {
        let len = chunks.len;
        Self {
            chunks,
            front: <&[T]>::default().iter(),
            back: <&[T]>::default().iter(),
            len,
        }
    }
}

impl<T, const N: usize> Clone for Iter<'_, T, N> {
    fn clone(&self) -> Self {
        Self {
            chunks: self.chunks.clone(),
            front: self.front.clone(),
            back: self.back.clone(),
            len: self.len,
        }
    }
}

impl<'a, T: fmt::Debug + 'a, const N: usize> fmt::Debug for Iter<'a, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter")
            .field(&self.clone().collect::<Vec<_>>())
            .finish()
    }
}

impl<'a, T: 'a, const N: usize> Iterator for Iter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.front.next() {
                self.len -= 1;
                return Some(item);
            }
            match self.chunks.next() {
                Some(chunk) => self.front = chunk.iter(),
                None => {
                    let item = self.back.next();
                    if item.is_some() {
                        self.len -= 1;
                    }
                    return item;
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    fn last(mut self) -> Option<Self::Item>
    where
        Self: Sized,
    {
        self.next_back()
    }
}

impl<'a, T: 'a, const N: usize> DoubleEndedIterator for Iter<'a, T, N> {
    fn next_back(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.back.next_back() {
                self.len -= 1;
                return Some(item);
            }
            match self.chunks.next_back() {
                Some(chunk) => self.back = chunk.iter(),
                None => {
                    let item = self.front.next_back();
                    if item.is_some() {
                        self.len -= 1;
                    }
                    return item;
                }
            }
        }
    }
}

impl<'a, T: 'a, const N: usize> ExactSizeIterator for Iter<'a, T, N> {}

impl<'a, T: 'a, const N: usize> FusedIterator for Iter<'a, T, N> {}

/// A mutable iterator over the elements of an `UnrolledList`.
///
/// Though the `IterMut` does not hold a reference from the list,
/// it actually *borrows* (mutably) from the list.
///
/// # Examples
///
/// `UnrolledList` is not readable after an `IterMut` is created.
/// ```compile_fail
/// use unrolled_list::UnrolledList;
///
/// let mut list = UnrolledList::from([1, 2, 3]);
/// let mut iter = list.iter_mut();
/// println!("{:?}", list.back());
/// println!("{:?}", iter.next());
/// ```
pub struct IterMut<'a, T: 'a, const N: usize = { DEFAULT_NODE_CAPACITY }> {
    chunks: ChunksMut<'a, T, N>,
    front: slice::IterMut<'a, T>,
    back: slice::IterMut<'a, T>,
    len: usize,
}

impl<'a, T: 'a, const N: usize> IterMut<'a, T, N> {
    pub(crate) fn new(chunks: ChunksMut<'a, T, N>) -> Self {
        let len = chunks.len;
        Self {
            chunks,
            front: <&mut [T]>::default().iter_mut(),
            back: <&mut [T]>::default().iter_mut(),
            len,
        }
    }
}

impl<'a, T: 'a, const N: usize> fmt::Debug for IterMut<'a, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut").field("len", &self.len).finish()
    }
}

impl<'a, T: 'a, const N: usize> Iterator for IterMut<'a, T, N> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.front.next() {
                self.len -= 1;
                return Some(item);
            }
            match self.chunks.next() {
                Some(chunk) => self.front = chunk.iter_mut(),
                None => {
                    let item = self.back.next();
                    if item.is_some() {
                        self.len -= 1;
                    }
                    return item;
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    fn last(mut self) -> Option<Self::Item>
    where
        Self: Sized,
    {
        self.next_back()
    }
}

impl<'a, T: 'a, const N: usize> DoubleEndedIterator for IterMut<'a, T, N> {
    fn next_back(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.back.next_back() {
                self.len -= 1;
                return Some(item);
            }
            match self.chunks.next_back() {
                Some(chunk) => self.back = chunk.iter_mut(),
                None => {
                    let item = self.front.next_back();
                    if item.is_some() {
                        self.len -= 1;
                    }
                    return item;
                }
            }
        }
    }
}

impl<'a, T: 'a, const N: usize> ExactSizeIterator for IterMut<'a, T, N> {}

impl<'a, T: 'a, const N: usize> FusedIterator for IterMut<'a, T, N> {}

/// An owning iterator over the elements of an `UnrolledList`.
///
/// This `struct` is created by the [`into_iter`] method on [`UnrolledList`]
/// (provided by the `IntoIterator` trait). See its documentation for more.
///
/// [`into_iter`]: UnrolledList::into_iter
pub struct IntoIter<T, const N: usize = { DEFAULT_NODE_CAPACITY }, A: Allocator = Global> {
    list: UnrolledList<T, N, A>,
}

impl<T: fmt::Debug, const N: usize, A: Allocator> fmt::Debug for IntoIter<T, N, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.list).finish()
    }
}

impl<T, const N: usize, A: Allocator> Iterator for IntoIter<T, N, A> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.list.len;
        (len, Some(len))
    }

    fn last(mut self) -> Option<Self::Item>
    where
        Self: Sized,
    {
        self.next_back()
    }
}

impl<T, const N: usize, A: Allocator> DoubleEndedIterator for IntoIter<T, N, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.list.pop_back()
    }
}

impl<T, const N: usize, A: Allocator> ExactSizeIterator for IntoIter<T, N, A> {}

impl<T, const N: usize, A: Allocator> FusedIterator for IntoIter<T, N, A> {}

impl<T, const N: usize, A: Allocator> IntoIterator for UnrolledList<T, N, A> {
    type Item = T;
    type IntoIter = IntoIter<T, N, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self }
    }
}

impl<'a, T, const N: usize, A: Allocator> IntoIterator for &'a UnrolledList<T, N, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const N: usize, A: Allocator> IntoIterator for &'a mut UnrolledList<T, N, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, const N: usize, A: Allocator + Default> FromIterator<T> for UnrolledList<T, N, A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new_in(A::default());
        list.extend(iter);
        list
    }
}

impl<T, const N: usize, A: Allocator> Extend<T> for UnrolledList<T, N, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(|item| self.push_back(item));
    }
}

impl<'a, T: 'a + Copy, const N: usize, A: Allocator> Extend<&'a T> for UnrolledList<T, N, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied())
    }
}

unsafe impl<T: Sync, const N: usize> Send for Chunks<'_, T, N> {}

unsafe impl<T: Sync, const N: usize> Sync for Chunks<'_, T, N> {}

unsafe impl<T: Send, const N: usize> Send for ChunksMut<'_, T, N> {}

unsafe impl<T: Sync, const N: usize> Sync for ChunksMut<'_, T, N> {}
