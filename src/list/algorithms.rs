use crate::list::UnrolledList;
use allocator_api2::alloc::Allocator;
use std::alloc::handle_alloc_error;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::mem;

pub mod drain;

/// Lists are equal when they hold equal elements in the same order, however
/// the elements are spread over the nodes.
impl<T, U, const N: usize, const M: usize, A, B> PartialEq<UnrolledList<U, M, B>>
    for UnrolledList<T, N, A>
where
    T: PartialEq<U>,
    A: Allocator,
    B: Allocator,
{
    fn eq(&self, other: &UnrolledList<U, M, B>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, const N: usize, A: Allocator> Eq for UnrolledList<T, N, A> {}

impl<T, U, const N: usize, A: Allocator> PartialEq<[U]> for UnrolledList<T, N, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U]) -> bool {
        self.len() == other.len() && self.iter().eq(other)
    }
}

impl<T, U, const N: usize, A: Allocator> PartialEq<&[U]> for UnrolledList<T, N, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &&[U]) -> bool {
        *self == **other
    }
}

impl<T, U, const N: usize, A: Allocator> PartialEq<Vec<U>> for UnrolledList<T, N, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &Vec<U>) -> bool {
        *self == **other
    }
}

impl<T, U, const N: usize, const M: usize, A: Allocator> PartialEq<[U; M]> for UnrolledList<T, N, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; M]) -> bool {
        *self == other[..]
    }
}

impl<T: PartialOrd, const N: usize, A: Allocator> PartialOrd for UnrolledList<T, N, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other)
    }
}

impl<T: Ord, const N: usize, A: Allocator> Ord for UnrolledList<T, N, A> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other)
    }
}

/// The clone keeps the node layout of the source list: every node is copied into
/// a node of its own, holding the same number of elements.
impl<T: Clone, const N: usize, A: Allocator + Clone> Clone for UnrolledList<T, N, A> {
    fn clone(&self) -> Self {
        let mut other = Self::new_in(self.alloc.clone());
        for chunk in self.chunks() {
            let mut node = other
                .allocate_node()
                .unwrap_or_else(|layout| handle_alloc_error(layout));
            // SAFETY: the node is freshly allocated, and it is attached before
            // anything is cloned into it, so a panicking `clone` leaves `other`
            // in a state it can drop.
            unsafe {
                other.attach_node(other.tail, node);
                for item in chunk {
                    node.as_mut().push(item.clone());
                    other.len += 1;
                }
            }
        }
        other
    }

    /// Replace the contents with a clone of `source`. The clone is built
    /// completely before anything in `self` is released.
    fn clone_from(&mut self, source: &Self) {
        let mut fresh = source.clone();
        mem::swap(self, &mut fresh);
    }
}

impl<T: Hash, const N: usize, A: Allocator> Hash for UnrolledList<T, N, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut len = 0_usize;
        for elt in self {
            elt.hash(state);
            len += 1;
        }
        len.hash(state);
    }
}

/// Only provided for the default node capacity and allocator, so that
/// `UnrolledList::from([..])` needs no type annotation. Other lists can be
/// collected from `array.into_iter()`.
impl<T, const M: usize> From<[T; M]> for UnrolledList<T> {
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list = UnrolledList::from([1, 2, 3]);
    /// assert_eq!(list, [1, 2, 3]);
    /// ```
    fn from(array: [T; M]) -> Self {
        array.into_iter().collect()
    }
}

impl<T, const N: usize, A: Allocator> UnrolledList<T, N, A> {
    /// Returns `true` if the `UnrolledList` contains an element equal to the given value.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::new();
    ///
    /// list.push_back(0);
    /// list.push_back(1);
    /// list.push_back(2);
    ///
    /// assert_eq!(list.contains(&0), true);
    /// assert_eq!(list.contains(&10), false);
    /// ```
    pub fn contains(&self, x: &T) -> bool
    where
        T: PartialEq<T>,
    {
        self.chunks().any(|chunk| chunk.contains(x))
    }
}
