use crate::list::{RawCursor, UnrolledList, DEFAULT_NODE_CAPACITY};
use crate::Error;
use allocator_api2::alloc::{Allocator, Global};
use std::alloc::handle_alloc_error;
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Formatter;

/// A cursor over an `UnrolledList`.
///
/// Unlike an iterator, a `Cursor` can be moved both ways as often as needed.
///
/// A list of length *n* has *n* + 1 cursor positions: indices 0 to *n* - 1
/// point at elements, and index *n* is the end position, which holds none.
/// Stepping past the last element reaches the end position; stepping past it
/// cyclically wraps to the first element.
///
/// Seeking skips whole nodes, so moving the cursor by *k* steps costs
/// *O*(*k* / `N`) rather than *O*(*k*).
///
/// # Examples
///
/// Walking a cursor over a small list (`#` marks the end position):
/// ```
/// use unrolled_list::UnrolledList;
///
/// // [ A B C D E F #]
/// let list = UnrolledList::<char, 2>::from_iter("ABCDEF".chars());
///
/// // [|A B C D E F #] index 0
/// let mut cursor = list.cursor_start();
/// assert_eq!(cursor.current(), Some(&'A'));
///
/// // [ A B C D|E F #] index 4, two nodes further
/// assert!(cursor.seek_forward(4).is_ok());
/// assert_eq!(cursor.current(), Some(&'E'));
/// assert_eq!(cursor.previous(), Some(&'D'));
///
/// // [ A B C D E F|#] index 6, nothing under the cursor
/// cursor.move_to_end();
/// assert_eq!(cursor.current(), None);
/// assert!(cursor.move_next().is_err());
///
/// // [|A B C D E F #] the cyclic step wraps around
/// cursor.move_next_cyclic();
/// assert_eq!(cursor.index(), 0);
///
/// // [ A B C D E F|#] and back again
/// cursor.move_prev_cyclic();
/// assert_eq!(cursor.index(), 6);
/// ```
pub struct Cursor<'a, T: 'a, const N: usize = { DEFAULT_NODE_CAPACITY }, A: Allocator = Global> {
    index: usize,
    pub(crate) raw: RawCursor<T, N>,
    pub(crate) list: &'a UnrolledList<T, N, A>,
}

impl<'a, T: 'a, const N: usize, A: Allocator> Clone for Cursor<'a, T, N, A> {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            raw: self.raw,
            list: self.list,
        }
    }
}

/// Two cursors are equal when they point into the same list at the same
/// position.
///
/// # Examples
/// ```
/// use unrolled_list::UnrolledList;
///
/// let list = UnrolledList::from([1, 2, 3]);
/// let cursor1 = list.cursor_start();
/// let mut cursor2 = cursor1.clone();
/// // The same list, and the same position.
/// assert_eq!(cursor1, cursor2);
///
/// cursor2.move_next_cyclic();
/// // The same list, but different positions.
/// assert_ne!(cursor1, cursor2);
///
/// let another_list = list.clone();
/// let cursor3 = another_list.cursor_start();
/// // Different list, different positions.
/// assert_ne!(cursor1, cursor3);
/// ```
impl<'a, T: 'a, const N: usize, A: Allocator> PartialEq for Cursor<'a, T, N, A> {
    fn eq(&self, other: &Self) -> bool {
        self.same_list_with(other) && self.raw == other.raw
    }
}

impl<'a, T: 'a, const N: usize, A: Allocator> Eq for Cursor<'a, T, N, A> {}

/// Cursors are ordered by index. Cursors into different lists have no order,
/// hence `PartialOrd` only.
///
/// # Examples
/// ```
/// use unrolled_list::UnrolledList;
///
/// let list = UnrolledList::from([1, 2, 3]);
/// let cursor1 = list.cursor_start();
/// let mut cursor2 = cursor1.clone();
/// cursor2.move_next_cyclic();
/// // They belong to the same list, can compare.
/// assert!(cursor1 < cursor2);
///
/// let another_list = list.clone();
/// let cursor3 = another_list.cursor_end();
/// // They belong to different lists, cannot compare.
/// assert_eq!(cursor1.partial_cmp(&cursor3), None);
/// ```
impl<'a, T: 'a, const N: usize, A: Allocator> PartialOrd for Cursor<'a, T, N, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if !self.same_list_with(other) {
            return None;
        }
        Some(self.index().cmp(&other.index()))
    }
}

/// A cursor over an `UnrolledList` with editing operations.
///
/// A `CursorMut` moves like a [`Cursor`] and may also edit the list under it.
/// The references it hands out borrow the cursor rather than the list, so only
/// one of them can be alive at a time, and the list itself stays locked for as
/// long as the cursor lives. [`CursorMut::view`] lends the whole list out for
/// reading in between edits.
///
/// Every edit leaves the cursor on a valid position: after an insertion it points
/// at the inserted element, and after a removal at the element that followed the
/// removed ones (or the end position).
///
/// # Examples
///
/// ```compile_fail
/// use unrolled_list::UnrolledList;
///
/// let mut list = UnrolledList::from([1, 2, 3]);
/// let mut cursor = list.cursor_start_mut();
/// println!("{:?}", list.back());
/// println!("{:?}", cursor.current());
/// ```
pub struct CursorMut<'a, T: 'a, const N: usize = { DEFAULT_NODE_CAPACITY }, A: Allocator = Global> {
    index: usize,
    pub(crate) raw: RawCursor<T, N>,
    pub(crate) list: &'a mut UnrolledList<T, N, A>,
}

macro_rules! impl_cursor {
    ($CURSOR:ident, $lt:lifetime) => {
        impl<'a, T: 'a, const N: usize, A: Allocator> $CURSOR<'a, T, N, A> {
            /// Return the index of the cursor
            pub fn index(&self) -> usize {
                self.index
            }

            /// Returns `true` if the `UnrolledList` is empty. See [`UnrolledList::is_empty`].
            pub fn is_empty(&self) -> bool {
                self.list.is_empty()
            }

            /// Move the cursor to the next position, where passing
            /// through the end position is allowed.
            ///
            /// This operation should compute in *O*(*1*) time.
            ///
            /// # Examples
            ///
            /// ```
            /// use unrolled_list::UnrolledList;
            ///
            /// let list = UnrolledList::from([1, 2, 3]);
            /// let mut cursor = list.cursor_end();
            ///
            /// // The cursor is at the end position
            /// assert_eq!(cursor.previous(), Some(&3));
            /// cursor.move_next_cyclic();
            ///
            /// // The cursor is now at the first element
            /// assert_eq!(cursor.current(), Some(&1));
            /// ```
            pub fn move_next_cyclic(&mut self) {
                if self.is_empty() {
                    return;
                }
                self.index = if self.raw.is_end() { 0 } else { self.index + 1 };
                // SAFETY: the cursor always holds a valid position of its list.
                self.raw = unsafe { self.list.next_raw(self.raw) };
            }

            /// Move the cursor to the previous position, where passing
            /// through the end position is allowed.
            ///
            /// This operation should compute in *O*(*1*) time.
            ///
            /// # Examples
            ///
            /// ```
            /// use unrolled_list::UnrolledList;
            ///
            /// let list = UnrolledList::from([1, 2, 3]);
            /// let mut cursor = list.cursor_start();
            ///
            /// // The cursor is at the first element
            /// assert_eq!(cursor.current(), Some(&1));
            /// cursor.move_prev_cyclic();
            ///
            /// // The cursor is now at the end position
            /// assert_eq!(cursor.previous(), Some(&3));
            /// ```
            pub fn move_prev_cyclic(&mut self) {
                if self.is_empty() {
                    return;
                }
                self.index = match self.index {
                    0 => self.list.len(),
                    index => index - 1,
                };
                // SAFETY: the cursor always holds a valid position of its list.
                self.raw = unsafe { self.list.prev_raw(self.raw) };
            }

            /// Move the cursor to the next position, or return an error
            /// when it would pass through the end position.
            ///
            /// This operation should compute in *O*(*1*) time.
            ///
            /// # Examples
            ///
            /// ```
            /// use unrolled_list::{Error, UnrolledList};
            ///
            /// let list = UnrolledList::from([1, 2, 3]);
            /// let mut cursor = list.cursor_end();
            ///
            /// // The cursor is at the end position
            /// assert_eq!(cursor.previous(), Some(&3));
            ///
            /// // Forbid to move passing through the end position
            /// assert_eq!(cursor.move_next(), Err(Error::Boundary));
            ///
            /// // the cursor is still at the end position
            /// assert_eq!(cursor.previous(), Some(&3));
            /// ```
            pub fn move_next(&mut self) -> Result<(), Error> {
                if self.raw.is_end() {
                    return Err(Error::Boundary);
                }
                self.move_next_cyclic();
                Ok(())
            }

            /// Move the cursor to the previous position, or return an error
            /// when it would pass through the end position.
            ///
            /// This operation should compute in *O*(*1*) time.
            ///
            /// # Examples
            ///
            /// ```
            /// use unrolled_list::UnrolledList;
            ///
            /// let list = UnrolledList::from([1, 2, 3]);
            /// let mut cursor = list.cursor_start();
            ///
            /// // The cursor is at the first element
            /// assert_eq!(cursor.current(), Some(&1));
            ///
            /// // Forbid to move passing through the end position
            /// assert!(cursor.move_prev().is_err());
            ///
            /// // The cursor is still at the first element
            /// assert_eq!(cursor.current(), Some(&1));
            /// ```
            pub fn move_prev(&mut self) -> Result<(), Error> {
                if self.index == 0 {
                    return Err(Error::Boundary);
                }
                self.move_prev_cyclic();
                Ok(())
            }

            /// Move forward the cursor by given steps, or return the number
            /// of steps actually moved when it would pass through the end position.
            ///
            /// If an error occurs, the cursor will stay at the end position.
            ///
            /// This operation should compute in *O*(*steps* / `N`) time.
            ///
            /// # Examples
            ///
            /// ```
            /// use unrolled_list::UnrolledList;
            ///
            /// let list = UnrolledList::from([1, 2, 3]);
            /// let mut cursor = list.cursor_start();
            ///
            /// // The cursor is at the first element
            /// assert_eq!(cursor.current(), Some(&1));
            ///
            /// // Forbid to move passing through the end position
            /// assert_eq!(cursor.seek_forward(5), Err(3));
            ///
            /// // the cursor is now at the end position
            /// assert_eq!(cursor.previous(), Some(&3));
            /// ```
            pub fn seek_forward(&mut self, steps: usize) -> Result<(), usize> {
                let remaining = self.list.len() - self.index;
                if steps > remaining {
                    self.move_to_end();
                    return Err(remaining);
                }
                // SAFETY: the cursor always holds a valid position of its list.
                self.raw = unsafe { self.list.advance_raw(self.raw, steps) };
                self.index += steps;
                Ok(())
            }

            /// Move backward the cursor by given steps, or return the number
            /// of steps actually moved when it would pass through the first element.
            ///
            /// If an error occurs, the cursor will stay at the first element.
            ///
            /// This operation should compute in *O*(*steps* / `N`) time.
            ///
            /// # Examples
            ///
            /// ```
            /// use unrolled_list::UnrolledList;
            ///
            /// let list = UnrolledList::from([1, 2, 3]);
            /// let mut cursor = list.cursor_end();
            ///
            /// // the cursor is at the end position
            /// assert_eq!(cursor.previous(), Some(&3));
            ///
            /// // Forbid to move passing through the end position
            /// assert_eq!(cursor.seek_backward(5), Err(3));
            ///
            /// // the cursor is now at the first element
            /// assert_eq!(cursor.current(), Some(&1));
            /// ```
            pub fn seek_backward(&mut self, steps: usize) -> Result<(), usize> {
                if steps > self.index {
                    let moved = self.index;
                    self.move_to_start();
                    return Err(moved);
                }
                // SAFETY: the cursor always holds a valid position of its list.
                self.raw = unsafe { self.list.retreat_raw(self.raw, steps) };
                self.index -= steps;
                Ok(())
            }

            /// Move the cursor to the given position `target`, or return an error
            /// when `target > len`.
            ///
            /// If an error occurs, the cursor will stay put.
            ///
            /// The cursor walks from whichever of its current position, the start
            /// and the end is the closest to `target`.
            ///
            /// # Examples
            ///
            /// ```
            /// use unrolled_list::{Error, UnrolledList};
            ///
            /// let list = UnrolledList::from([1, 2, 3]);
            /// let mut cursor = list.cursor_start();
            ///
            /// // The cursor is at the first element
            /// assert_eq!(cursor.current(), Some(&1));
            ///
            /// // Move cursor to a valid place (at the third element)
            /// assert!(cursor.seek_to(2).is_ok());
            /// assert_eq!(cursor.current(), Some(&3));
            ///
            /// // Forbid to move to a invalid place
            /// assert_eq!(cursor.seek_to(5), Err(Error::OutOfBounds { index: 5, len: 3 }));
            ///
            /// // The cursor is still at the third element
            /// assert_eq!(cursor.current(), Some(&3));
            /// ```
            pub fn seek_to(&mut self, target: usize) -> Result<(), Error> {
                let len = self.list.len();
                if target > len {
                    return Err(Error::OutOfBounds { index: target, len });
                }
                // current=c, target=t, end=#
                // SAFETY: the cursor always holds a valid position of its list,
                // and `target <= len` keeps every walk inside the list.
                unsafe {
                    if target >= self.index {
                        // target is at the right side of current: [   c----->t   #]
                        if target - self.index > len - target {
                            // target is far from the right side of current: [ c     t<--#]
                            self.move_to_end();
                        }
                    } else if self.index - target > target {
                        // target is far from the left side of current: [-->t      c #]
                        self.move_to_start();
                    }
                    self.raw = if target >= self.index {
                        self.list.advance_raw(self.raw, target - self.index)
                    } else {
                        self.list.retreat_raw(self.raw, self.index - target)
                    };
                }
                self.index = target;
                Ok(())
            }

            /// Set the cursor to the start of the list (i.e. the first element).
            ///
            /// This operation should compute in *O*(*1*) time.
            ///
            /// # Examples
            ///
            /// ```
            /// use unrolled_list::UnrolledList;
            ///
            /// let list = UnrolledList::from([1, 2, 3]);
            /// let mut cursor = list.cursor_end();
            ///
            /// // The cursor is at the end position
            /// assert_eq!(cursor.previous(), Some(&3));
            /// cursor.move_to_start();
            ///
            /// // The cursor is now at the first element
            /// assert_eq!(cursor.current(), Some(&1));
            /// ```
            #[inline]
            pub fn move_to_start(&mut self) {
                self.index = 0;
                self.raw = self.list.begin_raw();
            }

            /// Set the cursor to the end position of the list.
            ///
            /// This operation should compute in *O*(*1*) time.
            #[inline]
            pub fn move_to_end(&mut self) {
                self.index = self.list.len();
                self.raw = RawCursor::end();
            }

            /// Return an immutable reference of the element at the cursor,
            /// or return `None` if it is located at the end position.
            ///
            /// # Examples
            ///
            /// ```
            /// use unrolled_list::UnrolledList;
            ///
            /// let list = UnrolledList::from([1, 2, 3]);
            /// assert_eq!(list.cursor(0).current(), Some(&1));
            /// assert_eq!(list.cursor(1).current(), Some(&2));
            /// assert_eq!(list.cursor(2).current(), Some(&3));
            /// assert_eq!(list.cursor(3).current(), None);
            /// ```
            pub fn current(&self) -> Option<&$lt T> {
                // SAFETY: the cursor holds a valid position, and the element
                // lives as long as the list is borrowed.
                unsafe { self.raw.element() }
            }

            /// Return an immutable reference of the element before the cursor,
            /// or return `None` if it is located at the first element.
            ///
            /// # Examples
            ///
            /// ```
            /// use unrolled_list::UnrolledList;
            ///
            /// let list = UnrolledList::from([1, 2, 3]);
            /// assert_eq!(list.cursor(0).previous(), None);
            /// assert_eq!(list.cursor(1).previous(), Some(&1));
            /// assert_eq!(list.cursor(2).previous(), Some(&2));
            /// assert_eq!(list.cursor(3).previous(), Some(&3));
            /// ```
            pub fn previous(&self) -> Option<&$lt T> {
                if self.index == 0 {
                    return None;
                }
                // SAFETY: a cursor not at the first element always has a valid
                // element before it.
                unsafe { self.list.prev_raw(self.raw).element() }
            }
        }

        impl<'a, T: fmt::Debug + 'a, const N: usize, A: Allocator> fmt::Debug for $CURSOR<'a, T, N, A> {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($CURSOR))
                    .field("list", &self.list)
                    .field("current", &self.current())
                    .field("index", &self.index)
                    .finish()
            }
        }
    };
}

impl_cursor!(CursorMut, '_);
impl_cursor!(Cursor, 'a);

impl<'a, T: 'a, const N: usize, A: Allocator> Cursor<'a, T, N, A> {
    pub(crate) fn new(list: &'a UnrolledList<T, N, A>, raw: RawCursor<T, N>, index: usize) -> Self {
        Self { index, raw, list }
    }

    fn same_list_with(&self, other: &Self) -> bool {
        std::ptr::eq(self.list, other.list)
    }
}

impl<'a, T: 'a, const N: usize, A: Allocator> CursorMut<'a, T, N, A> {
    pub(crate) fn new(list: &'a mut UnrolledList<T, N, A>, raw: RawCursor<T, N>, index: usize) -> Self {
        Self { index, raw, list }
    }
}

// Methods that does not change the structure of the list.
impl<'a, T: 'a, const N: usize, A: Allocator> CursorMut<'a, T, N, A> {
    /// Return an mutable reference of the element at the cursor,
    /// or return `None` if it is located at the end position.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::from([1, 2, 3]);
    ///
    /// // Create a cursor and mutate the element at the cursor.
    /// let mut cursor = list.cursor_mut(0);
    /// *cursor.current_mut().unwrap() *= 5;
    /// assert_eq!(cursor.current(), Some(&5));
    ///
    /// // Cannot mutate the end position.
    /// assert!(list.cursor_mut(3).current_mut().is_none());
    /// ```
    pub fn current_mut(&mut self) -> Option<&mut T> {
        // SAFETY: the cursor holds a valid position, and the list is
        // mutably borrowed through the cursor.
        unsafe { self.raw.element_mut() }
    }

    /// Re-borrow the mutable cursor as a short-lived immutable one.
    pub fn as_cursor(&self) -> Cursor<'_, T, N, A> {
        Cursor::new(self.list, self.raw, self.index)
    }

    /// Convert the mutable cursor to an immutable one.
    pub fn into_cursor(self) -> Cursor<'a, T, N, A> {
        Cursor::new(self.list, self.raw, self.index)
    }

    /// Borrow the list for reading while the cursor is alive.
    ///
    /// The list cannot be reached directly until the cursor is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::from([1, 2, 3]);
    /// let mut cursor = list.cursor_start_mut();
    ///
    /// assert_eq!(cursor.view().back(), Some(&3));
    ///
    /// cursor.insert(4);
    /// assert_eq!(list.to_vec(), vec![4, 1, 2, 3]);
    /// ```
    pub fn view(&self) -> &UnrolledList<T, N, A> {
        self.list
    }
}

// Methods that might change the structure of the list.
impl<'a, T: 'a, const N: usize, A: Allocator> CursorMut<'a, T, N, A> {
    /// Add an element before the cursor position. After insertion, the cursor
    /// points at the new element and its `index` is unchanged.
    ///
    /// If the node at the cursor is full it is split in two first.
    ///
    /// This operation should compute in *O*(`N`) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::from([1, 2, 3]);
    /// let mut cursor = list.cursor_mut(1);
    ///
    /// cursor.insert(4); // becomes [1, 4, 2, 3]
    /// assert_eq!(cursor.index(), 1);
    /// assert_eq!(cursor.current(), Some(&4));
    ///
    /// cursor.move_to_end();
    /// cursor.insert(5); // becomes [1, 4, 2, 3, 5]
    /// assert_eq!(cursor.index(), 4);
    /// assert_eq!(cursor.current(), Some(&5));
    ///
    /// assert_eq!(list.to_vec(), vec![1, 4, 2, 3, 5]);
    /// ```
    pub fn insert(&mut self, item: T) {
        // SAFETY: the cursor always holds a valid position of its list.
        self.raw = unsafe { self.list.insert_at(self.raw, item) };
    }

    /// Construct an element with `f` and add it before the cursor position,
    /// like [`CursorMut::insert`].
    ///
    /// The element is constructed before the list is touched, so if `f`
    /// panics the list is left exactly as it was.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::from([1, 3]);
    /// let mut cursor = list.cursor_mut(1);
    /// cursor.insert_with(|| 2);
    /// assert_eq!(list, [1, 2, 3]);
    /// ```
    pub fn insert_with<F>(&mut self, f: F)
    where
        F: FnOnce() -> T,
    {
        let item = f();
        self.insert(item);
    }

    /// Like [`CursorMut::insert`], but returns an error instead of aborting
    /// when a node cannot be allocated. The list and the cursor are left
    /// unchanged on error, and `item` is handed back with it.
    pub fn try_insert(&mut self, item: T) -> Result<(), (T, Error)> {
        // SAFETY: the cursor always holds a valid position of its list.
        self.raw = unsafe { self.list.try_insert_at(self.raw, item) }
            .map_err(|(item, layout)| (item, Error::AllocError { layout }))?;
        Ok(())
    }

    /// Add `count` copies of `item` before the cursor position. The cursor then
    /// points at the first inserted element; nothing happens if `count == 0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::from([1, 2]);
    /// let mut cursor = list.cursor_mut(1);
    /// cursor.insert_n(3, 0);
    /// assert_eq!(cursor.index(), 1);
    /// assert_eq!(list.to_vec(), vec![1, 0, 0, 0, 2]);
    /// ```
    pub fn insert_n(&mut self, count: usize, item: T)
    where
        T: Clone,
    {
        if count == 0 {
            return;
        }
        for _ in 1..count {
            self.insert(item.clone());
        }
        self.insert(item);
    }

    /// Remove the element at the cursor and return it, or return `None`
    /// if the cursor is at the end position. After removal, the cursor
    /// is moved to the next element unless no removing is happened.
    ///
    /// This operation should compute in *O*(`N`) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<_> = (0..10).collect();
    /// let mut cursor = list.cursor_mut(5);
    ///
    /// assert_eq!(cursor.remove(), Some(5)); // becomes [0, 1, 2, 3, 4, 6, 7, 8, 9]
    /// assert_eq!(cursor.index(), 5);
    /// assert_eq!(cursor.current(), Some(&6));
    ///
    /// cursor.move_to_start();
    /// assert_eq!(cursor.remove(), Some(0)); // becomes [1, 2, 3, 4, 6, 7, 8, 9]
    /// assert_eq!(cursor.index(), 0);
    /// assert_eq!(cursor.current(), Some(&1));
    ///
    /// cursor.move_to_end();
    /// assert_eq!(cursor.remove(), None);
    /// assert_eq!(cursor.index(), 8);
    /// assert_eq!(cursor.current(), None);
    ///
    /// assert_eq!(list.to_vec(), vec![1, 2, 3, 4, 6, 7, 8, 9]);
    /// ```
    pub fn remove(&mut self) -> Option<T> {
        // SAFETY: the cursor always holds a valid position of its list.
        let (item, follower) = unsafe { self.list.remove_at(self.raw) }?;
        self.raw = follower;
        Some(item)
    }

    /// Remove up to `count` elements starting at the cursor, and return how
    /// many were removed. After removal, the cursor points at the element that
    /// followed them.
    ///
    /// Nodes emptied by the removal are freed; the nodes at both ends of the
    /// removed range keep whatever they still hold.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<_> = (0..10).collect();
    /// let mut cursor = list.cursor_mut(3);
    ///
    /// assert_eq!(cursor.remove_n(4), 4);
    /// assert_eq!(cursor.current(), Some(&7));
    /// assert_eq!(cursor.remove_n(100), 3);
    /// assert_eq!(cursor.current(), None);
    ///
    /// assert_eq!(list.to_vec(), vec![0, 1, 2]);
    /// ```
    pub fn remove_n(&mut self, count: usize) -> usize {
        let count = count.min(self.list.len() - self.index);
        if count == 0 {
            return 0;
        }
        // SAFETY: `raw..last` covers `count` elements of the list.
        unsafe {
            let last = self.list.advance_raw(self.raw, count);
            self.raw = self.list.erase_between(self.raw, last);
        }
        count
    }

    /// Remove the element before the cursor and return it, or return `None` if
    /// the cursor is at the first element. After removal, the cursor still
    /// points at the same element, but its `index` becomes `index - 1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<_> = (0..10).collect();
    /// let mut cursor = list.cursor_mut(5);
    ///
    /// assert_eq!(cursor.backspace(), Some(4)); // becomes [0, 1, 2, 3, 5, 6, 7, 8, 9]
    /// assert_eq!(cursor.index(), 4);
    /// assert_eq!(cursor.current(), Some(&5));
    ///
    /// cursor.move_to_start();
    /// assert_eq!(cursor.backspace(), None);
    /// assert_eq!(cursor.index(), 0);
    /// assert_eq!(cursor.current(), Some(&0));
    ///
    /// cursor.move_to_end();
    /// assert_eq!(cursor.backspace(), Some(9)); // becomes [0, 1, 2, 3, 5, 6, 7, 8]
    /// assert_eq!(cursor.index(), 8);
    /// assert_eq!(cursor.current(), None);
    ///
    /// assert_eq!(list.to_vec(), vec![0, 1, 2, 3, 5, 6, 7, 8]);
    /// ```
    pub fn backspace(&mut self) -> Option<T> {
        self.move_prev().ok().and_then(|_| self.remove())
    }
}

impl<'a, T: 'a, const N: usize, A: Allocator + Clone> CursorMut<'a, T, N, A> {
    /// Split the list into two before the current element. This will return a
    /// new list consisting of everything after the cursor (inclusive), with the
    /// current list retaining everything before (exclusive).
    ///
    /// After splitting, the cursor is at the end position of the shortened list.
    /// If the cursor is already at the end position, an empty list is returned.
    ///
    /// At most one node is split in two.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<_> = (0..10).collect();
    /// let mut cursor = list.cursor_mut(5);
    ///
    /// let list2 = cursor.split();
    /// assert_eq!(cursor.current(), None);
    /// assert_eq!(cursor.index(), 5);
    ///
    /// assert_eq!(list2.to_vec(), vec![5, 6, 7, 8, 9]);
    /// assert_eq!(list.to_vec(), vec![0, 1, 2, 3, 4]);
    /// ```
    pub fn split(&mut self) -> UnrolledList<T, N, A> {
        // SAFETY: the cursor holds the valid position of index `self.index`.
        let other = unsafe { self.list.split_at_raw(self.raw, self.index) }
            .unwrap_or_else(|layout| handle_alloc_error(layout));
        self.raw = RawCursor::end();
        other
    }
}

impl<'a, T: 'a, const N: usize> CursorMut<'a, T, N, Global> {
    /// Splice another list before the cursor position. The cursor stays at the
    /// same element, and its `index` grows by the length of `other`.
    ///
    /// The nodes of `other` are moved into the list as they are.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::from([0, 1, 7, 8, 9]);
    /// let list2 = UnrolledList::from([2, 3, 4, 5, 6]);
    /// let mut cursor = list.cursor_mut(2);
    ///
    /// cursor.splice(list2);
    /// assert_eq!(cursor.current(), Some(&7));
    /// assert_eq!(cursor.index(), 7);
    ///
    /// assert_eq!(list.to_vec(), (0..10).collect::<Vec<_>>());
    /// ```
    pub fn splice(&mut self, mut other: UnrolledList<T, N>) {
        if other.is_empty() {
            return;
        }
        let mut back = self.split();
        let current = back.begin_raw();
        self.index += other.len();
        self.list.append(&mut other);
        self.list.append(&mut back);
        self.raw = current;
    }
}

unsafe impl<T: Sync, const N: usize, A: Allocator + Sync> Send for Cursor<'_, T, N, A> {}

unsafe impl<T: Sync, const N: usize, A: Allocator + Sync> Sync for Cursor<'_, T, N, A> {}

unsafe impl<T: Send, const N: usize, A: Allocator + Send> Send for CursorMut<'_, T, N, A> {}

unsafe impl<T: Sync, const N: usize, A: Allocator + Sync> Sync for CursorMut<'_, T, N, A> {}
