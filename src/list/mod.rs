use std::alloc::{handle_alloc_error, Layout};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::mem;
use std::ops::{Bound, Index, IndexMut, RangeBounds};
use std::ptr::{self, NonNull};

use allocator_api2::alloc::{Allocator, Global};

use crate::list::algorithms::drain::Drain;
use crate::list::cursor::{Cursor, CursorMut};
use crate::list::node::{Node, NodePtr};
use crate::{Chunks, ChunksMut, Error, IntoIter, Iter, IterMut};

pub mod cursor;
pub mod iterator;

mod algorithms;
mod node;

pub use algorithms::drain;

/// The node capacity used when none is given, i.e. `UnrolledList<T>` is
/// `UnrolledList<T, DEFAULT_NODE_CAPACITY>`.
pub const DEFAULT_NODE_CAPACITY: usize = 10;

/// The `UnrolledList` is a doubly-linked list whose nodes hold up to `N` elements
/// each, stored inline in a fixed-capacity slot array.
///
/// Compared to a list with one element per node, it stores `N` times fewer links
/// and walks memory in contiguous runs, while still inserting and erasing at a
/// known position in *O*(1) amortized time (at most `N` elements are shifted).
/// In compromise, indexing walks the list node by node, which takes *O*(*n* / `N`)
/// rather than *O*(1).
///
/// The `UnrolledList` contains:
/// - the pointers `head` and `tail` to the first and the last node, both `None`
///   when the list is empty (there is no sentinel node);
/// - a length field `len`, the sum of the lengths of all nodes;
/// - the allocator `alloc` that every node is allocated from.
///
/// A node never stays empty in the list: it is unlinked and freed as soon as its
/// last element goes away. Nodes are never merged, so a list that saw many
/// erasures may hold several partially filled nodes.
///
/// `N` must be at least 2, which is checked at compile time.
///
/// # Naming Conventions
///
/// - *node*: one block of the chain, holding a contiguous run of elements;
/// - *offset*: the position of an element inside its node;
/// - *index*: the position of an element in the whole list.
pub struct UnrolledList<T, const N: usize = { DEFAULT_NODE_CAPACITY }, A: Allocator = Global> {
    head: Option<NodePtr<T, N>>,
    tail: Option<NodePtr<T, N>>,
    /// the length of the list
    pub(crate) len: usize,
    alloc: A,
    _marker: PhantomData<Box<Node<T, N>>>,
}

/// A position in the list: an element as `(node, offset)`, or the end position
/// when `node` is `None`.
///
/// A raw cursor does not borrow the list; it is valid until the node it points
/// into is split, freed, or has elements inserted or removed before `offset`.
pub(crate) struct RawCursor<T, const N: usize> {
    pub(crate) node: Option<NodePtr<T, N>>,
    pub(crate) offset: usize,
}

impl<T, const N: usize> Clone for RawCursor<T, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const N: usize> Copy for RawCursor<T, N> {}

impl<T, const N: usize> PartialEq for RawCursor<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.offset == other.offset
    }
}

impl<T, const N: usize> Eq for RawCursor<T, N> {}

impl<T, const N: usize> RawCursor<T, N> {
    pub(crate) fn new(node: Option<NodePtr<T, N>>, offset: usize) -> Self {
        Self { node, offset }
    }

    pub(crate) fn end() -> Self {
        Self::new(None, 0)
    }

    pub(crate) fn is_end(&self) -> bool {
        self.node.is_none()
    }

    /// It is unsafe because the cursor must point to a live element (or the end)
    /// and the chosen lifetime must not outlive the node.
    pub(crate) unsafe fn element<'b>(self) -> Option<&'b T> {
        let node = self.node?;
        Some(&(*node.as_ptr()).as_slice()[self.offset])
    }

    /// See [`RawCursor::element`].
    pub(crate) unsafe fn element_mut<'b>(self) -> Option<&'b mut T> {
        let node = self.node?;
        Some(&mut (*node.as_ptr()).as_mut_slice()[self.offset])
    }
}

// private methods
impl<T, const N: usize, A: Allocator> UnrolledList<T, N, A> {
    const NODE_CAPACITY_CHECK: () = assert!(N >= 2, "a node must hold at least two elements");

    fn node_layout() -> Layout {
        Layout::new::<Node<T, N>>()
    }

    /// Allocate an empty, unlinked node. On failure the layout that could not be
    /// allocated is returned.
    fn allocate_node(&self) -> Result<NodePtr<T, N>, Layout> {
        let layout = Self::node_layout();
        let node = self.alloc.allocate(layout).map_err(|_| layout)?.cast();
        // SAFETY: the block was allocated with the layout of `Node<T, N>`.
        unsafe { Node::init(node) };
        Ok(node)
    }

    /// Drop the elements left in `node` and return its memory to the allocator.
    /// The memory is returned even if one of the destructors panics.
    ///
    /// It is unsafe because `node` must have been allocated by this list's
    /// allocator and must no longer be linked.
    unsafe fn free_node(&self, node: NodePtr<T, N>) {
        struct Deallocate<'a, A: Allocator> {
            alloc: &'a A,
            ptr: NonNull<u8>,
            layout: Layout,
        }

        impl<A: Allocator> Drop for Deallocate<'_, A> {
            fn drop(&mut self) {
                // SAFETY: `ptr` was allocated by `alloc` with `layout`.
                unsafe { self.alloc.deallocate(self.ptr, self.layout) };
            }
        }

        let _guard = Deallocate {
            alloc: &self.alloc,
            ptr: node.cast(),
            layout: Self::node_layout(),
        };
        ptr::drop_in_place(node.as_ptr());
    }

    /// Attach a single node `node` to the list right after `prev`, or at the
    /// front when `prev` is `None`. The list length is not changed.
    ///
    /// It is unsafe because it does not check whether `prev` belongs to the list.
    pub(crate) unsafe fn attach_node(&mut self, prev: Option<NodePtr<T, N>>, mut node: NodePtr<T, N>) {
        let next = match prev {
            Some(prev) => prev.as_ref().next,
            None => self.head,
        };
        node.as_mut().prev = prev;
        node.as_mut().next = next;
        match prev {
            Some(mut prev) => prev.as_mut().next = Some(node),
            None => self.head = Some(node),
        }
        match next {
            Some(mut next) => next.as_mut().prev = Some(node),
            None => self.tail = Some(node),
        }
        #[cfg(debug_assertions)]
        {
            if let Some(prev) = prev {
                assert_adjacent(prev, node);
            }
            if let Some(next) = next {
                assert_adjacent(node, next);
            }
        }
    }

    /// Detach a single node `node` from the list and return the node that
    /// followed it. The list length is not changed.
    ///
    /// It is unsafe because it does not check whether `node` belongs to the list.
    pub(crate) unsafe fn detach_node(&mut self, node: NodePtr<T, N>) -> Option<NodePtr<T, N>> {
        let (prev, next) = (node.as_ref().prev, node.as_ref().next);
        match prev {
            Some(mut prev) => prev.as_mut().next = next,
            None => self.head = next,
        }
        match next {
            Some(mut next) => next.as_mut().prev = prev,
            None => self.tail = prev,
        }
        next
    }

    /// Detach `node`, drop the elements it still holds and free it. Returns the
    /// node that followed it.
    ///
    /// The node is unlinked and the length updated before any destructor runs.
    unsafe fn discard_node(&mut self, node: NodePtr<T, N>) -> Option<NodePtr<T, N>> {
        let next = self.detach_node(node);
        self.len -= node.as_ref().len();
        self.free_node(node);
        next
    }

    /// Split the full `node`, moving its back `N / 2` elements into a new node
    /// linked right after it. The front keeps `N - N / 2` elements.
    ///
    /// Nothing is moved if the new node cannot be allocated.
    unsafe fn split_node(&mut self, mut node: NodePtr<T, N>) -> Result<NodePtr<T, N>, Layout> {
        let mut back = self.allocate_node()?;
        node.as_mut().move_tail_to(N - N / 2, back.as_mut());
        self.attach_node(Some(node), back);
        Ok(back)
    }

    /// Move a cursor sitting one past the last element of its node onto the
    /// first element of the next node.
    unsafe fn settle(&self, at: RawCursor<T, N>) -> RawCursor<T, N> {
        match at.node {
            Some(node) if at.offset >= node.as_ref().len() => RawCursor::new(node.as_ref().next, 0),
            _ => at,
        }
    }

    /// Insert `value` before the element at `at` (or at the back when `at` is the
    /// end), and return the position now holding `value`.
    ///
    /// A full node is split first. The new node is allocated before anything is
    /// moved, so if the allocation fails the list is left untouched and `value`
    /// is handed back along with the failed layout.
    ///
    /// It is unsafe because `at` must be a valid position of this list.
    pub(crate) unsafe fn try_insert_at(
        &mut self,
        at: RawCursor<T, N>,
        value: T,
    ) -> Result<RawCursor<T, N>, (T, Layout)> {
        let (mut node, mut offset) = match (at.node, self.tail) {
            (Some(node), _) => (node, at.offset),
            (None, Some(tail)) => (tail, tail.as_ref().len()),
            (None, None) => {
                let node = match self.allocate_node() {
                    Ok(node) => node,
                    Err(layout) => return Err((value, layout)),
                };
                self.attach_node(None, node);
                (node, 0)
            }
        };
        if node.as_ref().is_full() {
            let back = match self.split_node(node) {
                Ok(back) => back,
                Err(layout) => return Err((value, layout)),
            };
            let kept = node.as_ref().len();
            if offset > kept {
                node = back;
                offset -= kept;
            }
        }
        node.as_mut().insert(offset, value);
        self.len += 1;
        Ok(RawCursor::new(Some(node), offset))
    }

    /// Like [`UnrolledList::try_insert_at`], but handles allocation failure the
    /// way std collections do.
    pub(crate) unsafe fn insert_at(&mut self, at: RawCursor<T, N>, value: T) -> RawCursor<T, N> {
        self.try_insert_at(at, value)
            .unwrap_or_else(|(_, layout)| handle_alloc_error(layout))
    }

    /// Remove the element at `at` and return it along with the position of the
    /// element that followed it, or `None` if `at` is the end.
    ///
    /// It is unsafe because `at` must be a valid position of this list.
    pub(crate) unsafe fn remove_at(&mut self, at: RawCursor<T, N>) -> Option<(T, RawCursor<T, N>)> {
        let mut node = at.node?;
        let value = node.as_mut().remove(at.offset);
        self.len -= 1;
        let follower = if node.as_ref().is_empty() {
            RawCursor::new(self.discard_node(node), 0)
        } else {
            self.settle(RawCursor::new(Some(node), at.offset))
        };
        Some((value, follower))
    }

    /// Drop the elements in `first..last` and return the position of the element
    /// that followed them.
    ///
    /// Every node emptied on the way is freed; partially filled nodes are left as
    /// they are and never merged.
    ///
    /// If a destructor panics, the node being worked on is still left without
    /// dropped values (or unlinked, if it was to be emptied), and the nodes not
    /// reached yet stay in the list untouched. `len` only counts what is left.
    ///
    /// It is unsafe because `first..last` must be a valid range of this list
    /// (`first` must not be at the right of `last`).
    pub(crate) unsafe fn erase_between(
        &mut self,
        first: RawCursor<T, N>,
        last: RawCursor<T, N>,
    ) -> RawCursor<T, N> {
        let Some(mut start) = first.node else {
            return first;
        };
        if first == last {
            return first;
        }
        let (mut end, end_offset) = match (last.node, self.tail) {
            (Some(node), _) => (node, last.offset),
            (None, Some(tail)) => (tail, tail.as_ref().len()),
            (None, None) => return first,
        };

        if start == end {
            let count = end_offset - first.offset;
            if count == start.as_ref().len() {
                return RawCursor::new(self.discard_node(start), 0);
            }
            self.len -= count;
            start.as_mut().drop_range(first.offset, end_offset);
            return self.settle(RawCursor::new(Some(start), first.offset));
        }

        let mut current = start.as_ref().next;
        if first.offset == 0 {
            self.discard_node(start);
        } else {
            self.len -= start.as_ref().len() - first.offset;
            start.as_mut().truncate(first.offset);
        }
        while let Some(node) = current {
            if node == end {
                break;
            }
            current = self.discard_node(node);
        }

        if end_offset == end.as_ref().len() {
            return RawCursor::new(self.discard_node(end), 0);
        }
        self.len -= end_offset;
        end.as_mut().drop_range(0, end_offset);
        RawCursor::new(Some(end), 0)
    }

    pub(crate) fn begin_raw(&self) -> RawCursor<T, N> {
        RawCursor::new(self.head, 0)
    }

    /// The position after `at`, where the end position is followed by the
    /// first element.
    ///
    /// It is unsafe because `at` must be a valid position of this list.
    pub(crate) unsafe fn next_raw(&self, at: RawCursor<T, N>) -> RawCursor<T, N> {
        match at.node {
            None => self.begin_raw(),
            Some(node) if at.offset + 1 < node.as_ref().len() => {
                RawCursor::new(Some(node), at.offset + 1)
            }
            Some(node) => RawCursor::new(node.as_ref().next, 0),
        }
    }

    /// The position before `at`, where the first element is preceded by the
    /// end position.
    ///
    /// It is unsafe because `at` must be a valid position of this list.
    pub(crate) unsafe fn prev_raw(&self, at: RawCursor<T, N>) -> RawCursor<T, N> {
        let prev = match at.node {
            None => self.tail,
            Some(node) if at.offset > 0 => return RawCursor::new(Some(node), at.offset - 1),
            Some(node) => node.as_ref().prev,
        };
        match prev {
            Some(prev) => RawCursor::new(Some(prev), prev.as_ref().len() - 1),
            None => RawCursor::end(),
        }
    }

    /// Move `at` forward by `steps` elements, skipping whole nodes where possible.
    /// Stops at the end position.
    ///
    /// It is unsafe because `at` must be a valid position of this list.
    pub(crate) unsafe fn advance_raw(&self, mut at: RawCursor<T, N>, mut steps: usize) -> RawCursor<T, N> {
        while let Some(node) = at.node {
            let remaining = node.as_ref().len() - at.offset;
            if steps < remaining {
                at.offset += steps;
                return at;
            }
            steps -= remaining;
            at = RawCursor::new(node.as_ref().next, 0);
        }
        at
    }

    /// Move `at` backward by `steps` elements, skipping whole nodes where possible.
    /// Stops at the first element.
    ///
    /// It is unsafe because `at` must be a valid position of this list.
    pub(crate) unsafe fn retreat_raw(&self, at: RawCursor<T, N>, mut steps: usize) -> RawCursor<T, N> {
        if steps == 0 {
            return at;
        }
        // `before` counts the elements of `node` in front of the position.
        let (mut node, mut before) = match (at.node, self.tail) {
            (Some(node), _) => (node, at.offset),
            (None, Some(tail)) => (tail, tail.as_ref().len()),
            (None, None) => return at,
        };
        loop {
            if steps <= before {
                return RawCursor::new(Some(node), before - steps);
            }
            steps -= before;
            match node.as_ref().prev {
                Some(prev) => {
                    node = prev;
                    before = prev.as_ref().len();
                }
                None => return self.begin_raw(),
            }
        }
    }

    /// The position of the element at `index`, or the end when `index >= len`,
    /// walking from whichever end of the list is closer.
    pub(crate) fn raw_at(&self, index: usize) -> RawCursor<T, N> {
        if index >= self.len {
            return RawCursor::end();
        }
        // SAFETY: both the front and the end are valid positions of the list.
        unsafe {
            if index <= self.len / 2 {
                self.advance_raw(self.begin_raw(), index)
            } else {
                self.retreat_raw(RawCursor::end(), self.len - index)
            }
        }
    }

    /// Resolve a range of indices against the length, panicking like slices do.
    fn resolve_range<R: RangeBounds<usize>>(&self, range: R) -> (usize, usize) {
        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start
                .checked_add(1)
                .expect("range start overflows usize"),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&end) => end.checked_add(1).expect("range end overflows usize"),
            Bound::Excluded(&end) => end,
            Bound::Unbounded => self.len,
        };
        assert!(start <= end, "range starts at {} but ends at {}", start, end);
        assert!(
            end <= self.len,
            "range end {} is out of bounds for a list of length {}",
            end,
            self.len
        );
        (start, end)
    }
}

impl<T> UnrolledList<T> {
    /// Create an empty `UnrolledList` with the default node capacity and the
    /// global allocator. No node is allocated until the first insertion.
    ///
    /// Use [`UnrolledList::new_in`] (or [`Default`]) to pick another node
    /// capacity or allocator.
    ///
    /// # Examples
    /// ```
    /// use unrolled_list::UnrolledList;
    /// let list: UnrolledList<u32> = UnrolledList::new();
    /// assert_eq!(list.node_capacity(), 10);
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self::new_in(Global)
    }
}

impl<T, const N: usize, A: Allocator> UnrolledList<T, N, A> {
    /// Create an empty `UnrolledList` whose nodes are allocated from `alloc`.
    ///
    /// # Examples
    /// ```
    /// use allocator_api2::alloc::Global;
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::<u32, 4>::new_in(Global);
    /// list.push_back(1);
    /// assert_eq!(list.node_capacity(), 4);
    /// ```
    #[inline]
    pub fn new_in(alloc: A) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NODE_CAPACITY_CHECK;
        Self {
            head: None,
            tail: None,
            len: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    /// Create a list holding `count` clones of `value`.
    ///
    /// # Examples
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list: UnrolledList<&str> = UnrolledList::from_elem("a", 3);
    /// assert_eq!(list, ["a", "a", "a"]);
    /// ```
    pub fn from_elem(value: T, count: usize) -> Self
    where
        T: Clone,
        A: Default,
    {
        let mut list = Self::new_in(A::default());
        list.cursor_end_mut().insert_n(count, value);
        list
    }

    /// Returns a reference to the allocator of the list.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns `true` if the `UnrolledList` is empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::new();
    /// assert!(list.is_empty());
    ///
    /// list.push_front("foo");
    /// assert!(!list.is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns the length of the `UnrolledList`.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::new();
    ///
    /// list.push_front(2);
    /// assert_eq!(list.len(), 1);
    ///
    /// list.push_front(1);
    /// assert_eq!(list.len(), 2);
    ///
    /// list.push_back(3);
    /// assert_eq!(list.len(), 3);
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the largest length a list can reach.
    #[inline]
    pub fn max_len(&self) -> usize {
        usize::MAX
    }

    /// Returns how many elements a single node holds, i.e. `N`.
    #[inline]
    pub const fn node_capacity(&self) -> usize {
        N
    }

    /// Removes all elements from the `UnrolledList` and frees every node.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::new();
    ///
    /// list.push_front(2);
    /// list.push_front(1);
    /// assert_eq!(list.len(), 2);
    /// assert_eq!(list.front(), Some(&1));
    ///
    /// list.clear();
    /// assert_eq!(list.len(), 0);
    /// assert_eq!(list.front(), None);
    /// ```
    pub fn clear(&mut self) {
        while let Some(head) = self.head {
            // SAFETY: `head` is a node of this list.
            unsafe { self.discard_node(head) };
        }
    }

    /// Shortens the list, keeping the first `len` elements and dropping the rest.
    /// Does nothing if `len` is not less than the current length.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<_> = (0..30).collect();
    /// list.truncate(12);
    /// assert_eq!(list.to_vec(), (0..12).collect::<Vec<_>>());
    /// ```
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.erase(len..);
        }
    }

    /// Provides a reference to the front element, or `None` if the list is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::new();
    /// assert_eq!(list.front(), None);
    ///
    /// list.push_front(1);
    /// assert_eq!(list.front(), Some(&1));
    /// ```
    #[inline]
    pub fn front(&self) -> Option<&T> {
        // SAFETY: the front position is valid and bound to `&self`.
        unsafe { self.begin_raw().element() }
    }

    /// Provides a mutable reference to the front element, or `None` if the list
    /// is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::new();
    /// list.push_front(1);
    ///
    /// if let Some(x) = list.front_mut() {
    ///     *x = 5;
    /// }
    /// assert_eq!(list.front(), Some(&5));
    /// ```
    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        // SAFETY: the front position is valid and bound to `&mut self`.
        unsafe { self.begin_raw().element_mut() }
    }

    /// Provides a reference to the back element, or `None` if the list is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::new();
    /// assert_eq!(list.back(), None);
    ///
    /// list.push_back(1);
    /// assert_eq!(list.back(), Some(&1));
    /// ```
    #[inline]
    pub fn back(&self) -> Option<&T> {
        let tail = self.tail?;
        // SAFETY: nodes in the list are never empty.
        unsafe { tail.as_ref().as_slice().last() }
    }

    /// Provides a mutable reference to the back element, or `None` if the list
    /// is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::new();
    /// list.push_back(1);
    ///
    /// if let Some(x) = list.back_mut() {
    ///     *x = 5;
    /// }
    /// assert_eq!(list.back(), Some(&5));
    /// ```
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        let mut tail = self.tail?;
        // SAFETY: the tail node is owned by the list, which is mutably borrowed.
        unsafe { tail.as_mut().as_mut_slice().last_mut() }
    }

    /// Provides a reference to the element at `index`, or `None` if `index` is
    /// out of bounds.
    ///
    /// # Complexity
    ///
    /// This operation walks the list node by node from the closer end, so it
    /// computes in *O*(*n* / `N`) time, not *O*(1).
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list: UnrolledList<_> = (0..100).collect();
    /// assert_eq!(list.get(42), Some(&42));
    /// assert_eq!(list.get(100), None);
    /// ```
    pub fn get(&self, index: usize) -> Option<&T> {
        // SAFETY: `raw_at` returns a valid position, bound to `&self`.
        unsafe { self.raw_at(index).element() }
    }

    /// Provides a mutable reference to the element at `index`, or `None` if
    /// `index` is out of bounds. See [`UnrolledList::get`].
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        // SAFETY: `raw_at` returns a valid position, bound to `&mut self`.
        unsafe { self.raw_at(index).element_mut() }
    }

    /// Adds an element first in the list.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) amortized time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::new();
    ///
    /// list.push_front(2);
    /// assert_eq!(list.front().unwrap(), &2);
    ///
    /// list.push_front(1);
    /// assert_eq!(list.front().unwrap(), &1);
    /// ```
    pub fn push_front(&mut self, elt: T) {
        // SAFETY: the front position is valid.
        unsafe { self.insert_at(self.begin_raw(), elt) };
    }

    /// Appends an element to the back of a list.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) amortized time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::new();
    /// list.push_back(1);
    /// list.push_back(3);
    /// assert_eq!(list.back().unwrap(), &3);
    /// ```
    pub fn push_back(&mut self, elt: T) {
        // SAFETY: the end position is valid.
        unsafe { self.insert_at(RawCursor::end(), elt) };
    }

    /// Like [`UnrolledList::push_front`], but returns an error instead of
    /// aborting when a node cannot be allocated. The list is left unchanged
    /// on error and `elt` is handed back with it.
    pub fn try_push_front(&mut self, elt: T) -> Result<(), (T, Error)> {
        // SAFETY: the front position is valid.
        unsafe { self.try_insert_at(self.begin_raw(), elt) }
            .map(drop)
            .map_err(|(elt, layout)| (elt, Error::AllocError { layout }))
    }

    /// Like [`UnrolledList::push_back`], but returns an error instead of
    /// aborting when a node cannot be allocated. The list is left unchanged
    /// on error and `elt` is handed back with it.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::new();
    /// assert!(list.try_push_back(1).is_ok());
    /// assert_eq!(list.back(), Some(&1));
    /// ```
    pub fn try_push_back(&mut self, elt: T) -> Result<(), (T, Error)> {
        // SAFETY: the end position is valid.
        unsafe { self.try_insert_at(RawCursor::end(), elt) }
            .map(drop)
            .map_err(|(elt, layout)| (elt, Error::AllocError { layout }))
    }

    /// Removes the first element and returns it, or `None` if the list is
    /// empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::new();
    /// assert_eq!(list.pop_front(), None);
    ///
    /// list.push_front(1);
    /// list.push_front(3);
    /// assert_eq!(list.pop_front(), Some(3));
    /// assert_eq!(list.pop_front(), Some(1));
    /// assert_eq!(list.pop_front(), None);
    /// ```
    pub fn pop_front(&mut self) -> Option<T> {
        // SAFETY: the front position is valid.
        unsafe { self.remove_at(self.begin_raw()) }.map(|(value, _)| value)
    }

    /// Removes the last element from a list and returns it, or `None` if
    /// it is empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::new();
    /// assert_eq!(list.pop_back(), None);
    /// list.push_back(1);
    /// list.push_back(3);
    /// assert_eq!(list.pop_back(), Some(3));
    /// ```
    pub fn pop_back(&mut self) -> Option<T> {
        // SAFETY: the position before the end is the last element, or the end
        // itself when the list is empty.
        unsafe { self.remove_at(self.prev_raw(RawCursor::end())) }.map(|(value, _)| value)
    }

    /// Provides a cursor at the element with given index.
    ///
    /// By convention, the cursor is at the end position if `at == len`.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list = UnrolledList::from([1, 2, 3]);
    /// assert_eq!(list.cursor(1).current(), Some(&2));
    /// assert_eq!(list.cursor(3).current(), None);
    /// ```
    pub fn cursor(&self, at: usize) -> Cursor<'_, T, N, A> {
        assert!(at <= self.len, "Cannot create cursor at a nonexistent index");
        Cursor::new(self, self.raw_at(at), at)
    }

    /// Provides a cursor at the first element.
    ///
    /// The cursor is at the end position if the list is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list = UnrolledList::from([1, 2, 3]);
    /// let cursor = list.cursor_start();
    /// assert_eq!(cursor.current(), Some(&1));
    /// ```
    pub fn cursor_start(&self) -> Cursor<'_, T, N, A> {
        Cursor::new(self, self.begin_raw(), 0)
    }

    /// Provides a cursor at the end position.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list = UnrolledList::from([1, 2, 3]);
    /// let cursor = list.cursor_end();
    /// assert_eq!(cursor.current(), None);
    /// assert_eq!(cursor.previous(), Some(&3));
    /// ```
    pub fn cursor_end(&self) -> Cursor<'_, T, N, A> {
        Cursor::new(self, RawCursor::end(), self.len)
    }

    /// Provides a cursor with editing operations at the element with given index.
    ///
    /// By convention, the cursor is at the end position if `at == len`.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::from([1, 2, 3]);
    /// let mut cursor = list.cursor_mut(1);
    ///
    /// if let Some(x) = cursor.current_mut() {
    ///     *x *= 5;
    /// }
    /// assert_eq!(cursor.current(), Some(&10));
    /// assert_eq!(list.cursor_mut(3).current_mut(), None);
    /// ```
    pub fn cursor_mut(&mut self, at: usize) -> CursorMut<'_, T, N, A> {
        assert!(at <= self.len, "Cannot create cursor at a nonexistent index");
        let raw = self.raw_at(at);
        CursorMut::new(self, raw, at)
    }

    /// Provides a cursor with editing operations at the first element.
    ///
    /// The cursor is at the end position if the list is empty.
    pub fn cursor_start_mut(&mut self) -> CursorMut<'_, T, N, A> {
        let raw = self.begin_raw();
        CursorMut::new(self, raw, 0)
    }

    /// Provides a cursor with editing operations at the end position.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::from([1, 2, 3]);
    /// let mut cursor = list.cursor_end_mut();
    ///
    /// cursor.insert(4);
    /// assert_eq!(cursor.current(), Some(&4));
    /// assert_eq!(list.to_vec(), vec![1, 2, 3, 4]);
    /// ```
    pub fn cursor_end_mut(&mut self) -> CursorMut<'_, T, N, A> {
        let len = self.len;
        CursorMut::new(self, RawCursor::end(), len)
    }

    /// Provides a forward iterator.
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
    /// let mut iter = list.iter();
    /// assert_eq!(iter.next(), Some(&0));
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next(), Some(&2));
    /// assert_eq!(iter.next(), None);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, T, N> {
        Iter::new(self.chunks())
    }

    /// Provides a forward iterator with mutable references.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<_> = (0..3).collect();
    ///
    /// for element in list.iter_mut() {
    ///     *element += 10;
    /// }
    /// assert_eq!(list.to_vec(), vec![10, 11, 12]);
    /// ```
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T, N> {
        IterMut::new(self.chunks_mut())
    }

    /// Provides an iterator over the nodes of the list, each yielded as the
    /// slice of elements it holds.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let list: UnrolledList<i32, 4> = (1..=5).collect();
    /// let chunks: Vec<&[i32]> = list.chunks().collect();
    /// assert_eq!(chunks, vec![&[1, 2][..], &[3, 4, 5][..]]);
    /// ```
    #[inline]
    pub fn chunks(&self) -> Chunks<'_, T, N> {
        Chunks::new(self.head, self.tail, self.len)
    }

    /// Provides an iterator over the nodes of the list, each yielded as a
    /// mutable slice of the elements it holds.
    #[inline]
    pub fn chunks_mut(&mut self) -> ChunksMut<'_, T, N> {
        ChunksMut::new(self.head, self.tail, self.len)
    }

    /// Adds an element at the given index in the list.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n* / `N`) time to find the node,
    /// plus *O*(`N`) to make room in it.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::from([1, 2, 3]);
    ///
    /// list.insert(2, 4);
    /// list.insert(4, 5);
    ///
    /// assert_eq!(list.to_vec(), vec![1, 2, 4, 3, 5]);
    /// ```
    pub fn insert(&mut self, at: usize, elt: T) {
        assert!(
            at <= self.len,
            "Cannot insert at an index outside of the list bounds"
        );
        self.cursor_mut(at).insert(elt);
    }

    /// Removes the element at the given index and returns it.
    ///
    /// # Panics
    ///
    /// Panics if `at >= len`
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::from([3, 2, 1]);
    ///
    /// assert_eq!(list.remove(1), 2);
    /// assert_eq!(list.remove(0), 3);
    /// assert_eq!(list.remove(0), 1);
    /// ```
    pub fn remove(&mut self, at: usize) -> T {
        assert!(
            at < self.len,
            "Cannot remove at an index outside of the list bounds"
        );
        self.cursor_mut(at)
            .remove()
            .expect("Cannot remove at an index outside of the list bounds")
    }

    /// Drops the elements in the given range.
    ///
    /// Nodes emptied by the erasure are freed; the nodes at both ends of the
    /// range keep whatever they still hold.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n* / `N`) time to find the range,
    /// plus *O*(*m*) for *m* erased elements.
    ///
    /// # Panics
    ///
    /// Panics if the range starts after it ends, or ends after the list.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<_> = (0..10).collect();
    /// list.erase(2..8);
    /// assert_eq!(list.to_vec(), vec![0, 1, 8, 9]);
    /// ```
    pub fn erase<R: RangeBounds<usize>>(&mut self, range: R) {
        let (start, end) = self.resolve_range(range);
        let mut cursor = self.cursor_mut(start);
        cursor.remove_n(end - start);
    }

    /// Clears the list and fills it with the items of `iter`.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::from([1, 2, 3]);
    /// list.assign([7, 8]);
    /// assert_eq!(list, [7, 8]);
    /// ```
    pub fn assign<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.clear();
        self.extend(iter);
    }

    /// Pushes every item of `iter` to the front, one by one, so they end up in
    /// reverse order before the existing elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::from([4, 5]);
    /// list.extend_front([3, 2, 1]);
    /// assert_eq!(list, [1, 2, 3, 4, 5]);
    /// ```
    pub fn extend_front<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(|item| self.push_front(item));
    }

    /// Removes all elements lazily, yielding them from the front.
    ///
    /// Elements not consumed are dropped when the [`Drain`] is.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<_> = (0..5).collect();
    /// let firsts: Vec<_> = list.drain().take(2).collect();
    /// assert_eq!(firsts, vec![0, 1]);
    /// assert!(list.is_empty());
    /// ```
    pub fn drain(&mut self) -> Drain<'_, T, N, A> {
        Drain::new(self)
    }

    /// Retains only the elements for which `keep` returns `true`, visiting them
    /// in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list: UnrolledList<_> = (0..10).collect();
    /// list.retain(|x| x % 3 == 0);
    /// assert_eq!(list, [0, 3, 6, 9]);
    /// ```
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        let mut cursor = self.cursor_start_mut();
        while let Some(item) = cursor.current() {
            if keep(item) {
                cursor.move_next_cyclic();
            } else {
                cursor.remove();
            }
        }
    }

    /// Copies the elements into a `Vec`, in order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<T, const N: usize, A: Allocator + Clone> UnrolledList<T, N, A> {
    /// Splits the list into two at the given index. Returns everything after
    /// the given index (inclusive).
    ///
    /// At most one node is split in two, the rest of the nodes are handed over
    /// as they are.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n* / `N`) time.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::from([1, 2, 3]);
    ///
    /// let split = list.split_off(1);
    ///
    /// assert_eq!(list, [1]);
    /// assert_eq!(split, [2, 3]);
    /// ```
    pub fn split_off(&mut self, at: usize) -> Self {
        assert!(at <= self.len, "Cannot split off at a nonexistent index");
        let raw = self.raw_at(at);
        // SAFETY: `raw` is the valid position of index `at`.
        unsafe { self.split_at_raw(raw, at) }.unwrap_or_else(|layout| handle_alloc_error(layout))
    }

    /// Detach everything from `at` (whose index is `index`) to the end into a
    /// new list sharing a clone of the allocator.
    ///
    /// It is unsafe because `at` must be a valid position of this list and
    /// `index` must be its index.
    pub(crate) unsafe fn split_at_raw(&mut self, at: RawCursor<T, N>, index: usize) -> Result<Self, Layout> {
        let mut other = Self::new_in(self.alloc.clone());
        let Some(mut node) = at.node else {
            return Ok(other);
        };
        if at.offset > 0 {
            let mut back = self.allocate_node()?;
            node.as_mut().move_tail_to(at.offset, back.as_mut());
            self.attach_node(Some(node), back);
            node = back;
        }
        let prev = node.as_ref().prev;
        match prev {
            Some(mut prev) => prev.as_mut().next = None,
            None => self.head = None,
        }
        node.as_mut().prev = None;
        other.head = Some(node);
        other.tail = mem::replace(&mut self.tail, prev);
        other.len = self.len - index;
        self.len = index;
        Ok(other)
    }
}

/// Moving nodes between two lists requires that each list can free the nodes
/// of the other, which holds for the global allocator.
impl<T, const N: usize> UnrolledList<T, N, Global> {
    /// Moves all elements from `other` to the end of the list.
    ///
    /// This reuses all the nodes from `other` and moves them into `self`. After
    /// this operation, `other` becomes empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time and *O*(1) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list1 = UnrolledList::new();
    /// list1.push_back('a');
    ///
    /// let mut list2 = UnrolledList::new();
    /// list2.push_back('b');
    /// list2.push_back('c');
    ///
    /// list1.append(&mut list2);
    ///
    /// let mut iter = list1.iter();
    /// assert_eq!(iter.next(), Some(&'a'));
    /// assert_eq!(iter.next(), Some(&'b'));
    /// assert_eq!(iter.next(), Some(&'c'));
    /// assert!(iter.next().is_none());
    ///
    /// assert!(list2.is_empty());
    /// ```
    pub fn append(&mut self, other: &mut Self) {
        let (Some(mut front), Some(back)) = (other.head.take(), other.tail.take()) else {
            return;
        };
        match self.tail {
            // SAFETY: both nodes are valid, and `front` is now owned by `self`.
            Some(mut tail) => unsafe {
                tail.as_mut().next = Some(front);
                front.as_mut().prev = Some(tail);
            },
            None => self.head = Some(front),
        }
        self.tail = Some(back);
        self.len += mem::take(&mut other.len);
    }

    /// Moves all elements from `other` to the beginning of the list.
    ///
    /// This reuses all the nodes from `other` and moves them into `self`. After
    /// this operation, `other` becomes empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time and *O*(1) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list1 = UnrolledList::from(['a']);
    /// let mut list2 = UnrolledList::from(['b', 'c']);
    ///
    /// list2.prepend(&mut list1);
    ///
    /// assert_eq!(list2, ['a', 'b', 'c']);
    /// assert!(list1.is_empty());
    /// ```
    pub fn prepend(&mut self, other: &mut Self) {
        let (Some(front), Some(mut back)) = (other.head.take(), other.tail.take()) else {
            return;
        };
        match self.head {
            // SAFETY: both nodes are valid, and `back` is now owned by `self`.
            Some(mut head) => unsafe {
                back.as_mut().next = Some(head);
                head.as_mut().prev = Some(back);
            },
            None => self.tail = Some(back),
        }
        self.head = Some(front);
        self.len += mem::take(&mut other.len);
    }

    /// Splices another list at the given index.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n* / `N`) time.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`
    ///
    /// # Examples
    ///
    /// ```
    /// use unrolled_list::UnrolledList;
    ///
    /// let mut list = UnrolledList::from([1, 2, 3]);
    ///
    /// let other = UnrolledList::from([4, 5, 6]);
    ///
    /// list.splice_at(2, other);
    ///
    /// assert_eq!(list.to_vec(), vec![1, 2, 4, 5, 6, 3]);
    /// ```
    pub fn splice_at(&mut self, at: usize, other: Self) {
        assert!(at <= self.len, "Cannot splice at a nonexistent index");
        self.cursor_mut(at).splice(other);
    }
}

impl<T, const N: usize, A: Allocator> Index<usize> for UnrolledList<T, N, A> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `index >= len`.
    fn index(&self, index: usize) -> &T {
        self.get(index)
            .expect("Cannot index outside of the list bounds")
    }
}

impl<T, const N: usize, A: Allocator> IndexMut<usize> for UnrolledList<T, N, A> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        self.get_mut(index)
            .expect("Cannot index outside of the list bounds")
    }
}

impl<T: Debug, const N: usize, A: Allocator> Debug for UnrolledList<T, N, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, const N: usize, A: Allocator + Default> Default for UnrolledList<T, N, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

#[cfg(debug_assertions)]
unsafe fn assert_adjacent<T, const N: usize>(prev: NodePtr<T, N>, next: NodePtr<T, N>) {
    assert_eq!(prev.as_ref().next, Some(next));
    assert_eq!(next.as_ref().prev, Some(prev));
}

impl<T, const N: usize, A: Allocator> Drop for UnrolledList<T, N, A> {
    fn drop(&mut self) {
        struct DropGuard<'a, T, const N: usize, A: Allocator>(&'a mut UnrolledList<T, N, A>);

        impl<T, const N: usize, A: Allocator> Drop for DropGuard<'_, T, N, A> {
            fn drop(&mut self) {
                // Keep freeing the remaining nodes after a destructor panicked.
                self.0.clear();
            }
        }

        let mut guard = DropGuard(self);
        guard.0.clear();
        mem::forget(guard);
    }
}

unsafe impl<T: Send, const N: usize, A: Allocator + Send> Send for UnrolledList<T, N, A> {}

unsafe impl<T: Sync, const N: usize, A: Allocator + Sync> Sync for UnrolledList<T, N, A> {}

// Ensure that `UnrolledList` and its read-only iterators are covariant in their type parameters.
#[allow(dead_code)]
fn assert_covariance() {
    fn a<'a>(x: UnrolledList<&'static str>) -> UnrolledList<&'a str> {
        x
    }
    fn b<'i, 'a>(x: Iter<'i, &'static str, 4>) -> Iter<'i, &'a str, 4> {
        x
    }
    fn c<'a>(x: IntoIter<&'static str>) -> IntoIter<&'a str> {
        x
    }
}

#[cfg(test)]
impl<T, const N: usize, A: Allocator> UnrolledList<T, N, A> {
    /// Check every structural invariant of the chain.
    pub(crate) fn assert_invariants(&self) {
        assert_eq!(self.head.is_none(), self.tail.is_none());
        assert_eq!(self.head.is_none(), self.len == 0);
        let mut prev = None;
        let mut current = self.head;
        let mut len = 0;
        while let Some(node) = current {
            let node_ref = unsafe { node.as_ref() };
            assert_eq!(node_ref.prev, prev, "broken back link");
            assert!(!node_ref.is_empty(), "empty node left in the list");
            assert!(node_ref.len() <= N, "overfull node");
            len += node_ref.len();
            prev = Some(node);
            current = node_ref.next;
        }
        assert_eq!(self.tail, prev, "tail is not the last node");
        assert_eq!(self.len, len, "cached length is out of sync");
    }

    pub(crate) fn node_lens(&self) -> Vec<usize> {
        self.chunks().map(<[T]>::len).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::list::UnrolledList;
    use crate::Error;
    use allocator_api2::alloc::{AllocError, Allocator, Global};
    use proptest::prelude::*;
    use std::alloc::Layout;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::fmt::Debug;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::ptr::NonNull;

    #[derive(Debug)]
    struct DropChecker<'a, T: Copy> {
        value: T,
        dropped: &'a RefCell<Vec<T>>,
    }
    impl<'a, T: Copy> DropChecker<'a, T> {
        fn new(value: T, dropped: &'a RefCell<Vec<T>>) -> Self {
            Self { value, dropped }
        }
    }
    impl<'a, T: Copy> Drop for DropChecker<'a, T> {
        fn drop(&mut self) {
            self.dropped.borrow_mut().push(self.value);
        }
    }

    /// Hands out at most `remaining` allocations, then fails.
    struct LimitedAlloc {
        remaining: Cell<usize>,
    }

    impl LimitedAlloc {
        fn new(remaining: usize) -> Self {
            let remaining = Cell::new(remaining);
            Self { remaining }
        }
    }

    unsafe impl Allocator for LimitedAlloc {
        fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
            match self.remaining.get() {
                0 => Err(AllocError),
                n => {
                    self.remaining.set(n - 1);
                    Global.allocate(layout)
                }
            }
        }

        unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
            Global.deallocate(ptr, layout)
        }
    }

    #[test]
    fn list_create() {
        let mut list = UnrolledList::<i32>::new();
        assert!(list.is_empty());
        list.push_back(1);
        assert!(!list.is_empty());
        assert_eq!(list.pop_back(), Some(1));
        assert!(list.is_empty());
        list.assert_invariants();
    }

    #[test]
    fn list_drop() {
        let dropped = RefCell::new(Vec::<i32>::new());
        let mut list = UnrolledList::<_, 2>::default();
        for i in 1..=5 {
            list.push_back(DropChecker::new(i, &dropped));
        }
        // Pushing to the back of a full tail leaves half filled nodes behind.
        assert_eq!(list.node_lens(), vec![1, 1, 1, 2]);
        drop(list);
        assert_eq!(dropped.borrow().as_slice(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn list_push_and_pop() {
        let mut list = UnrolledList::<_, 3>::default();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);

        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        assert_eq!(list.pop_front(), None);
        assert_eq!(list.pop_back(), None);

        list.push_back(1);
        assert_eq!(list.back(), Some(&1));
        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);

        list.push_front(1);
        list.push_front(2);
        list.push_back(3);
        assert_eq!(list.back(), Some(&3));
        assert_eq!(list.front(), Some(&2));
        assert_eq!(list.pop_front(), Some(2));
        assert_eq!(list.pop_back(), Some(3));

        assert_eq!(list.front(), Some(&1));
        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        assert!(list.is_empty());
        list.assert_invariants();
    }

    #[test]
    fn list_insert_and_remove() {
        fn list_eq<T, const N: usize, I>(list: &UnrolledList<T, N>, expected: I)
        where
            T: Debug + Clone + Eq,
            I: IntoIterator<Item = T>,
        {
            list.assert_invariants();
            assert_eq!(
                Vec::from_iter(list.iter().cloned()),
                Vec::from_iter(expected)
            );
        }

        let mut list: UnrolledList<_, 4> = UnrolledList::from_iter(0..10);
        list.insert(5, 10);
        list_eq(&list, (0..5).chain(Some(10)).chain(5..10));

        assert_eq!(list.remove(10), 9);
        assert_eq!(list.back(), Some(&8));
        list_eq(&list, (0..5).chain(Some(10)).chain(5..9));

        list.insert(0, 11);
        assert_eq!(list.front(), Some(&11));
        list_eq(&list, (11..=11).chain((0..5).chain(Some(10)).chain(5..9)));

        assert_eq!(list.remove(0), 11);
        assert_eq!(list.front(), Some(&0));
        list_eq(&list, (0..5).chain(Some(10)).chain(5..9));

        list.insert(10, 12);
        assert_eq!(list.back(), Some(&12));
        list_eq(&list, (0..5).chain(Some(10)).chain(5..9).chain(Some(12)));
    }

    #[test]
    fn list_split_on_overflow() {
        let mut list = UnrolledList::<i32, 4>::default();
        for i in 1..=4 {
            list.push_back(i);
        }
        assert_eq!(list.node_lens(), vec![4]);
        list.push_back(5);
        assert_eq!(list.node_lens(), vec![2, 3]);
        assert_eq!(list.to_vec(), vec![1, 2, 3, 4, 5]);
        list.assert_invariants();
    }

    #[test]
    fn list_split_keeps_larger_front_half() {
        let mut list = UnrolledList::<i32, 5>::default();
        list.extend(0..5);
        // Inserting into the front half of the split.
        list.insert(1, 10);
        assert_eq!(list.node_lens(), vec![4, 2]);
        assert_eq!(list.to_vec(), vec![0, 10, 1, 2, 3, 4]);

        let mut list = UnrolledList::<i32, 5>::default();
        list.extend(0..5);
        // Inserting right behind the kept front half stays in the front node.
        list.insert(3, 10);
        assert_eq!(list.node_lens(), vec![4, 2]);
        // Inserting past it goes to the new node.
        let mut list2 = UnrolledList::<i32, 5>::default();
        list2.extend(0..5);
        list2.insert(4, 10);
        assert_eq!(list2.node_lens(), vec![3, 3]);
        assert_eq!(list2.to_vec(), vec![0, 1, 2, 3, 10, 4]);
        list.assert_invariants();
        list2.assert_invariants();
    }

    #[test]
    fn list_pop_front_across_nodes() {
        let mut list = UnrolledList::<i32, 4>::default();
        (1..=14).for_each(|i| list.push_back(i));
        for _ in 0..5 {
            list.pop_front();
        }
        assert_eq!(list.len(), 9);
        assert_eq!(list.to_vec(), (6..=14).collect::<Vec<_>>());
        list.assert_invariants();
    }

    #[test]
    fn list_erase() {
        let mut list = UnrolledList::<i32, 4>::from_iter([1, 2, 3]);
        list.erase(..);
        assert_eq!(list.len(), 0);
        assert!(list.iter().next().is_none());
        assert_eq!(list.cursor_start().current(), None);
        assert_eq!(list.cursor_end().index(), 0);
        list.assert_invariants();

        // behaves like a fresh list afterwards
        list.push_front(2);
        list.push_back(3);
        list.push_front(1);
        assert_eq!(list, [1, 2, 3]);

        let mut list = UnrolledList::<i32, 4>::from_iter(0..20);
        let lens = list.node_lens();
        list.erase(3..3);
        assert_eq!(list.node_lens(), lens);
        list.erase(3..17);
        assert_eq!(list.to_vec(), vec![0, 1, 2, 17, 18, 19]);
        list.assert_invariants();

        list.erase(1..=1);
        assert_eq!(list.to_vec(), vec![0, 2, 17, 18, 19]);
        list.truncate(2);
        assert_eq!(list.to_vec(), vec![0, 2]);
        list.assert_invariants();
    }

    #[test]
    fn list_erase_drops_each_element_once() {
        let dropped = RefCell::new(Vec::new());
        let mut list = UnrolledList::<_, 3>::default();
        for i in 0..10 {
            list.push_back(DropChecker::new(i, &dropped));
        }
        list.erase(2..9);
        let mut erased = dropped.borrow().clone();
        erased.sort_unstable();
        assert_eq!(erased, (2..9).collect::<Vec<_>>());
        assert_eq!(list.iter().map(|d| d.value).collect::<Vec<_>>(), vec![0, 1, 9]);
        list.assert_invariants();
    }

    #[test]
    #[should_panic]
    fn list_erase_out_of_bounds() {
        let mut list = UnrolledList::<i32>::from_iter(0..3);
        list.erase(1..4);
    }

    #[test]
    fn list_index() {
        let mut list = UnrolledList::<i32, 3>::from_iter(0..50);
        for i in 0..50 {
            assert_eq!(list[i], i as i32);
        }
        list[27] = 100;
        assert_eq!(list.get(27), Some(&100));
        assert_eq!(list.get(50), None);
        *list.get_mut(49).unwrap() = -1;
        assert_eq!(list.back(), Some(&-1));
    }

    #[test]
    #[should_panic]
    fn list_index_out_of_bounds() {
        let list = UnrolledList::<i32>::from_iter(0..3);
        let _ = list[3];
    }

    #[test]
    fn list_from_elem_and_assign() {
        let mut list = UnrolledList::<String, 4>::from_elem("x".to_owned(), 9);
        assert_eq!(list.len(), 9);
        assert!(list.iter().all(|s| s == "x"));
        list.assert_invariants();

        list.assign(["a", "b"].map(String::from));
        assert_eq!(list, ["a", "b"]);

        list.extend_front(["c", "d"].map(String::from));
        assert_eq!(list, ["d", "c", "a", "b"]);

        let empty = UnrolledList::<String>::from_elem("x".to_owned(), 0);
        assert!(empty.is_empty());
    }

    #[test]
    fn list_retain() {
        let mut list = UnrolledList::<i32, 4>::from_iter(0..40);
        list.retain(|x| x % 5 != 0);
        assert_eq!(list.len(), 32);
        assert!(list.iter().all(|x| x % 5 != 0));
        list.retain(|_| false);
        assert!(list.is_empty());
        list.assert_invariants();
    }

    #[test]
    fn list_split_and_append() {
        fn test_list_split_and_append_and_prepend<T, I1, I2, I3>(
            list: I1,
            other: I2,
            at: usize,
            appended: I3,
        ) where
            T: Clone + Eq + Debug,
            I1: IntoIterator<Item = T>,
            I2: IntoIterator<Item = T>,
            I3: IntoIterator<Item = T>,
        {
            // Construct the lists with iterators.
            let mut list = UnrolledList::<T, 3>::from_iter(list);
            let other = UnrolledList::<T, 3>::from_iter(other);
            let appended = UnrolledList::<T, 3>::from_iter(appended);

            let cloned = list.clone();
            let mut other_cloned = other.clone();

            // Test append
            list.append(&mut other_cloned);
            assert!(other_cloned.is_empty());
            assert_eq!(list, appended);
            assert_eq!(list.len(), cloned.len() + other.len());
            list.assert_invariants();

            // Test split
            let split = list.split_off(at);
            assert_eq!(list, cloned);
            assert_eq!(split, other.clone());
            assert_eq!(list.len(), cloned.len());
            list.assert_invariants();
            split.assert_invariants();

            let (mut list, other) = (other, list);
            let cloned = list.clone();
            let mut other_cloned = other.clone();

            // Test prepend
            list.prepend(&mut other_cloned);
            assert!(other_cloned.is_empty());
            assert_eq!(list, appended);
            assert_eq!(list.len(), cloned.len() + other.len());

            let split = list.split_off(at);
            assert_eq!(list, other);
            assert_eq!(split, cloned);
            list.assert_invariants();
            split.assert_invariants();
        }
        test_list_split_and_append_and_prepend(0..5, 5..7, 5, 0..7);
        test_list_split_and_append_and_prepend(0..5, None, 5, 0..5);
        test_list_split_and_append_and_prepend(0..5, 5..6, 5, 0..6);
        test_list_split_and_append_and_prepend(0..1, 1..3, 1, 0..3);
        test_list_split_and_append_and_prepend(0..1, None, 1, 0..1);
        test_list_split_and_append_and_prepend(0..1, 1..2, 1, 0..2);
        test_list_split_and_append_and_prepend(None, 0..2, 0, 0..2);
        test_list_split_and_append_and_prepend::<i32, _, _, _>(None, None, 0, None);
        test_list_split_and_append_and_prepend(None, 0..1, 0, 0..1);
        test_list_split_and_append_and_prepend(0..8, 8..20, 8, 0..20);
    }

    #[test]
    fn list_splice() {
        fn test_list_splice<T, I1, I2, I3>(list: I1, other: I2, at: usize, spliced: I3)
        where
            T: Clone + Eq + Debug,
            I1: IntoIterator<Item = T>,
            I2: IntoIterator<Item = T>,
            I3: IntoIterator<Item = T>,
        {
            let mut list = UnrolledList::<T, 2>::from_iter(list);
            let other = UnrolledList::<T, 2>::from_iter(other);
            let spliced = UnrolledList::<T, 2>::from_iter(spliced);

            list.splice_at(at, other.clone());
            assert_eq!(list, spliced);
            assert_eq!(list.len(), spliced.len());
            list.assert_invariants();
        }
        test_list_splice(0..5, 5..7, 5, 0..7);
        test_list_splice(0..5, 5..7, 2, (0..2).chain(5..7).chain(2..5));
        test_list_splice(0..5, 5..7, 0, (5..7).chain(0..5));
        test_list_splice(0..5, Some(5), 5, 0..6);
        test_list_splice(0..5, Some(5), 2, (0..2).chain(Some(5)).chain(2..5));
        test_list_splice(0..5, Some(5), 0, Some(5).into_iter().chain(0..5));
        test_list_splice(Some(0), 1..3, 1, 0..3);
        test_list_splice(Some(0), 1..3, 0, (1..3).chain(Some(0)));
        test_list_splice(None, 0..2, 0, 0..2);
        test_list_splice(None, Some(0), 0, Some(0));
        test_list_splice::<i32, _, _, _>(None, None, 0, None);
    }

    #[test]
    fn list_len() {
        let mut list = UnrolledList::<_, 2>::default();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);

        list.push_back(1);
        assert_eq!(list.len(), 1);

        list.pop_front();
        assert_eq!(list.len(), 0);

        list.append(&mut UnrolledList::from_iter(0..5));
        assert_eq!(list.len(), 5);

        list.remove(3);
        assert_eq!(list.len(), 4);

        list.splice_at(3, UnrolledList::from_iter(5..7));
        assert_eq!(list.len(), 6);

        let other = list.split_off(4);
        assert_eq!(list.len(), 4);
        assert_eq!(other.len(), 2);

        list.prepend(&mut UnrolledList::from_iter(7..10));
        assert_eq!(list.len(), 7);

        list.clear();
        assert_eq!(list.len(), 0);
        list.assert_invariants();
    }

    #[test]
    fn list_copy_independence() {
        let mut a = UnrolledList::<i32, 4>::from_iter(0..9);
        let mut b = a.clone();
        assert_eq!(a.node_lens(), b.node_lens());

        a.push_back(100);
        a.erase(0..3);
        assert_eq!(b.to_vec(), (0..9).collect::<Vec<_>>());

        b.push_front(-1);
        b.remove(5);
        assert_eq!(a.to_vec(), vec![3, 4, 5, 6, 7, 8, 100]);
        assert_eq!(b.to_vec(), vec![-1, 0, 1, 2, 3, 5, 6, 7, 8]);
    }

    #[test]
    fn list_move_leaves_source_empty() {
        let mut a = UnrolledList::<i32, 4>::from_iter(0..9);
        let b = std::mem::take(&mut a);
        assert!(a.is_empty());
        assert_eq!(b.len(), 9);
        a.push_back(1);
        assert_eq!(a, [1]);
        a.assert_invariants();
    }

    struct Bomb<'a> {
        value: i32,
        fuse: &'a Cell<Option<i32>>,
        drops: &'a Cell<usize>,
    }

    impl Drop for Bomb<'_> {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
            if self.fuse.get() == Some(self.value) {
                self.fuse.set(None);
                panic!("dropping {} panicked", self.value);
            }
        }
    }

    #[test]
    fn list_panicking_drop_keeps_list_consistent() {
        let (fuse, drops, made) = (&Cell::new(None), &Cell::new(0), &Cell::new(0));
        let bomb = move |value| {
            made.set(made.get() + 1);
            Bomb { value, fuse, drops }
        };

        macro_rules! check_erase {
            ($target:expr, |$list:ident| $erase:expr, $kept:expr) => {{
                let kept = $kept;
                let mut $list = UnrolledList::<Bomb<'_>, 4>::default();
                for value in 0..6 {
                    $list.push_back(bomb(value));
                }
                assert_eq!($list.node_lens(), vec![2, 4]);

                fuse.set(Some($target));
                let result = catch_unwind(AssertUnwindSafe(|| {
                    $erase;
                }));
                assert!(result.is_err());
                $list.assert_invariants();
                assert_eq!($list.is_empty(), $list.len() == 0);
                assert_eq!($list.iter().map(|b| b.value).collect::<Vec<_>>(), kept);
                assert!(drops.get() <= made.get());

                assert_eq!($list.pop_front().map(|b| b.value), Some(kept[0]));
                $list.push_back(bomb(100));
                assert_eq!($list.back().map(|b| b.value), Some(100));
                $list.assert_invariants();
                drop($list);
                assert_eq!(drops.get(), made.get());
            }};
        }

        // Within one node.
        check_erase!(3, |list| list.erase(2..5), [0, 1, 5]);
        // Across nodes, panicking in the last node.
        check_erase!(3, |list| list.erase(1..4), [0, 4, 5]);
        // A whole node.
        check_erase!(0, |list| list.erase(0..2), [2, 3, 4, 5]);
        // Through a cursor, panicking in the first node.
        check_erase!(1, |list| list.cursor_mut(1).remove_n(3), [0, 2, 3, 4, 5]);

        // Dropping the list keeps freeing the other nodes.
        let mut list = UnrolledList::<Bomb<'_>, 4>::default();
        for value in 0..6 {
            list.push_back(bomb(value));
        }
        fuse.set(Some(1));
        assert!(catch_unwind(AssertUnwindSafe(|| drop(list))).is_err());
        assert_eq!(drops.get(), made.get());
    }

    #[test]
    fn list_panicking_construction_keeps_contents() {
        let mut list = UnrolledList::<String, 4>::default();
        let k = 7;
        for i in 1..k {
            list.push_back(i.to_string());
        }
        let result = catch_unwind(AssertUnwindSafe(|| {
            list.cursor_end_mut()
                .insert_with(|| panic!("construction of element {} failed", k));
        }));
        assert!(result.is_err());
        assert_eq!(list.len(), k - 1);
        assert_eq!(list.to_vec(), (1..k).map(|i| i.to_string()).collect::<Vec<_>>());
        list.assert_invariants();

        // A full node must not be split by a failed construction either.
        let mut list = UnrolledList::<i32, 4>::from_iter(0..4);
        let result = catch_unwind(AssertUnwindSafe(|| {
            list.cursor_mut(2).insert_with(|| panic!("boom"));
        }));
        assert!(result.is_err());
        assert_eq!(list.node_lens(), vec![4]);
        assert_eq!(list, [0, 1, 2, 3]);
    }

    #[test]
    fn list_allocation_failure() {
        let alloc = LimitedAlloc::new(2);
        let mut list = UnrolledList::<i32, 2, &LimitedAlloc>::new_in(&alloc);
        for i in 0..3 {
            assert_eq!(list.try_push_back(i), Ok(()));
        }
        assert_eq!(list.node_lens(), vec![1, 2]);

        let (value, err) = list.try_push_back(3).unwrap_err();
        assert_eq!(value, 3);
        assert!(matches!(err, Error::AllocError { .. }));
        assert_eq!(list.to_vec(), vec![0, 1, 2]);
        assert_eq!(list.node_lens(), vec![1, 2]);

        // There is still room in the front node.
        assert_eq!(list.try_push_front(-1), Ok(()));
        assert_eq!(list.try_push_front(-2).unwrap_err().0, -2);
        assert_eq!(list.to_vec(), vec![-1, 0, 1, 2]);
        list.assert_invariants();

        // Both nodes are full now, so a cursor insertion needs a split.
        let mut cursor = list.cursor_mut(1);
        let (value, err) = cursor.try_insert(7).unwrap_err();
        assert_eq!(value, 7);
        assert!(matches!(err, Error::AllocError { .. }));
        assert_eq!(cursor.index(), 1);
        assert_eq!(cursor.current(), Some(&0));
        assert_eq!(list.to_vec(), vec![-1, 0, 1, 2]);
        assert_eq!(list.node_lens(), vec![2, 2]);

        let empty_alloc = LimitedAlloc::new(0);
        let mut empty = UnrolledList::<i32, 4, _>::new_in(&empty_alloc);
        let (value, err) = empty.try_push_front(1).unwrap_err();
        assert_eq!(value, 1);
        assert_eq!(
            err,
            Error::AllocError {
                layout: Layout::new::<crate::list::node::Node<i32, 4>>()
            }
        );
        assert!(empty.is_empty());
        empty.assert_invariants();
    }

    #[derive(Debug, Clone)]
    enum Op {
        PushBack(i32),
        PushFront(i32),
        PopBack,
        PopFront,
        Insert(usize, i32),
        Remove(usize),
        Erase(usize, usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<i32>().prop_map(Op::PushBack),
            any::<i32>().prop_map(Op::PushFront),
            Just(Op::PopBack),
            Just(Op::PopFront),
            (any::<usize>(), any::<i32>()).prop_map(|(at, v)| Op::Insert(at, v)),
            any::<usize>().prop_map(Op::Remove),
            (any::<usize>(), 0usize..12).prop_map(|(at, n)| Op::Erase(at, n)),
        ]
    }

    fn apply<const N: usize>(list: &mut UnrolledList<i32, N>, model: &mut VecDeque<i32>, op: Op) {
        match op {
            Op::PushBack(v) => {
                list.push_back(v);
                model.push_back(v);
            }
            Op::PushFront(v) => {
                list.push_front(v);
                model.push_front(v);
            }
            Op::PopBack => assert_eq!(list.pop_back(), model.pop_back()),
            Op::PopFront => assert_eq!(list.pop_front(), model.pop_front()),
            Op::Insert(at, v) => {
                let at = at % (model.len() + 1);
                list.insert(at, v);
                model.insert(at, v);
            }
            Op::Remove(at) => {
                if !model.is_empty() {
                    let at = at % model.len();
                    assert_eq!(Some(list.remove(at)), model.remove(at));
                }
            }
            Op::Erase(at, n) => {
                let at = at % (model.len() + 1);
                let end = (at + n).min(model.len());
                list.erase(at..end);
                model.drain(at..end);
            }
        }
    }

    proptest! {
        #[test]
        fn list_matches_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
            let mut list = UnrolledList::<i32, 4>::default();
            let mut model = VecDeque::new();
            for op in ops {
                apply(&mut list, &mut model, op);
                list.assert_invariants();
                prop_assert_eq!(list.len(), model.len());
            }
            prop_assert!(list.iter().eq(model.iter()));
            prop_assert!(list.iter().rev().eq(model.iter().rev()));
        }

        #[test]
        fn list_matches_model_odd_capacity(ops in prop::collection::vec(op_strategy(), 0..200)) {
            let mut list = UnrolledList::<i32, 5>::default();
            let mut model = VecDeque::new();
            for op in ops {
                apply(&mut list, &mut model, op);
                list.assert_invariants();
            }
            prop_assert!(list.iter().eq(model.iter()));
        }

        #[test]
        fn list_round_trip(values in prop::collection::vec(any::<i16>(), 0..100)) {
            let list = UnrolledList::<i16, 3>::from_iter(values.iter().copied());
            let rebuilt = UnrolledList::<i16, 7>::from_iter(list.to_vec());
            prop_assert_eq!(rebuilt.to_vec(), values);
            prop_assert_eq!(&list, &rebuilt);
        }
    }
}
