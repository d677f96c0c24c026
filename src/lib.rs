//! This crate provides an unrolled linked list: a doubly-linked list whose nodes
//! each store up to `N` elements inline.
//!
//! The [`UnrolledList`] inserts and removes elements at a known position in
//! *O*(`N`) time, touching a single node. Storing a run of elements per node
//! saves link overhead and keeps traversal cache friendly. In compromise,
//! accessing an element by index walks the list node by node, which takes
//! *O*(*n* / `N`) time.
//!
//! Here is a quick example showing how the list works.
//!
//! ```
//! use unrolled_list::UnrolledList;
//!
//! let mut list = UnrolledList::from([1, 2, 3, 4]);
//!
//! let mut cursor = list.cursor_start_mut();
//!
//! cursor.insert(0); // 0 goes in front, the cursor now points at it
//! assert_eq!(cursor.current(), Some(&0));
//! assert_eq!(cursor.view(), &[0, 1, 2, 3, 4]);
//!
//! cursor.seek_to(3).unwrap();
//! assert_eq!(cursor.remove(), Some(3)); // the element at index 3
//! assert_eq!(cursor.view(), &[0, 1, 2, 4]);
//!
//! assert_eq!(list[3], 4);
//! ```
//!
//! # Memory Layout
//!
//! A list with `k + 1` nodes looks like this:
//! ```text
//!     UnrolledList
//!    ╔═══════════╗
//!    ║   head    ║ ──┐
//!    ╟───────────╢   │
//!    ║   tail    ║ ──┼─────────────────────────────────────────┐
//!    ╟───────────╢   │                                         │
//!    ║    len    ║   │                                         │
//!    ╟───────────╢   │                                         │
//!    ║   alloc   ║   │                                         │
//!    ╚═══════════╝   ↓                                         ↓
//!              ╔═══════════╗          ╔═══════════╗       ╔═══════════╗
//!     None ←── ║   prev    ║ ←─────── ║   prev    ║ ←┄┄── ║   prev    ║
//!              ╟───────────╢          ╟───────────╢       ╟───────────╢
//!              ║   next    ║ ───────→ ║   next    ║ ──┄┄→ ║   next    ║ ──→ None
//!              ╟───────────╢          ╟───────────╢       ╟───────────╢
//!              ║    len    ║          ║    len    ║       ║    len    ║
//!              ╟───────────╢          ╟───────────╢       ╟───────────╢
//!              ║ T T T ┊ ┊ ║          ║ T T ┊ ┊ ┊ ║       ║ T T T T T ║
//!              ╚═══════════╝          ╚═══════════╝       ╚═══════════╝
//!                 Node 0                 Node 1              Node k
//! ```
//! The `UnrolledList` contains:
//! - the pointers `head` and `tail` to the first and the last node, or `None`
//!   when the list is empty;
//! - a length field `len`, the number of elements in the whole list;
//! - the allocator `alloc` that the nodes are allocated from.
//!
//! Each node is allocated on heap, and contains:
//! - the `prev` and `next` pointers to its neighbours;
//! - a length field `len`, the number of elements it holds (never 0 while
//!   the node is in the list);
//! - `N` slots, of which the first `len` hold elements and the rest are
//!   uninitialized.
//!
//! There is no sentinel node: an empty list allocates nothing, and the end
//! position of a cursor is represented by pointing to no node at all.
//!
//! When an element is inserted into a full node, the node is split in two,
//! the front node keeping `N - N / 2` elements. A node emptied by removals is
//! freed right away. Nodes are never merged back.
//!
//! # Node Capacity and Allocator
//!
//! Both are part of the type: `UnrolledList<T, N, A>`, where `N` defaults to
//! [`DEFAULT_NODE_CAPACITY`] and `A` to the global allocator. Any
//! [`Allocator`](allocator_api2::alloc::Allocator) can be used with
//! [`UnrolledList::new_in`], and the `try_*` methods report allocation failures
//! as [`Error::AllocError`] instead of aborting.
//!
//! ```
//! use allocator_api2::alloc::Global;
//! use unrolled_list::UnrolledList;
//!
//! let mut list = UnrolledList::<u8, 64>::new_in(Global);
//! list.extend(0..=255);
//! assert!(list.chunks().all(|chunk| chunk.len() <= 64));
//! ```
//!
//! # Iteration
//!
//! [`Iter`] and [`IterMut`] walk the elements in order from either end. Unlike
//! cursors they stop for good once they meet in the middle. [`IterMut`] hands out
//! mutable elements but leaves the node chain alone. [`Chunks`] and [`ChunksMut`]
//! yield one node at a time as a slice, which exposes how the elements are packed.
//!
//! ## Examples
//!
//! ```
//! use unrolled_list::UnrolledList;
//!
//! let mut list = UnrolledList::from([1, 2, 3]);
//! let mut iter = list.iter();
//! assert_eq!(iter.next(), Some(&1));
//! assert_eq!(iter.next(), Some(&2));
//! assert_eq!(iter.next(), Some(&3));
//! assert_eq!(iter.next(), None);
//! assert_eq!(iter.next(), None); // stays exhausted
//!
//! for item in list.iter_mut() {
//!     *item *= 2;
//! }
//! assert_eq!(list.into_iter().collect::<Vec<_>>(), vec![2, 4, 6]);
//! ```
//!
//! # Cursor Views
//!
//! [`Cursor`] and [`CursorMut`] hold a position in the list and can be moved in
//! both directions, jumping over whole nodes when seeking. A list of length *n*
//! has *n* + 1 positions: one per element, numbered from 0, and the end position
//! *n*, which holds no element. The `*_cyclic` moves wrap from the end position
//! to the first element and back.
//!
//! # Cursor Mutations
//!
//! [`CursorMut`] edits the list where it stands:
//! - [`insert`] puts an element before the cursor and moves onto it;
//! - [`remove`] takes out the element under the cursor;
//! - [`remove_n`] erases a run of elements starting at the cursor;
//! - [`backspace`] takes out the element before the cursor;
//! - [`split`] cuts off everything from the cursor to the end as a new list;
//! - [`splice`] moves the nodes of another list in before the cursor.
//!
//! ## Examples
//!
//! ```
//! use unrolled_list::UnrolledList;
//!
//! let mut list = UnrolledList::from([1, 2, 3, 4]);
//!
//! let mut cursor = list.cursor_start_mut();
//!
//! cursor.insert(5); // becomes [5, 1, 2, 3, 4], points to 5
//! assert_eq!(cursor.current(), Some(&5));
//!
//! assert!(cursor.seek_forward(3).is_ok());
//! assert_eq!(cursor.remove(), Some(3)); // becomes [5, 1, 2, 4], points to 4
//! assert_eq!(cursor.current(), Some(&4));
//!
//! assert_eq!(cursor.backspace(), Some(2)); // becomes [5, 1, 4], points to 4
//! assert_eq!(cursor.current(), Some(&4));
//!
//! assert_eq!(list, [5, 1, 4]);
//! ```
//!
//! The full set of edits is listed on [`CursorMut`].
//!
//! [`Cursor`]: crate::list::cursor::Cursor
//! [`CursorMut`]: crate::list::cursor::CursorMut
//! [`insert`]: crate::list::cursor::CursorMut::insert
//! [`remove`]: crate::list::cursor::CursorMut::remove
//! [`remove_n`]: crate::list::cursor::CursorMut::remove_n
//! [`backspace`]: crate::list::cursor::CursorMut::backspace
//! [`split`]: crate::list::cursor::CursorMut::split
//! [`splice`]: crate::list::cursor::CursorMut::splice

#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use list::drain::Drain;
#[doc(inline)]
pub use list::iterator::{Chunks, ChunksMut, IntoIter, Iter, IterMut};
#[doc(inline)]
pub use list::{UnrolledList, DEFAULT_NODE_CAPACITY};

pub mod list;

mod error;
