use std::mem::MaybeUninit;
use std::ptr::{self, NonNull};
use std::slice;

pub(crate) type NodePtr<T, const N: usize> = NonNull<Node<T, N>>;

/// A block of up to `N` elements linked into the list.
///
/// Slots `[0, len)` hold live elements and `[len, N)` are uninitialized.
/// Elements only ever enter or leave the slots through the explicit
/// write/read/copy/drop helpers below, never by implicit struct copies.
///
/// A node does not own its neighbours: `next` and `prev` are plain links and
/// the list is responsible for freeing every node it holds.
pub(crate) struct Node<T, const N: usize> {
    pub(crate) next: Option<NodePtr<T, N>>,
    pub(crate) prev: Option<NodePtr<T, N>>,
    len: usize,
    slots: [MaybeUninit<T>; N],
}

impl<T, const N: usize> Node<T, N> {
    /// Initialize the header of a freshly allocated node in place, leaving
    /// every slot uninitialized.
    ///
    /// It is unsafe because `node` must point to writable memory laid out for
    /// a `Node<T, N>`.
    pub(crate) unsafe fn init(node: NodePtr<T, N>) {
        let raw = node.as_ptr();
        ptr::addr_of_mut!((*raw).next).write(None);
        ptr::addr_of_mut!((*raw).prev).write(None);
        ptr::addr_of_mut!((*raw).len).write(0);
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.len == N
    }

    #[inline]
    fn slot_ptr(&self) -> *const T {
        self.slots.as_ptr().cast()
    }

    #[inline]
    fn slot_mut_ptr(&mut self) -> *mut T {
        self.slots.as_mut_ptr().cast()
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        // SAFETY: slots `[0, len)` are initialized.
        unsafe { slice::from_raw_parts(self.slot_ptr(), self.len) }
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: slots `[0, len)` are initialized.
        unsafe { slice::from_raw_parts_mut(self.slot_mut_ptr(), self.len) }
    }

    /// Construct `value` at `index`, shifting `[index, len)` up by one slot.
    ///
    /// It is unsafe because the node must not be full and `index <= len`.
    pub(crate) unsafe fn insert(&mut self, index: usize, value: T) {
        debug_assert!(self.len < N, "insert into a full node");
        debug_assert!(index <= self.len, "insert past the end of a node");
        let base = self.slot_mut_ptr();
        ptr::copy(base.add(index), base.add(index + 1), self.len - index);
        base.add(index).write(value);
        self.len += 1;
    }

    /// Move the element at `index` out, shifting `(index, len)` down by one slot.
    ///
    /// It is unsafe because `index` must be less than `len`.
    pub(crate) unsafe fn remove(&mut self, index: usize) -> T {
        debug_assert!(index < self.len, "remove past the end of a node");
        let base = self.slot_mut_ptr();
        let value = base.add(index).read();
        ptr::copy(base.add(index + 1), base.add(index), self.len - index - 1);
        self.len -= 1;
        value
    }

    /// Drop the elements in `start..end` and close the gap.
    ///
    /// The gap is closed even if a destructor panics: the rest of the range is
    /// still dropped while unwinding, then the elements behind it are shifted
    /// down. The node never keeps a dropped value in its live slots.
    ///
    /// It is unsafe because `start <= end <= len` must hold.
    pub(crate) unsafe fn drop_range(&mut self, start: usize, end: usize) {
        debug_assert!(start <= end && end <= self.len);

        struct BackshiftOnDrop<'a, T, const N: usize> {
            node: &'a mut Node<T, N>,
            start: usize,
            end: usize,
            tail: usize,
        }

        impl<T, const N: usize> Drop for BackshiftOnDrop<'_, T, N> {
            fn drop(&mut self) {
                let base = self.node.slot_mut_ptr();
                // SAFETY: `[end, end + tail)` holds the live elements behind the
                // range, and `[start, end)` has been dropped.
                unsafe { ptr::copy(base.add(self.end), base.add(self.start), self.tail) };
                self.node.len = self.start + self.tail;
            }
        }

        let tail = self.len - end;
        self.len = start;
        let mut guard = BackshiftOnDrop {
            node: self,
            start,
            end,
            tail,
        };
        let base = guard.node.slot_mut_ptr();
        ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.add(start), end - start));
    }

    /// Drop every element from `new_len` onwards.
    pub(crate) fn truncate(&mut self, new_len: usize) {
        if new_len < self.len {
            // SAFETY: `new_len < len`.
            unsafe { self.drop_range(new_len, self.len) }
        }
    }

    /// Move the elements `[at, len)` into the empty node `other`, keeping
    /// `[0, at)` here.
    ///
    /// It is unsafe because `other` must be empty and `at <= len`.
    pub(crate) unsafe fn move_tail_to(&mut self, at: usize, other: &mut Self) {
        debug_assert!(other.is_empty(), "move into a non-empty node");
        debug_assert!(at <= self.len);
        let count = self.len - at;
        ptr::copy_nonoverlapping(self.slot_ptr().add(at), other.slot_mut_ptr(), count);
        self.len = at;
        other.len = count;
    }

    /// Construct `value` after the last live element.
    ///
    /// It is unsafe because the node must not be full.
    pub(crate) unsafe fn push(&mut self, value: T) {
        self.insert(self.len, value)
    }
}

impl<T, const N: usize> Drop for Node<T, N> {
    fn drop(&mut self) {
        self.truncate(0);
    }
}

#[cfg(test)]
mod tests {
    use super::{Node, NodePtr};
    use std::cell::RefCell;
    use std::mem::MaybeUninit;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::ptr::NonNull;

    fn new_node<T, const N: usize>() -> Box<Node<T, N>> {
        let raw = Box::into_raw(Box::new(MaybeUninit::<Node<T, N>>::uninit()));
        let node: NodePtr<T, N> = NonNull::new(raw).unwrap().cast();
        unsafe {
            Node::init(node);
            Box::from_raw(node.as_ptr())
        }
    }

    #[test]
    fn node_insert_and_remove() {
        let mut node = new_node::<i32, 4>();
        assert!(node.is_empty());
        unsafe {
            node.push(1);
            node.push(3);
            node.insert(1, 2);
            node.insert(0, 0);
        }
        assert!(node.is_full());
        assert_eq!(node.as_slice(), &[0, 1, 2, 3]);

        assert_eq!(unsafe { node.remove(1) }, 1);
        assert_eq!(unsafe { node.remove(2) }, 3);
        assert_eq!(node.as_slice(), &[0, 2]);
        assert_eq!(node.len(), 2);

        node.as_mut_slice()[1] = 5;
        assert_eq!(node.as_slice(), &[0, 5]);
    }

    #[test]
    fn node_drop_range() {
        let dropped = RefCell::new(Vec::new());
        struct DropChecker<'a>(i32, &'a RefCell<Vec<i32>>);
        impl Drop for DropChecker<'_> {
            fn drop(&mut self) {
                self.1.borrow_mut().push(self.0);
            }
        }

        let mut node = new_node::<DropChecker<'_>, 6>();
        for i in 0..6 {
            unsafe { node.push(DropChecker(i, &dropped)) };
        }
        unsafe { node.drop_range(1, 4) };
        assert_eq!(dropped.borrow().as_slice(), &[1, 2, 3]);
        assert_eq!(
            node.as_slice().iter().map(|d| d.0).collect::<Vec<_>>(),
            vec![0, 4, 5]
        );

        node.truncate(1);
        assert_eq!(dropped.borrow().as_slice(), &[1, 2, 3, 4, 5]);

        drop(node);
        assert_eq!(dropped.borrow().as_slice(), &[1, 2, 3, 4, 5, 0]);
    }

    #[test]
    fn node_drop_range_panicking_destructor() {
        struct Bomb<'a>(i32, &'a RefCell<Vec<i32>>);
        impl Drop for Bomb<'_> {
            fn drop(&mut self) {
                self.1.borrow_mut().push(self.0);
                if self.0 == 2 {
                    panic!("bomb {} went off", self.0);
                }
            }
        }

        let dropped = RefCell::new(Vec::new());
        let mut node = new_node::<Bomb<'_>, 6>();
        for i in 0..6 {
            unsafe { node.push(Bomb(i, &dropped)) };
        }
        let result = catch_unwind(AssertUnwindSafe(|| unsafe { node.drop_range(1, 4) }));
        assert!(result.is_err());
        // The whole range went, and the tail closed the gap.
        assert_eq!(dropped.borrow().as_slice(), &[1, 2, 3]);
        assert_eq!(
            node.as_slice().iter().map(|b| b.0).collect::<Vec<_>>(),
            vec![0, 4, 5]
        );

        drop(node);
        let mut all = dropped.borrow().clone();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn node_move_tail() {
        let mut front = new_node::<String, 5>();
        let mut back = new_node::<String, 5>();
        for s in ["a", "b", "c", "d", "e"] {
            unsafe { front.push(s.to_owned()) };
        }
        unsafe { front.move_tail_to(3, &mut back) };
        assert_eq!(front.as_slice(), &["a", "b", "c"]);
        assert_eq!(back.as_slice(), &["d", "e"]);
    }
}
