use std::alloc::Layout;

use thiserror::Error;

/// Errors reported by the fallible operations of an [`UnrolledList`] and its cursors.
///
/// [`UnrolledList`]: crate::UnrolledList
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The allocator could not provide memory for a new node.
    ///
    /// The list is left exactly as it was before the failed call.
    #[error("failed to allocate a node of {} bytes", .layout.size())]
    AllocError { layout: Layout },

    /// A cursor step would cross the end position of the list.
    #[error("cursor cannot move across the end of the list")]
    Boundary,

    /// A cursor was asked to seek past the end position.
    #[error("index {index} is out of bounds for a list of length {len}")]
    OutOfBounds { index: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::Error;
    use std::alloc::Layout;

    #[test]
    fn error_messages() {
        let layout = Layout::new::<[u64; 4]>();
        assert_eq!(
            Error::AllocError { layout }.to_string(),
            "failed to allocate a node of 32 bytes"
        );
        assert_eq!(
            Error::OutOfBounds { index: 7, len: 3 }.to_string(),
            "index 7 is out of bounds for a list of length 3"
        );
        assert_eq!(
            Error::Boundary.to_string(),
            "cursor cannot move across the end of the list"
        );
    }
}
