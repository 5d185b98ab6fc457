//! Segmented arena holding the serialized cut lists of all nodes.
//!
//! Cut lists are written once and never freed individually; the whole arena is released together
//! with the mapper. A cut list never spans two segments.
use std::fmt;

/// Number of bits of a [`CutSetHandle`] used for the offset within a segment.
pub const SEGMENT_BITS: u32 = 16;

/// Number of `u32` words in every arena segment.
pub const SEGMENT_SIZE: usize = 1 << SEGMENT_BITS;

/// Location of a cut list within a [`CutArena`].
///
/// Backed by a `usize`, so the number of segments is limited only by the address space.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CutSetHandle(usize);

impl CutSetHandle {
    #[inline(always)]
    fn new(segment: usize, offset: usize) -> Self {
        debug_assert!(offset < SEGMENT_SIZE);
        let raw = segment
            .checked_mul(SEGMENT_SIZE)
            .expect("cut arena exhausted the address space");
        Self(raw | offset)
    }

    /// Index of the segment containing the cut list.
    #[inline(always)]
    pub fn segment(self) -> usize {
        self.0 >> SEGMENT_BITS
    }

    /// Offset of the cut list within its segment.
    #[inline(always)]
    pub fn offset(self) -> usize {
        self.0 & (SEGMENT_SIZE - 1)
    }

    /// Packed representation `segment * SEGMENT_SIZE + offset`.
    #[inline(always)]
    pub fn raw(self) -> usize {
        self.0
    }
}

impl fmt::Debug for CutSetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for CutSetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}+{}", self.segment(), self.offset())
    }
}

/// Bump allocator for cut lists, organized in fixed size segments.
#[derive(Default)]
pub struct CutArena {
    segments: Vec<Box<[u32]>>,
    cursor: usize,
    used: usize,
}

impl CutArena {
    /// Reserves `len` consecutive words, starting a new segment if the current one is too full.
    ///
    /// Panics if `len` exceeds [`SEGMENT_SIZE`], which option validation rules out.
    pub fn allocate(&mut self, len: usize) -> CutSetHandle {
        assert!(
            len <= SEGMENT_SIZE,
            "cut list of {len} words exceeds the arena segment size"
        );
        if self.segments.is_empty() || self.cursor + len > SEGMENT_SIZE {
            self.segments.push(vec![0; SEGMENT_SIZE].into_boxed_slice());
            self.cursor = 0;
        }
        let handle = CutSetHandle::new(self.segments.len() - 1, self.cursor);
        self.cursor += len;
        self.used += len;
        handle
    }

    /// Returns the words starting at the handle up to the end of its segment.
    #[inline]
    pub fn resolve(&self, handle: CutSetHandle) -> &[u32] {
        &self.segments[handle.segment()][handle.offset()..]
    }

    /// Mutable variant of [`resolve`][Self::resolve].
    #[inline]
    pub fn resolve_mut(&mut self, handle: CutSetHandle) -> &mut [u32] {
        &mut self.segments[handle.segment()][handle.offset()..]
    }

    /// Number of allocated segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Number of words handed out by [`allocate`][Self::allocate].
    pub fn used_words(&self) -> usize {
        self.used
    }

    /// Memory reserved for all segments in bytes.
    pub fn reserved_bytes(&self) -> usize {
        self.segments.len() * SEGMENT_SIZE * std::mem::size_of::<u32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_packing() {
        let handle = CutSetHandle::new(3, 17);
        assert_eq!(handle.segment(), 3);
        assert_eq!(handle.offset(), 17);
        assert_eq!(handle.raw(), 3 * SEGMENT_SIZE + 17);
        assert_eq!(handle.to_string(), "s3+17");
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn handles_address_more_than_65536_segments() {
        let handle = CutSetHandle::new(70_000, 5);
        assert_eq!(handle.segment(), 70_000);
        assert_eq!(handle.offset(), 5);
        assert_eq!(handle.raw(), 70_000 * SEGMENT_SIZE + 5);
    }

    #[test]
    fn lists_never_span_segments() {
        let mut arena = CutArena::default();
        let first = arena.allocate(SEGMENT_SIZE - 10);
        let second = arena.allocate(8);
        let third = arena.allocate(8);

        assert_eq!(first.segment(), 0);
        assert_eq!(second.segment(), 0);
        assert_eq!(second.offset(), SEGMENT_SIZE - 10);
        assert_eq!(third.segment(), 1);
        assert_eq!(third.offset(), 0);
        assert_eq!(arena.segment_count(), 2);
        assert_eq!(arena.used_words(), SEGMENT_SIZE + 6);
        assert_eq!(arena.reserved_bytes(), 2 * SEGMENT_SIZE * 4);
    }

    #[test]
    fn writes_are_visible_through_handles() {
        let mut arena = CutArena::default();
        let a = arena.allocate(3);
        let b = arena.allocate(2);
        arena.resolve_mut(a)[..3].copy_from_slice(&[1, 2, 3]);
        arena.resolve_mut(b)[..2].copy_from_slice(&[4, 5]);
        assert_eq!(&arena.resolve(a)[..5], &[1, 2, 3, 4, 5]);
        assert_eq!(&arena.resolve(b)[..2], &[4, 5]);
    }

    #[test]
    #[should_panic]
    fn oversized_lists_are_rejected() {
        CutArena::default().allocate(SEGMENT_SIZE + 1);
    }
}
