use bytemuck::{Pod, Zeroable};
use std::ops::Range;

/// Growable contiguous numeric region backing one or more facets.
///
/// Capacity grows by an integer multiplier (default 2) until sufficient;
/// growth preserves existing content at unchanged offsets and zero-fills
/// the tail. The buffer itself has no notion of facets - slot bookkeeping
/// lives in the trackers that own it.
pub struct PackedBuffer<T: Pod> {
    data: Vec<T>,
    growth_factor: usize,
}

impl<T: Pod> PackedBuffer<T> {
    /// Default capacity multiplier applied on growth.
    pub const DEFAULT_GROWTH_FACTOR: usize = 2;

    pub fn new() -> Self {
        Self::with_growth_factor(Self::DEFAULT_GROWTH_FACTOR)
    }

    /// `growth_factor` must be at least 2.
    pub fn with_growth_factor(growth_factor: usize) -> Self {
        debug_assert!(growth_factor >= 2, "growth factor must multiply capacity");
        Self {
            data: Vec::new(),
            growth_factor,
        }
    }

    /// Current capacity in elements.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn growth_factor(&self) -> usize {
        self.growth_factor
    }

    /// Grow capacity until it is at least `min_len`.
    ///
    /// Capacity is seeded at 1 when zero, then multiplied by the growth
    /// factor until sufficient. Returns whether the backing store was
    /// reallocated; any outstanding views must be re-acquired when it was.
    pub fn expand(&mut self, min_len: usize) -> bool {
        if self.data.len() >= min_len {
            return false;
        }
        let mut cap = self.data.len().max(1);
        while cap < min_len {
            cap *= self.growth_factor;
        }
        tracing::trace!(from = self.data.len(), to = cap, "packed buffer expanded");
        self.data.resize(cap, T::zeroed());
        true
    }

    /// Copy `values` into the buffer at `offset`. The caller must have
    /// ensured capacity; offsets come from a tracker's own bookkeeping.
    #[inline]
    pub fn write_at(&mut self, offset: usize, values: &[T]) {
        self.data[offset..offset + values.len()].copy_from_slice(values);
    }

    /// Zero a region, e.g. a freshly (re)assigned facet.
    #[inline]
    pub fn zero_range(&mut self, range: Range<usize>) {
        self.data[range].fill(T::zeroed());
    }

    /// Move a region to a lower offset during compaction.
    #[inline]
    pub fn copy_within(&mut self, src: Range<usize>, dst: usize) {
        self.data.copy_within(src, dst);
    }

    /// Borrow a window, or `None` when it is out of capacity.
    pub fn slice(&self, range: Range<usize>) -> Option<&[T]> {
        self.data.get(range)
    }

    pub fn slice_mut(&mut self, range: Range<usize>) -> Option<&mut [T]> {
        self.data.get_mut(range)
    }

    /// Raw bytes of the first `len` elements, for GPU upload paths.
    pub fn as_bytes(&self, len: usize) -> &[u8] {
        bytemuck::cast_slice(&self.data[..len])
    }
}

impl<T: Pod> Default for PackedBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}
