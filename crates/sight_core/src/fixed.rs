use crate::{FacetError, IdentityIndexMap, PackedBuffer};
use bytemuck::Pod;
use std::hash::Hash;

/// Fixed-length facet allocator: every facet shares one length fixed at
/// construction, so offsets are `index * facet_len` and the facet count
/// is a plain add/delete counter rather than a sum over slot lengths.
///
/// Holes are reused unconditionally (all lengths match), via the lowest
/// free index first.
pub struct FixedFacetTracker<K, T: Pod> {
    buffer: PackedBuffer<T>,
    ids: IdentityIndexMap<K>,
    facet_len: usize,
}

impl<K: Clone + Eq + Hash, T: Pod> FixedFacetTracker<K, T> {
    pub fn new(facet_len: usize) -> Self {
        Self::with_growth_factor(facet_len, PackedBuffer::<T>::DEFAULT_GROWTH_FACTOR)
    }

    pub fn with_growth_factor(facet_len: usize, growth_factor: usize) -> Self {
        debug_assert!(facet_len > 0, "fixed facet length must be non-zero");
        Self {
            buffer: PackedBuffer::with_growth_factor(growth_factor),
            ids: IdentityIndexMap::new(),
            facet_len,
        }
    }

    #[inline]
    pub fn facet_len(&self) -> usize {
        self.facet_len
    }

    /// Number of live facets.
    #[inline]
    pub fn num_facets(&self) -> usize {
        self.ids.len()
    }

    /// Slots including holes; sizes `view_whole_buffer`.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.ids.slot_count()
    }

    /// Total length of all slots, holes included.
    #[inline]
    pub fn array_len(&self) -> usize {
        self.ids.slot_count() * self.facet_len
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Offset of any slot index; valid independent of occupancy.
    #[inline]
    pub fn facet_offset_at(&self, idx: usize) -> usize {
        idx * self.facet_len
    }

    pub fn facet_offset(&self, id: &K) -> Option<usize> {
        Some(self.facet_offset_at(self.ids.index_of(id)?))
    }

    pub fn index_of(&self, id: &K) -> Option<usize> {
        self.ids.index_of(id)
    }

    /// Add a facet for `id`, or overwrite it when already tracked.
    /// Returns whether the backing buffer grew.
    pub fn add_facet(&mut self, id: K, initial: Option<&[T]>) -> Result<bool, FacetError> {
        if let Some(values) = initial {
            if values.len() != self.facet_len {
                return Err(FacetError::LengthMismatch {
                    expected: self.facet_len,
                    got: values.len(),
                });
            }
        }
        if self.ids.index_of(&id).is_some() {
            return self.update_facet(&id, initial);
        }
        let slot = self.ids.insert(id);
        let expanded = self.buffer.expand(self.array_len());
        let offset = self.facet_offset_at(slot);
        self.buffer.zero_range(offset..offset + self.facet_len);
        if let Some(values) = initial {
            self.buffer.write_at(offset, values);
        }
        Ok(expanded)
    }

    /// Overwrite a facet in place. Untracked ids are a benign no-op;
    /// fixed facets never relocate on update.
    pub fn update_facet(&mut self, id: &K, values: Option<&[T]>) -> Result<bool, FacetError> {
        let Some(slot) = self.ids.index_of(id) else {
            return Ok(false);
        };
        if let Some(v) = values {
            if v.len() != self.facet_len {
                return Err(FacetError::LengthMismatch {
                    expected: self.facet_len,
                    got: v.len(),
                });
            }
            self.buffer.write_at(self.facet_offset_at(slot), v);
        }
        Ok(false)
    }

    /// Mark the id's slot free. Returns `false` when untracked.
    pub fn delete_facet(&mut self, id: &K) -> bool {
        self.ids.remove(id).is_some()
    }

    /// Pack occupied facets to the front. Idempotent.
    pub fn make_contiguous(&mut self) -> bool {
        let mut modified = false;
        let mut write_slot = 0;
        for read_slot in 0..self.ids.slot_count() {
            if self.ids.id_at(read_slot).is_none() {
                continue;
            }
            if read_slot != write_slot {
                let src = self.facet_offset_at(read_slot);
                let dst = self.facet_offset_at(write_slot);
                self.buffer.copy_within(src..src + self.facet_len, dst);
                self.ids.reassign(read_slot, write_slot);
                modified = true;
            }
            write_slot += 1;
        }
        if write_slot != self.ids.slot_count() {
            modified = true;
        }
        self.ids.truncate(write_slot);
        modified
    }

    pub fn view_facet(&self, id: &K) -> Option<&[T]> {
        self.view_facet_at(self.ids.index_of(id)?)
    }

    pub fn view_facet_at(&self, idx: usize) -> Option<&[T]> {
        self.ids.id_at(idx)?;
        let offset = self.facet_offset_at(idx);
        self.buffer.slice(offset..offset + self.facet_len)
    }

    pub fn view_facet_mut(&mut self, id: &K) -> Option<&mut [T]> {
        let idx = self.ids.index_of(id)?;
        let offset = self.facet_offset_at(idx);
        self.buffer.slice_mut(offset..offset + self.facet_len)
    }

    /// The packed region covering every slot, holes included.
    pub fn view_whole_buffer(&self) -> &[T] {
        self.buffer.slice(0..self.array_len()).unwrap_or(&[])
    }

    /// Raw bytes of the packed region, for upload paths.
    pub fn view_whole_buffer_bytes(&self) -> &[u8] {
        self.buffer.as_bytes(self.array_len())
    }

    /// Occupied `(id, slot)` pairs in slot order.
    pub fn iter_ids(&self) -> impl Iterator<Item = (&K, usize)> + '_ {
        self.ids.iter()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}
