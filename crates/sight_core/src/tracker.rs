use crate::{FacetError, IdentityIndexMap, PackedBuffer};
use bytemuck::Pod;
use std::hash::Hash;

/// Variable-length facet allocator over one packed buffer.
///
/// Each facet is a contiguous run of values keyed by an external stable
/// id. Deleting a facet leaves a hole that keeps its length, so offsets
/// of later facets never move until `make_contiguous` runs. Slot reuse on
/// add is first-fit by *exact* length: a larger hole is never split or
/// reused, and a fresh facet appends past the last slot instead.
pub struct FacetTracker<K, T: Pod> {
    buffer: PackedBuffer<T>,
    ids: IdentityIndexMap<K>,
    lengths: Vec<usize>,
    offsets: Vec<usize>,
}

impl<K: Clone + Eq + Hash, T: Pod> FacetTracker<K, T> {
    pub fn new() -> Self {
        Self::with_growth_factor(PackedBuffer::<T>::DEFAULT_GROWTH_FACTOR)
    }

    pub fn with_growth_factor(growth_factor: usize) -> Self {
        Self {
            buffer: PackedBuffer::with_growth_factor(growth_factor),
            ids: IdentityIndexMap::new(),
            lengths: Vec::new(),
            offsets: Vec::new(),
        }
    }

    /// Number of live facets.
    #[inline]
    pub fn num_facets(&self) -> usize {
        self.ids.len()
    }

    /// Total length of all slots, holes included. This is the capacity
    /// the buffer must cover and the length of `view_whole_buffer`.
    #[inline]
    pub fn array_len(&self) -> usize {
        match self.lengths.last() {
            Some(&last) => self.offsets[self.offsets.len() - 1] + last,
            None => 0,
        }
    }

    /// Total length of occupied facets only.
    pub fn active_len(&self) -> usize {
        self.ids.iter().map(|(_, idx)| self.lengths[idx]).sum()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Add a facet of `length` values for `id`, or update it when the id
    /// is already tracked. Returns whether the backing buffer grew; any
    /// outstanding views must be re-acquired when it did.
    pub fn add_facet(
        &mut self,
        id: K,
        length: usize,
        initial: Option<&[T]>,
    ) -> Result<bool, FacetError> {
        if let Some(values) = initial {
            if values.len() != length {
                return Err(FacetError::LengthMismatch {
                    expected: length,
                    got: values.len(),
                });
            }
        }
        if self.ids.index_of(&id).is_some() {
            return self.update_facet(&id, Some(length), initial);
        }

        // First-fit by exact length over the holes; otherwise append.
        let reuse = self
            .ids
            .free_indices()
            .find(|&idx| self.lengths[idx] == length);
        let slot = match reuse {
            Some(idx) => {
                self.ids.insert_at(id, idx);
                idx
            }
            None => {
                let idx = self.lengths.len();
                self.ids.insert_at(id, idx);
                self.offsets.push(self.array_len_before_push());
                self.lengths.push(length);
                idx
            }
        };

        let expanded = self.buffer.expand(self.array_len());
        let offset = self.offsets[slot];
        self.buffer.zero_range(offset..offset + length);
        if let Some(values) = initial {
            self.buffer.write_at(offset, values);
        }
        Ok(expanded)
    }

    fn array_len_before_push(&self) -> usize {
        match self.lengths.last() {
            Some(&last) => self.offsets[self.offsets.len() - 1] + last,
            None => 0,
        }
    }

    /// Overwrite a facet in place when its length is unchanged; otherwise
    /// delete and re-add it, which may move it to a different slot.
    /// Untracked ids are a benign no-op.
    pub fn update_facet(
        &mut self,
        id: &K,
        length: Option<usize>,
        values: Option<&[T]>,
    ) -> Result<bool, FacetError> {
        let Some(slot) = self.ids.index_of(id) else {
            return Ok(false);
        };
        let new_length = length.unwrap_or(self.lengths[slot]);
        if let Some(v) = values {
            if v.len() != new_length {
                return Err(FacetError::LengthMismatch {
                    expected: new_length,
                    got: v.len(),
                });
            }
        }
        if new_length == self.lengths[slot] {
            if let Some(v) = values {
                self.buffer.write_at(self.offsets[slot], v);
            }
            return Ok(false);
        }
        self.delete_facet(id);
        self.add_facet(id.clone(), new_length, values)
    }

    /// Mark the id's slot free, leaving a hole. Returns `false` when the
    /// id is untracked.
    pub fn delete_facet(&mut self, id: &K) -> bool {
        self.ids.remove(id).is_some()
    }

    /// Shift occupied slots down over any holes so live facets become
    /// contiguous, then drop trailing free slots. Returns whether anything
    /// moved; a second call without intervening mutation returns `false`.
    pub fn make_contiguous(&mut self) -> bool {
        let mut modified = false;
        let mut write_slot = 0;
        let mut write_off = 0;
        for read_slot in 0..self.lengths.len() {
            if self.ids.id_at(read_slot).is_none() {
                continue;
            }
            let len = self.lengths[read_slot];
            if read_slot != write_slot {
                let read_off = self.offsets[read_slot];
                self.buffer.copy_within(read_off..read_off + len, write_off);
                self.ids.reassign(read_slot, write_slot);
                self.lengths[write_slot] = len;
                modified = true;
            }
            self.offsets[write_slot] = write_off;
            write_off += len;
            write_slot += 1;
        }
        if write_slot != self.lengths.len() {
            modified = true;
        }
        self.lengths.truncate(write_slot);
        self.offsets.truncate(write_slot);
        self.ids.truncate(write_slot);
        modified
    }

    /// Byte-free window over one facet's values, or `None` when absent.
    pub fn view_facet(&self, id: &K) -> Option<&[T]> {
        self.view_facet_at(self.ids.index_of(id)?)
    }

    /// Facet window by slot index; `None` when the slot is free or out of
    /// range.
    pub fn view_facet_at(&self, idx: usize) -> Option<&[T]> {
        self.ids.id_at(idx)?;
        self.buffer
            .slice(self.offsets[idx]..self.offsets[idx] + self.lengths[idx])
    }

    pub fn view_facet_mut(&mut self, id: &K) -> Option<&mut [T]> {
        let idx = self.ids.index_of(id)?;
        self.buffer
            .slice_mut(self.offsets[idx]..self.offsets[idx] + self.lengths[idx])
    }

    /// The packed region covering every slot, holes included.
    pub fn view_whole_buffer(&self) -> &[T] {
        self.buffer.slice(0..self.array_len()).unwrap_or(&[])
    }

    /// Raw bytes of the packed region, for upload paths.
    pub fn view_whole_buffer_bytes(&self) -> &[u8] {
        self.buffer.as_bytes(self.array_len())
    }

    pub fn facet_offset(&self, id: &K) -> Option<usize> {
        Some(self.offsets[self.ids.index_of(id)?])
    }

    pub fn facet_offset_at(&self, idx: usize) -> Option<usize> {
        self.ids.id_at(idx)?;
        Some(self.offsets[idx])
    }

    pub fn facet_len(&self, id: &K) -> Option<usize> {
        Some(self.lengths[self.ids.index_of(id)?])
    }

    pub fn index_of(&self, id: &K) -> Option<usize> {
        self.ids.index_of(id)
    }

    /// Occupied `(id, slot)` pairs in slot order.
    pub fn iter_ids(&self) -> impl Iterator<Item = (&K, usize)> + '_ {
        self.ids.iter()
    }
}

impl<K: Clone + Eq + Hash, T: Pod> Default for FacetTracker<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> FacetTracker<&'static str, f32> {
        let mut t = FacetTracker::new();
        t.add_facet("a", 5, None).unwrap();
        t.add_facet("b", 10, None).unwrap();
        t.add_facet("c", 5, None).unwrap();
        t.add_facet("d", 7, None).unwrap();
        t.add_facet("e", 9, None).unwrap();
        t
    }

    #[test]
    fn growth_doubles_until_sufficient() {
        let t = seeded();
        assert_eq!(t.array_len(), 36);
        // 0 seeds to 1, then doubles: 1,2,4,8,16,32,64
        assert_eq!(t.capacity(), 64);
    }

    #[test]
    fn compaction_scenario() {
        let mut t = seeded();
        assert!(t.delete_facet(&"b"));
        assert!(t.delete_facet(&"d"));
        // Holes keep their length until compaction
        assert_eq!(t.array_len(), 36);
        assert_eq!(t.active_len(), 19);

        assert!(t.make_contiguous());
        assert_eq!(t.facet_offset(&"a"), Some(0));
        assert_eq!(t.facet_offset(&"c"), Some(5));
        assert_eq!(t.facet_offset(&"e"), Some(10));
        assert_eq!(t.array_len(), 19);
        assert_eq!(t.num_facets(), 3);
    }

    #[test]
    fn compaction_is_idempotent() {
        let mut t = seeded();
        t.delete_facet(&"b");
        t.delete_facet(&"d");
        assert!(t.make_contiguous());
        let offsets: Vec<_> = ["a", "c", "e"]
            .iter()
            .map(|id| t.facet_offset(id).unwrap())
            .collect();
        assert!(!t.make_contiguous());
        for (id, before) in ["a", "c", "e"].iter().zip(offsets) {
            assert_eq!(t.facet_offset(id), Some(before));
        }
    }

    #[test]
    fn compaction_moves_data() {
        let mut t = FacetTracker::<&str, f32>::new();
        t.add_facet("a", 2, Some(&[1.0, 2.0])).unwrap();
        t.add_facet("b", 3, Some(&[3.0, 4.0, 5.0])).unwrap();
        t.add_facet("c", 2, Some(&[6.0, 7.0])).unwrap();
        t.delete_facet(&"b");
        t.make_contiguous();
        assert_eq!(t.view_facet(&"a").unwrap(), &[1.0, 2.0]);
        assert_eq!(t.view_facet(&"c").unwrap(), &[6.0, 7.0]);
        assert_eq!(t.view_whole_buffer(), &[1.0, 2.0, 6.0, 7.0]);
    }

    #[test]
    fn reuse_is_first_fit_by_exact_length() {
        let mut t = seeded();
        t.delete_facet(&"b"); // hole of 10 at slot 1
        t.delete_facet(&"c"); // hole of 5 at slot 2

        // len 5 matches the hole at slot 2, not the larger hole at 1
        t.add_facet("f", 5, None).unwrap();
        assert_eq!(t.index_of(&"f"), Some(2));
        assert_eq!(t.facet_offset(&"f"), Some(15));

        // len 3 matches no hole; appends even though a hole of 10 exists
        t.add_facet("g", 3, None).unwrap();
        assert_eq!(t.index_of(&"g"), Some(5));
        assert_eq!(t.facet_offset(&"g"), Some(36));
    }

    #[test]
    fn update_in_place_keeps_slot() {
        let mut t = seeded();
        let expanded = t
            .update_facet(&"c", None, Some(&[1.0, 2.0, 3.0, 4.0, 5.0]))
            .unwrap();
        assert!(!expanded);
        assert_eq!(t.index_of(&"c"), Some(2));
        assert_eq!(t.view_facet(&"c").unwrap(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn update_with_new_length_moves_slot() {
        let mut t = seeded();
        t.update_facet(&"a", Some(3), Some(&[1.0, 2.0, 3.0])).unwrap();
        // Old slot had len 5; a fresh len-3 facet appends
        assert_eq!(t.index_of(&"a"), Some(5));
        assert_eq!(t.view_facet(&"a").unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn add_existing_id_updates() {
        let mut t = FacetTracker::<&str, f32>::new();
        t.add_facet("a", 2, Some(&[1.0, 2.0])).unwrap();
        t.add_facet("a", 2, Some(&[9.0, 8.0])).unwrap();
        assert_eq!(t.num_facets(), 1);
        assert_eq!(t.view_facet(&"a").unwrap(), &[9.0, 8.0]);
    }

    #[test]
    fn length_mismatch_leaves_state_unchanged() {
        let mut t = seeded();
        let err = t.add_facet("f", 4, Some(&[1.0, 2.0])).unwrap_err();
        assert_eq!(
            err,
            FacetError::LengthMismatch {
                expected: 4,
                got: 2
            }
        );
        assert_eq!(t.num_facets(), 5);
        assert_eq!(t.index_of(&"f"), None);
        assert_eq!(t.array_len(), 36);
    }

    #[test]
    fn lookup_misses_are_benign() {
        let mut t = FacetTracker::<&str, f32>::new();
        assert!(!t.delete_facet(&"ghost"));
        assert_eq!(t.update_facet(&"ghost", None, None).unwrap(), false);
        assert_eq!(t.view_facet(&"ghost"), None);
        assert_eq!(t.view_facet_at(3), None);
    }
}
