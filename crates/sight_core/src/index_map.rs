use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

/// Bidirectional map from an external stable id to a slot index.
///
/// Removing an id frees its index for reuse but never shrinks the slot
/// count; freed indices are kept ordered so "lowest free" and ordered
/// iteration over holes are direct. The host is the sole source of truth
/// for id validity, so there is no generation counter here.
pub struct IdentityIndexMap<K> {
    indices: HashMap<K, usize>,
    ids: Vec<Option<K>>,
    free: BTreeSet<usize>,
}

impl<K: Clone + Eq + Hash> IdentityIndexMap<K> {
    pub fn new() -> Self {
        Self {
            indices: HashMap::new(),
            ids: Vec::new(),
            free: BTreeSet::new(),
        }
    }

    /// Number of occupied slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Occupied slots plus holes.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.ids.len()
    }

    /// Lowest freed index, else the first never-used index.
    pub fn next_index(&self) -> usize {
        self.free.iter().next().copied().unwrap_or(self.ids.len())
    }

    /// Assign `id` to the lowest free slot, appending when none is free.
    /// An already-tracked id keeps its existing index.
    pub fn insert(&mut self, id: K) -> usize {
        if let Some(&idx) = self.indices.get(&id) {
            return idx;
        }
        let idx = self.next_index();
        self.bind(id, idx);
        idx
    }

    /// Bind `id` to a specific index, which must be free or exactly one
    /// past the end. Returns `false` (without binding) otherwise.
    pub fn insert_at(&mut self, id: K, idx: usize) -> bool {
        if self.indices.contains_key(&id) {
            return false;
        }
        if idx != self.ids.len() && !self.free.contains(&idx) {
            return false;
        }
        self.bind(id, idx);
        true
    }

    fn bind(&mut self, id: K, idx: usize) {
        if idx == self.ids.len() {
            self.ids.push(Some(id.clone()));
        } else {
            self.free.remove(&idx);
            self.ids[idx] = Some(id.clone());
        }
        self.indices.insert(id, idx);
    }

    /// Free the id's index for reuse. Returns the index it held.
    pub fn remove(&mut self, id: &K) -> Option<usize> {
        let idx = self.indices.remove(id)?;
        self.ids[idx] = None;
        self.free.insert(idx);
        Some(idx)
    }

    #[inline]
    pub fn index_of(&self, id: &K) -> Option<usize> {
        self.indices.get(id).copied()
    }

    #[inline]
    pub fn id_at(&self, idx: usize) -> Option<&K> {
        self.ids.get(idx)?.as_ref()
    }

    #[inline]
    pub fn is_free(&self, idx: usize) -> bool {
        self.free.contains(&idx)
    }

    /// Ordered iteration over holes.
    pub fn free_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.free.iter().copied()
    }

    /// Iterate occupied `(id, index)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> + '_ {
        self.ids
            .iter()
            .enumerate()
            .filter_map(|(idx, id)| id.as_ref().map(|id| (id, idx)))
    }

    /// Move the id at `from` down to the free slot `to` (compaction).
    ///
    /// `to` must be free and below `from`; `from` must be occupied.
    pub fn reassign(&mut self, from: usize, to: usize) {
        debug_assert!(to < from, "reassign only moves ids to lower slots");
        debug_assert!(self.free.contains(&to), "target slot must be free");
        let id = self.ids[from].take().expect("source slot must be occupied");
        self.free.remove(&to);
        self.free.insert(from);
        self.indices.insert(id.clone(), to);
        self.ids[to] = Some(id);
    }

    /// Drop trailing slots; every dropped slot must be free.
    pub fn truncate(&mut self, slot_count: usize) {
        debug_assert!(self.ids[slot_count..].iter().all(Option::is_none));
        for idx in slot_count..self.ids.len() {
            self.free.remove(&idx);
        }
        self.ids.truncate(slot_count);
    }

    pub fn clear(&mut self) {
        self.indices.clear();
        self.ids.clear();
        self.free.clear();
    }
}

impl<K: Clone + Eq + Hash> Default for IdentityIndexMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_assigns_sequential_indices() {
        let mut map = IdentityIndexMap::new();
        assert_eq!(map.insert("a"), 0);
        assert_eq!(map.insert("b"), 1);
        assert_eq!(map.insert("c"), 2);
        assert_eq!(map.len(), 3);
        assert_eq!(map.slot_count(), 3);
    }

    #[test]
    fn insert_existing_keeps_index() {
        let mut map = IdentityIndexMap::new();
        map.insert("a");
        map.insert("b");
        assert_eq!(map.insert("a"), 0);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn remove_frees_lowest_for_reuse() {
        let mut map = IdentityIndexMap::new();
        map.insert("a");
        map.insert("b");
        map.insert("c");

        assert_eq!(map.remove(&"b"), Some(1));
        assert_eq!(map.slot_count(), 3);
        assert_eq!(map.next_index(), 1);
        assert!(map.is_free(1));

        // Lowest free slot is reused, slot count unchanged
        assert_eq!(map.insert("d"), 1);
        assert_eq!(map.slot_count(), 3);
        assert_eq!(map.id_at(1), Some(&"d"));
    }

    #[test]
    fn free_indices_iterate_in_order() {
        let mut map = IdentityIndexMap::new();
        for id in ["a", "b", "c", "d", "e"] {
            map.insert(id);
        }
        map.remove(&"d");
        map.remove(&"b");
        let free: Vec<_> = map.free_indices().collect();
        assert_eq!(free, vec![1, 3]);
    }

    #[test]
    fn reassign_moves_id_down() {
        let mut map = IdentityIndexMap::new();
        map.insert("a");
        map.insert("b");
        map.insert("c");
        map.remove(&"a");

        map.reassign(2, 0);
        assert_eq!(map.index_of(&"c"), Some(0));
        assert_eq!(map.id_at(0), Some(&"c"));
        assert!(map.is_free(2));

        map.truncate(2);
        assert_eq!(map.slot_count(), 2);
        assert_eq!(map.next_index(), 2);
    }

    #[test]
    fn missing_lookups_are_none() {
        let map: IdentityIndexMap<&str> = IdentityIndexMap::new();
        assert_eq!(map.index_of(&"nope"), None);
        assert_eq!(map.id_at(7), None);
    }
}
