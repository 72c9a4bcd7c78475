use crate::{FacetError, FacetTracker};
use std::hash::Hash;

/// Outcome of a structural mesh mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshUpdate {
    /// A backing buffer was reallocated; outstanding views are stale.
    pub expanded: bool,
    /// The facet landed in a different slot than it previously held.
    /// Consumers keying render state by slot need a full restructure.
    pub relocated: bool,
}

/// Paired vertex and index facets sharing one logical id.
///
/// Per-facet indices are stored relative to their facet's first vertex,
/// so they never need rewriting when other facets move. The renderer-
/// facing view applies the additive `vertex_offset / stride` per facet
/// lazily into a secondary adjusted buffer.
pub struct MeshFacets<K> {
    vertices: FacetTracker<K, f32>,
    indices: FacetTracker<K, u16>,
    adjusted: Vec<u16>,
    stride: usize,
    dirty: bool,
}

impl<K: Clone + Eq + Hash> MeshFacets<K> {
    /// `stride` is the number of floats per vertex (3 for xyz).
    pub fn new(stride: usize) -> Self {
        Self::with_growth_factor(stride, 2)
    }

    pub fn with_growth_factor(stride: usize, growth_factor: usize) -> Self {
        debug_assert!(stride > 0, "vertex stride must be non-zero");
        Self {
            vertices: FacetTracker::with_growth_factor(growth_factor),
            indices: FacetTracker::with_growth_factor(growth_factor),
            adjusted: Vec::new(),
            stride,
            dirty: false,
        }
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn num_meshes(&self) -> usize {
        self.vertices.num_facets()
    }

    /// Add (or overwrite) the mesh for `id`. `vertices` must be a whole
    /// number of stride-sized vertices; `indices` are facet-relative.
    pub fn add_mesh(
        &mut self,
        id: K,
        vertices: &[f32],
        indices: &[u16],
    ) -> Result<MeshUpdate, FacetError> {
        if vertices.len() % self.stride != 0 {
            return Err(FacetError::StrideMismatch {
                stride: self.stride,
                got: vertices.len(),
            });
        }
        let was_at = self.vertices.index_of(&id);
        let v_expanded = self
            .vertices
            .add_facet(id.clone(), vertices.len(), Some(vertices))?;
        let i_expanded = match self.indices.add_facet(id.clone(), indices.len(), Some(indices)) {
            Ok(expanded) => expanded,
            Err(err) => {
                // Keep the pair in lockstep: roll the vertex side back.
                self.vertices.delete_facet(&id);
                return Err(err);
            }
        };
        self.dirty = true;
        Ok(MeshUpdate {
            expanded: v_expanded || i_expanded,
            relocated: match was_at {
                Some(before) => self.vertices.index_of(&id) != Some(before),
                None => false,
            },
        })
    }

    /// Overwrite the mesh for an already-tracked id. Benign no-op when
    /// untracked. A changed vertex or index count may relocate the facet.
    pub fn update_mesh(
        &mut self,
        id: &K,
        vertices: &[f32],
        indices: &[u16],
    ) -> Result<MeshUpdate, FacetError> {
        if self.vertices.index_of(id).is_none() {
            return Ok(MeshUpdate {
                expanded: false,
                relocated: false,
            });
        }
        self.add_mesh(id.clone(), vertices, indices)
    }

    /// Drop both facets for `id`. Returns `false` when untracked.
    pub fn delete_mesh(&mut self, id: &K) -> bool {
        let had = self.vertices.delete_facet(id);
        let had_idx = self.indices.delete_facet(id);
        debug_assert_eq!(had, had_idx, "vertex/index facets out of sync");
        if had {
            self.dirty = true;
        }
        had
    }

    /// Compact both buffers. Returns whether anything moved.
    pub fn make_contiguous(&mut self) -> bool {
        let moved_v = self.vertices.make_contiguous();
        let moved_i = self.indices.make_contiguous();
        if moved_v || moved_i {
            self.dirty = true;
        }
        moved_v || moved_i
    }

    /// Indices with the per-facet vertex offset applied, rebuilt lazily
    /// after any structural mutation. Holes in the index buffer stay zero.
    pub fn adjusted_indices(&mut self) -> &[u16] {
        if self.dirty {
            self.rebuild_adjusted();
            self.dirty = false;
        }
        &self.adjusted
    }

    fn rebuild_adjusted(&mut self) {
        self.adjusted.clear();
        self.adjusted.resize(self.indices.array_len(), 0);
        let ids: Vec<K> = self.indices.iter_ids().map(|(id, _)| id.clone()).collect();
        for id in &ids {
            let base = self.vertices.facet_offset(id).unwrap_or(0) / self.stride;
            debug_assert!(
                base <= u16::MAX as usize,
                "vertex base {base} exceeds the u16 index range"
            );
            let offset = match self.indices.facet_offset(id) {
                Some(offset) => offset,
                None => continue,
            };
            let raw = match self.indices.view_facet(id) {
                Some(raw) => raw,
                None => continue,
            };
            for (k, &value) in raw.iter().enumerate() {
                self.adjusted[offset + k] = value + base as u16;
            }
        }
    }

    pub fn vertex_facet(&self, id: &K) -> Option<&[f32]> {
        self.vertices.view_facet(id)
    }

    pub fn index_facet(&self, id: &K) -> Option<&[u16]> {
        self.indices.view_facet(id)
    }

    /// Whole packed vertex buffer, holes included.
    pub fn vertex_buffer(&self) -> &[f32] {
        self.vertices.view_whole_buffer()
    }

    pub fn vertex_offset(&self, id: &K) -> Option<usize> {
        self.vertices.facet_offset(id)
    }

    pub fn index_offset(&self, id: &K) -> Option<usize> {
        self.indices.facet_offset(id)
    }
}
