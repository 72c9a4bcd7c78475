use crate::{Aabb, Face, FaceSide, GeometryBackend, Placement, Shape2d, TransformSet};
use sight_core::{FacetError, FixedFacetTracker};
use std::hash::Hash;

/// Shared resources a record reads and writes during its pipeline.
///
/// The model-matrix buffer is owned by the tracker instance and passed
/// by reference here; records never reach for global state.
pub struct RecordContext<'a, K> {
    pub models: &'a mut FixedFacetTracker<K, f32>,
    pub backend: &'a dyn GeometryBackend,
}

/// Composite per-entity geometry: transform matrices, bounding volume,
/// and oriented faces, recomputed through a fixed pipeline order
/// (matrices, then bounds, then faces). Mesh facets for polygonal
/// shapes are layered on by the owning tracker.
#[derive(Debug, Clone)]
pub struct GeometryRecord {
    pub transforms: TransformSet,
    pub bounds: Aabb,
    pub faces: Vec<Face>,
}

impl GeometryRecord {
    /// Build the record and allocate its model facet. Returns the record
    /// and whether the shared model buffer grew.
    pub fn initialize<K: Clone + Eq + Hash>(
        id: &K,
        placement: &Placement,
        shape: &Shape2d,
        bottom: f32,
        top: f32,
        ctx: &mut RecordContext<'_, K>,
    ) -> Result<(Self, bool), FacetError> {
        let mut record = Self {
            transforms: TransformSet::default(),
            bounds: Aabb::EMPTY,
            faces: Vec::new(),
        };
        let expanded = record.update(id, placement, shape, bottom, top, ctx)?;
        Ok((record, expanded))
    }

    /// Recompute all layers in place. Facet length never changes (the
    /// model facet is fixed at 16 floats), so no reallocation happens
    /// unless the shared buffer itself must grow for a new entity.
    pub fn update<K: Clone + Eq + Hash>(
        &mut self,
        id: &K,
        placement: &Placement,
        shape: &Shape2d,
        bottom: f32,
        top: f32,
        ctx: &mut RecordContext<'_, K>,
    ) -> Result<bool, FacetError> {
        // Matrix layer
        self.transforms = TransformSet::from_placement(placement);
        let expanded = ctx
            .models
            .add_facet(id.clone(), Some(&self.transforms.model_facet()))?;
        // Bounding-volume layer
        self.bounds = Aabb::from_shape(shape, bottom, top);
        // Face layer
        self.faces = ctx.backend.prism_faces(shape, bottom, top);
        tracing::trace!(faces = self.faces.len(), expanded, "geometry record recomputed");
        Ok(expanded)
    }

    /// Free the model facet. Returns `false` when it was already gone.
    pub fn release<K: Clone + Eq + Hash>(id: &K, ctx: &mut RecordContext<'_, K>) -> bool {
        ctx.models.delete_facet(id)
    }

    /// First in-range ray hit, trying top/bottom caps before lateral
    /// faces. The bounding box acts as a cheap pre-filter.
    pub fn ray_query(
        &self,
        origin: glam::Vec3,
        dir: glam::Vec3,
        t_min: f32,
        t_max: f32,
        backend: &dyn GeometryBackend,
    ) -> Option<f32> {
        self.bounds.ray_range(origin, dir)?;
        let caps = self
            .faces
            .iter()
            .filter(|f| f.side != FaceSide::Lateral);
        let laterals = self.faces.iter().filter(|f| f.side == FaceSide::Lateral);
        for face in caps.chain(laterals) {
            if let Some(t) = backend.ray_face(origin, dir, face) {
                if t >= t_min && t <= t_max {
                    return Some(t);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlanarBackend;
    use crate::MODEL_FACET_LEN;
    use glam::Vec3;

    fn square() -> Shape2d {
        Shape2d::Rect {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }

    #[test]
    fn initialize_writes_model_facet() {
        let mut models = FixedFacetTracker::<&str, f32>::new(MODEL_FACET_LEN);
        let backend = PlanarBackend;
        let mut ctx = RecordContext {
            models: &mut models,
            backend: &backend,
        };
        let placement = Placement {
            translation: Vec3::new(3.0, 4.0, 0.0),
            rotation: 0.0,
            scale: Vec3::ONE,
        };
        let (record, expanded) =
            GeometryRecord::initialize(&"a", &placement, &square(), 0.0, 1.0, &mut ctx).unwrap();
        assert!(expanded);
        let facet = models.view_facet(&"a").unwrap();
        assert_eq!(facet, &record.transforms.model_facet()[..]);
        assert_eq!(&facet[12..14], &[3.0, 4.0]);
    }

    #[test]
    fn update_recomputes_without_reallocating() {
        let mut models = FixedFacetTracker::<&str, f32>::new(MODEL_FACET_LEN);
        let backend = PlanarBackend;
        let mut ctx = RecordContext {
            models: &mut models,
            backend: &backend,
        };
        let (mut record, _) = GeometryRecord::initialize(
            &"a",
            &Placement::IDENTITY,
            &square(),
            0.0,
            1.0,
            &mut ctx,
        )
        .unwrap();
        let slot = models.index_of(&"a");

        let mut ctx = RecordContext {
            models: &mut models,
            backend: &backend,
        };
        let moved = Placement {
            translation: Vec3::new(9.0, 9.0, 0.0),
            rotation: 0.0,
            scale: Vec3::ONE,
        };
        let expanded = record
            .update(&"a", &moved, &square(), 2.0, 5.0, &mut ctx)
            .unwrap();
        assert!(!expanded);
        assert_eq!(models.index_of(&"a"), slot);
        assert_eq!(record.bounds.min.z, 2.0);
        assert_eq!(record.bounds.max.z, 5.0);
    }

    #[test]
    fn ray_query_prefers_caps() {
        let mut models = FixedFacetTracker::<&str, f32>::new(MODEL_FACET_LEN);
        let backend = PlanarBackend;
        let mut ctx = RecordContext {
            models: &mut models,
            backend: &backend,
        };
        let (record, _) = GeometryRecord::initialize(
            &"a",
            &Placement::IDENTITY,
            &square(),
            0.0,
            2.0,
            &mut ctx,
        )
        .unwrap();

        // Straight down through the middle: top cap at t = 3
        let t = record
            .ray_query(Vec3::new(0.5, 0.5, 5.0), Vec3::NEG_Z, 0.0, 100.0, &backend)
            .unwrap();
        assert!((t - 3.0).abs() < 1e-5);

        // Out of range: no hit
        assert!(record
            .ray_query(Vec3::new(0.5, 0.5, 5.0), Vec3::NEG_Z, 0.0, 1.0, &backend)
            .is_none());

        // Sideways: only a lateral face can answer
        let t = record
            .ray_query(Vec3::new(-1.0, 0.5, 1.0), Vec3::X, 0.0, 100.0, &backend)
            .unwrap();
        assert!(t >= 1.0);
    }

    #[test]
    fn release_frees_the_facet() {
        let mut models = FixedFacetTracker::<&str, f32>::new(MODEL_FACET_LEN);
        let backend = PlanarBackend;
        let mut ctx = RecordContext {
            models: &mut models,
            backend: &backend,
        };
        GeometryRecord::initialize(&"a", &Placement::IDENTITY, &square(), 0.0, 1.0, &mut ctx)
            .unwrap();
        let mut ctx = RecordContext {
            models: &mut models,
            backend: &backend,
        };
        assert!(GeometryRecord::release(&"a", &mut ctx));
        assert_eq!(models.view_facet(&"a"), None);
        assert!(!GeometryRecord::release(&"a", &mut RecordContext {
            models: &mut models,
            backend: &backend,
        }));
    }
}
