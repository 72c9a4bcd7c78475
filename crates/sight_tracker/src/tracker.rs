use crate::host::{HookRegistry, Handler, HostEvent, PlaceableId, PlaceableState, SceneSource};
use crate::kinds::TrackedKind;
use crate::settings::TrackerSettings;
use sight_core::{FacetError, FixedFacetTracker, MeshFacets};
use sight_geometry::{
    prism_mesh, GeometryBackend, GeometryRecord, RecordContext, MODEL_FACET_LEN,
};
use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use thiserror::Error;

/// Floats per vertex in the shared mesh buffers.
const VERTEX_STRIDE: usize = 3;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("facet allocation failed: {0}")]
    Facet(#[from] FacetError),

    /// A per-entity mutation changed the buffer layout beyond its own
    /// facet; the caller falls back to a full re-scan.
    #[error("buffer layout requires a full rebuild")]
    RestructureNeeded,
}

/// A mirrored placeable: its composite geometry plus the value of the
/// update counter when it last changed.
pub struct TrackedEntity {
    pub record: GeometryRecord,
    pub last_update: u64,
}

/// Synchronization engine for one placeable kind.
///
/// Owns the tracked set, the shared model-matrix buffer and the mesh
/// buffers, and keeps them current against the host population through
/// incremental diffs. All mutation happens synchronously inside the
/// calling host event; there is no concurrent access.
pub struct KindTracker<K: TrackedKind> {
    records: HashMap<PlaceableId, TrackedEntity>,
    models: FixedFacetTracker<PlaceableId, f32>,
    meshes: MeshFacets<PlaceableId>,
    backend: Box<dyn GeometryBackend>,
    settings: TrackerSettings,
    update_counter: u64,
    _kind: PhantomData<K>,
}

impl<K: TrackedKind> KindTracker<K> {
    pub fn new(backend: Box<dyn GeometryBackend>, settings: TrackerSettings) -> Self {
        let growth = settings.growth_factor;
        Self {
            records: HashMap::new(),
            models: FixedFacetTracker::with_growth_factor(MODEL_FACET_LEN, growth),
            meshes: MeshFacets::with_growth_factor(VERTEX_STRIDE, growth),
            backend,
            settings,
            update_counter: 0,
            _kind: PhantomData,
        }
    }

    /// Monotone counter: bumped once per non-empty re-scan and once per
    /// successful single-entity add/update/remove.
    #[inline]
    pub fn update_counter(&self) -> u64 {
        self.update_counter
    }

    #[inline]
    pub fn num_tracked(&self) -> usize {
        self.records.len()
    }

    pub fn is_tracked(&self, id: &PlaceableId) -> bool {
        self.records.contains_key(id)
    }

    pub fn entity(&self, id: &PlaceableId) -> Option<&TrackedEntity> {
        self.records.get(id)
    }

    /// Shared model-matrix buffer, for renderer/query consumers.
    pub fn models(&self) -> &FixedFacetTracker<PlaceableId, f32> {
        &self.models
    }

    /// Shared vertex/index mesh buffers.
    pub fn meshes_mut(&mut self) -> &mut MeshFacets<PlaceableId> {
        &mut self.meshes
    }

    fn eligible(&self, state: &PlaceableState) -> bool {
        (self.settings.track_hidden || !state.hidden) && K::include(state)
    }

    /// Register this kind's event bindings. Idempotent.
    pub fn register_hooks(&self, registry: &mut HookRegistry) -> bool {
        registry.register(K::KIND, K::EVENT_BINDINGS)
    }

    /// Translate a host event through the registered binding.
    pub fn handle_event(
        &mut self,
        registry: &HookRegistry,
        scene: &dyn SceneSource,
        event: &HostEvent,
    ) -> Result<(), TrackError> {
        let Some(handler) = registry.handler(K::KIND, event.kind()) else {
            return Ok(());
        };
        match handler {
            Handler::Add => {
                if let Some(state) = event.state() {
                    self.add_placeable(scene, state)?;
                }
            }
            Handler::Update => {
                if let Some(state) = event.state() {
                    let keys = event.flattened_changes();
                    self.update_placeable(scene, state, &keys)?;
                }
            }
            Handler::Remove => {
                self.remove_placeable(event.id());
            }
            Handler::Rescan => self.initialize_placeables(scene)?,
        }
        Ok(())
    }

    /// Diff the tracked set against the host's current eligible
    /// population: remove entities no longer present or eligible, add
    /// newly eligible ones. A no-op (no counter bump) when the diff is
    /// empty. Also the fallback when an incremental operation signals a
    /// restructure.
    pub fn initialize_placeables(&mut self, scene: &dyn SceneSource) -> Result<(), TrackError> {
        let current: HashMap<PlaceableId, PlaceableState> = scene
            .current(K::KIND)
            .into_iter()
            .filter(|state| self.eligible(state))
            .map(|state| (state.id.clone(), state))
            .collect();

        let stale: Vec<PlaceableId> = self
            .records
            .keys()
            .filter(|id| !current.contains_key(id))
            .cloned()
            .collect();
        let fresh: Vec<&PlaceableState> = current
            .values()
            .filter(|state| !self.records.contains_key(&state.id))
            .collect();

        if stale.is_empty() && fresh.is_empty() {
            return Ok(());
        }
        let stamp = self.update_counter + 1;
        tracing::debug!(
            added = fresh.len(),
            removed = stale.len(),
            "re-scanning placeables"
        );
        for id in &stale {
            self.remove_inner(id);
        }
        for state in fresh {
            self.add_inner(state, stamp)?;
        }
        self.update_counter = stamp;
        Ok(())
    }

    /// Track a newly created or drawn placeable. No-op when already
    /// tracked or ineligible.
    pub fn add_placeable(
        &mut self,
        scene: &dyn SceneSource,
        state: &PlaceableState,
    ) -> Result<(), TrackError> {
        if self.records.contains_key(&state.id) || !self.eligible(state) {
            return Ok(());
        }
        let stamp = self.update_counter + 1;
        match self.add_inner(state, stamp) {
            Ok(()) => {
                self.update_counter = stamp;
                Ok(())
            }
            Err(TrackError::RestructureNeeded) => self.initialize_placeables(scene),
            Err(err) => Err(err),
        }
    }

    /// React to a host change whose flattened key set intersects this
    /// kind's relevant keys; anything else is absorbed without
    /// recomputation. Handles the three transitions: newly excluded
    /// becomes a remove, newly eligible becomes an add, otherwise the
    /// facets are recomputed in place.
    pub fn update_placeable(
        &mut self,
        scene: &dyn SceneSource,
        state: &PlaceableState,
        changed_keys: &[String],
    ) -> Result<(), TrackError> {
        if !Self::is_relevant(changed_keys) {
            return Ok(());
        }
        let tracked = self.records.contains_key(&state.id);
        let eligible = self.eligible(state);
        match (tracked, eligible) {
            (true, false) => {
                self.remove_placeable(&state.id);
                Ok(())
            }
            (false, true) => self.add_placeable(scene, state),
            (false, false) => Ok(()),
            (true, true) => match self.refresh_inner(state) {
                Err(TrackError::RestructureNeeded) => self.initialize_placeables(scene),
                other => other,
            },
        }
    }

    /// Stop tracking by bare id; the domain object may already be gone.
    /// Returns `false` when untracked.
    pub fn remove_placeable(&mut self, id: &PlaceableId) -> bool {
        if !self.records.contains_key(id) {
            return false;
        }
        self.update_counter += 1;
        self.remove_inner(id);
        true
    }

    /// Drop everything: records, facets, and hooks are the caller's to
    /// re-register. Used at teardown.
    pub fn clear(&mut self) {
        let ids: Vec<PlaceableId> = self.records.keys().cloned().collect();
        if ids.is_empty() {
            return;
        }
        self.update_counter += 1;
        for id in &ids {
            self.remove_inner(id);
        }
    }

    fn is_relevant(changed_keys: &[String]) -> bool {
        let relevant = K::relevant_keys();
        changed_keys
            .iter()
            .any(|key| relevant.contains(&key.as_str()))
    }

    fn add_inner(&mut self, state: &PlaceableState, stamp: u64) -> Result<(), TrackError> {
        let placement = K::placement(state);
        let shape = K::shape(state, &*self.backend);
        let (bottom, top) = K::elevation(state);
        let mut ctx = RecordContext {
            models: &mut self.models,
            backend: &*self.backend,
        };
        let (record, _expanded) =
            GeometryRecord::initialize(&state.id, &placement, &shape, bottom, top, &mut ctx)?;
        if K::needs_mesh(state) {
            let (vertices, indices) = prism_mesh(&shape.outline(), bottom, top);
            self.meshes
                .add_mesh(state.id.clone(), &vertices, &indices)?;
        }
        tracing::debug!(id = %state.id, "tracking placeable");
        self.records.insert(
            state.id.clone(),
            TrackedEntity {
                record,
                last_update: stamp,
            },
        );
        Ok(())
    }

    fn refresh_inner(&mut self, state: &PlaceableState) -> Result<(), TrackError> {
        let stamp = self.update_counter + 1;
        let placement = K::placement(state);
        let shape = K::shape(state, &*self.backend);
        let (bottom, top) = K::elevation(state);

        let Some(entity) = self.records.get_mut(&state.id) else {
            return Ok(());
        };
        let mut ctx = RecordContext {
            models: &mut self.models,
            backend: &*self.backend,
        };
        entity
            .record
            .update(&state.id, &placement, &shape, bottom, top, &mut ctx)?;

        let relocated = if K::needs_mesh(state) {
            let (vertices, indices) = prism_mesh(&shape.outline(), bottom, top);
            let update = self.meshes.add_mesh(state.id.clone(), &vertices, &indices)?;
            update.relocated
        } else {
            self.meshes.delete_mesh(&state.id);
            false
        };

        entity.last_update = stamp;
        self.update_counter = stamp;
        if relocated {
            // The facet moved slots; renderer-side layout must rebuild.
            return Err(TrackError::RestructureNeeded);
        }
        Ok(())
    }

    fn remove_inner(&mut self, id: &PlaceableId) {
        self.records.remove(id);
        let mut ctx = RecordContext {
            models: &mut self.models,
            backend: &*self.backend,
        };
        GeometryRecord::release(id, &mut ctx);
        self.meshes.delete_mesh(id);
        if self.settings.compact_on_remove {
            self.models.make_contiguous();
            self.meshes.make_contiguous();
        }
        tracing::debug!(id = %id, "placeable released");
    }

    /// First in-range ray hit against one tracked entity, or `None`.
    pub fn first_hit(
        &self,
        id: &PlaceableId,
        origin: glam::Vec3,
        dir: glam::Vec3,
        t_min: f32,
        t_max: f32,
    ) -> Option<f32> {
        self.records
            .get(id)?
            .record
            .ray_query(origin, dir, t_min, t_max, &*self.backend)
    }

    /// Slot indices currently occupied, for consumers sizing uploads.
    pub fn tracked_ids(&self) -> HashSet<&PlaceableId> {
        self.records.keys().collect()
    }
}
