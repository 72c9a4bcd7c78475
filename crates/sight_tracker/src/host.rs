//! Boundary with the host scene graph.
//!
//! The host owns the placeables and their lifecycle events; this module
//! defines the snapshots, event payloads and registration primitives the
//! tracker consumes. Handlers are pure translations into the tracker's
//! add/update/remove operations.

use sight_geometry::Shape2d;
use std::collections::HashMap;
use std::fmt;

/// Stable id the host assigns to a placeable; used as the facet key
/// across all buffers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceableId(String);

impl PlaceableId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlaceableId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// The placeable kinds mirrored by this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceableType {
    Token,
    Wall,
    Tile,
    Region,
}

/// Per-wall attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct WallData {
    /// Segment endpoints: `[x0, y0, x1, y1]`.
    pub c: [f32; 4],
    pub sight: SightRestriction,
    pub door_open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SightRestriction {
    None,
    Limited,
    Normal,
    Proximity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileData {
    pub overhead: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionData {
    pub shapes: Vec<Shape2d>,
    pub bottom: Option<f32>,
    pub top: Option<f32>,
}

/// Snapshot of a placeable's tracked attributes, delivered by the host
/// with every event.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceableState {
    pub id: PlaceableId,
    pub kind: PlaceableType,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation_deg: f32,
    pub elevation_bottom: f32,
    pub elevation_top: f32,
    pub shape: Shape2d,
    pub hidden: bool,
    pub wall: Option<WallData>,
    pub tile: Option<TileData>,
    pub region: Option<RegionData>,
}

/// Enumerable access to the host's current objects.
pub trait SceneSource {
    fn current(&self, kind: PlaceableType) -> Vec<PlaceableState>;
    fn get(&self, id: &PlaceableId) -> Option<PlaceableState>;
}

/// Host event classes a kind can bind handlers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Create,
    Update,
    Delete,
    Draw,
    Refresh,
    Destroy,
}

/// Local handler a host event translates into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Add,
    Update,
    Remove,
    Rescan,
}

/// A nested change payload as the host reports it. Leaves are changed
/// attributes; branches group nested attribute objects.
#[derive(Debug, Clone)]
pub enum ChangeValue {
    Leaf,
    Nested(Vec<(String, ChangeValue)>),
}

/// Flatten a nested change payload into dotted leaf keys, the form the
/// relevant-key filters consume (`"texture.scaleX"`).
pub fn flatten_changes(changes: &[(String, ChangeValue)]) -> Vec<String> {
    let mut keys = Vec::new();
    flatten_into(changes, None, &mut keys);
    keys
}

fn flatten_into(changes: &[(String, ChangeValue)], prefix: Option<&str>, out: &mut Vec<String>) {
    for (key, value) in changes {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            ChangeValue::Leaf => out.push(path),
            ChangeValue::Nested(children) => flatten_into(children, Some(&path), out),
        }
    }
}

/// One host event aimed at a kind's tracker.
#[derive(Debug, Clone)]
pub enum HostEvent {
    Create(PlaceableState),
    Update {
        state: PlaceableState,
        changes: Vec<(String, ChangeValue)>,
    },
    Delete(PlaceableId),
    Draw(PlaceableState),
    Refresh {
        state: PlaceableState,
        changes: Vec<(String, ChangeValue)>,
    },
    /// Destroy delivers only the id: the domain object may already be
    /// unresolvable by lookup when it arrives.
    Destroy(PlaceableId),
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::Create(_) => EventKind::Create,
            HostEvent::Update { .. } => EventKind::Update,
            HostEvent::Delete(_) => EventKind::Delete,
            HostEvent::Draw(_) => EventKind::Draw,
            HostEvent::Refresh { .. } => EventKind::Refresh,
            HostEvent::Destroy(_) => EventKind::Destroy,
        }
    }

    pub fn state(&self) -> Option<&PlaceableState> {
        match self {
            HostEvent::Create(state) | HostEvent::Draw(state) => Some(state),
            HostEvent::Update { state, .. } | HostEvent::Refresh { state, .. } => Some(state),
            HostEvent::Delete(_) | HostEvent::Destroy(_) => None,
        }
    }

    pub fn id(&self) -> &PlaceableId {
        match self {
            HostEvent::Create(state) | HostEvent::Draw(state) => &state.id,
            HostEvent::Update { state, .. } | HostEvent::Refresh { state, .. } => &state.id,
            HostEvent::Delete(id) | HostEvent::Destroy(id) => id,
        }
    }

    pub fn flattened_changes(&self) -> Vec<String> {
        match self {
            HostEvent::Update { changes, .. } | HostEvent::Refresh { changes, .. } => {
                flatten_changes(changes)
            }
            _ => Vec::new(),
        }
    }
}

/// Registration table mapping (kind, event) to a handler.
///
/// Registration is idempotent: registering a kind twice is a no-op, and
/// deregistration removes all of the kind's handlers at once.
#[derive(Default)]
pub struct HookRegistry {
    bindings: HashMap<(PlaceableType, EventKind), Handler>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind's declared event bindings. Returns `false` when
    /// the kind was already registered (nothing changes).
    pub fn register(
        &mut self,
        kind: PlaceableType,
        bindings: &[(EventKind, Handler)],
    ) -> bool {
        if bindings
            .iter()
            .any(|(event, _)| self.bindings.contains_key(&(kind, *event)))
        {
            return false;
        }
        for (event, handler) in bindings {
            self.bindings.insert((kind, *event), *handler);
        }
        tracing::debug!(?kind, count = bindings.len(), "hooks registered");
        true
    }

    /// Remove every handler for a kind; returns how many were removed.
    pub fn unregister(&mut self, kind: PlaceableType) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|(k, _), _| *k != kind);
        before - self.bindings.len()
    }

    pub fn handler(&self, kind: PlaceableType, event: EventKind) -> Option<Handler> {
        self.bindings.get(&(kind, event)).copied()
    }

    pub fn is_registered(&self, kind: PlaceableType) -> bool {
        self.bindings.keys().any(|(k, _)| *k == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_produces_dotted_leaf_keys() {
        let changes = vec![
            ("x".to_owned(), ChangeValue::Leaf),
            (
                "texture".to_owned(),
                ChangeValue::Nested(vec![
                    ("scaleX".to_owned(), ChangeValue::Leaf),
                    ("scaleY".to_owned(), ChangeValue::Leaf),
                ]),
            ),
        ];
        assert_eq!(
            flatten_changes(&changes),
            vec!["x", "texture.scaleX", "texture.scaleY"]
        );
    }

    #[test]
    fn registry_registration_is_idempotent() {
        let bindings = [
            (EventKind::Create, Handler::Add),
            (EventKind::Delete, Handler::Remove),
        ];
        let mut registry = HookRegistry::new();
        assert!(registry.register(PlaceableType::Token, &bindings));
        assert!(!registry.register(PlaceableType::Token, &bindings));
        assert_eq!(
            registry.handler(PlaceableType::Token, EventKind::Create),
            Some(Handler::Add)
        );
        assert_eq!(registry.handler(PlaceableType::Wall, EventKind::Create), None);

        assert_eq!(registry.unregister(PlaceableType::Token), 2);
        assert!(!registry.is_registered(PlaceableType::Token));
        assert_eq!(registry.unregister(PlaceableType::Token), 0);
    }
}
