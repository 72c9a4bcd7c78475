//! Per-kind tracking rules: inclusion predicates, relevant-key filters,
//! and the formulas turning domain attributes into placements.

mod region;
mod tile;
mod token;
mod wall;

pub use region::Region;
pub use tile::Tile;
pub use token::Token;
pub use wall::Wall;

use crate::host::{EventKind, Handler, PlaceableState, PlaceableType};
use sight_geometry::{GeometryBackend, Placement, Shape2d};

/// Event bindings shared by every kind: creation and draw add, update
/// and refresh recompute, deletion and destroy remove.
pub const DEFAULT_EVENT_BINDINGS: &[(EventKind, Handler)] = &[
    (EventKind::Create, Handler::Add),
    (EventKind::Draw, Handler::Add),
    (EventKind::Update, Handler::Update),
    (EventKind::Refresh, Handler::Update),
    (EventKind::Delete, Handler::Remove),
    (EventKind::Destroy, Handler::Remove),
];

/// Rules a concrete placeable kind supplies to the tracker.
pub trait TrackedKind {
    const KIND: PlaceableType;
    const EVENT_BINDINGS: &'static [(EventKind, Handler)] = DEFAULT_EVENT_BINDINGS;

    /// Changed-key set that warrants recomputation; anything else is
    /// filtered out before the tracker is consulted.
    fn relevant_keys() -> &'static [&'static str];

    /// Whether the placeable participates in visibility at all.
    fn include(state: &PlaceableState) -> bool;

    /// Transform-matrix inputs from the current attributes.
    fn placement(state: &PlaceableState) -> Placement;

    /// 2D footprint; kinds with multiple shapes combine them through the
    /// geometry collaborator.
    fn shape(state: &PlaceableState, backend: &dyn GeometryBackend) -> Shape2d;

    fn elevation(state: &PlaceableState) -> (f32, f32) {
        (state.elevation_bottom, state.elevation_top)
    }

    /// Whether the kind needs per-vertex mesh facets (irregular shapes
    /// with explicit winding).
    fn needs_mesh(state: &PlaceableState) -> bool {
        state.shape.is_polygonal()
    }
}

/// Minimum vertical extent so flat placeables still present faces.
pub(crate) const MIN_THICKNESS: f32 = 1.0;

pub(crate) fn vertical_extent(state: &PlaceableState) -> f32 {
    (state.elevation_top - state.elevation_bottom).max(MIN_THICKNESS)
}
