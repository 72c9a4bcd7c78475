use super::{vertical_extent, TrackedKind};
use crate::host::{PlaceableState, PlaceableType};
use glam::Vec3;
use sight_geometry::{GeometryBackend, Placement, Shape2d};

/// Tiles: only overhead tiles occlude sight from below, so ground tiles
/// are excluded outright.
pub struct Tile;

impl TrackedKind for Tile {
    const KIND: PlaceableType = PlaceableType::Tile;

    fn relevant_keys() -> &'static [&'static str] {
        &[
            "x",
            "y",
            "elevation",
            "rotation",
            "width",
            "height",
            "hidden",
            "overhead",
        ]
    }

    fn include(state: &PlaceableState) -> bool {
        state.tile.as_ref().is_some_and(|tile| tile.overhead)
    }

    fn placement(state: &PlaceableState) -> Placement {
        Placement {
            translation: Vec3::new(
                state.x + state.width / 2.0,
                state.y + state.height / 2.0,
                state.elevation_bottom,
            ),
            rotation: state.rotation_deg.to_radians(),
            scale: Vec3::new(state.width, state.height, vertical_extent(state)),
        }
    }

    fn shape(state: &PlaceableState, _backend: &dyn GeometryBackend) -> Shape2d {
        state.shape.clone()
    }
}
