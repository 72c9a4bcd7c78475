use super::{vertical_extent, TrackedKind};
use crate::host::{PlaceableState, PlaceableType};
use glam::Vec3;
use sight_geometry::{GeometryBackend, Placement, Shape2d};

/// Tokens: every non-hidden token is tracked; its footprint is the
/// host-provided rect or ellipse centered on the token's position.
pub struct Token;

impl TrackedKind for Token {
    const KIND: PlaceableType = PlaceableType::Token;

    fn relevant_keys() -> &'static [&'static str] {
        &[
            "x",
            "y",
            "elevation",
            "rotation",
            "width",
            "height",
            "hidden",
            "texture.scaleX",
            "texture.scaleY",
        ]
    }

    fn include(_state: &PlaceableState) -> bool {
        true
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
