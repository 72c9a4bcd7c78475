use super::TrackedKind;
use crate::host::{PlaceableState, PlaceableType};
use glam::Vec3;
use sight_geometry::{GeometryBackend, Placement, Shape2d};

/// Regions: one or more 2D shapes combined into a single footprint by
/// the geometry collaborator, with an explicit elevation span. Regions
/// always carry per-vertex mesh facets.
pub struct Region;

/// Fallback half-extent when a region leaves its elevation open-ended.
const OPEN_ELEVATION: f32 = 1.0e4;

impl TrackedKind for Region {
    const KIND: PlaceableType = PlaceableType::Region;

    fn relevant_keys() -> &'static [&'static str] {
        &["shapes", "elevation.bottom", "elevation.top", "visibility"]
    }

    fn include(state: &PlaceableState) -> bool {
        state
            .region
            .as_ref()
            .is_some_and(|region| !region.shapes.is_empty())
    }

    fn placement(state: &PlaceableState) -> Placement {
        let (bottom, _) = Self::elevation(state);
        Placement {
            translation: Vec3::new(0.0, 0.0, bottom),
            rotation: 0.0,
            scale: Vec3::ONE,
        }
    }

    fn shape(state: &PlaceableState, backend: &dyn GeometryBackend) -> Shape2d {
        match &state.region {
            Some(region) => backend.combine(&region.shapes),
            None => Shape2d::Polygon { points: Vec::new() },
        }
    }

    fn elevation(state: &PlaceableState) -> (f32, f32) {
        match &state.region {
            Some(region) => (
                region.bottom.unwrap_or(-OPEN_ELEVATION),
                region.top.unwrap_or(OPEN_ELEVATION),
            ),
            None => (state.elevation_bottom, state.elevation_top),
        }
    }

    fn needs_mesh(_state: &PlaceableState) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{PlaceableId, RegionData};
    use sight_geometry::PlanarBackend;

    fn region(shapes: Vec<Shape2d>, bottom: Option<f32>, top: Option<f32>) -> PlaceableState {
        PlaceableState {
            id: PlaceableId::from("reg1"),
            kind: PlaceableType::Region,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation_deg: 0.0,
            elevation_bottom: 0.0,
            elevation_top: 0.0,
            shape: Shape2d::Polygon { points: Vec::new() },
            hidden: false,
            wall: None,
            tile: None,
            region: Some(RegionData {
                shapes,
                bottom,
                top,
            }),
        }
    }

    fn square(x: f32) -> Shape2d {
        Shape2d::Rect {
            x,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }

    #[test]
    fn shapeless_regions_are_excluded() {
        assert!(!Region::include(&region(Vec::new(), None, None)));
        assert!(Region::include(&region(vec![square(0.0)], None, None)));
    }

    #[test]
    fn shapes_are_combined() {
        let state = region(vec![square(0.0), square(3.0)], Some(0.0), Some(5.0));
        let combined = Region::shape(&state, &PlanarBackend);
        let (min, max) = combined.bounds();
        assert_eq!(min.x, 0.0);
        assert_eq!(max.x, 4.0);
    }

    #[test]
    fn open_elevation_spans_widely() {
        let (bottom, top) = Region::elevation(&region(vec![square(0.0)], None, Some(20.0)));
        assert!(bottom < -1000.0);
        assert_eq!(top, 20.0);
    }

    #[test]
    fn regions_always_mesh() {
        assert!(Region::needs_mesh(&region(vec![square(0.0)], None, None)));
    }
}
