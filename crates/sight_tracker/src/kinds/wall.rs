use super::{vertical_extent, TrackedKind};
use crate::host::{PlaceableState, PlaceableType, SightRestriction};
use glam::{Vec2, Vec3};
use sight_geometry::{GeometryBackend, Placement, Shape2d};

/// Walls: tracked while they restrict sight and are not standing open.
/// The segment becomes a thin vertical prism so both sides present
/// lateral faces to ray queries.
pub struct Wall;

/// Half-thickness given to the degenerate wall footprint.
const HALF_THICKNESS: f32 = 0.05;

impl TrackedKind for Wall {
    const KIND: PlaceableType = PlaceableType::Wall;

    fn relevant_keys() -> &'static [&'static str] {
        &["c", "sight", "door", "ds"]
    }

    fn include(state: &PlaceableState) -> bool {
        match &state.wall {
            Some(wall) => wall.sight != SightRestriction::None && !wall.door_open,
            None => false,
        }
    }

    fn placement(state: &PlaceableState) -> Placement {
        let (a, b) = endpoints(state);
        let mid = (a + b) / 2.0;
        let delta = b - a;
        Placement {
            translation: Vec3::new(mid.x, mid.y, state.elevation_bottom),
            rotation: delta.y.atan2(delta.x),
            scale: Vec3::new(delta.length(), 2.0 * HALF_THICKNESS, vertical_extent(state)),
        }
    }

    fn shape(state: &PlaceableState, _backend: &dyn GeometryBackend) -> Shape2d {
        let (a, b) = endpoints(state);
        let delta = b - a;
        let normal = if delta.length_squared() > 0.0 {
            delta.perp().normalize() * HALF_THICKNESS
        } else {
            Vec2::new(0.0, HALF_THICKNESS)
        };
        Shape2d::Polygon {
            points: vec![a - normal, b - normal, b + normal, a + normal],
        }
    }

    // The thin prism has implicit winding; no per-vertex facets.
    fn needs_mesh(_state: &PlaceableState) -> bool {
        false
    }
}

fn endpoints(state: &PlaceableState) -> (Vec2, Vec2) {
    match &state.wall {
        Some(wall) => (
            Vec2::new(wall.c[0], wall.c[1]),
            Vec2::new(wall.c[2], wall.c[3]),
        ),
        None => (Vec2::ZERO, Vec2::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{PlaceableId, WallData};
    use sight_geometry::PlanarBackend;

    fn wall(c: [f32; 4], sight: SightRestriction, door_open: bool) -> PlaceableState {
        PlaceableState {
            id: PlaceableId::from("wall1"),
            kind: PlaceableType::Wall,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation_deg: 0.0,
            elevation_bottom: 0.0,
            elevation_top: 10.0,
            shape: Shape2d::Polygon { points: Vec::new() },
            hidden: false,
            wall: Some(WallData {
                c,
                sight,
                door_open,
            }),
            tile: None,
            region: None,
        }
    }

    #[test]
    fn placement_follows_the_segment() {
        let state = wall([0.0, 0.0, 4.0, 3.0], SightRestriction::Normal, false);
        let placement = Wall::placement(&state);
        assert_eq!(placement.translation, Vec3::new(2.0, 1.5, 0.0));
        assert!((placement.scale.x - 5.0).abs() < 1e-6);
        assert_eq!(placement.scale.z, 10.0);
        assert!((placement.rotation - (3.0f32).atan2(4.0)).abs() < 1e-6);
    }

    #[test]
    fn sightless_and_open_walls_are_excluded() {
        assert!(Wall::include(&wall(
            [0.0, 0.0, 1.0, 0.0],
            SightRestriction::Normal,
            false
        )));
        assert!(!Wall::include(&wall(
            [0.0, 0.0, 1.0, 0.0],
            SightRestriction::None,
            false
        )));
        assert!(!Wall::include(&wall(
            [0.0, 0.0, 1.0, 0.0],
            SightRestriction::Normal,
            true
        )));
    }

    #[test]
    fn footprint_is_a_thin_quad() {
        let state = wall([0.0, 0.0, 2.0, 0.0], SightRestriction::Normal, false);
        let shape = Wall::shape(&state, &PlanarBackend);
        let (min, max) = shape.bounds();
        assert!((max.y - min.y - 0.1).abs() < 1e-6);
        assert_eq!(min.x, 0.0);
        assert_eq!(max.x, 2.0);
    }
}
