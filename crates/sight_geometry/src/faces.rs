use crate::Shape2d;
use glam::{Vec2, Vec3};

/// Orientation class of an entity face. Ray queries try horizontal
/// caps before lateral faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceSide {
    Top,
    Bottom,
    Lateral,
}

/// One oriented planar polygon of an entity's 3D representation.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub points: Vec<Vec3>,
    pub side: FaceSide,
}

/// Boundary to the external geometry/clipping collaborator.
///
/// The core owns only the caching of *when* these run; the polygon math
/// itself is replaceable. `PlanarBackend` is the built-in implementation.
pub trait GeometryBackend {
    /// Oriented faces of a 2D shape extruded over an elevation range:
    /// a top cap, a bottom cap, and one lateral quad per outline edge.
    fn prism_faces(&self, shape: &Shape2d, bottom: f32, top: f32) -> Vec<Face>;

    /// Boolean union of several 2D shapes into one footprint.
    fn combine(&self, shapes: &[Shape2d]) -> Shape2d;

    /// Scalar parameter where the ray crosses the face, or `None`.
    fn ray_face(&self, origin: Vec3, dir: Vec3, face: &Face) -> Option<f32>;
}

/// Planar polygon implementation of the geometry boundary.
///
/// `combine` approximates the boolean union with the convex hull of all
/// outline points; a path-clipping collaborator can replace it without
/// touching the callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlanarBackend;

impl GeometryBackend for PlanarBackend {
    fn prism_faces(&self, shape: &Shape2d, bottom: f32, top: f32) -> Vec<Face> {
        let outline = shape.outline();
        if outline.len() < 3 {
            return Vec::new();
        }
        let mut faces = Vec::with_capacity(outline.len() + 2);
        faces.push(Face {
            points: outline.iter().map(|p| p.extend(top)).collect(),
            side: FaceSide::Top,
        });
        faces.push(Face {
            // Reverse winding so the cap faces downward
            points: outline.iter().rev().map(|p| p.extend(bottom)).collect(),
            side: FaceSide::Bottom,
        });
        for (i, a) in outline.iter().enumerate() {
            let b = outline[(i + 1) % outline.len()];
            faces.push(Face {
                points: vec![
                    a.extend(bottom),
                    b.extend(bottom),
                    b.extend(top),
                    a.extend(top),
                ],
                side: FaceSide::Lateral,
            });
        }
        faces
    }

    fn combine(&self, shapes: &[Shape2d]) -> Shape2d {
        match shapes {
            [] => Shape2d::Polygon { points: Vec::new() },
            [only] => only.clone(),
            many => {
                let points: Vec<Vec2> = many.iter().flat_map(|s| s.outline()).collect();
                Shape2d::Polygon {
                    points: convex_hull(points),
                }
            }
        }
    }

    fn ray_face(&self, origin: Vec3, dir: Vec3, face: &Face) -> Option<f32> {
        if face.points.len() < 3 {
            return None;
        }
        let p0 = face.points[0];
        let normal = (face.points[1] - p0).cross(face.points[2] - p0);
        let denom = dir.dot(normal);
        if denom.abs() < 1e-8 {
            return None;
        }
        let t = (p0 - origin).dot(normal) / denom;
        if t < 0.0 {
            return None;
        }
        let hit = origin + dir * t;
        if point_in_face(hit, face, normal) {
            Some(t)
        } else {
            None
        }
    }
}

/// Project onto the dominant-axis plane and run an even-odd crossing
/// test there.
fn point_in_face(p: Vec3, face: &Face, normal: Vec3) -> bool {
    let n = normal.abs();
    let (u, v) = if n.z >= n.x && n.z >= n.y {
        (0, 1)
    } else if n.x >= n.y {
        (1, 2)
    } else {
        (0, 2)
    };
    let px = p[u];
    let py = p[v];
    let mut inside = false;
    let len = face.points.len();
    for i in 0..len {
        let a = face.points[i];
        let b = face.points[(i + 1) % len];
        let (ax, ay) = (a[u], a[v]);
        let (bx, by) = (b[u], b[v]);
        if (ay > py) != (by > py) {
            let x = ax + (py - ay) / (by - ay) * (bx - ax);
            if px < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Monotone-chain convex hull over 2D points, counter-clockwise.
fn convex_hull(mut points: Vec<Vec2>) -> Vec<Vec2> {
    points.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    points.dedup();
    if points.len() <= 2 {
        return points;
    }
    let cross = |o: Vec2, a: Vec2, b: Vec2| (a - o).perp_dot(b - o);
    let mut hull: Vec<Vec2> = Vec::with_capacity(points.len() + 1);
    for &p in &points {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    // The upper chain may only pop vertices it pushed itself; the lower
    // chain below this mark is final.
    let lower = hull.len() + 1;
    for &p in points.iter().rev().skip(1) {
        while hull.len() >= lower && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}
