use crate::Shape2d;
use glam::Vec3;

/// Axis-aligned bounding box, used as a cheap pre-filter before face
/// intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut aabb = Self::EMPTY;
        for p in points {
            aabb.min = aabb.min.min(p);
            aabb.max = aabb.max.max(p);
        }
        aabb
    }

    /// Extrude a 2D footprint over an elevation range.
    pub fn from_shape(shape: &Shape2d, bottom: f32, top: f32) -> Self {
        let (min2, max2) = shape.bounds();
        Self {
            min: min2.extend(bottom.min(top)),
            max: max2.extend(bottom.max(top)),
        }
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Slab test: the parameter range where the ray overlaps the box,
    /// or `None` when it misses entirely.
    pub fn ray_range(&self, origin: Vec3, dir: Vec3) -> Option<(f32, f32)> {
        let mut t0 = f32::NEG_INFINITY;
        let mut t1 = f32::INFINITY;
        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            if d.abs() < f32::EPSILON {
                if o < self.min[axis] || o > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (near, far) = {
                let a = (self.min[axis] - o) * inv;
                let b = (self.max[axis] - o) * inv;
                if a <= b { (a, b) } else { (b, a) }
            };
            t0 = t0.max(near);
            t1 = t1.min(far);
            if t0 > t1 {
                return None;
            }
        }
        Some((t0, t1))
    }
}
