use glam::Vec2;

/// 2D footprint of a placeable, in scene coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape2d {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Ellipse {
        cx: f32,
        cy: f32,
        rx: f32,
        ry: f32,
    },
    Polygon {
        points: Vec<Vec2>,
    },
}

impl Shape2d {
    /// Counter-clockwise outline points. Ellipses are sampled; the
    /// sample count trades fidelity for face count downstream.
    pub fn outline(&self) -> Vec<Vec2> {
        match self {
            Shape2d::Rect {
                x,
                y,
                width,
                height,
            } => vec![
                Vec2::new(*x, *y),
                Vec2::new(x + width, *y),
                Vec2::new(x + width, y + height),
                Vec2::new(*x, y + height),
            ],
            Shape2d::Ellipse { cx, cy, rx, ry } => {
                const SEGMENTS: usize = 16;
                (0..SEGMENTS)
                    .map(|i| {
                        let theta = std::f32::consts::TAU * i as f32 / SEGMENTS as f32;
                        Vec2::new(cx + rx * theta.cos(), cy + ry * theta.sin())
                    })
                    .collect()
            }
            Shape2d::Polygon { points } => points.clone(),
        }
    }

    /// Whether the shape needs per-vertex mesh facets downstream.
    /// Rectangles and ellipses have implicit windings; polygons do not.
    pub fn is_polygonal(&self) -> bool {
        matches!(self, Shape2d::Polygon { .. })
    }

    /// 2D bounds as (min, max).
    pub fn bounds(&self) -> (Vec2, Vec2) {
        match self {
            Shape2d::Rect {
                x,
                y,
                width,
                height,
            } => (Vec2::new(*x, *y), Vec2::new(x + width, y + height)),
            Shape2d::Ellipse { cx, cy, rx, ry } => (
                Vec2::new(cx - rx, cy - ry),
                Vec2::new(cx + rx, cy + ry),
            ),
            Shape2d::Polygon { points } => {
                let mut min = Vec2::splat(f32::INFINITY);
                let mut max = Vec2::splat(f32::NEG_INFINITY);
                for p in points {
                    min = min.min(*p);
                    max = max.max(*p);
                }
                (min, max)
            }
        }
    }
}
