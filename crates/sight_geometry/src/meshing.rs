use glam::Vec2;

/// Build renderer-facing vertex/index arrays for an extruded outline.
///
/// Vertices are two rings (bottom then top), stride 3. Caps use fan
/// triangulation, which assumes the outline is convex; concave outlines
/// should be decomposed by the geometry collaborator first. Indices are
/// relative to the facet's first vertex, as the mesh facet store expects.
pub fn prism_mesh(outline: &[Vec2], bottom: f32, top: f32) -> (Vec<f32>, Vec<u16>) {
    let n = outline.len();
    if n < 3 {
        return (Vec::new(), Vec::new());
    }
    let mut vertices = Vec::with_capacity(n * 6);
    for p in outline {
        vertices.extend_from_slice(&[p.x, p.y, bottom]);
    }
    for p in outline {
        vertices.extend_from_slice(&[p.x, p.y, top]);
    }

    let n16 = n as u16;
    let mut indices = Vec::with_capacity((n - 2) * 6 + n * 6);
    // Bottom cap, wound downward
    for i in 1..(n16 - 1) {
        indices.extend_from_slice(&[0, i + 1, i]);
    }
    // Top cap
    for i in 1..(n16 - 1) {
        indices.extend_from_slice(&[n16, n16 + i, n16 + i + 1]);
    }
    // Lateral quads, two triangles per outline edge
    for i in 0..n16 {
        let j = (i + 1) % n16;
        indices.extend_from_slice(&[i, j, n16 + j, i, n16 + j, n16 + i]);
    }
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_prism_counts() {
        let outline = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let (vertices, indices) = prism_mesh(&outline, 0.0, 2.0);
        // Two rings of 4 vertices, stride 3
        assert_eq!(vertices.len(), 24);
        // 2 cap triangles per face + 2 per lateral edge
        assert_eq!(indices.len(), (2 + 2 + 8) * 3);
        assert!(indices.iter().all(|&i| (i as usize) < 8));
        // Bottom ring has z = 0, top ring z = 2
        assert_eq!(vertices[2], 0.0);
        assert_eq!(vertices[14], 2.0);
    }

    #[test]
    fn degenerate_outline_is_empty() {
        let (vertices, indices) = prism_mesh(&[Vec2::ZERO, Vec2::ONE], 0.0, 1.0);
        assert!(vertices.is_empty());
        assert!(indices.is_empty());
    }
}
