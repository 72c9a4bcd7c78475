use glam::{Mat4, Vec3};

/// Length of a model-matrix facet in the shared per-kind buffer.
pub const MODEL_FACET_LEN: usize = 16;

/// Domain-attribute snapshot feeding the matrix layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub translation: Vec3,
    /// Rotation about +Z, radians.
    pub rotation: f32,
    pub scale: Vec3,
}

impl Placement {
    pub const IDENTITY: Placement = Placement {
        translation: Vec3::ZERO,
        rotation: 0.0,
        scale: Vec3::ONE,
    };
}

/// Per-entity transform sub-matrices and their composition.
///
/// The model composition order is `scale * rotation * translation`;
/// downstream facet consumers expect that layout, so it is kept even
/// where a conventional T*R*S would read more naturally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformSet {
    pub translation: Mat4,
    pub rotation: Mat4,
    pub scale: Mat4,
    pub model: Mat4,
}

impl TransformSet {
    pub fn from_placement(placement: &Placement) -> Self {
        let translation = Mat4::from_translation(placement.translation);
        let rotation = Mat4::from_rotation_z(placement.rotation);
        let scale = Mat4::from_scale(placement.scale);
        let model = scale * rotation * translation;
        Self {
            translation,
            rotation,
            scale,
            model,
        }
    }

    /// Model matrix as a column-major facet payload.
    pub fn model_facet(&self) -> [f32; MODEL_FACET_LEN] {
        self.model.to_cols_array()
    }
}

impl Default for TransformSet {
    fn default() -> Self {
        Self::from_placement(&Placement::IDENTITY)
    }
}
