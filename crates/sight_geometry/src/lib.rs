//! Sightline Geometry
//!
//! Per-entity 3D representations for line-of-sight queries:
//! - Transform matrices composed from domain placements
//! - Axis-aligned bounding volumes
//! - Oriented prism faces with ray intersection
//! - The composite geometry record tying the layers together

mod aabb;
mod faces;
mod meshing;
mod record;
mod shape;
mod transform;

pub use aabb::Aabb;
pub use faces::{Face, FaceSide, GeometryBackend, PlanarBackend};
pub use meshing::prism_mesh;
pub use record::{GeometryRecord, RecordContext};
pub use shape::Shape2d;
pub use transform::{Placement, TransformSet, MODEL_FACET_LEN};

pub use glam;
