//! Sightline Core
//!
//! Packed-buffer facet allocation:
//! - Growable typed buffers (`PackedBuffer`)
//! - Stable-id to slot-index mapping (`IdentityIndexMap`)
//! - Variable- and fixed-length facet allocators
//! - Paired vertex/index facets for mesh consumers

mod buffer;
mod error;
mod fixed;
mod index_map;
mod mesh;
mod tracker;

pub use buffer::PackedBuffer;
pub use error::FacetError;
pub use fixed::FixedFacetTracker;
pub use index_map::IdentityIndexMap;
pub use mesh::{MeshFacets, MeshUpdate};
pub use tracker::FacetTracker;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
