use thiserror::Error;

/// Errors surfaced by the facet allocators.
///
/// These are local and recoverable: the allocator's state is unchanged
/// when one is returned, and the caller may retry with corrected inputs.
/// Lookup misses are not errors; they come back as `false`/`None`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FacetError {
    #[error("facet length mismatch: facet holds {expected} values, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("vertex data of {got} values is not a multiple of stride {stride}")]
    StrideMismatch { stride: usize, got: usize },
}
