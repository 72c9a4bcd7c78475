//! Sightline Tracker
//!
//! Keeps the facet population synchronized with the host scene graph:
//! hook-driven add/update/remove diffing per placeable kind, shared
//! model-matrix and mesh buffers, and the per-kind inclusion rules and
//! placement formulas for tokens, walls, tiles and regions.

pub mod host;
pub mod kinds;
mod settings;
mod tracker;

pub use host::{
    flatten_changes, ChangeValue, EventKind, Handler, HookRegistry, HostEvent, PlaceableId,
    PlaceableState, PlaceableType, RegionData, SceneSource, SightRestriction, TileData, WallData,
};
pub use kinds::{Region, Tile, Token, TrackedKind, Wall};
pub use settings::TrackerSettings;
pub use tracker::{KindTracker, TrackError, TrackedEntity};
