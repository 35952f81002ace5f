//! Tile lifecycle: identity/ownership, the state machine, the owning tree, and the derived
//! byte-size/geometric-error accounting (spec §3, §4.5).

mod byte_size;
mod geometric_error;
mod state;
mod tile;
mod tree;

pub use byte_size::compute_byte_size;
pub use geometric_error::{non_zero_geometric_error, EPSILON5};
pub use state::{AtomicTileState, FailedTileCallback, FailedTileDecision, GiveUpOnFailure, TileState};
pub use tile::{
    BoundingRegion, BoundingSphere, BoundingVolume, OctreeTileId, OrientedBoundingBox,
    QuadtreeTileId, RefineMode, RendererResource, S2CellBoundingVolume, Tile, TileError, TileId,
    TileIndex,
};
pub use tree::{ImplicitContext, TileTree};
