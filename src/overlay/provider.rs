//! Raster overlay provider trait (spec §4.3).
//!
//! Grounded in the teacher's enum-tagged, format-carrying small data types
//! (`examples/kurtkuehnert-bevy_terrain/src/terrain_data/attachment.rs`'s `AttachmentData`) for
//! the Rust shape; the placeholder/real-provider split itself has no teacher counterpart and
//! follows spec §4.3 directly.

use crate::tileset::BoundingVolume;

use super::raster_tile::RasterTile;

pub type OverlayId = u32;

/// A projection identifier a provider's raster tiles are expressed in. Two providers that share
/// a projection id may share a 3D tile's generated texture coordinates.
pub type ProjectionId = u32;

/// A pluggable raster overlay source. Early in a provider's life it may only be able to answer
/// `is_placeholder() == true`; `RasterOverlayMapping` re-attempts real mapping on every update
/// until the provider reports it is ready (spec §4.3 item 2).
pub trait RasterOverlayProvider: Send + Sync {
    fn id(&self) -> OverlayId;

    fn projection(&self) -> ProjectionId;

    fn is_placeholder(&self) -> bool;

    /// Picks the raster tile(s) that best match `target_geometric_error` over `region`, returning
    /// a handle the mapping can poll via [`RasterOverlayProvider::load_throttled`].
    fn map_region(&self, region: BoundingVolume, target_geometric_error: f64) -> RasterTile;

    /// Advances one in-flight raster tile load; returns `false` when the global in-flight budget
    /// is exhausted and the caller should retry next update (spec §4.3 "loadThrottled").
    fn load_throttled(&self, tile: &mut RasterTile, budget_remaining: usize) -> bool;
}
