//! Raster overlay mapping (spec §4.3).

mod mapping;
mod provider;
mod raster_tile;

pub use mapping::{map_tile, promote_placeholders, update_bindings, RasterBinding};
pub use provider::{OverlayId, ProjectionId, RasterOverlayProvider};
pub use raster_tile::{MoreDetailAvailable, RasterImage, RasterTile, TextureTransform, UvRectangle};
