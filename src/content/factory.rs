//! Decoded tile content (spec §3 `TileContent`) and the format-detecting factory that produces
//! it from raw bytes (spec §4.4 step 5). Real model decoding (glTF et al.) is a Non-goal (spec
//! §1); the factory here is the narrow seam a real decoder plugs into, grounded in the teacher's
//! enum-tagged `from_bytes` pattern
//! (`examples/kurtkuehnert-bevy_terrain/src/terrain_data/attachment.rs`'s `AttachmentData`).

use thiserror::Error;

use crate::tileset::BoundingVolume;

#[derive(Clone, Debug, Default)]
pub struct Buffer {
    pub data: Vec<u8>,
}

/// A decoded image. `buffer_view` indexes `Model::buffer_view_lengths` when the image was decoded
/// from an embedded buffer view, matching `Tile::computeByteSize`'s subtraction of the source
/// bytes (spec §4.5, §8 byte-size identity).
#[derive(Clone, Debug, Default)]
pub struct Image {
    pub buffer_view: Option<usize>,
    pub pixel_data: Vec<u8>,
}

#[derive(Clone, Debug, Default)]
pub struct Model {
    pub buffers: Vec<Buffer>,
    pub images: Vec<Image>,
    pub buffer_view_lengths: Vec<usize>,
}

/// A child tile injected directly by a loaded parent's content (external tileset references).
#[derive(Clone, Debug)]
pub struct InjectedChild {
    pub id: crate::tileset::TileId,
    pub bounding_volume: BoundingVolume,
    pub geometric_error: f64,
    pub refine: crate::tileset::RefineMode,
    pub content_url: Option<String>,
}

/// Base URL/credentials an external tileset's root content introduces (spec §3 `TileContent`).
#[derive(Clone, Debug)]
pub struct TileContext {
    pub base_url: String,
    pub headers: Vec<(String, String)>,
}

/// A contiguous range of quadtree tiles a loaded tile declares as available, fed into the
/// [`crate::availability::AvailabilityIndex`] on attach (spec §4.5).
#[derive(Clone, Copy, Debug)]
pub struct AvailableTileRange {
    pub level: u32,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

#[derive(Clone, Debug, Default)]
pub struct TileContent {
    pub model: Option<Model>,
    pub updated_bounding_volume: Option<BoundingVolume>,
    pub updated_content_bounding_volume: Option<BoundingVolume>,
    pub injected_children: Vec<InjectedChild>,
    pub new_tile_context: Option<TileContext>,
    pub available_tile_ranges: Vec<AvailableTileRange>,
    pub http_status_code: Option<u16>,
    pub overlay_texture_region: Option<crate::overlay::UvRectangle>,
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("asset fetch failed: {0}")]
    Asset(#[from] crate::io::AssetError),
    #[error("http status {0} is not success")]
    NotFound(u16),
    #[error("tile has no content to decode")]
    NoModel,
    #[error("decode failed: {0}")]
    Decode(String),
}

pub trait ContentFactory: Send + Sync {
    fn decode(&self, bytes: &[u8], content_type: Option<&str>) -> Result<Model, ContentError>;
}

/// Wraps response bytes as a single opaque buffer. Real format sniffing/decoding is out of scope
/// for this crate (spec §1 Non-goals); production deployments provide their own `ContentFactory`.
pub struct RawContentFactory;

impl ContentFactory for RawContentFactory {
    fn decode(&self, bytes: &[u8], _content_type: Option<&str>) -> Result<Model, ContentError> {
        if bytes.is_empty() {
            return Err(ContentError::Decode("empty response body".into()));
        }
        Ok(Model {
            buffers: vec![Buffer {
                data: bytes.to_vec(),
            }],
            images: Vec::new(),
            buffer_view_lengths: Vec::new(),
        })
    }
}
