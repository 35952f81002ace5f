//! Tile identity, ownership and bounding-volume data (spec §3, §9).

use thiserror::Error;

use super::state::AtomicTileState;
use super::state::TileState;
use crate::overlay::RasterBinding;

pub type TileIndex = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QuadtreeTileId {
    pub level: u32,
    pub x: u32,
    pub y: u32,
}

impl QuadtreeTileId {
    pub fn new(level: u32, x: u32, y: u32) -> Self {
        Self { level, x, y }
    }

    /// The four children of this tile in SW, SE, NW, NE order.
    pub fn children(&self) -> [QuadtreeTileId; 4] {
        let (level, x, y) = (self.level + 1, self.x * 2, self.y * 2);
        [
            QuadtreeTileId::new(level, x, y),
            QuadtreeTileId::new(level, x + 1, y),
            QuadtreeTileId::new(level, x, y + 1),
            QuadtreeTileId::new(level, x + 1, y + 1),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OctreeTileId {
    pub level: u32,
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

/// Tagged union over the identity schemes a tile may use (spec §9).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TileId {
    String(String),
    Quadtree(QuadtreeTileId),
    Octree(OctreeTileId),
    /// A child synthesized by upsampling from its parent rather than fetched from the network.
    UpsampledQuadtreeNode(QuadtreeTileId),
}

impl TileId {
    pub fn quadtree_id(&self) -> Option<QuadtreeTileId> {
        match self {
            TileId::Quadtree(id) | TileId::UpsampledQuadtreeNode(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_upsampled(&self) -> bool {
        matches!(self, TileId::UpsampledQuadtreeNode(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingRegion {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
    pub min_height: f64,
    pub max_height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedBoundingBox {
    pub center: [f64; 3],
    pub half_axes: [[f64; 3]; 3],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: [f64; 3],
    pub radius: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct S2CellBoundingVolume {
    pub cell_id: u64,
    pub min_height: f64,
    pub max_height: f64,
}

/// Tagged union over the bounding-volume representations a tile may carry (spec §9). Transform
/// and center-estimation operations are consumed through geodetic math outside this crate; here
/// the volume is carried opaquely and compared/replaced as a whole.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundingVolume {
    Obb(OrientedBoundingBox),
    Region(BoundingRegion),
    Sphere(BoundingSphere),
    LooseRegion(BoundingRegion),
    S2Cell(S2CellBoundingVolume),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefineMode {
    Replace,
    Add,
}

/// Opaque GPU-side (or otherwise renderer-owned) handle produced by `PrepareRendererResources`.
pub struct RendererResource(pub Box<dyn std::any::Any + Send>);

#[derive(Debug, Error)]
pub enum TileError {
    #[error("tile is still loading content")]
    StillLoading,
    #[error("a child is upsampling from this tile")]
    ChildUpsampling,
    #[error("developer contract violation: {0}")]
    DeveloperContractViolation(String),
}

/// A node in the tile tree. Parent/child links are non-owning indices into the owning
/// [`crate::tileset::TileTree`]'s arena (spec §9 design note: arena ownership avoids the
/// cycle/aliasing hazards of `Rc`/`Weak` back-references).
pub struct Tile {
    pub id: TileId,
    /// Content request URL, `None` for upsampled tiles and tiles with no content of their own.
    pub content_url: Option<String>,
    pub parent: Option<TileIndex>,
    pub children: Vec<TileIndex>,
    pub bounding_volume: BoundingVolume,
    pub viewer_request_volume: Option<BoundingVolume>,
    pub content_bounding_volume: Option<BoundingVolume>,
    pub geometric_error: f64,
    pub refine: RefineMode,
    pub transform: [[f64; 4]; 4],
    pub(crate) state: AtomicTileState,
    pub content: Option<crate::content::TileContent>,
    pub renderer_resource: Option<RendererResource>,
    pub raster_bindings: Vec<RasterBinding>,
    pub unconditionally_refine: bool,
    /// Opaque bookkeeping the selection layer may stamp; unused by the core state machine.
    pub last_selection_frame: u64,
    /// Load-thread renderer result awaiting `prepare_in_main_thread`, stashed between the worker
    /// merge step and the `ContentLoaded -> Done` transition.
    pub(crate) pending_renderer_load_result: Option<Box<dyn std::any::Any + Send>>,
    /// Status code from the most recent failed load, consulted by the `failedTileCallback`.
    pub(crate) pending_http_status: Option<u16>,
}

impl Tile {
    pub fn new(id: TileId, bounding_volume: BoundingVolume, geometric_error: f64) -> Self {
        Self {
            id,
            content_url: None,
            parent: None,
            children: Vec::new(),
            bounding_volume,
            viewer_request_volume: None,
            content_bounding_volume: None,
            geometric_error,
            refine: RefineMode::Replace,
            transform: IDENTITY,
            state: AtomicTileState::new(TileState::Unloaded),
            content: None,
            renderer_resource: None,
            raster_bindings: Vec::new(),
            unconditionally_refine: false,
            last_selection_frame: 0,
            pending_renderer_load_result: None,
            pending_http_status: None,
        }
    }

    pub fn with_content_url(mut self, url: impl Into<String>) -> Self {
        self.content_url = Some(url.into());
        self
    }

    pub fn state(&self) -> TileState {
        self.state.load()
    }

    pub(crate) fn set_state(&self, state: TileState) {
        self.state.store(state);
    }

    pub fn is_renderable(&self) -> bool {
        matches!(self.state(), TileState::Done)
    }
}

const IDENTITY: [[f64; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];
