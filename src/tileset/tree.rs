//! Tile tree ownership, the per-tile `update` driver, and unload bookkeeping (spec §4.5),
//! grounded in `examples/kurtkuehnert-bevy_terrain/src/terrain_data/tile_atlas.rs`'s `TileAtlas`
//! (VecDeque-ordered, reference-counted LRU shape) for the Rust idiom; state-machine semantics
//! from `examples/original_source/Cesium3DTilesSelection/src/Tile.cpp`.

use std::collections::VecDeque;
use std::sync::Arc;

use slab::Slab;
use tracing::{debug, warn};

use crate::availability::{AvailabilityFlags, AvailabilityIndex};
use crate::content::{ContentPipeline, LoadOutcome, Quadrant, TileRequest};
use crate::io::PrepareRendererResources;
use crate::overlay::{self, MoreDetailAvailable, RasterOverlayProvider};

use super::byte_size::compute_byte_size;
use super::geometric_error::non_zero_geometric_error;
use super::state::{FailedTileCallback, FailedTileDecision, TileState};
use super::tile::{BoundingVolume, RefineMode, Tile, TileError, TileId, TileIndex};

/// Per-tileset implicit-tiling context: the availability index plus a URL template with
/// `{level}`/`{x}`/`{y}` placeholders used to request implicitly-defined tiles (spec §4.2, §4.5
/// "implicit context present").
pub struct ImplicitContext {
    pub availability: AvailabilityIndex,
    pub url_template: String,
}

impl ImplicitContext {
    pub fn url_for(&self, level: u32, x: u32, y: u32) -> String {
        self.url_template
            .replace("{level}", &level.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

pub struct TileTree {
    arena: Slab<Tile>,
    root: TileIndex,
    lru: VecDeque<TileIndex>,
    pipeline: ContentPipeline<TileIndex>,
    renderer: Arc<dyn PrepareRendererResources>,
    overlay_providers: Vec<Arc<dyn RasterOverlayProvider>>,
    implicit: Option<ImplicitContext>,
    failed_tile_callback: Arc<dyn FailedTileCallback>,
    max_throttled_overlay_loads: usize,
}

impl TileTree {
    pub fn new(
        root: Tile,
        pipeline: ContentPipeline<TileIndex>,
        renderer: Arc<dyn PrepareRendererResources>,
        overlay_providers: Vec<Arc<dyn RasterOverlayProvider>>,
        implicit: Option<ImplicitContext>,
        failed_tile_callback: Arc<dyn FailedTileCallback>,
        max_throttled_overlay_loads: usize,
    ) -> Self {
        let mut arena = Slab::new();
        let root_index = arena.insert(root);
        Self {
            arena,
            root: root_index,
            lru: VecDeque::new(),
            pipeline,
            renderer,
            overlay_providers,
            implicit,
            failed_tile_callback,
            max_throttled_overlay_loads,
        }
    }

    pub fn root(&self) -> TileIndex {
        self.root
    }

    pub fn tile(&self, index: TileIndex) -> &Tile {
        &self.arena[index]
    }

    pub fn tile_mut(&mut self, index: TileIndex) -> &mut Tile {
        &mut self.arena[index]
    }

    pub fn children(&self, index: TileIndex) -> &[TileIndex] {
        &self.arena[index].children
    }

    /// Most-recently-Done tiles last; consumed by the selection layer as an LRU candidate list
    /// for eviction (spec §6 "Produced by the core").
    pub fn lru_tiles(&self) -> impl Iterator<Item = TileIndex> + '_ {
        self.lru.iter().copied()
    }

    fn touch_lru(&mut self, index: TileIndex) {
        self.lru.retain(|&i| i != index);
        self.lru.push_back(index);
    }

    fn untrack_lru(&mut self, index: TileIndex) {
        self.lru.retain(|&i| i != index);
    }

    /// Drains completed worker results into `ContentLoading -> {ContentLoaded, FailedTemporarily,
    /// Failed}` transitions (spec §4.4 step 6, §5 "merge inspects current state and drops stale
    /// results"). Returns the tiles that changed state so the caller can re-run `update` on them.
    pub fn poll_completed(&mut self) -> Vec<TileIndex> {
        let mut changed = Vec::new();
        while let Some(completed) = self.pipeline.try_recv() {
            let index = completed.tile_index;
            if !self.arena.contains(index) {
                continue; // tile was removed before its load finished
            }
            if self.arena[index].state() != TileState::ContentLoading {
                debug!(?index, "dropping stale load result, tile left ContentLoading");
                continue;
            }

            match completed.outcome {
                LoadOutcome::Loaded {
                    content,
                    renderer_load_result,
                } => {
                    self.arena[index].content = Some(content);
                    self.arena[index].pending_renderer_load_result = renderer_load_result;
                    self.arena[index].set_state(TileState::ContentLoaded);
                }
                LoadOutcome::FailedTemporarily { http_status_code } => {
                    self.arena[index].content = None;
                    self.arena[index].pending_http_status = http_status_code;
                    self.arena[index].set_state(TileState::FailedTemporarily);
                }
                LoadOutcome::Failed => {
                    self.arena[index].content = None;
                    self.arena[index].set_state(TileState::Failed);
                }
            }
            changed.push(index);
        }
        changed
    }

    /// Starts loading a tile's content (spec §4.4 steps 1-4). No-op unless the tile is
    /// `Unloaded`.
    pub fn load_content(&mut self, index: TileIndex) {
        if self.arena[index].state() != TileState::Unloaded {
            return;
        }

        let geometric_error = non_zero_geometric_error(self, index);
        let tile = &self.arena[index];
        let bounding_volume = tile.bounding_volume;
        let transform = tile.transform;
        let tile_id = tile.id.clone();
        let content_url = tile.content_url.clone();

        let mut bindings = std::mem::take(&mut self.arena[index].raster_bindings);
        let newly_attached = overlay::map_tile(
            &mut bindings,
            &self.overlay_providers,
            bounding_volume,
            geometric_error,
        );
        self.arena[index].raster_bindings = bindings;

        match content_url {
            Some(url) => {
                self.arena[index].set_state(TileState::ContentLoading);
                self.pipeline.start_load(
                    index,
                    tile_id,
                    TileRequest { url, headers: Vec::new() },
                    transform,
                    newly_attached,
                );
            }
            None => self.try_start_upsample(index),
        }
    }

    fn try_start_upsample(&mut self, index: TileIndex) {
        let Some(parent_index) = self.arena[index].parent else {
            return;
        };
        let parent_done = self.arena[parent_index].state() == TileState::Done;
        let parent_has_model = self
            .arena[parent_index]
            .content
            .as_ref()
            .map(|c| c.model.is_some())
            .unwrap_or(false);

        if !parent_done || !parent_has_model {
            // Push the parent toward loading; retry this tile next tick (spec §4.4).
            if self.arena[parent_index].state() == TileState::Unloaded {
                self.load_content(parent_index);
            }
            return;
        }

        let Some(quadrant) = upsample_quadrant(&self.arena[index].id) else {
            return;
        };
        let Some(BoundingVolume::Region(parent_region)) = region_of(&self.arena[parent_index]) else {
            return;
        };
        let parent_model = self.arena[parent_index]
            .content
            .as_ref()
            .and_then(|c| c.model.clone())
            .expect("checked above");

        let tile_id = self.arena[index].id.clone();
        let transform = self.arena[index].transform;

        self.arena[index].set_state(TileState::ContentLoading);
        self.pipeline
            .start_upsample(index, tile_id, parent_model, parent_region, quadrant, transform);
    }

    /// Attempts to unload a tile's content (spec §4.5 `unloadContent`). Fails while the tile is
    /// still loading, or while a child is upsampling from it.
    pub fn unload_content(&mut self, index: TileIndex) -> Result<bool, TileError> {
        if self.arena[index].state() == TileState::ContentLoading {
            return Err(TileError::StillLoading);
        }
        let has_upsampling_child = self.arena[index].children.iter().any(|&child| {
            self.arena[child].id.is_upsampled() && self.arena[child].state() == TileState::ContentLoading
        });
        if has_upsampling_child {
            return Err(TileError::ChildUpsampling);
        }

        let tile = &mut self.arena[index];
        if let Some(resource) = tile.renderer_resource.take() {
            self.renderer.free(&tile.id, None, Some(resource));
        }
        tile.content = None;
        tile.raster_bindings.clear();
        tile.set_state(TileState::Unloaded);
        self.untrack_lru(index);
        Ok(true)
    }

    /// The per-tile `update(prevFrame, curFrame)` driver (spec §4.5). Call after
    /// [`TileTree::poll_completed`] for every tile that changed, and periodically for every
    /// selected tile to drive overlay promotion and implicit/upsampled subdivision.
    pub fn update(&mut self, index: TileIndex) -> Result<(), TileError> {
        match self.arena[index].state() {
            TileState::FailedTemporarily => self.handle_failed_temporarily(index)?,
            TileState::ContentLoaded => self.apply_content_loaded(index)?,
            _ => {}
        }

        self.maybe_expand_implicit_children(index);

        if self.arena[index].state() == TileState::Done {
            self.touch_lru(index);
            self.update_overlays_and_maybe_subdivide(index);
        }

        Ok(())
    }

    fn handle_failed_temporarily(&mut self, index: TileIndex) -> Result<(), TileError> {
        let http_status_code = self.arena[index].pending_http_status;
        match self.failed_tile_callback.on_failed_tile(http_status_code) {
            FailedTileDecision::GiveUp => {
                self.arena[index].set_state(TileState::Failed);
            }
            FailedTileDecision::Retry => {
                // Full unload to reset overlay bindings cleanly before the next load attempt.
                self.arena[index].set_state(TileState::Unloaded);
                self.unload_content(index)?;
            }
            FailedTileDecision::Wait => {}
        }
        Ok(())
    }

    fn apply_content_loaded(&mut self, index: TileIndex) -> Result<(), TileError> {
        let tile_id = self.arena[index].id.clone();
        let transform = self.arena[index].transform;
        let load_result = self.arena[index].pending_renderer_load_result.take();

        if let Some(content) = self.arena[index].content.as_ref() {
            if content.updated_content_bounding_volume.is_some()
                && content.updated_bounding_volume.is_none()
            {
                return Err(TileError::DeveloperContractViolation(
                    "content bounding volume updated without an updated tile bounding volume"
                        .into(),
                ));
            }
        }

        if let Some(load_result) = load_result {
            let resource = self.renderer.prepare_in_main_thread(&tile_id, load_result);
            self.arena[index].renderer_resource = Some(resource);
        }

        let (injected_children, new_bounding_volume, new_content_bounding_volume, available_ranges, has_model) = {
            let content = self.arena[index].content.as_ref();
            (
                content.map(|c| c.injected_children.clone()).unwrap_or_default(),
                content.and_then(|c| c.updated_bounding_volume),
                content.and_then(|c| c.updated_content_bounding_volume),
                content.map(|c| c.available_tile_ranges.clone()).unwrap_or_default(),
                content.map(|c| c.model.is_some()).unwrap_or(false),
            )
        };

        if let Some(volume) = new_bounding_volume {
            self.arena[index].bounding_volume = volume;
        }
        self.arena[index].content_bounding_volume = new_content_bounding_volume;
        self.arena[index].unconditionally_refine = !has_model;

        if !injected_children.is_empty() && self.arena[index].children.is_empty() {
            for child in injected_children {
                let mut child_tile =
                    Tile::new(child.id, child.bounding_volume, child.geometric_error);
                child_tile.refine = child.refine;
                child_tile.transform = transform;
                if let Some(url) = child.content_url {
                    child_tile = child_tile.with_content_url(url);
                }
                self.insert_child(index, child_tile);
            }
        }

        if let Some(implicit) = self.implicit.as_mut() {
            for range in &available_ranges {
                let subtree_levels = implicit.availability.subtree_levels();
                if range.level % subtree_levels == 0 {
                    let subtree = crate::availability::Subtree::new(
                        subtree_levels,
                        crate::availability::Accessor::Constant(true),
                        crate::availability::Accessor::Constant(true),
                        crate::availability::Accessor::Constant(false),
                    );
                    if let Err(error) =
                        implicit
                            .availability
                            .add_subtree(range.level, range.min_x, range.min_y, subtree)
                    {
                        warn!(%error, "failed to install availability subtree from tile content");
                    }
                }
            }
        }

        self.arena[index].set_state(TileState::Done);
        Ok(())
    }

    fn maybe_expand_implicit_children(&mut self, index: TileIndex) {
        if !self.arena[index].children.is_empty() {
            return;
        }
        let Some(quadtree_id) = self.arena[index].id.quadtree_id() else {
            return;
        };
        if self.arena[index].id.is_upsampled() {
            return;
        }
        let Some(implicit) = self.implicit.as_ref() else {
            return;
        };

        let child_ids = quadtree_id.children();
        let mut any_available = false;
        let mut flags = [AvailabilityFlags::empty(); 4];
        for (i, child_id) in child_ids.iter().enumerate() {
            let f = implicit
                .availability
                .compute_availability(child_id.level, child_id.x, child_id.y);
            if f.contains(AvailabilityFlags::TILE_AVAILABLE) {
                any_available = true;
            }
            flags[i] = f;
        }
        if !any_available {
            return;
        }

        let parent_bounding_volume = self.arena[index].bounding_volume;
        let parent_transform = self.arena[index].transform;
        let parent_geometric_error = self.arena[index].geometric_error;
        let url_template = implicit.url_template.clone();

        for (i, child_id) in child_ids.into_iter().enumerate() {
            let available = flags[i].contains(AvailabilityFlags::TILE_AVAILABLE);
            let (id, content_url) = if available {
                let url = url_template
                    .replace("{level}", &child_id.level.to_string())
                    .replace("{x}", &child_id.x.to_string())
                    .replace("{y}", &child_id.y.to_string());
                (TileId::Quadtree(child_id), Some(url))
            } else {
                (TileId::UpsampledQuadtreeNode(child_id), None)
            };

            let mut child_tile = Tile::new(id, parent_bounding_volume, parent_geometric_error * 0.5);
            child_tile.transform = parent_transform;
            child_tile.refine = RefineMode::Replace;
            if let Some(url) = content_url {
                child_tile = child_tile.with_content_url(url);
            }
            self.insert_child(index, child_tile);
        }
    }

    fn update_overlays_and_maybe_subdivide(&mut self, index: TileIndex) {
        let has_model = self.arena[index]
            .content
            .as_ref()
            .map(|c| c.model.is_some())
            .unwrap_or(false);
        if !has_model || self.overlay_providers.is_empty() {
            return;
        }

        let bounding_volume = self.arena[index].bounding_volume;
        let geometric_error = self.arena[index].geometric_error;

        let mut bindings = std::mem::take(&mut self.arena[index].raster_bindings);
        let promoted_projections =
            overlay::promote_placeholders(&mut bindings, &self.overlay_providers, bounding_volume, geometric_error);
        let more_detail =
            overlay::update_bindings(&mut bindings, &self.overlay_providers, self.max_throttled_overlay_loads);
        self.arena[index].raster_bindings = bindings;

        if !promoted_projections.is_empty() {
            // A newly attached projection needs matching texture coordinates the current mesh
            // doesn't have; force a reload (spec §4.3 item 2).
            let _ = self.unload_content(index);
            return;
        }

        if more_detail == MoreDetailAvailable::Yes && self.arena[index].children.is_empty() {
            self.subdivide_with_upsampled_children(index);
        }
    }

    fn subdivide_with_upsampled_children(&mut self, index: TileIndex) {
        let Some(BoundingVolume::Region(region)) = region_of(&self.arena[index]) else {
            return;
        };
        let Some(quadtree_id) = self.arena[index].id.quadtree_id() else {
            return;
        };
        let parent_transform = self.arena[index].transform;
        let parent_geometric_error = non_zero_geometric_error(self, index);
        self.arena[index].refine = RefineMode::Replace;
        self.arena[index].geometric_error = parent_geometric_error;

        for (child_id, quadrant) in quadtree_id.children().into_iter().zip(Quadrant::ALL) {
            let child_region = crate::content::quadrant_region(region, quadrant);
            let mut child_tile = Tile::new(
                TileId::UpsampledQuadtreeNode(child_id),
                BoundingVolume::Region(child_region),
                parent_geometric_error * 0.5,
            );
            child_tile.transform = parent_transform;
            child_tile.refine = RefineMode::Replace;
            self.insert_child(index, child_tile);
        }
    }

    fn insert_child(&mut self, parent: TileIndex, mut child: Tile) {
        child.parent = Some(parent);
        let child_index = self.arena.insert(child);
        self.arena[parent].children.push(child_index);
    }

    pub fn byte_size(&self, index: TileIndex) -> usize {
        self.arena[index]
            .content
            .as_ref()
            .and_then(|c| c.model.as_ref())
            .map(compute_byte_size)
            .unwrap_or(0)
    }
}

fn region_of(tile: &Tile) -> Option<BoundingVolume> {
    match tile.bounding_volume {
        BoundingVolume::Region(_) | BoundingVolume::LooseRegion(_) => Some(tile.bounding_volume),
        _ => None,
    }
}

fn upsample_quadrant(id: &TileId) -> Option<Quadrant> {
    let TileId::UpsampledQuadtreeNode(id) = id else {
        return None;
    };
    Some(match (id.x % 2, id.y % 2) {
        (0, 0) => Quadrant::Sw,
        (1, 0) => Quadrant::Se,
        (0, 1) => Quadrant::Nw,
        (1, 1) => Quadrant::Ne,
        _ => unreachable!(),
    })
}

/// End-to-end scenarios from spec §8, driven against fakes for every external collaborator
/// (`SPEC_FULL.md` §10.4) so the whole request -> decode -> attach -> `update` chain runs
/// deterministically on the test thread via [`crate::io::InlineTaskProcessor`].
#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::availability::{Accessor, AvailabilityIndex, Subtree};
    use crate::content::{ContentError, ContentPipeline, RawContentFactory};
    use crate::io::{AssetAccessor, AssetError, AssetResponse, BoxFuture, InlineTaskProcessor};
    use crate::io::{NullPrepareRendererResources, PrepareRendererResources};
    use crate::cache::CacheControl;
    use crate::tileset::{BoundingRegion, GiveUpOnFailure, QuadtreeTileId};

    use super::*;

    struct FakeAssetAccessor {
        status_code: u16,
        body: Vec<u8>,
    }

    impl FakeAssetAccessor {
        fn ok(body: &[u8]) -> Self {
            Self {
                status_code: 200,
                body: body.to_vec(),
            }
        }

        fn status(status_code: u16) -> Self {
            Self {
                status_code,
                body: Vec::new(),
            }
        }
    }

    impl AssetAccessor for FakeAssetAccessor {
        fn get(
            &self,
            _url: String,
            _headers: Vec<(String, String)>,
        ) -> BoxFuture<'static, Result<AssetResponse, AssetError>> {
            let response = AssetResponse {
                status_code: self.status_code,
                headers: Vec::new(),
                content_type: None,
                cache_control: CacheControl::default(),
                data: self.body.clone(),
            };
            Box::pin(std::future::ready(Ok(response)))
        }
    }

    fn region() -> BoundingVolume {
        BoundingVolume::Region(BoundingRegion {
            west: -1.0,
            south: -1.0,
            east: 1.0,
            north: 1.0,
            min_height: 0.0,
            max_height: 0.0,
        })
    }

    fn harness(
        accessor: impl AssetAccessor + 'static,
    ) -> (TileTree, Arc<dyn PrepareRendererResources>) {
        let renderer: Arc<dyn PrepareRendererResources> = Arc::new(NullPrepareRendererResources);
        let pipeline = ContentPipeline::new(
            Arc::new(accessor),
            Arc::new(RawContentFactory),
            renderer.clone(),
            Arc::new(InlineTaskProcessor),
        );
        let root = Tile::new(
            TileId::Quadtree(QuadtreeTileId::new(0, 0, 0)),
            region(),
            10.0,
        )
        .with_content_url("https://example.test/root");
        let tree = TileTree::new(
            root,
            pipeline,
            renderer.clone(),
            Vec::new(),
            None,
            Arc::new(GiveUpOnFailure),
            20,
        );
        (tree, renderer)
    }

    #[test]
    fn happy_path_reaches_done_and_is_renderable() {
        let (mut tree, _renderer) = harness(FakeAssetAccessor::ok(b"glb-bytes"));
        let root = tree.root();

        tree.load_content(root);
        assert_eq!(tree.tile(root).state(), TileState::ContentLoading);

        let changed = tree.poll_completed();
        assert_eq!(changed, vec![root]);
        assert_eq!(tree.tile(root).state(), TileState::ContentLoaded);

        tree.update(root).unwrap();
        assert_eq!(tree.tile(root).state(), TileState::Done);
        assert!(tree.tile(root).is_renderable());
        assert!(tree.byte_size(root) > 0);
    }

    #[test]
    fn http_404_gives_up_to_failed() {
        let (mut tree, _renderer) = harness(FakeAssetAccessor::status(404));
        let root = tree.root();

        tree.load_content(root);
        tree.poll_completed();
        assert_eq!(tree.tile(root).state(), TileState::FailedTemporarily);
        assert_eq!(tree.tile(root).pending_http_status, Some(404));

        tree.update(root).unwrap();
        assert_eq!(tree.tile(root).state(), TileState::Failed);
        assert!(!tree.tile(root).is_renderable());
    }

    #[test]
    fn unload_blocked_while_upsampled_child_is_loading() {
        let (mut tree, _renderer) = harness(FakeAssetAccessor::ok(b"glb-bytes"));
        let root = tree.root();

        tree.load_content(root);
        tree.poll_completed();
        tree.update(root).unwrap();
        assert_eq!(tree.tile(root).state(), TileState::Done);

        let child_id = QuadtreeTileId::new(1, 0, 0);
        let mut child = Tile::new(TileId::UpsampledQuadtreeNode(child_id), region(), 5.0);
        child.set_state(TileState::ContentLoading);
        tree.insert_child(root, child);

        assert!(matches!(tree.unload_content(root), Err(TileError::ChildUpsampling)));
    }

    #[test]
    fn upsampled_child_synthesizes_from_done_parent() {
        let (mut tree, _renderer) = harness(FakeAssetAccessor::ok(b"glb-bytes"));
        let root = tree.root();

        tree.load_content(root);
        tree.poll_completed();
        tree.update(root).unwrap();
        assert_eq!(tree.tile(root).state(), TileState::Done);

        let child_id = QuadtreeTileId::new(1, 0, 0);
        let child = Tile::new(TileId::UpsampledQuadtreeNode(child_id), region(), 5.0);
        tree.insert_child(root, child);
        let child_index = tree.children(root)[0];

        tree.load_content(child_index);
        assert_eq!(tree.tile(child_index).state(), TileState::ContentLoading);

        let changed = tree.poll_completed();
        assert_eq!(changed, vec![child_index]);
        assert_eq!(tree.tile(child_index).state(), TileState::ContentLoaded);

        tree.update(child_index).unwrap();
        assert_eq!(tree.tile(child_index).state(), TileState::Done);
        assert!(tree.tile(child_index).is_renderable());

        assert!(matches!(tree.unload_content(root), Err(TileError::ChildUpsampling)));
    }

    #[test]
    fn implicit_expansion_creates_four_children_mixing_available_and_upsampled() {
        let mut availability = AvailabilityIndex::new(1, None);
        // Depth-1 subtree over the root: morton(0,0)=0 and morton(0,1)=2 available, 1 and 3 not.
        availability
            .add_subtree(
                0,
                0,
                0,
                Subtree::new(
                    1,
                    Accessor::Constant(true),
                    Accessor::Constant(true),
                    Accessor::Buffer(vec![0b0000_0101]),
                ),
            )
            .unwrap();

        let implicit = ImplicitContext {
            availability,
            url_template: "https://example.test/{level}/{x}/{y}".into(),
        };
        let renderer: Arc<dyn PrepareRendererResources> = Arc::new(NullPrepareRendererResources);
        let pipeline = ContentPipeline::new(
            Arc::new(FakeAssetAccessor::ok(b"glb-bytes")),
            Arc::new(RawContentFactory),
            renderer.clone(),
            Arc::new(InlineTaskProcessor),
        );
        let mut tree = TileTree::new(
            Tile::new(
                TileId::Quadtree(QuadtreeTileId::new(0, 0, 0)),
                region(),
                10.0,
            )
            .with_content_url("https://example.test/root"),
            pipeline,
            renderer,
            Vec::new(),
            Some(implicit),
            Arc::new(GiveUpOnFailure),
            20,
        );
        let root = tree.root();

        tree.load_content(root);
        tree.poll_completed();
        tree.update(root).unwrap();
        assert_eq!(tree.tile(root).state(), TileState::Done);

        let children = tree.children(root).to_vec();
        assert_eq!(children.len(), 4);
        let available: Vec<bool> = children
            .iter()
            .map(|&c| !tree.tile(c).id.is_upsampled())
            .collect();
        assert_eq!(available, vec![true, false, true, false]);
    }

    #[test]
    fn decode_failure_on_empty_body_marks_failed() {
        use crate::content::ContentFactory;
        let error = RawContentFactory.decode(&[], None).unwrap_err();
        assert!(matches!(error, ContentError::Decode(_)));
    }
}
