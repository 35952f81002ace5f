//! Async request -> decode -> prepare chain (spec §4.4), grounded in the teacher's
//! `Slab`-based in-flight tracking
//! (`examples/kurtkuehnert-bevy_terrain/src/terrain_data/tile_loader.rs`'s `DefaultLoader`) and
//! the worker-to-main completion channel shape of
//! `examples/terrence2-nitrogen/libs/wgpu-buffer/terrain_geo/src/tile/manager.rs` (pack
//! reference, not the teacher).

use std::any::Any;
use std::sync::Arc;

use slab::Slab;
use tracing::warn;

use crate::io::{AssetAccessor, PrepareRendererResources, TaskProcessor};
use crate::tileset::{BoundingRegion, BoundingVolume, TileId};

use super::factory::{ContentError, ContentFactory, Model, TileContent};
use super::upsample::{quadrant_region, synthesize_child_model, Quadrant};

pub struct TileRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// What a completed worker task reports back to the main-thread merge step. `tile_index` lets
/// the tileset drop a result for a tile that was reset to `Unloaded` in the meantime (spec §5
/// cancellation: "abandon in-flight continuations' results on the main-thread merge step").
pub enum LoadOutcome {
    Loaded {
        content: TileContent,
        renderer_load_result: Option<Box<dyn Any + Send>>,
    },
    FailedTemporarily {
        http_status_code: Option<u16>,
    },
    Failed,
}

pub struct CompletedLoad<Index> {
    pub tile_index: Index,
    pub outcome: LoadOutcome,
}

struct InFlight;

/// Dispatches network loads and upsampling synthesis onto the worker pool, and hands completed
/// results back over a channel for the main thread to merge.
pub struct ContentPipeline<Index: Send + 'static> {
    asset_accessor: Arc<dyn AssetAccessor>,
    factory: Arc<dyn ContentFactory>,
    renderer: Arc<dyn PrepareRendererResources>,
    task_processor: Arc<dyn TaskProcessor>,
    in_flight: Slab<InFlight>,
    sender: async_channel::Sender<(Index, usize, LoadOutcome)>,
    receiver: async_channel::Receiver<(Index, usize, LoadOutcome)>,
}

impl<Index: Send + 'static> ContentPipeline<Index> {
    pub fn new(
        asset_accessor: Arc<dyn AssetAccessor>,
        factory: Arc<dyn ContentFactory>,
        renderer: Arc<dyn PrepareRendererResources>,
        task_processor: Arc<dyn TaskProcessor>,
    ) -> Self {
        let (sender, receiver) = async_channel::unbounded();
        Self {
            asset_accessor,
            factory,
            renderer,
            task_processor,
            in_flight: Slab::new(),
            sender,
            receiver,
        }
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Starts the network request -> decode -> prepare chain for `tile_index` (spec §4.4 steps
    /// 3-6). Overlay UV generation is driven by the caller before dispatch, since it needs the
    /// tileset's registered overlay providers, which the pipeline does not hold.
    pub fn start_load(
        &mut self,
        tile_index: Index,
        tile_id: TileId,
        request: TileRequest,
        transform: [[f64; 4]; 4],
        requested_projections: Vec<u32>,
    ) {
        let slot = self.in_flight.insert(InFlight);
        let asset_accessor = self.asset_accessor.clone();
        let factory = self.factory.clone();
        let renderer = self.renderer.clone();
        let sender = self.sender.clone();

        self.task_processor.start_task(Box::pin(async move {
            let outcome = load_over_network(
                &tile_id,
                request,
                transform,
                requested_projections,
                asset_accessor.as_ref(),
                factory.as_ref(),
                renderer.as_ref(),
            )
            .await;
            if sender.send((tile_index, slot, outcome)).await.is_err() {
                warn!("content pipeline result dropped: receiver closed");
            }
        }));
    }

    /// Starts the upsampling path (spec §4.4 "Upsampling path"). Eligibility (parent must be
    /// `Done` with a model) is checked by the caller before dispatch.
    pub fn start_upsample(
        &mut self,
        tile_index: Index,
        tile_id: TileId,
        parent_model: Model,
        parent_region: BoundingRegion,
        quadrant: Quadrant,
        transform: [[f64; 4]; 4],
    ) {
        let slot = self.in_flight.insert(InFlight);
        let renderer = self.renderer.clone();
        let sender = self.sender.clone();

        self.task_processor.start_task(Box::pin(async move {
            let outcome =
                upsample(&tile_id, parent_model, parent_region, quadrant, transform, renderer.as_ref());
            if sender.send((tile_index, slot, outcome)).await.is_err() {
                warn!("content pipeline upsample result dropped: receiver closed");
            }
        }));
    }

    /// Non-blocking poll for a completed load, to be called from the main-thread `update` loop.
    pub fn try_recv(&mut self) -> Option<CompletedLoad<Index>> {
        match self.receiver.try_recv() {
            Ok((tile_index, slot, outcome)) => {
                self.in_flight.remove(slot);
                Some(CompletedLoad { tile_index, outcome })
            }
            Err(_) => None,
        }
    }
}

async fn load_over_network(
    tile_id: &TileId,
    request: TileRequest,
    transform: [[f64; 4]; 4],
    requested_projections: Vec<u32>,
    asset_accessor: &dyn AssetAccessor,
    factory: &dyn ContentFactory,
    renderer: &dyn PrepareRendererResources,
) -> LoadOutcome {
    let response = match asset_accessor.get(request.url, request.headers).await {
        Ok(response) => response,
        Err(error) => {
            warn!(%error, "asset request failed");
            return LoadOutcome::FailedTemporarily {
                http_status_code: None,
            };
        }
    };

    // Status 0 means "unknown", per spec §4.4 step 5: trust the body rather than fail fast.
    if response.status_code != 0 && !(200..300).contains(&response.status_code) {
        return LoadOutcome::FailedTemporarily {
            http_status_code: Some(response.status_code),
        };
    }

    let model = match factory.decode(&response.data, response.content_type.as_deref()) {
        Ok(model) => model,
        Err(ContentError::Decode(message)) => {
            warn!(%message, "content decode failed");
            return LoadOutcome::Failed;
        }
        Err(error) => {
            warn!(%error, "content decode failed");
            return LoadOutcome::Failed;
        }
    };

    let overlay_texture_region = (!requested_projections.is_empty())
        .then_some(crate::overlay::UvRectangle::UNIT);

    let load_thread_result = Some(renderer.prepare_in_load_thread(tile_id, transform));

    LoadOutcome::Loaded {
        content: TileContent {
            model: Some(model),
            updated_bounding_volume: None,
            updated_content_bounding_volume: None,
            injected_children: Vec::new(),
            new_tile_context: None,
            available_tile_ranges: Vec::new(),
            http_status_code: Some(response.status_code),
            overlay_texture_region,
        },
        renderer_load_result: load_thread_result,
    }
}

fn upsample(
    tile_id: &TileId,
    parent_model: Model,
    parent_region: BoundingRegion,
    quadrant: Quadrant,
    transform: [[f64; 4]; 4],
    renderer: &dyn PrepareRendererResources,
) -> LoadOutcome {
    let model = synthesize_child_model(&parent_model);
    let region = quadrant_region(parent_region, quadrant);
    let load_thread_result = Some(renderer.prepare_in_load_thread(tile_id, transform));

    LoadOutcome::Loaded {
        content: TileContent {
            model: Some(model),
            updated_bounding_volume: Some(BoundingVolume::Region(region)),
            updated_content_bounding_volume: Some(BoundingVolume::Region(region)),
            injected_children: Vec::new(),
            new_tile_context: None,
            available_tile_ranges: Vec::new(),
            http_status_code: None,
            overlay_texture_region: None,
        },
        renderer_load_result: load_thread_result,
    }
}
