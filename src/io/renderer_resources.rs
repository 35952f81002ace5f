//! `PrepareRendererResources` (spec §6): the narrow interface by which decoded content crosses
//! into renderer-owned GPU (or otherwise opaque) resources. The renderer itself is out of scope
//! (spec §1 Non-goals); this crate only guarantees the prepare/free discipline around it.

use std::any::Any;

use crate::tileset::{RendererResource, TileId};

pub trait PrepareRendererResources: Send + Sync {
    /// Runs on the worker thread once content has decoded; returns an opaque load-thread result
    /// later handed to [`PrepareRendererResources::prepare_in_main_thread`].
    fn prepare_in_load_thread(
        &self,
        tile_id: &TileId,
        transform: [[f64; 4]; 4],
    ) -> Box<dyn Any + Send>;

    /// Runs on the main thread; produces the final renderer handle attached to the tile.
    fn prepare_in_main_thread(
        &self,
        tile_id: &TileId,
        load_thread_result: Box<dyn Any + Send>,
    ) -> RendererResource;

    /// Must be called on every exit path that produced a load-thread and/or main-thread resource,
    /// including failure after partial preparation (spec §5 resource discipline).
    fn free(
        &self,
        tile_id: &TileId,
        load_thread_resource: Option<Box<dyn Any + Send>>,
        main_thread_resource: Option<RendererResource>,
    );
}

/// No-op implementation used by tests (`SPEC_FULL.md` §10.4) and by upsampled/contentless tiles
/// that have nothing to upload.
pub struct NullPrepareRendererResources;

impl PrepareRendererResources for NullPrepareRendererResources {
    fn prepare_in_load_thread(
        &self,
        _tile_id: &TileId,
        _transform: [[f64; 4]; 4],
    ) -> Box<dyn Any + Send> {
        Box::new(())
    }

    fn prepare_in_main_thread(
        &self,
        _tile_id: &TileId,
        _load_thread_result: Box<dyn Any + Send>,
    ) -> RendererResource {
        RendererResource(Box::new(()))
    }

    fn free(
        &self,
        _tile_id: &TileId,
        _load_thread_resource: Option<Box<dyn Any + Send>>,
        _main_thread_resource: Option<RendererResource>,
    ) {
    }
}
