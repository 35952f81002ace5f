//! Tile content pipeline (spec §4.4).

mod factory;
mod pipeline;
mod upsample;

pub use factory::{
    AvailableTileRange, Buffer, ContentError, ContentFactory, Image, InjectedChild, Model,
    RawContentFactory, TileContent, TileContext,
};
pub use pipeline::{CompletedLoad, ContentPipeline, LoadOutcome, TileRequest};
pub use upsample::{quadrant_region, synthesize_child_model, Quadrant};
