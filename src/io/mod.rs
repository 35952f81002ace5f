//! External interfaces the core consumes rather than implements (spec §6).

mod asset_accessor;
mod renderer_resources;
mod task_processor;

pub use asset_accessor::{AssetAccessor, AssetError, AssetResponse, CachingAssetAccessor};
pub use renderer_resources::{NullPrepareRendererResources, PrepareRendererResources};
pub use task_processor::{InlineTaskProcessor, TaskProcessor, TokioTaskProcessor};

pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;
