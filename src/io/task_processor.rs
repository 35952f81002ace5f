//! `ITaskProcessor` (spec §6): submits a unit of work to the worker pool.

use super::BoxFuture;

pub trait TaskProcessor: Send + Sync {
    fn start_task(&self, task: BoxFuture<'static, ()>);
}

/// Dispatches onto the ambient tokio runtime, the direct equivalent of
/// `examples/terrence2-nitrogen/libs/wgpu-buffer/terrain_geo/src/tile/manager.rs`'s
/// `async_rt.spawn(...)` worker dispatch (pack reference, adapted since nitrogen is not the
/// teacher for this crate).
pub struct TokioTaskProcessor {
    handle: tokio::runtime::Handle,
}

impl TokioTaskProcessor {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }
}

impl TaskProcessor for TokioTaskProcessor {
    fn start_task(&self, task: BoxFuture<'static, ()>) {
        self.handle.spawn(task);
    }
}

/// Runs tasks inline on the calling thread via `futures::executor::block_on`, used by tests so
/// the whole pipeline is driven deterministically without a real thread pool (`SPEC_FULL.md`
/// §10.4). Test fakes never suspend on real I/O, so blocking here never stalls.
pub struct InlineTaskProcessor;

impl TaskProcessor for InlineTaskProcessor {
    fn start_task(&self, task: BoxFuture<'static, ()>) {
        futures::executor::block_on(task);
    }
}
