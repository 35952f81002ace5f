//! Tile lifecycle state machine (spec §4.5, §5).

use std::sync::atomic::{AtomicU8, Ordering};

/// `Unloaded -> ContentLoading -> ContentLoaded -> Done`, with `FailedTemporarily`/`Failed`
/// branches reachable from `ContentLoading`.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileState {
    Unloaded = 0,
    ContentLoading = 1,
    ContentLoaded = 2,
    Done = 3,
    FailedTemporarily = 4,
    Failed = 5,
}

impl TileState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => TileState::Unloaded,
            1 => TileState::ContentLoading,
            2 => TileState::ContentLoaded,
            3 => TileState::Done,
            4 => TileState::FailedTemporarily,
            5 => TileState::Failed,
            _ => unreachable!("invalid tile state encoding"),
        }
    }
}

/// Atomic wrapper so the main thread can observe a worker-driven transition without a lock
/// (spec §5: "release on store, acquire on load").
#[derive(Debug)]
pub struct AtomicTileState(AtomicU8);

impl AtomicTileState {
    pub fn new(state: TileState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub fn load(&self) -> TileState {
        TileState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, state: TileState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

impl Clone for AtomicTileState {
    fn clone(&self) -> Self {
        Self::new(self.load())
    }
}

/// Outcome of `failedTileCallback` (spec §6, §7).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailedTileDecision {
    GiveUp,
    Retry,
    Wait,
}

pub trait FailedTileCallback: Send + Sync {
    fn on_failed_tile(&self, http_status_code: Option<u16>) -> FailedTileDecision;
}

/// Default policy: give up permanently on any terminal failure, matching scenario 2 of spec §8.
pub struct GiveUpOnFailure;

impl FailedTileCallback for GiveUpOnFailure {
    fn on_failed_tile(&self, _http_status_code: Option<u16>) -> FailedTileDecision {
        FailedTileDecision::GiveUp
    }
}
