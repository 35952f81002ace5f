//! Crate-wide error glue.
//!
//! Each subsystem owns its own `thiserror` enum (`cache::CacheError`,
//! `availability::AvailabilityError`, `content::ContentError`, `tileset::TileError`); this module
//! only carries the `anyhow`-based wiring error used at construction time, never inside per-tile
//! update or load paths.

use thiserror::Error;

/// Errors raised while assembling a [`crate::tileset::TileTree`] from its pluggable collaborators.
#[derive(Debug, Error)]
pub enum WiringError {
    #[error("cache setup failed: {0}")]
    Cache(#[from] crate::cache::CacheError),
    #[error("invalid tileset configuration: {0}")]
    Config(String),
}

pub type Result<T> = anyhow::Result<T>;
