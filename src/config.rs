//! Tunables read by the core itself.
//!
//! This is deliberately narrow: selection policy, CLI surface and end-user configuration live
//! outside the crate. `TilesetOptions` only holds the knobs the state machine, cache and
//! availability index consult directly.

use serde::Deserialize;
use std::path::PathBuf;

/// Typical subtree depth used by real datasets (Cesium ion defaults to 5).
pub const DEFAULT_SUBTREE_LEVELS: u32 = 5;

/// Default cap on rows kept in the persistent response cache.
pub const DEFAULT_CACHE_MAX_ITEMS: u64 = 4096;

/// Default cap on concurrently in-flight tile loads.
pub const DEFAULT_MAX_CONCURRENT_LOADS: usize = 16;

/// Default cap on concurrently in-flight overlay loads (throttled independently of tile loads).
pub const DEFAULT_MAX_THROTTLED_OVERLAY_LOADS: usize = 20;

#[derive(Clone, Debug, Deserialize)]
pub struct TilesetOptions {
    /// Root content URL for the tileset. `None` means the root must be supplied by the caller.
    pub root_url: Option<String>,
    /// Depth of each installed availability subtree.
    #[serde(default = "default_subtree_levels")]
    pub subtree_levels: u32,
    /// Path to the persistent cache database. A `:memory:` path disables persistence across runs.
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,
    /// Row cap enforced by `Cache::prune`.
    #[serde(default = "default_cache_max_items")]
    pub cache_max_items: u64,
    /// Cap on concurrently in-flight tile content loads.
    #[serde(default = "default_max_concurrent_loads")]
    pub max_concurrent_loads: usize,
    /// Cap on concurrently in-flight overlay loads.
    #[serde(default = "default_max_throttled_overlay_loads")]
    pub max_throttled_overlay_loads: usize,
}

impl Default for TilesetOptions {
    fn default() -> Self {
        Self {
            root_url: None,
            subtree_levels: DEFAULT_SUBTREE_LEVELS,
            cache_path: default_cache_path(),
            cache_max_items: DEFAULT_CACHE_MAX_ITEMS,
            max_concurrent_loads: DEFAULT_MAX_CONCURRENT_LOADS,
            max_throttled_overlay_loads: DEFAULT_MAX_THROTTLED_OVERLAY_LOADS,
        }
    }
}

fn default_subtree_levels() -> u32 {
    DEFAULT_SUBTREE_LEVELS
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("tile_cache.sqlite")
}

fn default_cache_max_items() -> u64 {
    DEFAULT_CACHE_MAX_ITEMS
}

fn default_max_concurrent_loads() -> usize {
    DEFAULT_MAX_CONCURRENT_LOADS
}

fn default_max_throttled_overlay_loads() -> usize {
    DEFAULT_MAX_THROTTLED_OVERLAY_LOADS
}
