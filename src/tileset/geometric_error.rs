//! `getNonZeroGeometricError` (spec §4.5), grounded in
//! `examples/original_source/Cesium3DTilesSelection/src/Tile.cpp`'s `Tile::getNonZeroGeometricError`.

use super::tile::TileIndex;
use super::tree::TileTree;

/// Cesium's `Math::EPSILON5`.
pub const EPSILON5: f64 = 0.00001;

/// Returns the tile's own geometric error if it's meaningfully non-zero; otherwise walks
/// ancestors, halving the effective error per generation skipped (an ancestor marked
/// "unconditionally refine" doesn't count as a doubling step, since it declares no model of its
/// own), and falls back to [`EPSILON5`] if no ancestor has a positive error.
pub fn non_zero_geometric_error(tree: &TileTree, index: TileIndex) -> f64 {
    let tile = tree.tile(index);
    if tile.geometric_error > EPSILON5 {
        return tile.geometric_error;
    }

    let mut divisor = 1.0;
    let mut current = tile.parent;
    while let Some(parent_index) = current {
        let parent = tree.tile(parent_index);
        if !parent.unconditionally_refine {
            divisor *= 2.0;
            if parent.geometric_error > EPSILON5 {
                return parent.geometric_error / divisor;
            }
        }
        current = parent.parent;
    }

    EPSILON5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentPipeline, RawContentFactory};
    use crate::io::{AssetAccessor, AssetError, AssetResponse, BoxFuture, InlineTaskProcessor, NullPrepareRendererResources};
    use crate::tileset::{BoundingRegion, BoundingVolume, GiveUpOnFailure, QuadtreeTileId, Tile, TileId};
    use std::sync::Arc;

    struct NoopAccessor;

    impl AssetAccessor for NoopAccessor {
        fn get(
            &self,
            _url: String,
            _headers: Vec<(String, String)>,
        ) -> BoxFuture<'static, Result<AssetResponse, AssetError>> {
            unreachable!("not exercised by these tests")
        }
    }

    fn region() -> BoundingVolume {
        BoundingVolume::Region(BoundingRegion {
            west: 0.0,
            south: 0.0,
            east: 1.0,
            north: 1.0,
            min_height: 0.0,
            max_height: 0.0,
        })
    }

    fn single_tile_tree(geometric_error: f64) -> TileTree {
        let root = Tile::new(
            TileId::Quadtree(QuadtreeTileId::new(0, 0, 0)),
            region(),
            geometric_error,
        );
        let renderer = Arc::new(NullPrepareRendererResources);
        let pipeline = ContentPipeline::new(
            Arc::new(NoopAccessor),
            Arc::new(RawContentFactory),
            renderer.clone(),
            Arc::new(InlineTaskProcessor),
        );
        TileTree::new(root, pipeline, renderer, Vec::new(), None, Arc::new(GiveUpOnFailure), 20)
    }

    #[test]
    fn own_error_wins_when_non_zero() {
        let tree = single_tile_tree(10.0);
        assert_eq!(non_zero_geometric_error(&tree, tree.root()), 10.0);
    }

    #[test]
    fn falls_back_to_epsilon_with_no_ancestors() {
        let tree = single_tile_tree(0.0);
        assert_eq!(non_zero_geometric_error(&tree, tree.root()), EPSILON5);
    }
}
