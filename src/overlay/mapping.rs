//! Per-tile raster overlay bindings and promotion/aggregation logic (spec §4.3).

use std::sync::Arc;

use crate::tileset::BoundingVolume;

use super::provider::{OverlayId, ProjectionId, RasterOverlayProvider};
use super::raster_tile::{MoreDetailAvailable, RasterTile, TextureTransform, UvRectangle};

/// One overlay's binding to a 3D tile.
pub struct RasterBinding {
    pub overlay_id: OverlayId,
    pub projection: ProjectionId,
    pub tile: RasterTile,
    pub uv: UvRectangle,
    pub transform: TextureTransform,
}

impl RasterBinding {
    fn placeholder(overlay_id: OverlayId, projection: ProjectionId) -> Self {
        Self {
            overlay_id,
            projection,
            tile: RasterTile::Placeholder,
            uv: UvRectangle::UNIT,
            transform: TextureTransform::default(),
        }
    }
}

/// For every registered provider without an existing binding, attempts to map it onto `region`.
/// Returns the set of newly attached projections so the caller can generate matching texture
/// coordinates (spec §4.3 item 1).
pub fn map_tile(
    bindings: &mut Vec<RasterBinding>,
    providers: &[Arc<dyn RasterOverlayProvider>],
    region: BoundingVolume,
    target_geometric_error: f64,
) -> Vec<ProjectionId> {
    let mut newly_attached = Vec::new();

    for provider in providers {
        if bindings.iter().any(|b| b.overlay_id == provider.id()) {
            continue;
        }

        if provider.is_placeholder() {
            bindings.push(RasterBinding::placeholder(provider.id(), provider.projection()));
            continue;
        }

        let tile = provider.map_region(region, target_geometric_error);
        bindings.push(RasterBinding {
            overlay_id: provider.id(),
            projection: provider.projection(),
            tile,
            uv: UvRectangle::UNIT,
            transform: TextureTransform::default(),
        });
        newly_attached.push(provider.projection());
    }

    newly_attached
}

/// Re-checks placeholder bindings now that their provider may have become real (spec §4.3 item
/// 2). Returns the projections of any binding that was just promoted, so the caller can decide
/// whether the tile needs to unload and reload with matching UVs.
pub fn promote_placeholders(
    bindings: &mut Vec<RasterBinding>,
    providers: &[Arc<dyn RasterOverlayProvider>],
    region: BoundingVolume,
    target_geometric_error: f64,
) -> Vec<ProjectionId> {
    let mut promoted = Vec::new();

    for binding in bindings.iter_mut() {
        if !matches!(binding.tile, RasterTile::Placeholder) {
            continue;
        }
        let Some(provider) = providers.iter().find(|p| p.id() == binding.overlay_id) else {
            continue;
        };
        if provider.is_placeholder() {
            continue;
        }
        binding.tile = provider.map_region(region, target_geometric_error);
        binding.projection = provider.projection();
        promoted.push(provider.projection());
    }

    promoted
}

/// Advances every non-placeholder binding's throttled load and aggregates the
/// `MoreDetailAvailable` signal across all bindings (spec §4.3 item 3).
pub fn update_bindings(
    bindings: &mut [RasterBinding],
    providers: &[Arc<dyn RasterOverlayProvider>],
    mut budget_remaining: usize,
) -> MoreDetailAvailable {
    let mut any_yes = false;
    let mut any_unknown = false;

    for binding in bindings.iter_mut() {
        if matches!(binding.tile, RasterTile::Placeholder) {
            any_unknown = true;
            continue;
        }
        let Some(provider) = providers.iter().find(|p| p.id() == binding.overlay_id) else {
            continue;
        };
        if budget_remaining > 0 && provider.load_throttled(&mut binding.tile, budget_remaining) {
            budget_remaining -= 1;
        }
        match &binding.tile {
            RasterTile::Ready {
                more_detail_available,
                ..
            } => match more_detail_available {
                MoreDetailAvailable::Yes => any_yes = true,
                MoreDetailAvailable::Unknown => any_unknown = true,
                MoreDetailAvailable::No => {}
            },
            RasterTile::Loading => any_unknown = true,
            RasterTile::Placeholder | RasterTile::Failed => {}
        }
    }

    if any_yes {
        MoreDetailAvailable::Yes
    } else if any_unknown {
        MoreDetailAvailable::Unknown
    } else {
        MoreDetailAvailable::No
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FakeProvider {
        id: OverlayId,
        projection: ProjectionId,
        placeholder: AtomicBool,
    }

    impl RasterOverlayProvider for FakeProvider {
        fn id(&self) -> OverlayId {
            self.id
        }
        fn projection(&self) -> ProjectionId {
            self.projection
        }
        fn is_placeholder(&self) -> bool {
            self.placeholder.load(Ordering::SeqCst)
        }
        fn map_region(&self, _region: BoundingVolume, _target_geometric_error: f64) -> RasterTile {
            RasterTile::Ready {
                image: super::super::raster_tile::RasterImage {
                    width: 1,
                    height: 1,
                    pixels: vec![0, 0, 0, 255],
                },
                transform: TextureTransform::default(),
                more_detail_available: MoreDetailAvailable::No,
            }
        }
        fn load_throttled(&self, _tile: &mut RasterTile, _budget_remaining: usize) -> bool {
            true
        }
    }

    fn region() -> BoundingVolume {
        BoundingVolume::Region(crate::tileset::BoundingRegion {
            west: 0.0,
            south: 0.0,
            east: 1.0,
            north: 1.0,
            min_height: 0.0,
            max_height: 0.0,
        })
    }

    #[test]
    fn placeholder_provider_yields_placeholder_binding() {
        let providers: Vec<Arc<dyn RasterOverlayProvider>> = vec![Arc::new(FakeProvider {
            id: 1,
            projection: 1,
            placeholder: AtomicBool::new(true),
        })];
        let mut bindings = Vec::new();
        let attached = map_tile(&mut bindings, &providers, region(), 1.0);
        assert!(attached.is_empty());
        assert!(matches!(bindings[0].tile, RasterTile::Placeholder));
    }

    #[test]
    fn promotion_replaces_placeholder_with_real_mapping() {
        let provider = Arc::new(FakeProvider {
            id: 1,
            projection: 1,
            placeholder: AtomicBool::new(true),
        });
        let providers: Vec<Arc<dyn RasterOverlayProvider>> = vec![provider.clone()];
        let mut bindings = Vec::new();
        map_tile(&mut bindings, &providers, region(), 1.0);

        provider.placeholder.store(false, Ordering::SeqCst);
        let promoted = promote_placeholders(&mut bindings, &providers, region(), 1.0);
        assert_eq!(promoted, vec![1]);
        assert!(matches!(bindings[0].tile, RasterTile::Ready { .. }));
    }
}
