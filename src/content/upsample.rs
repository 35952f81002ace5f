//! Sibling upsampling path (spec §4.4 "Upsampling path", §4.5 subdivision geometry), grounded in
//! `examples/original_source/Cesium3DTilesSelection/src/Tile.cpp`'s upsampled-children creation
//! logic (quadrant split of the parent region, halved geometric error).

use crate::content::factory::Model;
use crate::tileset::BoundingRegion;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quadrant {
    Sw,
    Se,
    Nw,
    Ne,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [Quadrant::Sw, Quadrant::Se, Quadrant::Nw, Quadrant::Ne];
}

/// Splits `parent` into the rectangle covered by one quadrant, matching the SW/SE/NW/NE layout
/// `Tile.cpp` derives from `QuadtreeTileID{level+1, x*2[+1], y*2[+1]}`.
pub fn quadrant_region(parent: BoundingRegion, quadrant: Quadrant) -> BoundingRegion {
    let mid_lon = (parent.west + parent.east) / 2.0;
    let mid_lat = (parent.south + parent.north) / 2.0;

    let (west, east) = match quadrant {
        Quadrant::Sw | Quadrant::Nw => (parent.west, mid_lon),
        Quadrant::Se | Quadrant::Ne => (mid_lon, parent.east),
    };
    let (south, north) = match quadrant {
        Quadrant::Sw | Quadrant::Se => (parent.south, mid_lat),
        Quadrant::Nw | Quadrant::Ne => (mid_lat, parent.north),
    };

    BoundingRegion {
        west,
        south,
        east,
        north,
        min_height: parent.min_height,
        max_height: parent.max_height,
    }
}

/// Synthesizes a child's model from its parent's decoded content. Real mesh clipping to the
/// quadrant is geodetic-math territory and out of scope (spec §1 Non-goals); this reuses the
/// parent's buffers so the state-machine and bounding-region contracts under test (spec §8
/// scenario 3) are exercised faithfully.
pub fn synthesize_child_model(parent: &Model) -> Model {
    parent.clone()
}
