//! Sparse quadtree availability index (spec §4.2), grounded in
//! `examples/original_source/CesiumGeometry/src/QuadtreeAvailability.cpp`.

use bitflags::bitflags;
use thiserror::Error;

use super::morton;
use super::subtree::{level_offset, Subtree};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct AvailabilityFlags: u8 {
        const REACHABLE         = 0b0000_0001;
        const TILE_AVAILABLE    = 0b0000_0010;
        const CONTENT_AVAILABLE = 0b0000_0100;
        const SUBTREE_AVAILABLE = 0b0000_1000;
        const SUBTREE_LOADED    = 0b0001_0000;
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("level is out of range for this index")]
    LevelOutOfRange,
    #[error("a subtree already occupies this slot")]
    DuplicateSubtree,
    #[error("the parent subtree for this level is not installed")]
    MissingParentSubtree,
}

/// Root-anchored sparse tree of fixed-depth [`Subtree`]s, answering availability queries for any
/// (level, x, y) quadtree tile in O(depth / subtree_levels).
pub struct AvailabilityIndex {
    subtree_levels: u32,
    maximum_level: Option<u32>,
    root: Option<Box<Subtree>>,
}

impl AvailabilityIndex {
    pub fn new(subtree_levels: u32, maximum_level: Option<u32>) -> Self {
        Self {
            subtree_levels,
            maximum_level,
            root: None,
        }
    }

    pub fn subtree_levels(&self) -> u32 {
        self.subtree_levels
    }

    pub fn compute_availability(&self, level: u32, x: u32, y: u32) -> AvailabilityFlags {
        let Some(root) = self.root.as_deref() else {
            return AvailabilityFlags::empty();
        };
        if let Some(max_level) = self.maximum_level {
            if level > max_level {
                return AvailabilityFlags::empty();
            }
        }

        let mut node = root;
        let mut node_level = 0u32;

        loop {
            let level_difference = (level - node_level).min(self.subtree_levels);

            if level_difference < self.subtree_levels {
                let mask = (1u32 << level_difference) - 1;
                let relative_x = (x & mask) as u16;
                let relative_y = (y & mask) as u16;
                let relative_morton = morton::index(relative_x, relative_y);
                let availability_index = relative_morton + level_offset(level_difference);

                let mut flags = AvailabilityFlags::REACHABLE;
                if node.tile_availability.is_set(availability_index) {
                    flags |= AvailabilityFlags::TILE_AVAILABLE;
                }
                if node.content_availability.is_set(availability_index) {
                    flags |= AvailabilityFlags::CONTENT_AVAILABLE;
                }
                if level_difference == 0 {
                    flags |= AvailabilityFlags::SUBTREE_AVAILABLE | AvailabilityFlags::SUBTREE_LOADED;
                }
                return flags;
            }

            let child_level = node_level + self.subtree_levels;
            let shift = level - child_level;
            let child_mask = (1u32 << self.subtree_levels) - 1;
            let child_x = ((x >> shift) & child_mask) as u16;
            let child_y = ((y >> shift) & child_mask) as u16;
            let child_morton = morton::index(child_x, child_y);

            if !node.subtree_availability.is_set(child_morton) {
                return AvailabilityFlags::REACHABLE;
            }

            match node.child_subtree(child_morton) {
                Some(child) => {
                    node = child;
                    node_level = child_level;
                }
                None => {
                    if level == child_level {
                        return AvailabilityFlags::REACHABLE
                            | AvailabilityFlags::TILE_AVAILABLE
                            | AvailabilityFlags::SUBTREE_AVAILABLE;
                    }
                    return AvailabilityFlags::REACHABLE;
                }
            }
        }
    }

    pub fn add_subtree(
        &mut self,
        level: u32,
        x: u32,
        y: u32,
        subtree: Subtree,
    ) -> Result<(), AvailabilityError> {
        if level == 0 {
            if self.root.is_some() {
                return Err(AvailabilityError::DuplicateSubtree);
            }
            self.root = Some(Box::new(subtree));
            return Ok(());
        }

        if level % self.subtree_levels != 0 {
            return Err(AvailabilityError::LevelOutOfRange);
        }

        let Some(root) = self.root.as_deref_mut() else {
            return Err(AvailabilityError::MissingParentSubtree);
        };

        let mut node = root;
        let mut node_level = 0u32;

        loop {
            let child_level = node_level + self.subtree_levels;
            let shift = level - child_level;
            let child_mask = (1u32 << self.subtree_levels) - 1;
            let child_x = ((x >> shift) & child_mask) as u16;
            let child_y = ((y >> shift) & child_mask) as u16;
            let child_morton = morton::index(child_x, child_y);

            if child_level == level {
                return node
                    .install_child_subtree(child_morton, subtree)
                    .map_err(|()| AvailabilityError::DuplicateSubtree);
            }

            node = node
                .child_subtree_mut(child_morton)
                .ok_or(AvailabilityError::MissingParentSubtree)?;
            node_level = child_level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::subtree::Accessor;
    use super::*;

    fn all_available_subtree(levels: u32) -> Subtree {
        Subtree::new(
            levels,
            Accessor::Constant(true),
            Accessor::Constant(true),
            Accessor::Constant(false),
        )
    }

    #[test]
    fn empty_index_is_unreachable() {
        let index = AvailabilityIndex::new(4, None);
        assert_eq!(index.compute_availability(0, 0, 0), AvailabilityFlags::empty());
    }

    #[test]
    fn root_tile_is_available_and_subtree_loaded() {
        let mut index = AvailabilityIndex::new(4, None);
        index.add_subtree(0, 0, 0, all_available_subtree(4)).unwrap();
        let flags = index.compute_availability(0, 0, 0);
        assert!(flags.contains(AvailabilityFlags::TILE_AVAILABLE));
        assert!(flags.contains(AvailabilityFlags::CONTENT_AVAILABLE));
        assert!(flags.contains(AvailabilityFlags::SUBTREE_AVAILABLE));
        assert!(flags.contains(AvailabilityFlags::SUBTREE_LOADED));
    }

    #[test]
    fn tile_within_loaded_subtree_is_available_without_loaded_flag() {
        let mut index = AvailabilityIndex::new(4, None);
        index.add_subtree(0, 0, 0, all_available_subtree(4)).unwrap();
        let flags = index.compute_availability(2, 3, 1);
        assert!(flags.contains(AvailabilityFlags::TILE_AVAILABLE));
        assert!(!flags.contains(AvailabilityFlags::SUBTREE_LOADED));
    }

    #[test]
    fn beyond_maximum_level_is_unreachable() {
        let mut index = AvailabilityIndex::new(4, Some(3));
        index.add_subtree(0, 0, 0, all_available_subtree(4)).unwrap();
        assert_eq!(index.compute_availability(4, 0, 0), AvailabilityFlags::empty());
    }

    #[test]
    fn child_subtree_known_available_but_not_yet_loaded() {
        // subtree_availability marks morton index 0 available, but no child Subtree is installed.
        let root = Subtree::new(
            2,
            Accessor::Constant(true),
            Accessor::Constant(true),
            Accessor::Buffer(vec![0b0000_0001]),
        );
        let mut index = AvailabilityIndex::new(2, None);
        index.add_subtree(0, 0, 0, root).unwrap();

        let flags = index.compute_availability(2, 0, 0);
        assert!(flags.contains(AvailabilityFlags::TILE_AVAILABLE));
        assert!(flags.contains(AvailabilityFlags::SUBTREE_AVAILABLE));
        assert!(!flags.contains(AvailabilityFlags::SUBTREE_LOADED));
    }

    #[test]
    fn duplicate_root_subtree_rejected() {
        let mut index = AvailabilityIndex::new(4, None);
        index.add_subtree(0, 0, 0, all_available_subtree(4)).unwrap();
        assert_eq!(
            index.add_subtree(0, 0, 0, all_available_subtree(4)),
            Err(AvailabilityError::DuplicateSubtree)
        );
    }

    #[test]
    fn add_subtree_without_parent_fails() {
        let mut index = AvailabilityIndex::new(4, None);
        assert_eq!(
            index.add_subtree(4, 0, 0, all_available_subtree(4)),
            Err(AvailabilityError::MissingParentSubtree)
        );
    }
}
