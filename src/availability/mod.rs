//! Quadtree availability index (spec §4.2).

mod index;
mod morton;
mod subtree;

pub use index::{AvailabilityError, AvailabilityFlags, AvailabilityIndex};
pub use subtree::{Accessor, Subtree};
