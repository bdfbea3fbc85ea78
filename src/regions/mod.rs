/*!
 * Regions Module
 * Protected area records and the per-world spatial store
 */

pub mod area;
pub mod grid;
pub mod store;

pub use area::{Area, Bounds};
pub use grid::GridIndex;
pub use store::{Overlapping, RegionObserver, RegionStore, WorldRegions};
