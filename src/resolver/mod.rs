/*!
 * Resolver
 * Picks the governing area for a world point
 *
 * Pure function of the region store's current snapshot. Among overlapping
 * areas the greatest priority wins; equal priorities go to the lexically
 * smaller name so the outcome never depends on index iteration order.
 */

use crate::core::types::BlockPos;
use crate::regions::{Area, RegionStore};
use std::cmp::Ordering;
use std::sync::Arc;

/// Decision order: higher priority first, then smaller name first
#[inline]
pub fn decision_order(a: &Area, b: &Area) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.name.cmp(&b.name))
}

/// Resolves points against a region store
#[derive(Clone)]
pub struct Resolver {
    store: Arc<RegionStore>,
}

impl Resolver {
    pub fn new(store: Arc<RegionStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<RegionStore> {
        &self.store
    }

    /// Winning area at `pos`, `None` if the point lies in no area
    pub fn resolve_highest_priority(&self, world: &str, pos: BlockPos) -> Option<Arc<Area>> {
        self.store
            .query_overlapping(world, pos)
            .min_by(|a, b| decision_order(a, b))
    }

    /// Every area at `pos`, in decision order
    pub fn resolve_all(&self, world: &str, pos: BlockPos) -> Vec<Arc<Area>> {
        let mut areas: Vec<_> = self.store.query_overlapping(world, pos).collect();
        areas.sort_by(|a, b| decision_order(a, b));
        areas
    }
}
