/*!
 * Column Grid Index
 * Coarse uniform grid bucketing areas by (x, z) cell for point queries
 *
 * A point maps to exactly one cell, so a point query only bound-tests the
 * areas registered in that cell. Areas spanning more than
 * `MAX_GRID_CELLS_PER_AREA` cells are not registered per cell; they live in
 * an oversized list that every query scans linearly. Worlds dominated by a
 * few huge areas therefore degrade to a linear scan of those areas, which
 * is a cost trade-off and never changes results.
 */

use super::area::{Area, Bounds};
use crate::core::limits::MAX_GRID_CELLS_PER_AREA;
use crate::core::types::BlockPos;
use ahash::HashMap;
use std::sync::Arc;

type CellKey = (i32, i32);

#[derive(Debug, Clone)]
pub struct GridIndex {
    cell_size: i32,
    cells: HashMap<CellKey, Vec<Arc<Area>>>,
    oversized: Vec<Arc<Area>>,
}

impl GridIndex {
    pub fn new(cell_size: i32) -> Self {
        Self {
            cell_size: cell_size.max(1),
            cells: HashMap::default(),
            oversized: Vec::new(),
        }
    }

    #[inline]
    fn cell_of(&self, x: i32, z: i32) -> CellKey {
        (x.div_euclid(self.cell_size), z.div_euclid(self.cell_size))
    }

    /// Inclusive cell range covered by bounds
    fn cell_range(&self, bounds: &Bounds) -> (CellKey, CellKey) {
        (
            self.cell_of(bounds.min.x, bounds.min.z),
            self.cell_of(bounds.max.x, bounds.max.z),
        )
    }

    fn cell_count(lo: CellKey, hi: CellKey) -> u64 {
        let span = |a: i32, b: i32| (i64::from(b) - i64::from(a) + 1).max(0) as u64;
        span(lo.0, hi.0).saturating_mul(span(lo.1, hi.1))
    }

    fn is_oversized(&self, bounds: &Bounds) -> bool {
        let (lo, hi) = self.cell_range(bounds);
        Self::cell_count(lo, hi) > MAX_GRID_CELLS_PER_AREA
    }

    pub fn insert(&mut self, area: Arc<Area>) {
        if self.is_oversized(&area.bounds) {
            self.oversized.push(area);
            return;
        }
        let (lo, hi) = self.cell_range(&area.bounds);
        for cx in lo.0..=hi.0 {
            for cz in lo.1..=hi.1 {
                self.cells.entry((cx, cz)).or_default().push(Arc::clone(&area));
            }
        }
    }

    /// Remove an area previously inserted with these bounds
    pub fn remove(&mut self, name: &str, bounds: &Bounds) {
        if self.is_oversized(bounds) {
            self.oversized.retain(|a| a.name != name);
            return;
        }
        let (lo, hi) = self.cell_range(bounds);
        for cx in lo.0..=hi.0 {
            for cz in lo.1..=hi.1 {
                if let Some(bucket) = self.cells.get_mut(&(cx, cz)) {
                    bucket.retain(|a| a.name != name);
                    if bucket.is_empty() {
                        self.cells.remove(&(cx, cz));
                    }
                }
            }
        }
    }

    /// Areas registered in the cell holding `pos`; bounds not yet tested
    #[inline]
    pub fn cell_candidates(&self, pos: BlockPos) -> &[Arc<Area>] {
        self.cells
            .get(&self.cell_of(pos.x, pos.z))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[inline]
    pub fn oversized(&self) -> &[Arc<Area>] {
        &self.oversized
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}
