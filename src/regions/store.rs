/*!
 * Region Store
 * Authoritative area set, partitioned per world
 *
 * Each world is an RCU snapshot (areas by name plus a column grid). Queries
 * load a snapshot and never lock; authoring serializes on a writer lock,
 * builds the next snapshot, swaps it in and then notifies observers before
 * returning, so a mutation is complete only once dependent caches have
 * been invalidated.
 */

use super::area::{Area, Bounds};
use super::grid::GridIndex;
use crate::core::errors::GuardError;
use crate::core::limits::{DEFAULT_GRID_CELL_SIZE, DEFAULT_PRIORITY_CEILING};
use crate::core::rcu::RcuCell;
use crate::core::types::{AreaId, BlockPos, GuardResult, WorldId};
use ahash::{HashMap, HashSet, RandomState};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Snapshot file format version
const SNAPSHOT_VERSION: u32 = 1;

/// Notified synchronously after an area in `world` is created, updated or deleted
pub trait RegionObserver: Send + Sync {
    fn world_changed(&self, world: &WorldId);
}

/// Immutable view of one world's areas
#[derive(Debug, Clone)]
pub struct WorldRegions {
    areas: HashMap<AreaId, Arc<Area>>,
    grid: GridIndex,
}

impl WorldRegions {
    fn new(cell_size: i32) -> Self {
        Self {
            areas: HashMap::default(),
            grid: GridIndex::new(cell_size),
        }
    }

    fn insert(&mut self, area: Arc<Area>) {
        self.remove(&area.name);
        self.grid.insert(Arc::clone(&area));
        self.areas.insert(area.name.clone(), area);
    }

    fn remove(&mut self, name: &str) -> Option<Arc<Area>> {
        let old = self.areas.remove(name)?;
        self.grid.remove(name, &old.bounds);
        Some(old)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Area>> {
        self.areas.get(name)
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn areas(&self) -> impl Iterator<Item = &Arc<Area>> {
        self.areas.values()
    }
}

/// Lazy overlap query over one world snapshot
///
/// Yields each area containing the point exactly once, in unspecified order.
pub struct Overlapping {
    snapshot: Option<Arc<WorldRegions>>,
    pos: BlockPos,
    cell_index: usize,
    oversized_index: usize,
}

impl Iterator for Overlapping {
    type Item = Arc<Area>;

    fn next(&mut self) -> Option<Self::Item> {
        let snapshot = self.snapshot.as_ref()?;

        let cell = snapshot.grid.cell_candidates(self.pos);
        while let Some(area) = cell.get(self.cell_index) {
            self.cell_index += 1;
            if area.contains(self.pos) {
                return Some(Arc::clone(area));
            }
        }

        let oversized = snapshot.grid.oversized();
        while let Some(area) = oversized.get(self.oversized_index) {
            self.oversized_index += 1;
            if area.contains(self.pos) {
                return Some(Arc::clone(area));
            }
        }

        None
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AreaSnapshot {
    version: u32,
    areas: Vec<Area>,
}

/// Authoritative area store
pub struct RegionStore {
    worlds: DashMap<WorldId, Arc<RcuCell<WorldRegions>>, RandomState>,
    /// Area name to owning world
    owners: DashMap<AreaId, WorldId, RandomState>,
    /// Serializes authoring
    write_lock: Mutex<()>,
    observers: RwLock<Vec<Arc<dyn RegionObserver>>>,
    priority_ceiling: u32,
    cell_size: i32,
}

impl RegionStore {
    pub fn new(priority_ceiling: u32, cell_size: i32) -> Self {
        Self {
            worlds: DashMap::with_hasher(RandomState::new()),
            owners: DashMap::with_hasher(RandomState::new()),
            write_lock: Mutex::new(()),
            observers: RwLock::new(Vec::new()),
            priority_ceiling,
            cell_size: cell_size.max(1),
        }
    }

    /// Register a mutation observer
    pub fn subscribe(&self, observer: Arc<dyn RegionObserver>) {
        self.observers.write().push(observer);
    }

    pub fn priority_ceiling(&self) -> u32 {
        self.priority_ceiling
    }

    fn notify(&self, world: &WorldId) {
        for observer in self.observers.read().iter() {
            observer.world_changed(world);
        }
    }

    fn world_cell(&self, world: &WorldId) -> Arc<RcuCell<WorldRegions>> {
        let cell_size = self.cell_size;
        Arc::clone(
            self.worlds
                .entry(world.clone())
                .or_insert_with(|| Arc::new(RcuCell::new(WorldRegions::new(cell_size))))
                .value(),
        )
    }

    /// Insert or replace an area by name
    ///
    /// Returns the replaced version. On validation failure the store is unchanged.
    ///
    /// An area moving between worlds is published in its new world before it
    /// leaves the old one, so readers never see it in neither.
    pub fn upsert(&self, area: Area) -> GuardResult<Option<Arc<Area>>> {
        area.validate(self.priority_ceiling)?;

        let _guard = self.write_lock.lock();
        let area = Arc::new(area);
        let previous_world = self.owners.get(&area.name).map(|w| w.value().clone());

        let cell = self.world_cell(&area.world);
        let inserted = Arc::clone(&area);
        let before = cell.update(move |regions| regions.insert(inserted));
        let mut previous = before.get(&area.name).cloned();
        self.owners.insert(area.name.clone(), area.world.clone());

        if let Some(old_world) = previous_world.as_ref().filter(|w| **w != area.world) {
            if let Some(cell) = self.worlds.get(old_world).map(|c| Arc::clone(c.value())) {
                let name = area.name.clone();
                let before = cell.update(|regions| {
                    regions.remove(&name);
                });
                previous = before.get(&name).cloned();
            }
            self.notify(old_world);
        }
        self.notify(&area.world);

        debug!(
            area = %area.name,
            world = %area.world,
            priority = area.priority,
            replaced = previous.is_some(),
            "Area upserted"
        );
        Ok(previous)
    }

    /// Delete an area; no-op if absent
    pub fn remove(&self, name: &str) -> Option<Arc<Area>> {
        let _guard = self.write_lock.lock();
        let (_, world) = self.owners.remove(name)?;
        let cell = self.worlds.get(&world).map(|c| Arc::clone(c.value()))?;

        let before = cell.update(|regions| {
            regions.remove(name);
        });
        self.notify(&world);

        debug!(area = %name, world = %world, "Area removed");
        before.get(name).cloned()
    }

    /// Look up an area by name
    pub fn get(&self, name: &str) -> Option<Arc<Area>> {
        let world = self.owners.get(name)?.value().clone();
        self.get_in(&world, name)
    }

    /// Look up an area by name, failing with `NotFound`
    pub fn require(&self, name: &str) -> GuardResult<Arc<Area>> {
        self.get(name).ok_or_else(|| GuardError::NotFound(name.into()))
    }

    /// Look up an area known to live in `world`
    #[inline]
    pub fn get_in(&self, world: &str, name: &str) -> Option<Arc<Area>> {
        self.snapshot(world)?.get(name).cloned()
    }

    /// Current snapshot of a world
    #[inline]
    pub fn snapshot(&self, world: &str) -> Option<Arc<WorldRegions>> {
        self.worlds.get(world).map(|cell| cell.value().load())
    }

    /// All areas containing `pos`, lazily, in unspecified order
    pub fn query_overlapping(&self, world: &str, pos: BlockPos) -> Overlapping {
        Overlapping {
            snapshot: self.snapshot(world),
            pos,
            cell_index: 0,
            oversized_index: 0,
        }
    }

    /// All areas intersecting a volume, sorted by name
    ///
    /// Linear in the world's area count; meant for authoring, not the decision path.
    pub fn query_volume(&self, world: &str, bounds: &Bounds) -> Vec<Arc<Area>> {
        let Some(snapshot) = self.snapshot(world) else {
            return Vec::new();
        };
        let mut hits: Vec<_> = snapshot
            .areas()
            .filter(|area| area.bounds.intersects(bounds))
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.name.cmp(&b.name));
        hits
    }

    /// All areas of a world, sorted by name
    pub fn areas_in(&self, world: &str) -> Vec<Arc<Area>> {
        let Some(snapshot) = self.snapshot(world) else {
            return Vec::new();
        };
        let mut areas: Vec<_> = snapshot.areas().cloned().collect();
        areas.sort_by(|a, b| a.name.cmp(&b.name));
        areas
    }

    /// Worlds holding at least one area, sorted
    pub fn worlds(&self) -> Vec<WorldId> {
        let mut worlds: Vec<_> = self
            .worlds
            .iter()
            .filter(|entry| !entry.value().load().is_empty())
            .map(|entry| entry.key().clone())
            .collect();
        worlds.sort();
        worlds
    }

    /// Total number of areas
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Write every area to a JSON snapshot file (temp file + rename)
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> GuardResult<usize> {
        let path = path.as_ref();
        let mut areas: Vec<Area> = self
            .worlds()
            .iter()
            .flat_map(|world| self.areas_in(world))
            .map(|area| Area::clone(&area))
            .collect();
        areas.sort_by(|a, b| (&a.world, &a.name).cmp(&(&b.world, &b.name)));
        let count = areas.len();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        let snapshot = AreaSnapshot {
            version: SNAPSHOT_VERSION,
            areas,
        };
        std::fs::write(&tmp, serde_json::to_vec_pretty(&snapshot)?)?;
        std::fs::rename(&tmp, path)?;

        info!(path = %path.display(), areas = count, "Area snapshot saved");
        Ok(count)
    }

    /// Replace the store contents with a JSON snapshot file
    ///
    /// All-or-nothing: every area is validated before any is applied.
    pub fn load_snapshot(&self, path: impl AsRef<Path>) -> GuardResult<usize> {
        let path = path.as_ref();
        let raw = std::fs::read(path)?;
        let snapshot: AreaSnapshot = serde_json::from_slice(&raw)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(GuardError::Configuration(
                format!("unsupported area snapshot version {}", snapshot.version).into(),
            ));
        }
        for area in &snapshot.areas {
            area.validate(self.priority_ceiling)?;
        }

        let _guard = self.write_lock.lock();
        let mut touched: HashSet<WorldId> = self.worlds.iter().map(|e| e.key().clone()).collect();
        let mut rebuilt: HashMap<WorldId, WorldRegions> = HashMap::default();

        self.owners.clear();
        for area in snapshot.areas {
            let world = area.world.clone();
            self.owners.insert(area.name.clone(), world.clone());
            rebuilt
                .entry(world)
                .or_insert_with(|| WorldRegions::new(self.cell_size))
                .insert(Arc::new(area));
        }

        let count = self.owners.len();
        for world in &touched {
            if !rebuilt.contains_key(world) {
                if let Some(cell) = self.worlds.get(world) {
                    cell.value().swap(WorldRegions::new(self.cell_size));
                }
            }
        }
        for (world, regions) in rebuilt {
            self.world_cell(&world).swap(regions);
            touched.insert(world);
        }
        for world in &touched {
            self.notify(world);
        }

        info!(path = %path.display(), areas = count, "Area snapshot loaded");
        Ok(count)
    }
}

impl Default for RegionStore {
    fn default() -> Self {
        Self::new(DEFAULT_PRIORITY_CEILING, DEFAULT_GRID_CELL_SIZE)
    }
}
