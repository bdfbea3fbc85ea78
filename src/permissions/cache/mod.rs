/*!
 * Decision Cache
 * TTL cache of resolved decisions keyed by world, block, group chain and kind
 *
 * Every world carries a generation counter bumped on each area mutation.
 * Entries remember the generation their caller observed before resolving;
 * a lookup treats any entry from an older generation as absent, so a decision
 * resolved against a superseded snapshot can never be served.
 */

use crate::core::limits::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_MINUTES};
use crate::core::types::{BlockPos, GroupName, WorldId};
use crate::core::InlineString;
use crate::permissions::types::{Decision, PermissionKind};
use crate::regions::RegionObserver;
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::trace;

/// Separator between chain entries in a group signature
const SIGNATURE_SEPARATOR: char = '\u{1f}';

/// Cache key
///
/// Quantization is the block, the resolution of area bounds, so one key never
/// spans an area boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub world: WorldId,
    pub pos: BlockPos,
    /// Exact ordered group chain
    pub groups: InlineString,
    pub kind: PermissionKind,
}

impl CacheKey {
    pub fn new(world: impl Into<WorldId>, pos: BlockPos, groups: &[GroupName], kind: PermissionKind) -> Self {
        Self {
            world: world.into(),
            pos,
            groups: group_signature(groups),
            kind,
        }
    }
}

/// Join a group chain into one signature string, preserving order
pub fn group_signature(groups: &[GroupName]) -> InlineString {
    let mut signature = InlineString::default();
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            signature.push_str(SIGNATURE_SEPARATOR.encode_utf8(&mut [0; 4]));
        }
        signature.push_str(group);
    }
    signature
}

/// Cached decision
struct CachedDecision {
    decision: Decision,
    generation: u64,
    /// `None` when the TTL runs past the clock's range
    expires_at: Option<Instant>,
}

impl CachedDecision {
    #[inline]
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Decision cache with TTL and bounded capacity
///
/// # Performance
/// - Cache-line aligned to keep the hit/miss counters off shared lines
#[repr(C, align(64))]
pub struct DecisionCache {
    cache: DashMap<CacheKey, CachedDecision, RandomState>,
    generations: DashMap<WorldId, u64, RandomState>,
    capacity: usize,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

impl DecisionCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            cache: DashMap::with_capacity_and_hasher(capacity.min(4096), RandomState::new()),
            generations: DashMap::with_hasher(RandomState::new()),
            capacity: capacity.max(1),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    /// Current generation of a world; read before resolving
    #[inline]
    pub fn generation(&self, world: &str) -> u64 {
        self.generations.get(world).map(|g| *g.value()).unwrap_or(0)
    }

    /// Get a live decision
    pub fn get(&self, key: &CacheKey) -> Option<Decision> {
        let current = self.generation(&key.world);

        if let Some(entry) = self.cache.get(key) {
            if entry.generation == current && entry.is_fresh(Instant::now()) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.decision.clone());
            }
            // Stale or expired, remove it
            drop(entry);
            self.cache.remove(key);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a decision resolved under `generation`
    ///
    /// Skipped when the world has already moved past that generation.
    pub fn put(&self, key: CacheKey, decision: Decision, generation: u64) {
        if generation != self.generation(&key.world) {
            trace!(world = %key.world, "Skipping cache insert for superseded generation");
            return;
        }

        if self.cache.len() >= self.capacity && !self.cache.contains_key(&key) {
            if let Some(entry) = self.cache.iter().next() {
                let victim = entry.key().clone();
                drop(entry);
                self.cache.remove(&victim);
            }
        }

        self.cache.insert(
            key,
            CachedDecision {
                decision,
                generation,
                expires_at: Instant::now().checked_add(self.ttl),
            },
        );
    }

    /// Drop every entry for a world and advance its generation
    pub fn invalidate_world(&self, world: &str) {
        // Bump first: an insert racing the retain below is already stale
        *self.generations.entry(world.into()).or_insert(0) += 1;
        self.cache.retain(|key, _| key.world != world);
        self.invalidations.fetch_add(1, Ordering::Relaxed);
        trace!(world = %world, "Decision cache invalidated");
    }

    /// Remove expired and superseded entries, returning how many were removed
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.cache.len();
        self.cache.retain(|key, entry| {
            entry.is_fresh(now) && entry.generation == self.generation(&key.world)
        });
        before.saturating_sub(self.cache.len())
    }

    /// Clear entire cache
    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            size: self.cache.len(),
            capacity: self.capacity,
            hits,
            misses,
            hit_rate,
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}

impl RegionObserver for DecisionCache {
    fn world_changed(&self, world: &WorldId) {
        self.invalidate_world(world);
    }
}

impl Default for DecisionCache {
    fn default() -> Self {
        Self::new(
            DEFAULT_CACHE_CAPACITY,
            Duration::from_secs(DEFAULT_CACHE_TTL_MINUTES * 60),
        )
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub invalidations: u64,
}
