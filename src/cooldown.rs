/*!
 * Cooldown Tracker
 * Bounded per-(actor, area) throttle for deny notifications
 */

use crate::core::limits::{DEFAULT_MESSAGE_COOLDOWN_SECS, MAX_COOLDOWN_ENTRIES};
use crate::core::types::{ActorId, AreaId};
use ahash::RandomState;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Throttle keyed by (actor, area)
///
/// Holds at most `capacity` pairs. When full, expired pairs are evicted
/// first, then an arbitrary one.
pub struct CooldownTracker {
    last: DashMap<(ActorId, AreaId), Instant, RandomState>,
    cooldown: Duration,
    capacity: usize,
}

impl CooldownTracker {
    pub fn new(cooldown: Duration, capacity: usize) -> Self {
        Self {
            last: DashMap::with_hasher(RandomState::new()),
            cooldown,
            capacity: capacity.max(1),
        }
    }

    /// True at most once per cooldown window for a pair; marks the pair when true
    pub fn should_notify(&self, actor: &str, area: &str) -> bool {
        self.should_notify_at(actor, area, Instant::now())
    }

    fn should_notify_at(&self, actor: &str, area: &str, now: Instant) -> bool {
        let key = (ActorId::from(actor), AreaId::from(area));

        // Evict before taking the entry; it holds the shard lock
        if self.last.len() >= self.capacity && !self.last.contains_key(&key) {
            self.evict(now);
        }

        match self.last.entry(key) {
            Entry::Occupied(mut entry) => {
                if now.saturating_duration_since(*entry.get()) < self.cooldown {
                    return false;
                }
                entry.insert(now);
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                true
            }
        }
    }

    fn evict(&self, now: Instant) {
        let cooldown = self.cooldown;
        self.last
            .retain(|_, last| now.saturating_duration_since(*last) < cooldown);

        if self.last.len() >= self.capacity {
            if let Some(entry) = self.last.iter().next() {
                let victim = entry.key().clone();
                drop(entry);
                self.last.remove(&victim);
            }
        }
    }

    /// Forget every pair for an actor (e.g. on disconnect)
    pub fn forget_actor(&self, actor: &str) {
        self.last.retain(|(a, _), _| a != actor);
    }

    pub fn len(&self) -> usize {
        self.last.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_MESSAGE_COOLDOWN_SECS),
            MAX_COOLDOWN_ENTRIES,
        )
    }
}
