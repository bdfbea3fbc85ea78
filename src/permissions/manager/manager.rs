/*!
 * Protection Manager
 * Composed, cached decision entry point plus authoring and audit hooks
 */

use crate::audit::{AuditLog, ChangeKind};
use crate::cooldown::CooldownTracker;
use crate::core::config::GuardConfig;
use crate::core::errors::GuardError;
use crate::core::limits::MAX_COOLDOWN_ENTRIES;
use crate::core::types::{ActorId, BlockPos, GroupName, GuardResult};
use crate::groups::GroupService;
use crate::monitoring::{DecisionSpan, GuardMetrics, MetricsSnapshot};
use crate::permissions::cache::{CacheKey, CacheStats, DecisionCache};
use crate::permissions::policy::PolicyEngine;
use crate::permissions::types::{
    Decision, DecisionChecker, DecisionRequest, PermissionKind, RuleTier, Verdict,
};
use crate::regions::{Area, RegionObserver, RegionStore};
use crate::resolver::Resolver;
use ahash::RandomState;
use dashmap::DashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Central protection manager
pub struct ProtectionManager {
    store: Arc<RegionStore>,
    resolver: Resolver,
    policy: Arc<PolicyEngine>,
    cache: Arc<DecisionCache>,
    groups: Arc<dyn GroupService>,
    /// Actors with the operator override enabled
    operators: DashSet<ActorId, RandomState>,
    audit: Option<Arc<AuditLog>>,
    cooldowns: CooldownTracker,
    metrics: Arc<GuardMetrics>,
}

impl ProtectionManager {
    /// Build every component from configuration
    pub fn new(config: &GuardConfig, groups: Arc<dyn GroupService>) -> Self {
        debug!("Initializing protection manager");
        Self::with_parts(
            Arc::new(RegionStore::new(config.priority_ceiling, config.grid_cell_size)),
            Arc::new(DecisionCache::new(config.cache_capacity, config.cache_ttl())),
            PolicyEngine::new(config.permissions.clone()),
            groups,
            CooldownTracker::new(config.message_cooldown(), MAX_COOLDOWN_ENTRIES),
        )
    }

    /// Wire existing components; the cache is subscribed to store mutations
    pub fn with_parts(
        store: Arc<RegionStore>,
        cache: Arc<DecisionCache>,
        policy: PolicyEngine,
        groups: Arc<dyn GroupService>,
        cooldowns: CooldownTracker,
    ) -> Self {
        store.subscribe(Arc::clone(&cache) as Arc<dyn RegionObserver>);
        Self {
            resolver: Resolver::new(Arc::clone(&store)),
            store,
            policy: Arc::new(policy),
            cache,
            groups,
            operators: DashSet::with_hasher(RandomState::new()),
            audit: None,
            cooldowns,
            metrics: Arc::new(GuardMetrics::new()),
        }
    }

    /// Attach the audit log
    pub fn with_audit(mut self, audit: Arc<AuditLog>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn store(&self) -> &Arc<RegionStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<DecisionCache> {
        &self.cache
    }

    pub fn audit(&self) -> Option<&Arc<AuditLog>> {
        self.audit.as_ref()
    }

    /// Governing area at a point
    pub fn resolve(&self, world: &str, pos: BlockPos) -> Option<Arc<Area>> {
        self.resolver.resolve_highest_priority(world, pos)
    }

    /// Every area at a point, in decision order
    pub fn resolve_all(&self, world: &str, pos: BlockPos) -> Vec<Arc<Area>> {
        self.resolver.resolve_all(world, pos)
    }

    /// Decide whether `actor` may perform `kind` at a point
    ///
    /// Never fails: a group service failure evaluates the actor as groupless.
    pub fn decide(&self, world: &str, pos: BlockPos, actor: &str, kind: PermissionKind) -> Decision {
        let span = DecisionSpan::new(&self.metrics, world, actor, kind);
        let _entered = span.enter();

        let (decision, cached) = if self.operators.contains(actor) {
            let area = self.resolver.resolve_highest_priority(world, pos);
            (self.policy.decide(area.as_deref(), actor, &[], kind, true), false)
        } else {
            self.decide_cached(world, pos, actor, kind)
        };

        span.record_decision(&decision, cached);
        self.metrics.record_decision(&decision);
        decision
    }

    fn decide_cached(
        &self,
        world: &str,
        pos: BlockPos,
        actor: &str,
        kind: PermissionKind,
    ) -> (Decision, bool) {
        let chain = self.group_chain(actor);
        let key = CacheKey::new(world, pos, &chain, kind);

        if let Some(decision) = self.cache.get(&key) {
            return (self.apply_area_bypass(world, actor, decision), true);
        }

        // Generation read before the snapshot so a concurrent mutation voids the insert
        let generation = self.cache.generation(world);
        let area = self.resolver.resolve_highest_priority(world, pos);
        let decision = self.policy.decide(area.as_deref(), actor, &chain, kind, false);

        if !decision.tier.is_actor_specific() {
            self.cache.put(key, decision.clone(), generation);
        }
        (decision, false)
    }

    /// Cached entries are shared across actors; bypass sets are per actor
    fn apply_area_bypass(&self, world: &str, actor: &str, decision: Decision) -> Decision {
        let bypassed = decision
            .area
            .as_deref()
            .and_then(|name| self.store.get_in(world, name))
            .is_some_and(|area| area.is_bypassed_by(actor));

        if bypassed {
            Decision::new(decision.area, decision.kind, Verdict::Allow, RuleTier::AreaBypass)
        } else {
            decision
        }
    }

    fn group_chain(&self, actor: &str) -> Vec<GroupName> {
        match self.groups.group_chain(actor) {
            Ok(chain) => chain,
            Err(e) => {
                self.metrics.record_group_service_failure();
                warn!(actor = %actor, error = %e, "Group lookup failed, evaluating as groupless");
                Vec::new()
            }
        }
    }

    /// Decide and submit an interaction (allowed) or violation (denied) row
    ///
    /// Points outside every area produce no row.
    pub fn decide_and_audit(
        &self,
        world: &str,
        pos: BlockPos,
        actor: &str,
        kind: PermissionKind,
    ) -> Decision {
        let decision = self.decide(world, pos, actor, kind);
        if let (Some(audit), Some(area)) = (&self.audit, &decision.area) {
            if decision.is_allowed() {
                audit.record_interaction(area.clone(), actor, kind);
            } else {
                audit.record_violation(area.clone(), actor, kind);
            }
        }
        decision
    }

    /// Enable or disable the operator override for an actor
    pub fn set_bypass(&self, actor: &str, enabled: bool) {
        if enabled {
            self.operators.insert(actor.into());
        } else {
            self.operators.remove(actor);
        }
        info!(actor = %actor, enabled, "Operator bypass changed");
    }

    pub fn is_bypassing(&self, actor: &str) -> bool {
        self.operators.contains(actor)
    }

    /// Create or replace an area and record the change
    pub fn upsert_area(&self, actor: &str, area: Area) -> GuardResult<Option<Arc<Area>>> {
        let name = area.name.clone();
        let detail = describe(&area);
        let previous = self.store.upsert(area)?;

        if let Some(audit) = &self.audit {
            let change = if previous.is_some() {
                ChangeKind::Modify
            } else {
                ChangeKind::Create
            };
            audit.record_modification(name.clone(), actor, change, detail);
        }
        info!(area = %name, actor = %actor, replaced = previous.is_some(), "Area saved");
        Ok(previous)
    }

    /// Delete an area and record the change
    pub fn remove_area(&self, actor: &str, name: &str) -> GuardResult<Arc<Area>> {
        let removed = self
            .store
            .remove(name)
            .ok_or_else(|| GuardError::NotFound(name.into()))?;

        if let Some(audit) = &self.audit {
            audit.record_modification(name, actor, ChangeKind::Delete, describe(&removed));
        }
        info!(area = %name, actor = %actor, "Area removed");
        Ok(removed)
    }

    /// Whether to show a deny message to `actor` for `area` now
    pub fn should_notify(&self, actor: &str, area: &str) -> bool {
        self.cooldowns.should_notify(actor, area)
    }

    /// Forget per-actor state (operator flag, cooldowns)
    pub fn forget_actor(&self, actor: &str) {
        self.operators.remove(actor);
        self.cooldowns.forget_actor(actor);
    }

    /// Drop expired cache entries
    pub fn sweep_cache(&self) -> usize {
        self.cache.sweep_expired()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// One-line summary stored with modification rows
fn describe(area: &Area) -> String {
    format!(
        "world={} bounds={}..{} priority={}",
        area.world, area.bounds.min, area.bounds.max, area.priority
    )
}

impl DecisionChecker for ProtectionManager {
    fn check(&self, request: &DecisionRequest) -> Decision {
        self.decide(&request.world, request.pos, &request.actor, request.kind)
    }

    fn check_and_audit(&self, request: &DecisionRequest) -> Decision {
        self.decide_and_audit(&request.world, request.pos, &request.actor, request.kind)
    }
}
