/*!
 * Policy Engine
 * Ordered rule stages with early exit
 *
 * Each stage either decides (Allow/Deny) or abstains; the first stage that
 * decides produces the verdict and its tier. Stages run in precedence order:
 * operator bypass, area bypass set, group overrides, area default, global
 * default, fallback. The fallback stage always decides.
 */

use super::context::EvaluationContext;
use super::defaults::PermissionDefaults;
use crate::core::types::GroupName;
use crate::permissions::types::{Decision, PermissionKind, RuleTier, TriState, Verdict};
use crate::regions::Area;
use tracing::trace;

/// Stage outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    Deny,
    Abstain,
}

impl From<TriState> for PolicyDecision {
    fn from(state: TriState) -> Self {
        match state {
            TriState::Allow => PolicyDecision::Allow,
            TriState::Deny => PolicyDecision::Deny,
            TriState::Inherit => PolicyDecision::Abstain,
        }
    }
}

impl From<Verdict> for PolicyDecision {
    fn from(verdict: Verdict) -> Self {
        PolicyDecision::from(TriState::from(verdict))
    }
}

/// One precedence stage
pub trait Policy: Send + Sync {
    /// Evaluate a request
    fn evaluate(&self, context: &EvaluationContext<'_>) -> PolicyDecision;

    /// Tier reported when this stage decides
    fn tier(&self) -> RuleTier;

    /// Policy name
    fn name(&self) -> &str;
}

/// Operator override flag allows unconditionally
pub struct OperatorBypassPolicy;

impl Policy for OperatorBypassPolicy {
    fn evaluate(&self, context: &EvaluationContext<'_>) -> PolicyDecision {
        if context.bypassing {
            PolicyDecision::Allow
        } else {
            PolicyDecision::Abstain
        }
    }

    fn tier(&self) -> RuleTier {
        RuleTier::OperatorBypass
    }

    fn name(&self) -> &str {
        "operator-bypass"
    }
}

/// Actors in the area's bypass set are allowed
pub struct AreaBypassPolicy;

impl Policy for AreaBypassPolicy {
    fn evaluate(&self, context: &EvaluationContext<'_>) -> PolicyDecision {
        match context.area {
            Some(area) if area.is_bypassed_by(context.actor) => PolicyDecision::Allow,
            _ => PolicyDecision::Abstain,
        }
    }

    fn tier(&self) -> RuleTier {
        RuleTier::AreaBypass
    }

    fn name(&self) -> &str {
        "area-bypass"
    }
}

/// First group in the chain with a non-inherit override wins
pub struct GroupOverridePolicy;

impl Policy for GroupOverridePolicy {
    fn evaluate(&self, context: &EvaluationContext<'_>) -> PolicyDecision {
        let Some(area) = context.area else {
            return PolicyDecision::Abstain;
        };
        context
            .groups
            .iter()
            .map(|group| area.group_flag(group, context.kind))
            .find(|state| *state != TriState::Inherit)
            .map(PolicyDecision::from)
            .unwrap_or(PolicyDecision::Abstain)
    }

    fn tier(&self) -> RuleTier {
        RuleTier::GroupOverride
    }

    fn name(&self) -> &str {
        "group-override"
    }
}

/// The area's own default for the action
pub struct AreaDefaultPolicy;

impl Policy for AreaDefaultPolicy {
    fn evaluate(&self, context: &EvaluationContext<'_>) -> PolicyDecision {
        context
            .area
            .map(|area| PolicyDecision::from(area.flag(context.kind)))
            .unwrap_or(PolicyDecision::Abstain)
    }

    fn tier(&self) -> RuleTier {
        RuleTier::AreaDefault
    }

    fn name(&self) -> &str {
        "area-default"
    }
}

/// Configured global default
pub struct GlobalDefaultPolicy {
    defaults: PermissionDefaults,
}

impl Policy for GlobalDefaultPolicy {
    fn evaluate(&self, context: &EvaluationContext<'_>) -> PolicyDecision {
        PolicyDecision::from(self.defaults.global(context.kind))
    }

    fn tier(&self) -> RuleTier {
        RuleTier::GlobalDefault
    }

    fn name(&self) -> &str {
        "global-default"
    }
}

/// Configured last-resort verdict; never abstains
pub struct FallbackPolicy {
    defaults: PermissionDefaults,
}

impl Policy for FallbackPolicy {
    fn evaluate(&self, context: &EvaluationContext<'_>) -> PolicyDecision {
        PolicyDecision::from(self.defaults.fallback(context.kind))
    }

    fn tier(&self) -> RuleTier {
        RuleTier::Fallback
    }

    fn name(&self) -> &str {
        "fallback"
    }
}

/// Policy engine that evaluates requests through the ordered stages
pub struct PolicyEngine {
    policies: Vec<Box<dyn Policy>>,
    defaults: PermissionDefaults,
}

impl PolicyEngine {
    pub fn new(defaults: PermissionDefaults) -> Self {
        let policies: Vec<Box<dyn Policy>> = vec![
            Box::new(OperatorBypassPolicy),
            Box::new(AreaBypassPolicy),
            Box::new(GroupOverridePolicy),
            Box::new(AreaDefaultPolicy),
            Box::new(GlobalDefaultPolicy {
                defaults: defaults.clone(),
            }),
            Box::new(FallbackPolicy {
                defaults: defaults.clone(),
            }),
        ];
        Self { policies, defaults }
    }

    pub fn defaults(&self) -> &PermissionDefaults {
        &self.defaults
    }

    /// Decide for an already-resolved area
    pub fn decide(
        &self,
        area: Option<&Area>,
        actor: &str,
        groups: &[GroupName],
        kind: PermissionKind,
        bypassing: bool,
    ) -> Decision {
        self.evaluate(&EvaluationContext::new(area, actor, groups, kind, bypassing))
    }

    /// Evaluate a context through all stages
    pub fn evaluate(&self, context: &EvaluationContext<'_>) -> Decision {
        let area = context.area.map(|area| area.name.clone());

        for policy in &self.policies {
            let verdict = match policy.evaluate(context) {
                PolicyDecision::Allow => Verdict::Allow,
                PolicyDecision::Deny => Verdict::Deny,
                PolicyDecision::Abstain => continue,
            };
            trace!(
                policy = policy.name(),
                actor = context.actor,
                kind = %context.kind,
                ?verdict,
                "Policy decided"
            );
            return Decision::new(area, context.kind, verdict, policy.tier());
        }

        // Unreachable with the fallback stage in place; keep the safe default anyway
        Decision::new(
            area,
            context.kind,
            PermissionDefaults::built_in_fallback(context.kind),
            RuleTier::Fallback,
        )
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new(PermissionDefaults::default())
    }
}
