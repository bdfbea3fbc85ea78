/*!
 * Permission Types
 * Core vocabulary for area permission decisions
 */

use crate::core::types::{ActorId, AreaId, BlockPos, WorldId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Action kind guarded by an area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionKind {
    BlockBreak,
    BlockPlace,
    Pvp,
    Interact,
    ContainerAccess,
    CommandUse,
}

impl PermissionKind {
    /// Every kind, in declaration order
    pub const ALL: [PermissionKind; 6] = [
        PermissionKind::BlockBreak,
        PermissionKind::BlockPlace,
        PermissionKind::Pvp,
        PermissionKind::Interact,
        PermissionKind::ContainerAccess,
        PermissionKind::CommandUse,
    ];

    /// Actions that change or harm world state
    ///
    /// Destructive actions fall back to deny when no rule resolves and whenever
    /// the decision path degrades.
    pub const fn is_destructive(self) -> bool {
        matches!(
            self,
            PermissionKind::BlockBreak
                | PermissionKind::BlockPlace
                | PermissionKind::ContainerAccess
                | PermissionKind::Pvp
        )
    }

    /// Stable upper-case name used in audit tables and statistics
    pub const fn as_str(self) -> &'static str {
        match self {
            PermissionKind::BlockBreak => "BLOCK_BREAK",
            PermissionKind::BlockPlace => "BLOCK_PLACE",
            PermissionKind::Pvp => "PVP",
            PermissionKind::Interact => "INTERACT",
            PermissionKind::ContainerAccess => "CONTAINER_ACCESS",
            PermissionKind::CommandUse => "COMMAND_USE",
        }
    }
}

impl fmt::Display for PermissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tri-state rule value: a rule either decides or defers to the next tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriState {
    Allow,
    Deny,
    #[default]
    Inherit,
}

impl TriState {
    /// Decided value, `None` for inherit
    #[inline]
    pub const fn verdict(self) -> Option<Verdict> {
        match self {
            TriState::Allow => Some(Verdict::Allow),
            TriState::Deny => Some(Verdict::Deny),
            TriState::Inherit => None,
        }
    }
}

impl From<Verdict> for TriState {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Allow => TriState::Allow,
            Verdict::Deny => TriState::Deny,
        }
    }
}

/// Final allow/deny outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Allow,
    Deny,
}

/// Rule tier that produced a decision, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleTier {
    /// Per-actor operator override flag
    OperatorBypass,
    /// Actor listed in the area's bypass set
    AreaBypass,
    /// Per-group override found while walking the group chain
    GroupOverride,
    /// The area's own default for the action
    AreaDefault,
    /// Global default from configuration
    GlobalDefault,
    /// Configured last-resort policy
    Fallback,
}

impl RuleTier {
    /// Tier depends on who the actor is, not only on their groups
    pub const fn is_actor_specific(self) -> bool {
        matches!(self, RuleTier::OperatorBypass | RuleTier::AreaBypass)
    }
}

/// Resolved decision
///
/// Ephemeral: cached and returned to the caller, summarized into the audit
/// log, never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Winning area, `None` when the point lies in no area
    pub area: Option<AreaId>,
    pub kind: PermissionKind,
    pub verdict: Verdict,
    pub tier: RuleTier,
}

impl Decision {
    pub fn new(area: Option<AreaId>, kind: PermissionKind, verdict: Verdict, tier: RuleTier) -> Self {
        Self {
            area,
            kind,
            verdict,
            tier,
        }
    }

    /// Check if allowed
    #[inline]
    pub fn is_allowed(&self) -> bool {
        self.verdict == Verdict::Allow
    }

    #[inline]
    pub fn is_denied(&self) -> bool {
        self.verdict == Verdict::Deny
    }

    /// Human-readable reason, for logs and operator tooling
    pub fn reason(&self) -> String {
        let verdict = match self.verdict {
            Verdict::Allow => "Allowed",
            Verdict::Deny => "Denied",
        };
        match &self.area {
            Some(area) => format!("{} {} by {:?} in area '{}'", verdict, self.kind, self.tier, area),
            None => format!("{} {} by {:?} outside any area", verdict, self.kind, self.tier),
        }
    }
}

/// Intercepted action forwarded by the host's event glue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub world: WorldId,
    pub pos: BlockPos,
    pub actor: ActorId,
    pub kind: PermissionKind,
}

impl DecisionRequest {
    pub fn new(
        world: impl Into<WorldId>,
        pos: impl Into<BlockPos>,
        actor: impl Into<ActorId>,
        kind: PermissionKind,
    ) -> Self {
        Self {
            world: world.into(),
            pos: pos.into(),
            actor: actor.into(),
            kind,
        }
    }

    /// Block break request
    pub fn block_break(world: &str, pos: impl Into<BlockPos>, actor: &str) -> Self {
        Self::new(world, pos, actor, PermissionKind::BlockBreak)
    }

    /// Block place request
    pub fn block_place(world: &str, pos: impl Into<BlockPos>, actor: &str) -> Self {
        Self::new(world, pos, actor, PermissionKind::BlockPlace)
    }

    /// Container open request
    pub fn container_access(world: &str, pos: impl Into<BlockPos>, actor: &str) -> Self {
        Self::new(world, pos, actor, PermissionKind::ContainerAccess)
    }
}
