/*!
 * Area Records
 * Named, prioritized, axis-aligned protected regions
 */

use crate::core::errors::ValidationError;
use crate::core::types::{ActorId, AreaId, Axis, BlockPos, GroupName, WorldId};
use crate::permissions::types::{PermissionKind, TriState};
use ahash::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

/// Inclusive axis-aligned bounding volume in block coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub min: BlockPos,
    pub max: BlockPos,
}

impl Bounds {
    /// Bounds from explicit min/max corners, unchecked
    pub const fn new(min: BlockPos, max: BlockPos) -> Self {
        Self { min, max }
    }

    /// Smallest bounds containing both corners, in any order
    pub fn spanning(a: impl Into<BlockPos>, b: impl Into<BlockPos>) -> Self {
        let (a, b) = (a.into(), b.into());
        Self {
            min: BlockPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: BlockPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// First axis where min > max, if any
    pub fn degenerate_axis(&self) -> Option<(Axis, i32, i32)> {
        if self.min.x > self.max.x {
            Some((Axis::X, self.min.x, self.max.x))
        } else if self.min.y > self.max.y {
            Some((Axis::Y, self.min.y, self.max.y))
        } else if self.min.z > self.max.z {
            Some((Axis::Z, self.min.z, self.max.z))
        } else {
            None
        }
    }

    #[inline]
    pub fn contains(&self, pos: BlockPos) -> bool {
        pos.x >= self.min.x
            && pos.x <= self.max.x
            && pos.y >= self.min.y
            && pos.y <= self.max.y
            && pos.z >= self.min.z
            && pos.z <= self.max.z
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Number of blocks enclosed (saturating)
    pub fn volume(&self) -> u64 {
        let span = |lo: i32, hi: i32| (i64::from(hi) - i64::from(lo) + 1).max(0) as u64;
        span(self.min.x, self.max.x)
            .saturating_mul(span(self.min.y, self.max.y))
            .saturating_mul(span(self.min.z, self.max.z))
    }
}

/// Protected area
///
/// Identity is the name; two areas with the same name are the same area,
/// regardless of world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub name: AreaId,
    pub world: WorldId,
    pub bounds: Bounds,
    #[serde(default)]
    pub priority: u32,
    /// Area defaults per permission kind
    #[serde(default)]
    pub flags: HashMap<PermissionKind, TriState>,
    /// Per-group overrides
    #[serde(default)]
    pub group_flags: HashMap<GroupName, HashMap<PermissionKind, TriState>>,
    /// Actors always allowed inside this area
    #[serde(default)]
    pub bypass: HashSet<ActorId>,
}

impl Area {
    /// New area with priority 0 and no rules
    pub fn new(name: impl Into<AreaId>, world: impl Into<WorldId>, bounds: Bounds) -> Self {
        Self {
            name: name.into(),
            world: world.into(),
            bounds,
            priority: 0,
            flags: HashMap::default(),
            group_flags: HashMap::default(),
            bypass: HashSet::default(),
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_flag(mut self, kind: PermissionKind, state: TriState) -> Self {
        self.set_flag(kind, state);
        self
    }

    pub fn with_group_flag(
        mut self,
        group: impl Into<GroupName>,
        kind: PermissionKind,
        state: TriState,
    ) -> Self {
        self.set_group_flag(group, kind, state);
        self
    }

    pub fn with_bypass(mut self, actor: impl Into<ActorId>) -> Self {
        self.bypass.insert(actor.into());
        self
    }

    /// Set an area default; `Inherit` clears it
    pub fn set_flag(&mut self, kind: PermissionKind, state: TriState) {
        match state {
            TriState::Inherit => {
                self.flags.remove(&kind);
            }
            _ => {
                self.flags.insert(kind, state);
            }
        }
    }

    /// Set a group override; `Inherit` clears it
    pub fn set_group_flag(&mut self, group: impl Into<GroupName>, kind: PermissionKind, state: TriState) {
        let group = group.into();
        match state {
            TriState::Inherit => {
                if let Some(overrides) = self.group_flags.get_mut(&group) {
                    overrides.remove(&kind);
                    if overrides.is_empty() {
                        self.group_flags.remove(&group);
                    }
                }
            }
            _ => {
                self.group_flags.entry(group).or_default().insert(kind, state);
            }
        }
    }

    /// Area default for a kind
    #[inline]
    pub fn flag(&self, kind: PermissionKind) -> TriState {
        self.flags.get(&kind).copied().unwrap_or_default()
    }

    /// Group override for a kind
    #[inline]
    pub fn group_flag(&self, group: &str, kind: PermissionKind) -> TriState {
        self.group_flags
            .get(group)
            .and_then(|overrides| overrides.get(&kind))
            .copied()
            .unwrap_or_default()
    }

    #[inline]
    pub fn is_bypassed_by(&self, actor: &str) -> bool {
        self.bypass.contains(actor)
    }

    #[inline]
    pub fn contains(&self, pos: BlockPos) -> bool {
        self.bounds.contains(pos)
    }

    /// Check structural invariants and the priority ceiling
    pub fn validate(&self, priority_ceiling: u32) -> Result<(), ValidationError> {
        if self.name.is_blank() {
            return Err(ValidationError::EmptyName);
        }
        if self.world.is_blank() {
            return Err(ValidationError::EmptyWorld {
                area: self.name.clone(),
            });
        }
        if let Some((axis, min, max)) = self.bounds.degenerate_axis() {
            return Err(ValidationError::DegenerateBounds {
                area: self.name.clone(),
                axis,
                min,
                max,
            });
        }
        if self.priority > priority_ceiling {
            return Err(ValidationError::PriorityAboveCeiling {
                area: self.name.clone(),
                priority: self.priority,
                ceiling: priority_ceiling,
            });
        }
        Ok(())
    }
}
