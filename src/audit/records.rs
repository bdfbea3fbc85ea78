/*!
 * Audit Records
 * Append-only interaction, violation and modification rows
 */

use crate::core::types::{ActorId, AreaId};
use crate::permissions::types::PermissionKind;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampMilliSeconds};
use std::time::SystemTime;

/// Statistics key under which an area's violation count is reported
pub const VIOLATION_STAT_KEY: &str = "VIOLATION";

/// Interaction or violation row
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub area_id: AreaId,
    pub player_id: ActorId,
    pub action_type: PermissionKind,
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub timestamp: SystemTime,
}

impl ActionRecord {
    pub fn new(area: impl Into<AreaId>, actor: impl Into<ActorId>, kind: PermissionKind) -> Self {
        Self::at(area, actor, kind, SystemTime::now())
    }

    /// Row with an explicit timestamp (imports, replays)
    pub fn at(
        area: impl Into<AreaId>,
        actor: impl Into<ActorId>,
        kind: PermissionKind,
        timestamp: SystemTime,
    ) -> Self {
        Self {
            area_id: area.into(),
            player_id: actor.into(),
            action_type: kind,
            timestamp,
        }
    }
}

/// Kind of authoring change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    Create,
    Modify,
    Delete,
}

/// Area authoring row
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationRecord {
    pub area_id: AreaId,
    pub player_id: ActorId,
    pub change_type: ChangeKind,
    #[serde(default)]
    pub detail: String,
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub timestamp: SystemTime,
}

impl ModificationRecord {
    pub fn new(
        area: impl Into<AreaId>,
        actor: impl Into<ActorId>,
        change: ChangeKind,
        detail: impl Into<String>,
    ) -> Self {
        Self::at(area, actor, change, detail, SystemTime::now())
    }

    pub fn at(
        area: impl Into<AreaId>,
        actor: impl Into<ActorId>,
        change: ChangeKind,
        detail: impl Into<String>,
        timestamp: SystemTime,
    ) -> Self {
        Self {
            area_id: area.into(),
            player_id: actor.into(),
            change_type: change,
            detail: detail.into(),
            timestamp,
        }
    }
}

/// Any row accepted by the audit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "table", rename_all = "snake_case")]
pub enum AuditRecord {
    Interaction(ActionRecord),
    Violation(ActionRecord),
    Modification(ModificationRecord),
}

impl AuditRecord {
    pub fn area_id(&self) -> &AreaId {
        match self {
            AuditRecord::Interaction(r) | AuditRecord::Violation(r) => &r.area_id,
            AuditRecord::Modification(r) => &r.area_id,
        }
    }

    pub fn timestamp(&self) -> SystemTime {
        match self {
            AuditRecord::Interaction(r) | AuditRecord::Violation(r) => r.timestamp,
            AuditRecord::Modification(r) => r.timestamp,
        }
    }

    /// Table the row belongs to
    pub fn table(&self) -> AuditTable {
        match self {
            AuditRecord::Interaction(_) => AuditTable::Interactions,
            AuditRecord::Violation(_) => AuditTable::Violations,
            AuditRecord::Modification(_) => AuditTable::Modifications,
        }
    }
}

/// Persisted tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditTable {
    Interactions,
    Violations,
    Modifications,
}

impl AuditTable {
    pub const ALL: [AuditTable; 3] = [
        AuditTable::Interactions,
        AuditTable::Violations,
        AuditTable::Modifications,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            AuditTable::Interactions => "interactions",
            AuditTable::Violations => "violations",
            AuditTable::Modifications => "modifications",
        }
    }
}

/// Full contents of the three tables; also the backup document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditDataset {
    pub interactions: Vec<ActionRecord>,
    pub violations: Vec<ActionRecord>,
    pub modifications: Vec<ModificationRecord>,
}

impl AuditDataset {
    pub fn len(&self) -> usize {
        self.interactions.len() + self.violations.len() + self.modifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every row in table order, each table in insertion order
    pub fn into_records(self) -> impl Iterator<Item = AuditRecord> {
        self.interactions
            .into_iter()
            .map(AuditRecord::Interaction)
            .chain(self.violations.into_iter().map(AuditRecord::Violation))
            .chain(self.modifications.into_iter().map(AuditRecord::Modification))
    }
}

/// Rows removed by one retention cleanup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    pub interactions: usize,
    pub violations: usize,
    pub modifications: usize,
}

impl CleanupReport {
    pub fn total(&self) -> usize {
        self.interactions + self.violations + self.modifications
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
