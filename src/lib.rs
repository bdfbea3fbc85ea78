/*!
 * Area Guard Library
 * Spatial area resolution, tiered permission decisions and durable auditing
 */

pub mod audit;
pub mod cooldown;
pub mod core;
pub mod groups;
pub mod maintenance;
pub mod monitoring;
pub mod permissions;
pub mod regions;
pub mod resolver;

// Re-exports
pub use crate::audit::{AuditLog, ChangeKind, CleanupReport, ModificationRecord};
pub use crate::cooldown::CooldownTracker;
pub use crate::core::{
    ActorId, AreaId, BlockPos, GroupName, GuardConfig, GuardError, GuardResult, InlineString,
    StorageError, ValidationError, WorldId,
};
pub use crate::groups::{GroupService, StaticGroupService};
pub use crate::maintenance::{MaintenanceIntervals, MaintenanceTask};
pub use crate::monitoring::{init_tracing, GuardMetrics, MetricsSnapshot};
pub use crate::permissions::{
    Decision, DecisionCache, DecisionChecker, DecisionRequest, PermissionDefaults, PermissionKind,
    PolicyEngine, ProtectionManager, RuleTier, TriState, Verdict,
};
pub use crate::regions::{Area, Bounds, RegionObserver, RegionStore};
pub use crate::resolver::Resolver;
