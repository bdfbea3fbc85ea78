/*!
 * Audit Module
 * Durable, retention-bounded record of interactions, violations and area changes
 *
 * ## Usage
 * ```ignore
 * use area_guard::audit::AuditLog;
 *
 * let log = AuditLog::open("audit", "backups", retention)?;
 * log.record_violation("spawn", "steve", PermissionKind::BlockBreak);
 * log.flush()?;
 * assert_eq!(log.interaction_stats("spawn")["VIOLATION"], 1);
 * log.close()?;
 * ```
 */

mod index;
mod logger;
mod records;
mod store;

pub use index::AuditIndex;
pub use logger::AuditLog;
pub use records::{
    ActionRecord, AuditDataset, AuditRecord, AuditTable, ChangeKind, CleanupReport,
    ModificationRecord, VIOLATION_STAT_KEY,
};
pub use store::{write_backup, AuditBackend, JsonlAuditStore};
