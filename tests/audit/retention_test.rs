/*!
 * Retention Tests
 * Rows older than the window are pruned from storage and statistics
 */

use area_guard::audit::{
    ActionRecord, AuditBackend, AuditLog, AuditRecord, ChangeKind, JsonlAuditStore,
    ModificationRecord, VIOLATION_STAT_KEY,
};
use area_guard::PermissionKind;
use pretty_assertions::assert_eq;
use std::time::{Duration, SystemTime};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[test]
fn test_cleanup_prunes_old_rows_only() {
    let dir = tempfile::tempdir().unwrap();
    let audit_dir = dir.path().join("audit");
    let log = AuditLog::open(&audit_dir, dir.path().join("backups"), 30 * DAY).unwrap();

    let now = SystemTime::now();
    log.record(AuditRecord::Violation(ActionRecord::at(
        "spawn",
        "steve",
        PermissionKind::BlockBreak,
        now - 31 * DAY,
    )));
    log.record(AuditRecord::Violation(ActionRecord::at(
        "spawn",
        "alex",
        PermissionKind::BlockBreak,
        now - DAY,
    )));
    log.record(AuditRecord::Modification(ModificationRecord::at(
        "spawn",
        "admin",
        ChangeKind::Create,
        "created",
        now - 40 * DAY,
    )));
    log.flush().unwrap();
    assert_eq!(log.interaction_stats("spawn")[VIOLATION_STAT_KEY], 2);

    let report = log.cleanup().unwrap();
    assert_eq!(report.violations, 1);
    assert_eq!(report.modifications, 1);
    assert_eq!(report.interactions, 0);
    assert_eq!(report.total(), 2);

    assert_eq!(log.interaction_stats("spawn")[VIOLATION_STAT_KEY], 1);
    assert!(log.recent_modifications("spawn", 10).is_empty());

    let second = log.cleanup().unwrap();
    assert!(second.is_empty());

    drop(log);
    let stored = JsonlAuditStore::open(&audit_dir).unwrap().load().unwrap();
    assert_eq!(stored.violations.len(), 1);
    assert_eq!(stored.violations[0].player_id, "alex");
    assert!(stored.modifications.is_empty());
}

#[test]
fn test_cleanup_before_explicit_cutoff() {
    let dir = tempfile::tempdir().unwrap();
    let log = AuditLog::open(dir.path().join("audit"), dir.path().join("backups"), 30 * DAY).unwrap();

    let now = SystemTime::now();
    for age in [1u32, 2, 3, 4] {
        log.record(AuditRecord::Interaction(ActionRecord::at(
            "market",
            "trader",
            PermissionKind::ContainerAccess,
            now - age * DAY,
        )));
    }

    let report = log.cleanup_before(now - DAY - DAY / 2).unwrap();
    assert_eq!(report.interactions, 3);
    assert_eq!(log.interaction_stats("market")["CONTAINER_ACCESS"], 1);
}

#[test]
fn test_rows_inside_window_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let audit_dir = dir.path().join("audit");
    let backups = dir.path().join("backups");

    {
        let log = AuditLog::open(&audit_dir, &backups, 7 * DAY).unwrap();
        log.record_interaction("spawn", "steve", PermissionKind::Interact);
        log.record(AuditRecord::Interaction(ActionRecord::at(
            "spawn",
            "steve",
            PermissionKind::Interact,
            SystemTime::now() - 8 * DAY,
        )));
        log.flush().unwrap();
    }

    let log = AuditLog::open(&audit_dir, &backups, 7 * DAY).unwrap();
    assert_eq!(log.interaction_stats("spawn")["INTERACT"], 2);

    log.cleanup().unwrap();
    assert_eq!(log.interaction_stats("spawn")["INTERACT"], 1);
}
