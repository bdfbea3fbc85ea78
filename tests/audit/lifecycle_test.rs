/*!
 * Audit Lifecycle Tests
 * Close drains pending rows into storage and a timestamped backup
 */

use area_guard::audit::{AuditDataset, AuditLog, ChangeKind};
use area_guard::core::StorageError;
use area_guard::PermissionKind;
use pretty_assertions::assert_eq;
use std::fs;
use std::time::Duration;

fn open(dir: &tempfile::TempDir) -> AuditLog {
    AuditLog::open(
        dir.path().join("audit"),
        dir.path().join("backups"),
        Duration::from_secs(30 * 24 * 60 * 60),
    )
    .unwrap()
}

#[test]
fn test_close_backs_up_everything_submitted() {
    let dir = tempfile::tempdir().unwrap();
    let log = open(&dir);

    for i in 0..50 {
        log.record_violation("spawn", &format!("actor-{}", i), PermissionKind::BlockBreak);
    }
    log.record_interaction("spawn", "steve", PermissionKind::Interact);
    log.record_modification("spawn", "admin", ChangeKind::Create, "priority=1");

    let backup = log.close().unwrap().unwrap();
    let name = backup.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("audit-backup-"));
    assert!(name.ends_with("Z.json"));

    let dataset: AuditDataset = serde_json::from_slice(&fs::read(&backup).unwrap()).unwrap();
    assert_eq!(dataset.violations.len(), 50);
    assert_eq!(dataset.interactions.len(), 1);
    assert_eq!(dataset.modifications.len(), 1);
    assert_eq!(dataset.modifications[0].detail, "priority=1");
}

#[test]
fn test_close_is_idempotent_and_rejects_late_rows() {
    let dir = tempfile::tempdir().unwrap();
    let log = open(&dir);

    assert!(log.close().unwrap().is_some());
    assert!(log.is_closed());
    assert!(log.close().unwrap().is_none());

    log.record_violation("spawn", "late", PermissionKind::Pvp);
    assert_eq!(log.rejected(), 1);
    assert!(matches!(log.cleanup(), Err(StorageError::WriterStopped)));
}

#[test]
fn test_recent_modifications_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let log = open(&dir);

    log.record_modification("spawn", "admin", ChangeKind::Create, "v1");
    log.record_modification("spawn", "admin", ChangeKind::Modify, "v2");
    log.record_modification("spawn", "builder", ChangeKind::Modify, "v3");
    log.flush().unwrap();

    let recent = log.recent_modifications("spawn", 2);
    let details: Vec<_> = recent.iter().map(|m| m.detail.as_str()).collect();
    assert_eq!(details, vec!["v3", "v2"]);
    assert!(log.recent_modifications("elsewhere", 2).is_empty());
}

#[test]
fn test_history_survives_close_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let log = open(&dir);
        log.record_violation("spawn", "steve", PermissionKind::BlockPlace);
        log.record_modification("spawn", "admin", ChangeKind::Delete, "gone");
        log.close().unwrap();
    }

    let log = open(&dir);
    assert_eq!(log.interaction_stats("spawn")["VIOLATION"], 1);
    let recent = log.recent_modifications("spawn", 5);
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].change_type, ChangeKind::Delete);
}
