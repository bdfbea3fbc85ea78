/*!
 * End-to-End Scenario Tests
 * Author an area, decide inside it and read the audit trail back
 */

use area_guard::audit::VIOLATION_STAT_KEY;
use area_guard::{
    Area, AuditLog, BlockPos, Bounds, ChangeKind, DecisionChecker, DecisionRequest, GuardConfig,
    PermissionKind, ProtectionManager, RuleTier, StaticGroupService, TriState, Verdict,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    audit: Arc<AuditLog>,
    manager: ProtectionManager,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let audit = Arc::new(
        AuditLog::open(
            dir.path().join("audit"),
            dir.path().join("backups"),
            Duration::from_secs(30 * 24 * 60 * 60),
        )
        .unwrap(),
    );
    let manager = ProtectionManager::new(&GuardConfig::default(), Arc::new(StaticGroupService::new()))
        .with_audit(Arc::clone(&audit));

    Fixture {
        _dir: dir,
        audit,
        manager,
    }
}

fn spawn() -> Area {
    Area::new("spawn", "world", Bounds::spanning((0, 0, 0), (10, 255, 10)))
        .with_priority(1)
        .with_flag(PermissionKind::BlockBreak, TriState::Deny)
}

#[test]
fn test_block_break_in_spawn_is_denied_and_counted() {
    let fx = fixture();
    fx.manager.upsert_area("admin", spawn()).unwrap();

    let decision = fx
        .manager
        .decide_and_audit("world", BlockPos::new(5, 50, 5), "steve", PermissionKind::BlockBreak);
    assert_eq!(decision.verdict, Verdict::Deny);
    assert_eq!(decision.tier, RuleTier::AreaDefault);
    assert_eq!(decision.area.as_deref(), Some("spawn"));

    fx.audit.flush().unwrap();
    let stats = fx.audit.interaction_stats("spawn");
    assert_eq!(stats[VIOLATION_STAT_KEY], 1);
    assert!(!stats.contains_key("BLOCK_BREAK"));
}

#[test]
fn test_allowed_actions_are_counted_by_kind() {
    let fx = fixture();
    fx.manager
        .upsert_area(
            "admin",
            spawn().with_flag(PermissionKind::Interact, TriState::Allow),
        )
        .unwrap();

    for _ in 0..3 {
        fx.manager
            .decide_and_audit("world", BlockPos::new(1, 1, 1), "alex", PermissionKind::Interact);
    }
    // Outside every area: no row
    fx.manager
        .decide_and_audit("world", BlockPos::new(99, 1, 99), "alex", PermissionKind::Interact);

    fx.audit.flush().unwrap();
    let stats = fx.audit.interaction_stats("spawn");
    assert_eq!(stats["INTERACT"], 3);
    assert_eq!(stats[VIOLATION_STAT_KEY], 0);
}

#[test]
fn test_authoring_is_recorded_newest_first() {
    let fx = fixture();
    fx.manager.upsert_area("admin", spawn()).unwrap();
    fx.manager
        .upsert_area("builder", spawn().with_priority(2))
        .unwrap();
    fx.manager.remove_area("admin", "spawn").unwrap();

    fx.audit.flush().unwrap();
    let changes: Vec<_> = fx
        .audit
        .recent_modifications("spawn", 10)
        .into_iter()
        .map(|m| (m.change_type, m.player_id.to_string()))
        .collect();
    assert_eq!(
        changes,
        vec![
            (ChangeKind::Delete, "admin".to_string()),
            (ChangeKind::Modify, "builder".to_string()),
            (ChangeKind::Create, "admin".to_string()),
        ]
    );
}

#[test]
fn test_unknown_area_removal_is_not_found() {
    let fx = fixture();
    let err = fx.manager.remove_area("admin", "nowhere").unwrap_err();
    assert!(err.is_not_found());

    fx.audit.flush().unwrap();
    assert!(fx.audit.recent_modifications("nowhere", 10).is_empty());
}

#[test]
fn test_checker_interface_batches() {
    let fx = fixture();
    fx.manager.upsert_area("admin", spawn()).unwrap();
    let checker: &dyn DecisionChecker = &fx.manager;

    let decisions = checker.check_batch(&[
        DecisionRequest::block_break("world", (5, 5, 5), "steve"),
        DecisionRequest::new("world", (5, 5, 5), "steve", PermissionKind::CommandUse),
        DecisionRequest::block_break("world", (50, 5, 5), "steve"),
    ]);

    assert_eq!(decisions[0].verdict, Verdict::Deny);
    assert_eq!(decisions[1].verdict, Verdict::Allow);
    assert_eq!(decisions[2].area, None);
    assert_eq!(decisions[2].tier, RuleTier::Fallback);
}

#[test]
fn test_deny_notifications_are_throttled() {
    let fx = fixture();
    assert!(fx.manager.should_notify("steve", "spawn"));
    assert!(!fx.manager.should_notify("steve", "spawn"));
    assert!(fx.manager.should_notify("alex", "spawn"));

    fx.manager.forget_actor("steve");
    assert!(fx.manager.should_notify("steve", "spawn"));
}
