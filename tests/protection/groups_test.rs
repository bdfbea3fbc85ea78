/*!
 * Group Service Tests
 * Identity service failures degrade to groupless evaluation
 */

use area_guard::core::GroupServiceError;
use area_guard::{
    Area, BlockPos, Bounds, GroupName, GroupService, GuardConfig, PermissionKind,
    ProtectionManager, RuleTier, TriState, Verdict,
};
use mockall::mock;
use mockall::predicate::eq;
use std::sync::Arc;

mock! {
    pub Groups {}

    impl GroupService for Groups {
        fn group_chain(&self, actor: &str) -> Result<Vec<GroupName>, GroupServiceError>;
    }
}

fn market() -> Area {
    Area::new("market", "world", Bounds::spanning((-20, 0, -20), (20, 128, 20)))
        .with_priority(3)
        .with_flag(PermissionKind::ContainerAccess, TriState::Deny)
        .with_group_flag("merchant", PermissionKind::ContainerAccess, TriState::Allow)
}

#[test]
fn test_group_chain_is_consulted_per_decision() {
    let mut groups = MockGroups::new();
    groups
        .expect_group_chain()
        .with(eq("trader"))
        .times(1)
        .returning(|_| Ok(vec![GroupName::from("merchant")]));

    let manager = ProtectionManager::new(&GuardConfig::default(), Arc::new(groups));
    manager.upsert_area("admin", market()).unwrap();

    let decision = manager.decide("world", BlockPos::new(0, 64, 0), "trader", PermissionKind::ContainerAccess);
    assert_eq!(decision.verdict, Verdict::Allow);
    assert_eq!(decision.tier, RuleTier::GroupOverride);
}

#[test]
fn test_service_failure_evaluates_as_groupless() {
    let mut groups = MockGroups::new();
    groups
        .expect_group_chain()
        .returning(|_| Err(GroupServiceError::Unavailable("timeout".into())));

    let manager = ProtectionManager::new(&GuardConfig::default(), Arc::new(groups));
    manager.upsert_area("admin", market()).unwrap();

    let decision = manager.decide("world", BlockPos::new(0, 64, 0), "trader", PermissionKind::ContainerAccess);
    assert_eq!(decision.verdict, Verdict::Deny);
    assert_eq!(decision.tier, RuleTier::AreaDefault);
    assert_eq!(manager.metrics().group_service_failures, 1);
}

#[test]
fn test_service_failure_outside_areas_uses_fallback() {
    let mut groups = MockGroups::new();
    groups
        .expect_group_chain()
        .returning(|_| Err(GroupServiceError::Unavailable("offline".into())));

    let manager = ProtectionManager::new(&GuardConfig::default(), Arc::new(groups));

    let destructive = manager.decide("world", BlockPos::new(500, 64, 500), "trader", PermissionKind::BlockBreak);
    assert_eq!(destructive.verdict, Verdict::Deny);
    assert_eq!(destructive.tier, RuleTier::Fallback);

    let informational = manager.decide("world", BlockPos::new(500, 64, 500), "trader", PermissionKind::CommandUse);
    assert_eq!(informational.verdict, Verdict::Allow);
}

#[test]
fn test_operator_skips_group_lookup() {
    let mut groups = MockGroups::new();
    groups.expect_group_chain().never();

    let manager = ProtectionManager::new(&GuardConfig::default(), Arc::new(groups));
    manager.upsert_area("admin", market()).unwrap();
    manager.set_bypass("op", true);

    let decision = manager.decide("world", BlockPos::new(0, 64, 0), "op", PermissionKind::ContainerAccess);
    assert_eq!(decision.tier, RuleTier::OperatorBypass);
}
