/*!
 * Decision Tests
 * Tier precedence through the protection manager
 */

use area_guard::{
    Area, BlockPos, Bounds, GuardConfig, PermissionDefaults, PermissionKind, ProtectionManager,
    RuleTier, StaticGroupService, TriState, Verdict,
};
use std::sync::Arc;

const WORLD: &str = "world";

fn manager_with(config: GuardConfig) -> (ProtectionManager, Arc<StaticGroupService>) {
    let groups = Arc::new(StaticGroupService::new());
    let manager = ProtectionManager::new(&config, groups.clone());
    (manager, groups)
}

fn spawn_area() -> Area {
    Area::new("spawn", WORLD, Bounds::spanning((0, 0, 0), (10, 255, 10))).with_priority(1)
}

#[test]
fn test_area_default_denies_groupless_actor() {
    let (manager, _) = manager_with(GuardConfig::default());
    manager
        .upsert_area(
            "admin",
            spawn_area().with_flag(PermissionKind::BlockBreak, TriState::Deny),
        )
        .unwrap();

    let decision = manager.decide(WORLD, BlockPos::new(5, 50, 5), "steve", PermissionKind::BlockBreak);
    assert_eq!(decision.verdict, Verdict::Deny);
    assert_eq!(decision.tier, RuleTier::AreaDefault);
    assert_eq!(decision.area.as_deref(), Some("spawn"));
}

#[test]
fn test_first_decided_group_in_chain_wins() {
    let (manager, groups) = manager_with(GuardConfig::default());
    manager
        .upsert_area(
            "admin",
            spawn_area()
                .with_flag(PermissionKind::BlockPlace, TriState::Deny)
                .with_group_flag("builder", PermissionKind::BlockPlace, TriState::Allow)
                .with_group_flag("default", PermissionKind::BlockPlace, TriState::Deny),
        )
        .unwrap();

    groups.assign("alex", ["visitor", "builder", "default"]);
    let decision = manager.decide(WORLD, BlockPos::new(1, 1, 1), "alex", PermissionKind::BlockPlace);
    assert_eq!(decision.verdict, Verdict::Allow);
    assert_eq!(decision.tier, RuleTier::GroupOverride);

    groups.assign("sam", ["default", "builder"]);
    let decision = manager.decide(WORLD, BlockPos::new(1, 1, 1), "sam", PermissionKind::BlockPlace);
    assert_eq!(decision.verdict, Verdict::Deny);
    assert_eq!(decision.tier, RuleTier::GroupOverride);
}

#[test]
fn test_area_bypass_beats_group_deny() {
    let (manager, groups) = manager_with(GuardConfig::default());
    manager
        .upsert_area(
            "admin",
            spawn_area()
                .with_group_flag("default", PermissionKind::Pvp, TriState::Deny)
                .with_bypass("owner"),
        )
        .unwrap();
    groups.assign("owner", ["default"]);

    let decision = manager.decide(WORLD, BlockPos::new(2, 2, 2), "owner", PermissionKind::Pvp);
    assert_eq!(decision.verdict, Verdict::Allow);
    assert_eq!(decision.tier, RuleTier::AreaBypass);
}

#[test]
fn test_operator_bypass_applies_everywhere() {
    let (manager, _) = manager_with(GuardConfig::default());
    manager
        .upsert_area(
            "admin",
            spawn_area().with_flag(PermissionKind::BlockBreak, TriState::Deny),
        )
        .unwrap();

    manager.set_bypass("op", true);
    assert!(manager.is_bypassing("op"));

    let inside = manager.decide(WORLD, BlockPos::new(5, 5, 5), "op", PermissionKind::BlockBreak);
    assert_eq!(inside.tier, RuleTier::OperatorBypass);
    assert!(inside.is_allowed());

    let outside = manager.decide(WORLD, BlockPos::new(500, 5, 5), "op", PermissionKind::BlockBreak);
    assert_eq!(outside.tier, RuleTier::OperatorBypass);
    assert!(outside.is_allowed());

    manager.set_bypass("op", false);
    let after = manager.decide(WORLD, BlockPos::new(5, 5, 5), "op", PermissionKind::BlockBreak);
    assert_eq!(after.tier, RuleTier::AreaDefault);
    assert!(after.is_denied());
}

#[test]
fn test_global_default_applies_outside_areas() {
    let config = GuardConfig {
        permissions: PermissionDefaults::default().with_global(PermissionKind::Pvp, TriState::Allow),
        ..GuardConfig::default()
    };
    let (manager, _) = manager_with(config);

    let decision = manager.decide(WORLD, BlockPos::new(0, 64, 0), "steve", PermissionKind::Pvp);
    assert_eq!(decision.area, None);
    assert_eq!(decision.verdict, Verdict::Allow);
    assert_eq!(decision.tier, RuleTier::GlobalDefault);
}

#[test]
fn test_fallback_splits_destructive_and_informational() {
    let (manager, _) = manager_with(GuardConfig::default());
    manager.upsert_area("admin", spawn_area()).unwrap();

    for kind in PermissionKind::ALL {
        let decision = manager.decide(WORLD, BlockPos::new(3, 3, 3), "steve", kind);
        assert_eq!(decision.tier, RuleTier::Fallback, "{}", kind);
        let expected = if kind.is_destructive() {
            Verdict::Deny
        } else {
            Verdict::Allow
        };
        assert_eq!(decision.verdict, expected, "{}", kind);
    }
}

#[test]
fn test_configured_fallback_overrides_built_in() {
    let config = GuardConfig {
        permissions: PermissionDefaults::default()
            .with_fallback(PermissionKind::BlockBreak, Verdict::Allow),
        ..GuardConfig::default()
    };
    let (manager, _) = manager_with(config);

    let decision = manager.decide(WORLD, BlockPos::new(3, 3, 3), "steve", PermissionKind::BlockBreak);
    assert_eq!(decision.verdict, Verdict::Allow);
    assert_eq!(decision.tier, RuleTier::Fallback);
}

#[test]
fn test_higher_priority_area_decides() {
    let (manager, _) = manager_with(GuardConfig::default());
    manager
        .upsert_area(
            "admin",
            spawn_area().with_flag(PermissionKind::Interact, TriState::Deny),
        )
        .unwrap();
    manager
        .upsert_area(
            "admin",
            Area::new("shop", WORLD, Bounds::spanning((4, 0, 4), (6, 100, 6)))
                .with_priority(5)
                .with_flag(PermissionKind::Interact, TriState::Allow),
        )
        .unwrap();

    let in_shop = manager.decide(WORLD, BlockPos::new(5, 50, 5), "steve", PermissionKind::Interact);
    assert_eq!(in_shop.area.as_deref(), Some("shop"));
    assert!(in_shop.is_allowed());

    let in_spawn = manager.decide(WORLD, BlockPos::new(1, 50, 1), "steve", PermissionKind::Interact);
    assert_eq!(in_spawn.area.as_deref(), Some("spawn"));
    assert!(in_spawn.is_denied());
}
