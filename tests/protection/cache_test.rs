/*!
 * Decision Cache Tests
 * Cached decisions never outlive the area state they were resolved against
 */

use area_guard::{
    Area, BlockPos, Bounds, GuardConfig, PermissionKind, ProtectionManager, RuleTier,
    StaticGroupService, TriState, Verdict,
};
use std::sync::Arc;
use std::thread;

const WORLD: &str = "world";

fn manager() -> Arc<ProtectionManager> {
    Arc::new(ProtectionManager::new(
        &GuardConfig::default(),
        Arc::new(StaticGroupService::new()),
    ))
}

fn base(state: TriState) -> Area {
    Area::new("spawn", WORLD, Bounds::spanning((0, 0, 0), (10, 255, 10)))
        .with_priority(1)
        .with_flag(PermissionKind::Interact, state)
}

#[test]
fn test_repeat_decision_is_served_from_cache() {
    let manager = manager();
    manager.upsert_area("admin", base(TriState::Deny)).unwrap();
    let pos = BlockPos::new(5, 50, 5);

    let first = manager.decide(WORLD, pos, "steve", PermissionKind::Interact);
    let second = manager.decide(WORLD, pos, "steve", PermissionKind::Interact);
    assert_eq!(first, second);

    let stats = manager.cache_stats();
    assert_eq!(stats.size, 1);
    assert_eq!(stats.hits, 1);
}

#[test]
fn test_overlapping_upsert_changes_next_decision() {
    let manager = manager();
    manager.upsert_area("admin", base(TriState::Deny)).unwrap();
    let pos = BlockPos::new(5, 50, 5);

    let before = manager.decide(WORLD, pos, "steve", PermissionKind::Interact);
    assert_eq!(before.verdict, Verdict::Deny);

    manager
        .upsert_area(
            "admin",
            Area::new("plaza", WORLD, Bounds::spanning((4, 40, 4), (6, 60, 6)))
                .with_priority(10)
                .with_flag(PermissionKind::Interact, TriState::Allow),
        )
        .unwrap();

    let after = manager.decide(WORLD, pos, "steve", PermissionKind::Interact);
    assert_eq!(after.verdict, Verdict::Allow);
    assert_eq!(after.area.as_deref(), Some("plaza"));
    assert_eq!(after.tier, RuleTier::AreaDefault);
}

#[test]
fn test_removal_invalidates_cached_decision() {
    let manager = manager();
    manager.upsert_area("admin", base(TriState::Deny)).unwrap();
    let pos = BlockPos::new(5, 50, 5);

    assert!(manager.decide(WORLD, pos, "steve", PermissionKind::Interact).is_denied());
    manager.remove_area("admin", "spawn").unwrap();

    let after = manager.decide(WORLD, pos, "steve", PermissionKind::Interact);
    assert_eq!(after.area, None);
    assert_eq!(after.tier, RuleTier::Fallback);
}

#[test]
fn test_mutation_in_other_world_keeps_entries() {
    let manager = manager();
    manager.upsert_area("admin", base(TriState::Deny)).unwrap();
    manager.decide(WORLD, BlockPos::new(5, 50, 5), "steve", PermissionKind::Interact);
    assert_eq!(manager.cache_stats().size, 1);

    manager
        .upsert_area(
            "admin",
            Area::new("hub", "nether", Bounds::spanning((0, 0, 0), (1, 1, 1))),
        )
        .unwrap();
    assert_eq!(manager.cache_stats().size, 1);
}

#[test]
fn test_area_bypass_not_shared_through_cache() {
    let manager = manager();
    manager
        .upsert_area("admin", base(TriState::Deny).with_bypass("owner"))
        .unwrap();
    let pos = BlockPos::new(5, 50, 5);

    let owner = manager.decide(WORLD, pos, "owner", PermissionKind::Interact);
    assert_eq!(owner.tier, RuleTier::AreaBypass);

    let guest = manager.decide(WORLD, pos, "guest", PermissionKind::Interact);
    assert_eq!(guest.verdict, Verdict::Deny);
    assert_eq!(guest.tier, RuleTier::AreaDefault);

    // Now served from the cache, still per actor
    let owner_again = manager.decide(WORLD, pos, "owner", PermissionKind::Interact);
    assert_eq!(owner_again.tier, RuleTier::AreaBypass);
    assert!(owner_again.is_allowed());
}

#[test]
fn test_concurrent_decisions_settle_on_last_write() {
    let manager = manager();
    manager.upsert_area("admin", base(TriState::Deny)).unwrap();
    let pos = BlockPos::new(5, 50, 5);

    let readers: Vec<_> = (0..4)
        .map(|i| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                let actor = format!("reader-{}", i);
                for _ in 0..500 {
                    let decision = manager.decide(WORLD, pos, &actor, PermissionKind::Interact);
                    assert_eq!(decision.area.as_deref(), Some("spawn"));
                    assert_eq!(decision.tier, RuleTier::AreaDefault);
                }
            })
        })
        .collect();

    let writer = {
        let manager = Arc::clone(&manager);
        thread::spawn(move || {
            for i in 0..200 {
                let state = if i % 2 == 0 { TriState::Allow } else { TriState::Deny };
                manager.upsert_area("admin", base(state)).unwrap();
            }
        })
    };

    for reader in readers {
        reader.join().unwrap();
    }
    writer.join().unwrap();

    // The last write was Deny (i = 199); nothing stale may survive it
    for i in 0..4 {
        let decision = manager.decide(WORLD, pos, &format!("reader-{}", i), PermissionKind::Interact);
        assert_eq!(decision.verdict, Verdict::Deny);
    }
}
