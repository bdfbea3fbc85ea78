/*!
 * Resolver Tests
 * Winner selection under overlap, against a brute-force oracle
 */

use area_guard::{Area, BlockPos, Bounds, RegionStore, Resolver};
use proptest::prelude::*;
use std::sync::Arc;

fn resolver(areas: Vec<Area>) -> Resolver {
    let store = Arc::new(RegionStore::default());
    for area in areas {
        store.upsert(area).unwrap();
    }
    Resolver::new(store)
}

fn cube(name: &str, priority: u32, a: (i32, i32, i32), b: (i32, i32, i32)) -> Area {
    Area::new(name, "world", Bounds::spanning(a, b)).with_priority(priority)
}

#[test]
fn test_point_outside_every_area() {
    let resolver = resolver(vec![cube("a", 1, (0, 0, 0), (10, 10, 10))]);
    assert!(resolver
        .resolve_highest_priority("world", BlockPos::new(-1, 5, 5))
        .is_none());
    assert!(resolver
        .resolve_highest_priority("other", BlockPos::new(5, 5, 5))
        .is_none());
}

#[test]
fn test_point_inside_single_area() {
    let resolver = resolver(vec![
        cube("a", 1, (0, 0, 0), (10, 10, 10)),
        cube("b", 9, (20, 0, 20), (30, 10, 30)),
    ]);
    let winner = resolver
        .resolve_highest_priority("world", BlockPos::new(10, 10, 10))
        .unwrap();
    assert_eq!(winner.name, "a");
}

#[test]
fn test_priority_ten_beats_five() {
    let resolver = resolver(vec![
        cube("five", 5, (0, 0, 0), (10, 10, 10)),
        cube("ten", 10, (0, 0, 0), (10, 10, 10)),
    ]);
    let winner = resolver
        .resolve_highest_priority("world", BlockPos::new(3, 3, 3))
        .unwrap();
    assert_eq!(winner.name, "ten");
}

#[test]
fn test_tie_is_deterministic_across_insert_order() {
    for order in [["b", "a"], ["a", "b"]] {
        let resolver = resolver(
            order
                .iter()
                .map(|name| cube(name, 7, (0, 0, 0), (4, 4, 4)))
                .collect(),
        );
        let winner = resolver
            .resolve_highest_priority("world", BlockPos::new(1, 1, 1))
            .unwrap();
        assert_eq!(winner.name, "a");
    }
}

#[test]
fn test_world_sized_area_still_resolves() {
    let resolver = resolver(vec![
        cube("world-guard", 0, (-30_000_000, -64, -30_000_000), (30_000_000, 320, 30_000_000)),
        cube("spawn", 1, (0, 0, 0), (10, 255, 10)),
    ]);

    let inside = resolver
        .resolve_highest_priority("world", BlockPos::new(5, 50, 5))
        .unwrap();
    assert_eq!(inside.name, "spawn");

    let far = resolver
        .resolve_highest_priority("world", BlockPos::new(1_000_000, 50, -2_000_000))
        .unwrap();
    assert_eq!(far.name, "world-guard");
}

fn arb_area() -> impl Strategy<Value = Area> {
    (
        0usize..8,
        0u32..4,
        (-40i32..40, -8i32..8, -40i32..40),
        (-40i32..40, -8i32..8, -40i32..40),
    )
        .prop_map(|(id, priority, a, b)| cube(&format!("area-{}", id), priority, a, b))
}

proptest! {
    #[test]
    fn prop_resolver_matches_linear_scan(
        areas in prop::collection::vec(arb_area(), 0..12),
        point in (-45i32..45, -10i32..10, -45i32..45),
    ) {
        let pos = BlockPos::from(point);

        // Later upserts replace earlier ones with the same name
        let mut latest: Vec<Area> = Vec::new();
        for area in &areas {
            latest.retain(|a| a.name != area.name);
            latest.push(area.clone());
        }

        let expected = latest
            .iter()
            .filter(|a| a.contains(pos))
            .max_by(|a, b| {
                a.priority
                    .cmp(&b.priority)
                    .then_with(|| b.name.cmp(&a.name))
            })
            .map(|a| a.name.clone());

        let resolver = resolver(areas);
        let actual = resolver
            .resolve_highest_priority("world", pos)
            .map(|a| a.name.clone());
        prop_assert_eq!(actual, expected);

        let all = resolver.resolve_all("world", pos);
        prop_assert_eq!(all.len(), latest.iter().filter(|a| a.contains(pos)).count());
        let sorted = all.windows(2).all(|w| {
            w[0].priority > w[1].priority
                || (w[0].priority == w[1].priority && w[0].name < w[1].name)
        });
        prop_assert!(sorted);
    }
}
