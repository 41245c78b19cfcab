//! Property tests over random seeds and configurations.

use grotto::{
    CorridorLayout, DungeonGenerator, GenerationConfig, LayoutShape, RoomLayout, StairKind,
};
use proptest::prelude::*;

fn layout_shape() -> impl Strategy<Value = LayoutShape> {
    prop_oneof![
        Just(LayoutShape::Full),
        Just(LayoutShape::Box),
        Just(LayoutShape::Cross),
        Just(LayoutShape::Round),
    ]
}

fn corridor_layout() -> impl Strategy<Value = CorridorLayout> {
    prop_oneof![
        Just(CorridorLayout::Labyrinth),
        Just(CorridorLayout::Bent),
        Just(CorridorLayout::Straight),
    ]
}

fn room_layout() -> impl Strategy<Value = RoomLayout> {
    prop_oneof![Just(RoomLayout::Packed), Just(RoomLayout::Scattered)]
}

prop_compose! {
    fn any_config()(
        seed in any::<u64>(),
        rows in 0u32..48,
        cols in 0u32..48,
        layout in layout_shape(),
        room_min in 1u32..6,
        room_max in 1u32..8,
        room_size in proptest::option::of(1u32..6),
        room_layout in room_layout(),
        corridor_layout in corridor_layout(),
        remove_deadends in 0u32..=100,
        add_stairs in 0u32..6,
    ) -> GenerationConfig {
        GenerationConfig {
            seed,
            rows,
            cols,
            layout,
            room_min,
            room_max,
            room_size,
            room_layout,
            corridor_layout,
            remove_deadends,
            add_stairs,
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn generation_never_fails(config in any_config()) {
        let dungeon = DungeonGenerator::new().build(&config);
        prop_assert!(dungeon.is_ok(), "{:?}", dungeon.err());
    }

    #[test]
    fn generation_is_deterministic(config in any_config()) {
        let generator = DungeonGenerator::new();
        let first = generator.build(&config).ok();
        let second = generator.build(&config).ok();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn stairs_respect_the_request(config in any_config()) {
        if let Ok(dungeon) = DungeonGenerator::new().build(&config) {
            prop_assert!(dungeon.stairs.len() <= config.add_stairs as usize);
            for stair in dungeon.stairs.iter().take(2) {
                prop_assert_eq!(stair.kind, StairKind::Down);
            }
            for stair in &dungeon.stairs {
                prop_assert_eq!(dungeon.grid[stair.pos].stair(), Some(stair.kind));
            }
        }
    }

    #[test]
    fn rooms_are_sealed(config in any_config()) {
        if let Ok(dungeon) = DungeonGenerator::new().build(&config) {
            prop_assert!(dungeon.check_invariants().is_ok());
            for room in dungeon.rooms.values() {
                for pos in room.bounds.positions() {
                    prop_assert_eq!(dungeon.grid[pos].room_id(), Some(room.id));
                }
                for door in room.all_doors() {
                    prop_assert!(dungeon.grid[door.pos].is_door());
                }
            }
        }
    }

    #[test]
    fn full_layouts_are_connected(mut config in any_config()) {
        config.layout = LayoutShape::Full;
        config.remove_deadends = 0;
        if let Ok(dungeon) = DungeonGenerator::new().build(&config) {
            prop_assert!(
                dungeon.is_connected(),
                "{} regions",
                dungeon.passable_regions()
            );
        }
    }
}
