//! End-to-end generation scenarios.

use grotto::generation::utils;
use grotto::{
    collapse_tunnels, export, match_pattern, CorridorLayout, Dungeon, DungeonGenerator,
    ExportFormat, GenerationConfig, GrottoError, GrottoResult, LayoutShape, RoomLayout, StairKind,
    CLOSE_ENDS,
};

fn generate(config: &GenerationConfig) -> GrottoResult<Dungeon> {
    DungeonGenerator::new().build(config)
}

#[test]
fn test_same_seed_same_dungeon() -> GrottoResult<()> {
    let config = GenerationConfig::new(9001);
    let first = generate(&config)?;
    let second = generate(&config)?;

    assert_eq!(first.grid, second.grid);
    assert_eq!(first.rooms, second.rooms);
    assert_eq!(first.doors, second.doors);
    assert_eq!(first.stairs, second.stairs);
    assert_eq!(
        export::render(&first, ExportFormat::Json)?,
        export::render(&second, ExportFormat::Json)?
    );
    Ok(())
}

#[test]
fn test_different_seeds_differ() -> GrottoResult<()> {
    let first = generate(&GenerationConfig::new(1))?;
    let second = generate(&GenerationConfig::new(2))?;
    assert_ne!(first.grid, second.grid);
    Ok(())
}

#[test]
fn test_small_packed_level_with_straight_corridors() -> GrottoResult<()> {
    let config = GenerationConfig::for_testing(42);
    let dungeon = generate(&config)?;

    assert_eq!(dungeon.grid.n_i(), 9);
    assert_eq!(dungeon.grid.n_j(), 9);
    assert_eq!(dungeon.rooms.len(), 35);
    // The placed doors leave seven separate regions; joining them takes six more.
    assert!(dungeon.doors.len() >= 38, "only {} doors", dungeon.doors.len());
    assert!(dungeon.is_connected());
    assert!(dungeon.stairs.len() <= 2);
    assert!(dungeon
        .stairs
        .iter()
        .all(|stair| stair.kind == StairKind::Down));

    let again = generate(&config)?;
    assert_eq!(again.rooms.len(), dungeon.rooms.len());
    assert_eq!(again.doors.len(), dungeon.doors.len());
    Ok(())
}

#[test]
fn test_small_packed_levels_get_two_down_stairs() -> GrottoResult<()> {
    let mut two_stairs = None;
    for seed in 0..200 {
        let dungeon = generate(&GenerationConfig::for_testing(seed))?;
        assert!(dungeon.is_connected(), "seed {} is split", seed);
        if dungeon.stairs.len() == 2 {
            two_stairs = Some(dungeon);
            break;
        }
    }

    let dungeon = two_stairs.expect("no seed placed two stairs");
    for stair in &dungeon.stairs {
        assert_eq!(stair.kind, StairKind::Down);
        assert_eq!(dungeon.grid[stair.pos].stair(), Some(StairKind::Down));
    }
    assert_ne!(dungeon.stairs[0].pos, dungeon.stairs[1].pos);
    Ok(())
}

#[test]
fn test_full_dead_end_removal_leaves_no_dead_ends() -> GrottoResult<()> {
    for seed in [3, 42, 777, 12345] {
        let mut config = GenerationConfig::new(seed);
        config.remove_deadends = 100;
        let mut dungeon = generate(&config)?;

        for (pos, cell) in dungeon.grid.cells() {
            if cell.is_corridor() && !cell.is_stair() {
                assert!(
                    match_pattern(&CLOSE_ENDS, &dungeon.grid, pos).is_none(),
                    "seed {} left a dead end at {:?}",
                    seed,
                    pos
                );
            }
        }

        let before = dungeon.grid.clone();
        let mut rng = utils::create_rng(&config);
        assert_eq!(collapse_tunnels(&mut dungeon.grid, 100, &mut rng), 0);
        assert_eq!(dungeon.grid, before);
    }
    Ok(())
}

#[test]
fn test_fully_masked_grids_stay_empty() -> GrottoResult<()> {
    let mut round = GenerationConfig::for_testing(42);
    round.rows = 0;
    round.cols = 0;
    round.layout = LayoutShape::Round;

    let mut custom = GenerationConfig::for_testing(42);
    custom.layout = LayoutShape::Custom(vec![vec![false]]);

    for config in [round, custom] {
        let dungeon = generate(&config)?;
        assert!(dungeon.rooms.is_empty());
        assert!(dungeon.doors.is_empty());
        assert!(dungeon.stairs.is_empty());
        assert_eq!(dungeon.grid.count(|cell| cell.is_open()), 0);
        assert_eq!(dungeon.grid.count(|cell| cell.is_blocked()), 0);
    }
    Ok(())
}

#[test]
fn test_invariants_hold_across_layouts() -> GrottoResult<()> {
    let shapes = [
        LayoutShape::Full,
        LayoutShape::Box,
        LayoutShape::Cross,
        LayoutShape::Round,
    ];
    let corridors = [
        CorridorLayout::Labyrinth,
        CorridorLayout::Bent,
        CorridorLayout::Straight,
    ];

    for shape in &shapes {
        for &corridor_layout in &corridors {
            for room_layout in [RoomLayout::Packed, RoomLayout::Scattered] {
                let mut config = GenerationConfig::new(31337);
                config.rows = 40;
                config.cols = 40;
                config.layout = shape.clone();
                config.room_size = None;
                config.room_min = 2;
                config.room_max = 6;
                config.room_layout = room_layout;
                config.corridor_layout = corridor_layout;
                config.remove_deadends = 50;
                config.add_stairs = 4;

                let dungeon = generate(&config)?;
                dungeon.check_invariants()?;
                assert!(dungeon.stairs.len() <= 4);
                for door in &dungeon.doors {
                    assert!(dungeon.grid[door.outside()].is_open());
                }
            }
        }
    }
    Ok(())
}

#[test]
fn test_room_min_above_room_max_is_not_an_error() -> GrottoResult<()> {
    let mut config = GenerationConfig::for_testing(8);
    config.room_min = 6;
    config.room_max = 2;
    let dungeon = generate(&config)?;
    dungeon.check_invariants()?;
    Ok(())
}

#[test]
fn test_configuration_errors() {
    let bad_names = [
        r#"{"corridor_layout": "Diagonal"}"#,
        r#"{"layout": "Hexagon"}"#,
        r#"{"room_layout": "Sparse"}"#,
        r#"{"remove_deadends": 150}"#,
        r#"{"layout": {"Custom": []}}"#,
        r#"{"layout": {"Custom": [[true, false], [true]]}}"#,
        r#"{"corridor_layot": "Straight"}"#,
    ];
    for json in bad_names {
        assert!(
            matches!(
                GenerationConfig::from_json(json),
                Err(GrottoError::InvalidConfig(_))
            ),
            "{} was accepted",
            json
        );
    }

    let mut huge = GenerationConfig::new(1);
    huge.rows = 1_000_000;
    assert!(matches!(
        generate(&huge),
        Err(GrottoError::InvalidConfig(_))
    ));
}

#[test]
fn test_config_file_round_trip() -> GrottoResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("level.json");

    let mut config = GenerationConfig::new(55);
    config.layout = LayoutShape::Cross;
    config.corridor_layout = CorridorLayout::Bent;
    std::fs::write(&path, serde_json::to_string_pretty(&config)?)?;

    assert_eq!(GenerationConfig::load(&path)?, config);

    let partial = GenerationConfig::from_json(r#"{"seed": 5, "rows": 20}"#)?;
    assert_eq!(partial.seed, 5);
    assert_eq!(partial.rows, 20);
    assert_eq!(partial.cols, GenerationConfig::default().cols);
    Ok(())
}

#[test]
fn test_export_to_file() -> GrottoResult<()> {
    let dungeon = generate(&GenerationConfig::new(4))?;
    let dir = tempfile::tempdir()?;

    let ascii = dir.path().join("level.txt");
    export::save(&dungeon, ExportFormat::Ascii, &ascii)?;
    let text = std::fs::read_to_string(&ascii)?;
    assert_eq!(text.lines().count(), dungeon.grid.height() as usize);
    assert!(text
        .lines()
        .all(|line| line.chars().count() == dungeon.grid.width() as usize));

    let json = dir.path().join("level.json");
    export::save(&dungeon, ExportFormat::Json, &json)?;
    let restored: Dungeon = serde_json::from_str(&std::fs::read_to_string(&json)?)?;
    assert_eq!(restored, dungeon);
    Ok(())
}
