//! # Door Placement
//!
//! Cuts openings through room walls.
//!
//! Every room, in id order, collects its candidate *sills*: floor cells on
//! its edge whose wall cell can become a door. A random subset of them is
//! opened, with at most one direct door between any pair of rooms.

use super::utils::roll_index;
use super::{DungeonPass, WeightedTable};
use crate::grid::{Cell, Direction, DoorKind, Grid, Position, RoomId};
use crate::{Bounds, Dungeon, GrottoError, GrottoResult};
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Door kinds and their relative frequency, out of 110.
pub const DOOR_KINDS: WeightedTable<DoorKind> = WeightedTable::new(&[
    (DoorKind::Archway, 15),
    (DoorKind::Unlocked, 45),
    (DoorKind::Locked, 15),
    (DoorKind::Trapped, 15),
    (DoorKind::Secret, 10),
    (DoorKind::Portcullis, 10),
]);

/// An opening in a room wall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    /// The wall cell holding the door.
    pub pos: Position,
    /// Wall of the owning room the door pierces.
    pub direction: Direction,
    pub kind: DoorKind,
    /// Room on the far side, if the door opens straight into one.
    pub out_id: Option<RoomId>,
}

impl Door {
    /// Cell just beyond the door, away from the owning room.
    pub fn outside(&self) -> Position {
        self.pos.step(self.direction)
    }

    /// Floor cell of the owning room the door opens from.
    pub fn inside(&self) -> Position {
        self.pos.step(self.direction.opposite())
    }
}

/// A candidate door location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sill {
    /// Room edge cell.
    pub sill: Position,
    pub direction: Direction,
    /// Wall cell that would hold the door.
    pub door: Position,
    /// Cell beyond the wall.
    pub out: Position,
    pub out_id: Option<RoomId>,
}

/// Checks whether a door may be cut from `sill` through the `direction` wall.
pub fn validate_sill(grid: &Grid, room_id: RoomId, sill: Position, direction: Direction) -> Option<Sill> {
    let door = sill.step(direction);
    let door_cell = grid.get(door)?;
    if !door_cell.is_perimeter() || door_cell.is_blocked() || door_cell.is_door() {
        return None;
    }

    let out = door.step(direction);
    let out_cell = grid.get(out)?;
    if out_cell.is_blocked() {
        return None;
    }
    let out_id = if out_cell.is_room() { out_cell.room_id() } else { None };
    if out_id == Some(room_id) {
        return None;
    }

    Some(Sill {
        sill,
        direction,
        door,
        out,
        out_id,
    })
}

/// Every valid sill of a room, wall by wall in north, south, west, east order.
///
/// Walls within two cells of the grid edge are skipped entirely.
pub fn room_sills(grid: &Grid, room_id: RoomId, bounds: &Bounds) -> Vec<Sill> {
    let (rows, cols) = (grid.rows() as i32, grid.cols() as i32);
    let mut candidates = Vec::new();

    if bounds.north >= 3 {
        for col in (bounds.west..=bounds.east).step_by(2) {
            candidates.push((Position::new(bounds.north, col), Direction::North));
        }
    }
    if bounds.south <= rows - 3 {
        for col in (bounds.west..=bounds.east).step_by(2) {
            candidates.push((Position::new(bounds.south, col), Direction::South));
        }
    }
    if bounds.west >= 3 {
        for row in (bounds.north..=bounds.south).step_by(2) {
            candidates.push((Position::new(row, bounds.west), Direction::West));
        }
    }
    if bounds.east <= cols - 3 {
        for row in (bounds.north..=bounds.south).step_by(2) {
            candidates.push((Position::new(row, bounds.east), Direction::East));
        }
    }

    candidates
        .into_iter()
        .filter_map(|(sill, direction)| validate_sill(grid, room_id, sill, direction))
        .collect()
}

/// Collects and shuffles every valid sill of a room.
pub fn collect_sills(grid: &Grid, room_id: RoomId, bounds: &Bounds, rng: &mut StdRng) -> Vec<Sill> {
    let mut sills = room_sills(grid, room_id, bounds);
    sills.shuffle(rng);
    sills
}

/// Opens the passage at `sill`, hangs a door of a rolled kind and records it
/// on the owning room and in the flat door list.
pub fn cut_door(dungeon: &mut Dungeon, room_id: RoomId, sill: &Sill, rng: &mut StdRng) -> Door {
    let mut pos = sill.sill;
    for _ in 0..3 {
        if let Some(cell) = dungeon.grid.get_mut(pos) {
            cell.open_entrance();
        }
        pos = pos.step(sill.direction);
    }

    let kind = DOOR_KINDS.choose(rng).unwrap_or_default();
    dungeon.grid[sill.door].hang_door(kind);

    let door = Door {
        pos: sill.door,
        direction: sill.direction,
        kind,
        out_id: sill.out_id,
    };
    trace!("Room {}: {} at {:?}", room_id, kind.name(), door.pos);
    if let Some(room) = dungeon.rooms.get_mut(&room_id) {
        room.doors.entry(sill.direction).or_default().push(door.clone());
    }
    dungeon.doors.push(door.clone());
    door
}

/// Number of doors to try for a room: larger rooms get more.
pub fn allocate_openings(bounds: &Bounds, rng: &mut StdRng) -> u32 {
    let room_h = (bounds.south - bounds.north) / 2 + 1;
    let room_w = (bounds.east - bounds.west) / 2 + 1;
    let flumph = f64::from(room_h * room_w).sqrt() as u32;
    if flumph == 0 {
        return 0;
    }
    flumph + rng.gen_range(0..flumph)
}

/// Opens doors in every room, in id order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoorPlacer;

impl DoorPlacer {
    fn open_room(
        &self,
        dungeon: &mut Dungeon,
        room_id: RoomId,
        connected: &mut BTreeSet<(RoomId, RoomId)>,
        rng: &mut StdRng,
    ) -> GrottoResult<usize> {
        let bounds = dungeon
            .rooms
            .get(&room_id)
            .map(|room| room.bounds)
            .ok_or_else(|| GrottoError::InvalidState(format!("room {} is not registered", room_id)))?;

        let mut sills = collect_sills(&dungeon.grid, room_id, &bounds, rng);
        if sills.is_empty() {
            return Ok(0);
        }

        let mut opened = 0;
        for _ in 0..allocate_openings(&bounds, rng) {
            if sills.is_empty() {
                break;
            }
            let sill = sills.remove(roll_index(rng, sills.len()));

            // Already opened from the other side.
            if dungeon.grid.get(sill.door).map_or(true, Cell::is_door) {
                continue;
            }
            if let Some(out_id) = sill.out_id {
                if !connected.insert((room_id.min(out_id), room_id.max(out_id))) {
                    continue;
                }
            }

            cut_door(dungeon, room_id, &sill, rng);
            opened += 1;
        }

        Ok(opened)
    }
}

impl DungeonPass for DoorPlacer {
    fn apply(&self, dungeon: &mut Dungeon, rng: &mut StdRng) -> GrottoResult<()> {
        // Room pairs already joined by a direct door; only needed during this pass.
        let mut connected = BTreeSet::new();
        let ids: Vec<RoomId> = dungeon.rooms.keys().copied().collect();

        let mut opened = 0;
        for id in ids {
            opened += self.open_room(dungeon, id, &mut connected, rng)?;
        }

        debug!("Opened {} doors, {} direct room links", opened, connected.len());
        Ok(())
    }

    fn pass_name(&self) -> &'static str {
        "DoorPlacer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils;
    use crate::{place_room, GenerationConfig, RoomProto, RoomSizing};

    fn dungeon_with_rooms(anchors: &[(i32, i32)]) -> (Dungeon, StdRng) {
        let mut config = GenerationConfig::for_testing(5);
        config.rows = 14;
        config.cols = 14;
        let mut dungeon = Dungeon::new(config);
        let mut rng = utils::create_rng(&dungeon.config);
        let sizing = RoomSizing { base: 2, radix: 0, fixed: true };
        for &(i, j) in anchors {
            place_room(&mut dungeon, &sizing, RoomProto::anchored(i, j), &mut rng).unwrap();
        }
        (dungeon, rng)
    }

    #[test]
    fn test_door_kind_weights() {
        assert_eq!(DOOR_KINDS.total(), 110);
        assert_eq!(DOOR_KINDS.outcome_for(14), Some(DoorKind::Archway));
        assert_eq!(DOOR_KINDS.outcome_for(15), Some(DoorKind::Unlocked));
        assert_eq!(DOOR_KINDS.outcome_for(59), Some(DoorKind::Unlocked));
        assert_eq!(DOOR_KINDS.outcome_for(60), Some(DoorKind::Locked));
        assert_eq!(DOOR_KINDS.outcome_for(89), Some(DoorKind::Trapped));
        assert_eq!(DOOR_KINDS.outcome_for(99), Some(DoorKind::Secret));
        assert_eq!(DOOR_KINDS.outcome_for(109), Some(DoorKind::Portcullis));
    }

    #[test]
    fn test_sills_skip_walls_near_the_edge() {
        // Room at rows/cols 1..=3 hugs the north and west edges.
        let (dungeon, mut rng) = dungeon_with_rooms(&[(0, 0)]);
        let bounds = dungeon.rooms[&1].bounds;
        let sills = collect_sills(&dungeon.grid, 1, &bounds, &mut rng);

        assert_eq!(sills.len(), 4);
        assert!(sills
            .iter()
            .all(|s| matches!(s.direction, Direction::South | Direction::East)));
        assert!(sills.iter().all(|s| s.out_id.is_none()));
    }

    #[test]
    fn test_sill_into_neighbouring_room_records_its_id() {
        // Rooms share the wall at column 5.
        let (dungeon, _) = dungeon_with_rooms(&[(1, 0), (1, 2)]);
        let sill = validate_sill(&dungeon.grid, 1, Position::new(3, 3), Direction::East).unwrap();
        assert_eq!(sill.door, Position::new(3, 4));
        assert_eq!(sill.out, Position::new(3, 5));
        assert_eq!(sill.out_id, Some(2));
    }

    #[test]
    fn test_sill_rejects_non_wall() {
        let (dungeon, _) = dungeon_with_rooms(&[(1, 1)]);
        // Interior step lands on floor, not wall.
        assert!(validate_sill(&dungeon.grid, 1, Position::new(3, 3), Direction::South).is_none());
    }

    #[test]
    fn test_allocate_openings_range() {
        let mut rng = utils::create_rng(&GenerationConfig::new(8));
        let bounds = Bounds::from_lattice(0, 0, 2, 2);
        for _ in 0..50 {
            let openings = allocate_openings(&bounds, &mut rng);
            assert!((2..=3).contains(&openings));
        }
    }

    #[test]
    fn test_doors_open_a_passage() -> GrottoResult<()> {
        let (mut dungeon, mut rng) = dungeon_with_rooms(&[(1, 1)]);
        DoorPlacer.apply(&mut dungeon, &mut rng)?;

        assert!(!dungeon.doors.is_empty());
        assert_eq!(dungeon.rooms[&1].door_count(), dungeon.doors.len());
        for door in &dungeon.doors {
            let cell = dungeon.grid[door.pos];
            assert_eq!(cell.door(), Some(door.kind));
            assert_eq!(cell.label(), Some(door.kind.glyph()));
            assert!(cell.is_entrance());
            assert!(!cell.is_perimeter());
            assert!(dungeon.grid[door.outside()].is_entrance());
            assert!(dungeon.grid[door.inside()].is_room());
        }
        Ok(())
    }

    #[test]
    fn test_at_most_one_direct_door_per_room_pair() -> GrottoResult<()> {
        let (mut dungeon, mut rng) = dungeon_with_rooms(&[(1, 0), (1, 2), (1, 4)]);
        DoorPlacer.apply(&mut dungeon, &mut rng)?;

        let mut pairs = BTreeSet::new();
        for room in dungeon.rooms.values() {
            for door in room.all_doors() {
                if let Some(out_id) = door.out_id {
                    assert!(pairs.insert((room.id.min(out_id), room.id.max(out_id))));
                }
            }
        }
        Ok(())
    }
}
