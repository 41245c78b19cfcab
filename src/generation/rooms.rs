//! # Room Placement
//!
//! Rectangular rooms laid on the intersection lattice.
//!
//! A room anchored at intersection `(i, j)` with a size of `height` x `width`
//! intersections covers cells `2i+1 ..= 2(i+height)-1` by
//! `2j+1 ..= 2(j+width)-1`, so its edges always fall on odd lines and its
//! one-cell wall ring on even lines. Rooms never overlap and never touch a
//! blocked cell; a placement that would do either is dropped, not retried.

use super::{Door, DungeonPass, GenerationConfig, RoomLayout};
use crate::grid::{Direction, Grid, Position, RoomId};
use crate::{config, Dungeon, GrottoResult};
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Inclusive cell bounds of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub north: i32,
    pub south: i32,
    pub west: i32,
    pub east: i32,
}

impl Bounds {
    /// Bounds of a room anchored at intersection `(i, j)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use grotto::Bounds;
    ///
    /// let bounds = Bounds::from_lattice(1, 0, 2, 3);
    /// assert_eq!((bounds.north, bounds.south), (3, 5));
    /// assert_eq!((bounds.west, bounds.east), (1, 5));
    /// ```
    pub fn from_lattice(i: i32, j: i32, height: i32, width: i32) -> Self {
        Self {
            north: i * 2 + 1,
            south: (i + height) * 2 - 1,
            west: j * 2 + 1,
            east: (j + width) * 2 - 1,
        }
    }

    /// Height in cells.
    pub fn height(&self) -> i32 {
        self.south - self.north + 1
    }

    /// Width in cells.
    pub fn width(&self) -> i32 {
        self.east - self.west + 1
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row >= self.north && pos.row <= self.south && pos.col >= self.west && pos.col <= self.east
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.north <= other.south
            && other.north <= self.south
            && self.west <= other.east
            && other.west <= self.east
    }

    /// Every cell inside the bounds, row-major.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let Bounds { north, south, west, east } = *self;
        (north..=south).flat_map(move |row| (west..=east).map(move |col| Position::new(row, col)))
    }

    /// The one-cell ring just outside the bounds, corners included.
    pub fn ring(&self) -> Vec<Position> {
        let (top, bottom) = (self.north - 1, self.south + 1);
        let (left, right) = (self.west - 1, self.east + 1);
        let mut ring = Vec::with_capacity(2 * (self.height() + self.width()) as usize + 4);

        for col in left..=right {
            ring.push(Position::new(top, col));
            ring.push(Position::new(bottom, col));
        }
        for row in self.north..=self.south {
            ring.push(Position::new(row, left));
            ring.push(Position::new(row, right));
        }

        ring
    }
}

/// A placed room.
///
/// Doors are grouped by the wall they pierce. A door shared by two rooms is
/// listed on both after finalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub bounds: Bounds,
    pub doors: BTreeMap<Direction, Vec<Door>>,
}

impl Room {
    pub fn new(id: RoomId, bounds: Bounds) -> Self {
        Self {
            id,
            bounds,
            doors: BTreeMap::new(),
        }
    }

    pub fn height_feet(&self) -> u32 {
        self.bounds.height() as u32 * config::FEET_PER_CELL
    }

    pub fn width_feet(&self) -> u32 {
        self.bounds.width() as u32 * config::FEET_PER_CELL
    }

    pub fn area_feet(&self) -> u32 {
        self.height_feet() * self.width_feet()
    }

    pub fn door_count(&self) -> usize {
        self.doors.values().map(Vec::len).sum()
    }

    pub fn all_doors(&self) -> impl Iterator<Item = &Door> {
        self.doors.values().flatten()
    }
}

/// Partially specified room: any field left `None` is rolled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoomProto {
    pub i: Option<i32>,
    pub j: Option<i32>,
    pub height: Option<i32>,
    pub width: Option<i32>,
}

impl RoomProto {
    pub fn anchored(i: i32, j: i32) -> Self {
        Self {
            i: Some(i),
            j: Some(j),
            ..Self::default()
        }
    }
}

/// Room size distribution, in intersections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomSizing {
    pub base: i32,
    pub radix: i32,
    pub fixed: bool,
}

impl RoomSizing {
    pub fn from_config(config: &GenerationConfig) -> Self {
        match config.room_size {
            Some(size) if size > 0 => Self {
                base: size as i32,
                radix: 0,
                fixed: true,
            },
            _ => {
                let (min, max) = (config.room_min as i32, config.room_max as i32);
                Self {
                    base: (min + 1) / 2,
                    radix: ((max - min).div_euclid(2) + 1).max(0),
                    fixed: false,
                }
            }
        }
    }

    fn roll_extent(&self, n: i32, anchor: Option<i32>, rng: &mut StdRng) -> i32 {
        let reach = match anchor {
            Some(anchor) => (n - self.base - anchor).clamp(0, self.radix),
            None => self.radix,
        };
        self.base + rng.gen_range(0..=reach)
    }

    /// Fills in the unknown fields of `proto`.
    ///
    /// Draws height, width, row and column in that order. Returns `None`
    /// when the rolled room cannot fit on a lattice of `n_i` x `n_j`.
    pub fn size_room(
        &self,
        proto: RoomProto,
        n_i: i32,
        n_j: i32,
        rng: &mut StdRng,
    ) -> Option<(i32, i32, i32, i32)> {
        let (height, width) = if self.fixed {
            (self.base, self.base)
        } else {
            let height = match proto.height {
                Some(height) => height,
                None => self.roll_extent(n_i, proto.i, rng),
            };
            let width = match proto.width {
                Some(width) => width,
                None => self.roll_extent(n_j, proto.j, rng),
            };
            (height, width)
        };
        if height <= 0 || width <= 0 {
            return None;
        }

        let i = match proto.i {
            Some(i) => i,
            None => rng.gen_range(0..=n_i.checked_sub(height).filter(|&n| n >= 0)?),
        };
        let j = match proto.j {
            Some(j) => j,
            None => rng.gen_range(0..=n_j.checked_sub(width).filter(|&n| n >= 0)?),
        };

        Some((height, width, i, j))
    }
}

/// What a candidate room footprint would cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    Clear,
    Blocked,
    Occupied(BTreeSet<RoomId>),
}

/// Scans `bounds` for blocked cells and existing rooms.
pub fn probe(grid: &Grid, bounds: &Bounds) -> Probe {
    let mut hits = BTreeSet::new();
    for pos in bounds.positions() {
        match grid.get(pos) {
            None => return Probe::Blocked,
            Some(cell) if cell.is_blocked() => return Probe::Blocked,
            Some(cell) => {
                if let Some(id) = cell.room_id() {
                    hits.insert(id);
                }
            }
        }
    }

    if hits.is_empty() {
        Probe::Clear
    } else {
        Probe::Occupied(hits)
    }
}

/// Attempts one room placement. Returns the new id on success.
pub fn place_room(
    dungeon: &mut Dungeon,
    sizing: &RoomSizing,
    proto: RoomProto,
    rng: &mut StdRng,
) -> Option<RoomId> {
    if dungeon.rooms.len() >= config::MAX_ROOMS {
        return None;
    }

    let grid = &dungeon.grid;
    let (height, width, i, j) =
        sizing.size_room(proto, grid.n_i() as i32, grid.n_j() as i32, rng)?;
    let bounds = Bounds::from_lattice(i, j, height, width);

    if bounds.north < 1
        || bounds.south > grid.max_row()
        || bounds.west < 1
        || bounds.east > grid.max_col()
    {
        return None;
    }
    if probe(grid, &bounds) != Probe::Clear {
        return None;
    }

    let id = dungeon.next_room_id();
    for pos in bounds.positions() {
        dungeon.grid[pos].claim_for_room(id);
    }
    for pos in bounds.ring() {
        if let Some(cell) = dungeon.grid.get_mut(pos) {
            cell.wall_off();
        }
    }

    trace!(
        "Placed room {} at rows {}..={} cols {}..={}",
        id,
        bounds.north,
        bounds.south,
        bounds.west,
        bounds.east
    );
    dungeon.rooms.insert(id, Room::new(id, bounds));
    Some(id)
}

/// Places rooms according to the configured [`RoomLayout`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RoomPlacer;

impl RoomPlacer {
    fn pack_rooms(&self, dungeon: &mut Dungeon, sizing: &RoomSizing, rng: &mut StdRng) {
        let (n_i, n_j) = (dungeon.grid.n_i() as i32, dungeon.grid.n_j() as i32);
        for i in 0..n_i {
            for j in 0..n_j {
                if dungeon.grid[Position::intersection(i, j)].is_room() {
                    continue;
                }
                // Ragged border: half the edge anchors are skipped.
                if (i == 0 || j == 0) && rng.gen_bool(0.5) {
                    continue;
                }
                place_room(dungeon, sizing, RoomProto::anchored(i, j), rng);
            }
        }
    }

    fn scatter_rooms(&self, dungeon: &mut Dungeon, sizing: &RoomSizing, rng: &mut StdRng) {
        for _ in 0..scattered_room_count(&dungeon.config) {
            place_room(dungeon, sizing, RoomProto::default(), rng);
        }
    }
}

/// Number of placement attempts made by the scattered layout.
pub fn scattered_room_count(config: &GenerationConfig) -> u64 {
    let room_area = u64::from(config.room_max) * u64::from(config.room_max);
    if room_area == 0 {
        return 0;
    }
    let rows = u64::from(config.rows / 2 * 2);
    let cols = u64::from(config.cols / 2 * 2);
    rows * cols / room_area
}

impl DungeonPass for RoomPlacer {
    fn apply(&self, dungeon: &mut Dungeon, rng: &mut StdRng) -> GrottoResult<()> {
        let sizing = RoomSizing::from_config(&dungeon.config);
        match dungeon.config.room_layout {
            RoomLayout::Packed => self.pack_rooms(dungeon, &sizing, rng),
            RoomLayout::Scattered => self.scatter_rooms(dungeon, &sizing, rng),
        }
        debug!("Placed {} rooms", dungeon.rooms.len());
        Ok(())
    }

    fn pass_name(&self) -> &'static str {
        "RoomPlacer"
    }
}

/// Writes each room's id onto the middle of its floor.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoomLabeler;

impl DungeonPass for RoomLabeler {
    fn apply(&self, dungeon: &mut Dungeon, _rng: &mut StdRng) -> GrottoResult<()> {
        for room in dungeon.rooms.values() {
            let label = room.id.to_string();
            let bounds = &room.bounds;
            // Labels that would be clipped are left off.
            if label.len() as i32 > bounds.width() {
                continue;
            }
            let row = (bounds.north + bounds.south) / 2;
            let col = (bounds.west + bounds.east - label.len() as i32) / 2 + 1;

            for (offset, glyph) in label.chars().enumerate() {
                let pos = Position::new(row, col + offset as i32);
                if let Some(cell) = dungeon.grid.get_mut(pos) {
                    if cell.room_id() == Some(room.id) {
                        cell.set_label(glyph);
                    }
                }
            }
        }
        Ok(())
    }

    fn pass_name(&self) -> &'static str {
        "RoomLabeler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils;
    use crate::grid::{Cell, LayoutShape};

    fn empty_dungeon(rows: u32, cols: u32) -> Dungeon {
        let mut config = GenerationConfig::for_testing(7);
        config.rows = rows;
        config.cols = cols;
        Dungeon::new(config)
    }

    #[test]
    fn test_bounds_geometry() {
        let bounds = Bounds::from_lattice(0, 0, 2, 1);
        assert_eq!(bounds, Bounds { north: 1, south: 3, west: 1, east: 1 });
        assert_eq!(bounds.height(), 3);
        assert_eq!(bounds.width(), 1);
        assert_eq!(bounds.positions().count(), 3);
        // (1 + 2) * 2 + 3 * 2
        assert_eq!(bounds.ring().len(), 12);
        assert!(bounds.contains(Position::new(2, 1)));
        assert!(!bounds.contains(Position::new(2, 2)));
    }

    #[test]
    fn test_bounds_intersection() {
        let a = Bounds::from_lattice(0, 0, 2, 2);
        let b = Bounds::from_lattice(1, 1, 2, 2);
        let c = Bounds::from_lattice(2, 0, 1, 1);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_room_feet() {
        let room = Room::new(1, Bounds::from_lattice(0, 0, 2, 1));
        assert_eq!(room.height_feet(), 30);
        assert_eq!(room.width_feet(), 10);
        assert_eq!(room.area_feet(), 300);
        assert_eq!(room.door_count(), 0);
    }

    #[test]
    fn test_sizing_from_config() {
        let mut config = GenerationConfig::for_testing(1);
        config.room_min = 3;
        config.room_max = 9;
        config.room_size = None;
        assert_eq!(
            RoomSizing::from_config(&config),
            RoomSizing { base: 2, radix: 4, fixed: false }
        );

        config.room_size = Some(5);
        assert_eq!(
            RoomSizing::from_config(&config),
            RoomSizing { base: 5, radix: 0, fixed: true }
        );

        // Inverted bounds collapse to a single size.
        config.room_size = None;
        config.room_min = 9;
        config.room_max = 3;
        assert_eq!(RoomSizing::from_config(&config).radix, 0);
    }

    #[test]
    fn test_anchored_size_stays_on_grid() {
        let sizing = RoomSizing { base: 2, radix: 6, fixed: false };
        let mut rng = utils::create_rng(&GenerationConfig::new(11));
        for _ in 0..200 {
            let (height, width, i, j) = sizing
                .size_room(RoomProto::anchored(5, 6), 8, 8, &mut rng)
                .unwrap();
            assert_eq!((i, j), (5, 6));
            assert!((2..=3).contains(&height), "height {}", height);
            assert_eq!(width, 2);
        }
    }

    #[test]
    fn test_free_room_cannot_fit_tiny_lattice() {
        let sizing = RoomSizing { base: 4, radix: 0, fixed: true };
        let mut rng = utils::create_rng(&GenerationConfig::new(11));
        assert_eq!(sizing.size_room(RoomProto::default(), 2, 8, &mut rng), None);
    }

    #[test]
    fn test_place_room_claims_cells_and_walls() {
        let mut dungeon = empty_dungeon(10, 10);
        let sizing = RoomSizing { base: 2, radix: 0, fixed: true };
        let mut rng = utils::create_rng(&dungeon.config);

        let id = place_room(&mut dungeon, &sizing, RoomProto::anchored(1, 1), &mut rng);
        assert_eq!(id, Some(1));

        let bounds = dungeon.rooms[&1].bounds;
        assert_eq!(bounds, Bounds { north: 3, south: 5, west: 3, east: 5 });
        for pos in bounds.positions() {
            assert_eq!(dungeon.grid[pos].room_id(), Some(1));
        }
        for pos in bounds.ring() {
            assert!(dungeon.grid[pos].is_perimeter());
        }
        assert_eq!(dungeon.grid.count(Cell::is_room), 9);
    }

    #[test]
    fn test_overlapping_room_is_dropped() {
        let mut dungeon = empty_dungeon(10, 10);
        let sizing = RoomSizing { base: 2, radix: 0, fixed: true };
        let mut rng = utils::create_rng(&dungeon.config);

        assert!(place_room(&mut dungeon, &sizing, RoomProto::anchored(1, 1), &mut rng).is_some());
        assert!(place_room(&mut dungeon, &sizing, RoomProto::anchored(2, 2), &mut rng).is_none());
        assert_eq!(dungeon.rooms.len(), 1);
        assert!(matches!(
            probe(&dungeon.grid, &Bounds::from_lattice(2, 2, 2, 2)),
            Probe::Occupied(ids) if ids.contains(&1)
        ));
    }

    #[test]
    fn test_room_off_the_edge_is_dropped() {
        let mut dungeon = empty_dungeon(10, 10);
        let sizing = RoomSizing { base: 2, radix: 0, fixed: true };
        let mut rng = utils::create_rng(&dungeon.config);
        assert!(place_room(&mut dungeon, &sizing, RoomProto::anchored(4, 0), &mut rng).is_none());
    }

    #[test]
    fn test_blocked_footprint_is_rejected() {
        let mut config = GenerationConfig::for_testing(3);
        config.layout = LayoutShape::Box;
        let dungeon = Dungeon::new(config);
        let middle = Bounds::from_lattice(4, 4, 1, 1);
        assert_eq!(probe(&dungeon.grid, &middle), Probe::Blocked);
    }

    #[test]
    fn test_scattered_room_count() {
        let mut config = GenerationConfig::for_testing(1);
        config.rows = 32;
        config.cols = 32;
        config.room_max = 4;
        assert_eq!(scattered_room_count(&config), 64);
        config.room_max = 0;
        assert_eq!(scattered_room_count(&config), 0);
    }

    #[test]
    fn test_labels_are_centred_on_the_floor() {
        let mut dungeon = empty_dungeon(10, 10);
        let sizing = RoomSizing { base: 2, radix: 0, fixed: true };
        let mut rng = utils::create_rng(&dungeon.config);
        place_room(&mut dungeon, &sizing, RoomProto::anchored(1, 1), &mut rng);

        RoomLabeler.apply(&mut dungeon, &mut rng).unwrap();
        assert_eq!(dungeon.grid[Position::new(4, 4)].label(), Some('1'));
        assert_eq!(dungeon.grid.cells().filter(|(_, c)| c.label().is_some()).count(), 1);
    }

    #[test]
    fn test_labels_too_wide_for_the_room_are_skipped() {
        let mut dungeon = empty_dungeon(22, 22);
        let sizing = RoomSizing { base: 1, radix: 0, fixed: true };
        let mut rng = utils::create_rng(&dungeon.config);
        let mut last = None;
        for i in [0, 2] {
            for j in [0, 2, 4, 6, 8] {
                last = place_room(&mut dungeon, &sizing, RoomProto::anchored(i, j), &mut rng);
            }
        }
        assert_eq!(last, Some(10));

        RoomLabeler.apply(&mut dungeon, &mut rng).unwrap();
        assert_eq!(dungeon.grid[Position::new(5, 17)].label(), None);
        assert_eq!(dungeon.grid[Position::new(5, 13)].label(), Some('9'));
        assert_eq!(dungeon.grid.cells().filter(|(_, c)| c.label().is_some()).count(), 9);
    }
}
