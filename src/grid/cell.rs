//! # Cells
//!
//! Per-cell state shared by every generation pass.
//!
//! A cell combines freely composable structural flags with a handful of
//! exclusive fields: the owning room, at most one door kind, at most one
//! stair kind and one display glyph.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Identifier of a placed room. Ids start at 1 and follow placement order.
pub type RoomId = u32;

bitflags! {
    /// Structural flags that may be combined on a single cell.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CellFlags: u8 {
        /// Outside the dungeon shape; nothing may be placed here.
        const BLOCKED = 0x01;
        /// Room floor.
        const ROOM = 0x02;
        /// Corridor floor.
        const CORRIDOR = 0x04;
        /// Wall ring around a room.
        const PERIMETER = 0x08;
        /// Threshold between a room or corridor and a door.
        const ENTRANCE = 0x10;

        const OPEN_SPACE = Self::ROOM.bits() | Self::CORRIDOR.bits();
    }
}

/// The kinds of door that can be hung in a room wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DoorKind {
    Archway,
    #[default]
    Unlocked,
    Locked,
    Trapped,
    Secret,
    Portcullis,
}

impl DoorKind {
    /// Single-character glyph drawn on the door cell.
    pub fn glyph(self) -> char {
        match self {
            DoorKind::Archway => 'a',
            DoorKind::Unlocked => 'o',
            DoorKind::Locked => 'x',
            DoorKind::Trapped => 't',
            DoorKind::Secret => 's',
            DoorKind::Portcullis => '#',
        }
    }

    /// Human readable name.
    pub fn name(self) -> &'static str {
        match self {
            DoorKind::Archway => "Archway",
            DoorKind::Unlocked => "Unlocked Door",
            DoorKind::Locked => "Locked Door",
            DoorKind::Trapped => "Trapped Door",
            DoorKind::Secret => "Secret Door",
            DoorKind::Portcullis => "Portcullis",
        }
    }
}

/// Direction of a staircase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StairKind {
    #[default]
    Down,
    Up,
}

impl StairKind {
    pub fn glyph(self) -> char {
        match self {
            StairKind::Down => 'd',
            StairKind::Up => 'u',
        }
    }
}

/// A single grid cell.
///
/// The default value is the empty cell: no flags, no owner, nothing drawn.
/// Mutators keep `Room` and `room_id` in lockstep, so a cell owns a room id
/// exactly when it is room floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    flags: CellFlags,
    room_id: Option<RoomId>,
    door: Option<DoorKind>,
    stair: Option<StairKind>,
    label: Option<char>,
}

impl Cell {
    pub fn flags(&self) -> CellFlags {
        self.flags
    }

    pub fn room_id(&self) -> Option<RoomId> {
        self.room_id
    }

    pub fn door(&self) -> Option<DoorKind> {
        self.door
    }

    pub fn stair(&self) -> Option<StairKind> {
        self.stair
    }

    pub fn label(&self) -> Option<char> {
        self.label
    }

    pub fn is_empty(&self) -> bool {
        *self == Cell::default()
    }

    pub fn is_blocked(&self) -> bool {
        self.flags.contains(CellFlags::BLOCKED)
    }

    pub fn is_room(&self) -> bool {
        self.flags.contains(CellFlags::ROOM)
    }

    pub fn is_corridor(&self) -> bool {
        self.flags.contains(CellFlags::CORRIDOR)
    }

    pub fn is_perimeter(&self) -> bool {
        self.flags.contains(CellFlags::PERIMETER)
    }

    pub fn is_entrance(&self) -> bool {
        self.flags.contains(CellFlags::ENTRANCE)
    }

    pub fn is_door(&self) -> bool {
        self.door.is_some()
    }

    pub fn is_stair(&self) -> bool {
        self.stair.is_some()
    }

    /// Room or corridor floor.
    pub fn is_open(&self) -> bool {
        self.flags.intersects(CellFlags::OPEN_SPACE)
    }

    /// Open floor or a door: anything a walker can pass through.
    pub fn is_passable(&self) -> bool {
        self.is_open() || self.is_door()
    }

    /// Corridor with nothing else on it.
    pub fn is_bare_corridor(&self) -> bool {
        self.flags == CellFlags::CORRIDOR
            && self.room_id.is_none()
            && self.door.is_none()
            && self.stair.is_none()
            && self.label.is_none()
    }

    /// Whether a corridor may be dug through this cell.
    pub fn is_tunnelable(&self) -> bool {
        !self.flags.intersects(
            CellFlags::BLOCKED | CellFlags::PERIMETER | CellFlags::CORRIDOR | CellFlags::ROOM,
        ) && self.door.is_none()
    }

    /// Marks the cell as outside the dungeon shape.
    pub fn block(&mut self) {
        self.flags.insert(CellFlags::BLOCKED);
    }

    /// Turns the cell into floor of `id`, dropping any wall or threshold on it.
    pub fn claim_for_room(&mut self, id: RoomId) {
        if self.is_entrance() {
            self.flags.remove(CellFlags::ENTRANCE);
            self.door = None;
            self.label = None;
        }
        self.flags.remove(CellFlags::PERIMETER);
        self.flags.insert(CellFlags::ROOM);
        self.room_id = Some(id);
    }

    /// Adds the cell to a room's wall ring unless it is floor or a threshold.
    pub fn wall_off(&mut self) {
        if !self.flags.intersects(CellFlags::ROOM | CellFlags::ENTRANCE) {
            self.flags.insert(CellFlags::PERIMETER);
        }
    }

    pub fn open_entrance(&mut self) {
        self.flags.remove(CellFlags::PERIMETER);
        self.flags.insert(CellFlags::ENTRANCE);
    }

    pub fn clear_entrance(&mut self) {
        self.flags.remove(CellFlags::ENTRANCE);
    }

    pub fn hang_door(&mut self, kind: DoorKind) {
        self.door = Some(kind);
        self.label = Some(kind.glyph());
    }

    /// Removes a door and restores the wall it was cut into.
    pub fn seal(&mut self) {
        self.door = None;
        self.label = None;
        self.flags.remove(CellFlags::ENTRANCE);
        self.flags.insert(CellFlags::PERIMETER);
    }

    pub fn carve_corridor(&mut self) {
        self.flags.remove(CellFlags::ENTRANCE);
        self.flags.insert(CellFlags::CORRIDOR);
    }

    pub fn place_stair(&mut self, kind: StairKind) {
        self.stair = Some(kind);
        self.label = Some(kind.glyph());
    }

    pub fn set_label(&mut self, glyph: char) {
        self.label = Some(glyph);
    }

    /// Resets the cell to nothing.
    pub fn clear(&mut self) {
        *self = Cell::default();
    }
}
