//! # Dungeon Generation
//!
//! The dungeon aggregate and the pipeline that fills it.
//!
//! [`DungeonGenerator`] runs the passes in a fixed order over a freshly
//! masked [`Dungeon`]:
//!
//! 1. [`RoomPlacer`] lays out non-overlapping rooms
//! 2. [`DoorPlacer`] cuts doors through their walls
//! 3. [`RoomLabeler`] writes room numbers on the floor
//! 4. [`CorridorCarver`] fills the remaining lattice with corridors
//! 5. [`RegionJoiner`] cuts extra doors until the level is one region
//! 6. [`StairPlacer`] puts stairs on dead ends (when stairs are requested)
//! 7. [`DeadEndCollapser`] erodes dead ends (when removal is requested)
//! 8. [`Finalizer`] seals useless doors and clears the mask

use super::{
    utils, CorridorCarver, DeadEndCollapser, Door, DoorPlacer, DungeonPass, Finalizer,
    GenerationConfig, Generator, RegionJoiner, RegionMap, Room, RoomLabeler, RoomPlacer, Stair,
    StairPlacer,
};
use crate::grid::{apply_mask, Cell, Grid, RoomId};
use crate::{GrottoError, GrottoResult};
use log::{debug, info};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A generated dungeon: the grid plus the records describing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dungeon {
    /// Parameters the dungeon was generated from
    pub config: GenerationConfig,
    pub grid: Grid,
    /// Rooms keyed by id, in placement order
    pub rooms: BTreeMap<RoomId, Room>,
    /// Every door once, in placement order
    pub doors: Vec<Door>,
    /// Stairs in placement order
    pub stairs: Vec<Stair>,
}

impl Dungeon {
    /// Creates an empty dungeon with the configured mask applied.
    pub fn new(config: GenerationConfig) -> Self {
        let mut grid = Grid::new(config.rows, config.cols);
        let blocked = apply_mask(&mut grid, &config.layout);
        debug!("Masked {} cells for layout {:?}", blocked, config.layout);

        Self {
            config,
            grid,
            rooms: BTreeMap::new(),
            doors: Vec::new(),
            stairs: Vec::new(),
        }
    }

    /// Id the next placed room will receive.
    pub fn next_room_id(&self) -> RoomId {
        self.rooms.len() as RoomId + 1
    }

    /// Number of 4-connected regions of passable cells.
    ///
    /// Room floor, corridors and doors are passable.
    pub fn passable_regions(&self) -> usize {
        RegionMap::build(&self.grid).count()
    }

    /// Whether every passable cell can reach every other.
    pub fn is_connected(&self) -> bool {
        self.passable_regions() <= 1
    }

    /// Checks the structural invariants every finished dungeon upholds.
    ///
    /// - no cell is both room and corridor
    /// - a cell carries a room id exactly when it is room floor, and the id is registered
    /// - room floor lies inside its room's bounds
    /// - rooms never overlap
    /// - every room's wall ring holds only walls, doors or nothing
    /// - every recorded door and stair is present on the grid
    pub fn check_invariants(&self) -> GrottoResult<()> {
        for (pos, cell) in self.grid.cells() {
            if cell.is_room() && cell.is_corridor() {
                return Err(invariant(format!("{:?} is both room and corridor", pos)));
            }
            if let Some(id) = cell.room_id() {
                match self.rooms.get(&id) {
                    None => {
                        return Err(invariant(format!("{:?} belongs to unknown room {}", pos, id)));
                    }
                    Some(room) if !room.bounds.contains(pos) => {
                        return Err(invariant(format!("{:?} lies outside room {}", pos, id)));
                    }
                    Some(_) => {}
                }
            }
            match cell.room_id() {
                Some(_) if !cell.is_room() => {
                    return Err(invariant(format!("{:?} has a room id but no floor", pos)));
                }
                None if cell.is_room() => {
                    return Err(invariant(format!("{:?} is floor without a room id", pos)));
                }
                _ => {}
            }
        }

        let rooms: Vec<&Room> = self.rooms.values().collect();
        for (index, room) in rooms.iter().enumerate() {
            for other in &rooms[index + 1..] {
                if room.bounds.intersects(&other.bounds) {
                    return Err(invariant(format!(
                        "rooms {} and {} overlap",
                        room.id, other.id
                    )));
                }
            }
            for pos in room.bounds.ring() {
                let sealed = self
                    .grid
                    .get(pos)
                    .map_or(true, |cell| cell.is_perimeter() || cell.is_door() || cell.is_empty());
                if !sealed {
                    return Err(invariant(format!(
                        "wall of room {} is open at {:?}",
                        room.id, pos
                    )));
                }
            }
        }

        for door in &self.doors {
            if self.grid.get(door.pos).and_then(Cell::door) != Some(door.kind) {
                return Err(invariant(format!("door at {:?} is missing", door.pos)));
            }
        }
        for stair in &self.stairs {
            let on_corridor = self
                .grid
                .get(stair.pos)
                .map_or(false, |cell| cell.is_corridor() && cell.stair() == Some(stair.kind));
            if !on_corridor {
                return Err(invariant(format!("stair at {:?} is missing", stair.pos)));
            }
        }

        Ok(())
    }
}

fn invariant(message: String) -> GrottoError {
    GrottoError::InvalidState(message)
}

/// Runs the full generation pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct DungeonGenerator;

impl DungeonGenerator {
    pub fn new() -> Self {
        Self
    }

    /// The passes enabled by `config`, in execution order.
    pub fn passes(&self, config: &GenerationConfig) -> Vec<Box<dyn DungeonPass>> {
        let mut passes: Vec<Box<dyn DungeonPass>> = vec![
            Box::new(RoomPlacer),
            Box::new(DoorPlacer),
            Box::new(RoomLabeler),
            Box::new(CorridorCarver),
            Box::new(RegionJoiner),
        ];
        if config.add_stairs > 0 {
            passes.push(Box::new(StairPlacer));
        }
        if config.remove_deadends > 0 {
            passes.push(Box::new(DeadEndCollapser));
        }
        passes.push(Box::new(Finalizer));
        passes
    }

    /// Validates `config`, generates a dungeon from its seed and verifies it.
    ///
    /// # Examples
    ///
    /// ```
    /// use grotto::{DungeonGenerator, GenerationConfig};
    ///
    /// let config = GenerationConfig::new(2024);
    /// let first = DungeonGenerator::new().build(&config).unwrap();
    /// let second = DungeonGenerator::new().build(&config).unwrap();
    /// assert_eq!(first, second);
    /// ```
    pub fn build(&self, config: &GenerationConfig) -> GrottoResult<Dungeon> {
        config.validate()?;
        let mut rng = utils::create_rng(config);
        let dungeon = self.generate(config, &mut rng)?;
        self.validate(&dungeon, config)?;
        Ok(dungeon)
    }
}

impl Generator<Dungeon> for DungeonGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> GrottoResult<Dungeon> {
        let mut dungeon = Dungeon::new(config.clone());

        for pass in self.passes(config) {
            pass.apply(&mut dungeon, rng)?;
            debug!("{} complete", pass.pass_name());
        }

        info!(
            "{} built {}x{} dungeon from seed {}: {} rooms, {} doors, {} stairs",
            self.generator_type(),
            dungeon.grid.rows(),
            dungeon.grid.cols(),
            config.seed,
            dungeon.rooms.len(),
            dungeon.doors.len(),
            dungeon.stairs.len()
        );
        Ok(dungeon)
    }

    fn validate(&self, dungeon: &Dungeon, config: &GenerationConfig) -> GrottoResult<()> {
        dungeon.check_invariants()?;

        if dungeon.grid.count(Cell::is_blocked) > 0 {
            return Err(GrottoError::GenerationFailed(
                "blocked cells survived finalization".to_string(),
            ));
        }
        if dungeon.stairs.len() > config.add_stairs as usize {
            return Err(GrottoError::GenerationFailed(format!(
                "placed {} stairs but only {} were requested",
                dungeon.stairs.len(),
                config.add_stairs
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "DungeonGenerator"
    }
}
