//! # Cleanup
//!
//! Dead-end removal and final tidying.

use super::utils::roll_percent;
use super::{match_pattern, Door, DungeonPass, CLOSE_ENDS};
use crate::grid::{Cell, Grid, Position, RoomId};
use crate::{Dungeon, GrottoResult};
use log::debug;
use rand::rngs::StdRng;
use std::collections::BTreeSet;

fn is_collapsible(grid: &Grid, pos: Position) -> bool {
    grid.get(pos)
        .map_or(false, |cell| cell.is_corridor() && !cell.is_stair())
}

/// Unravels the corridor chain ending at `start`.
///
/// Each dead-end cell is cleared and the walk moves one step back along the
/// corridor, stopping at the first cell that is no longer a dead end or is
/// not plain corridor. Returns the number of cells cleared.
pub fn collapse(grid: &mut Grid, start: Position) -> usize {
    let mut work = vec![start];
    let mut cleared = 0;

    while let Some(pos) = work.pop() {
        if !is_collapsible(grid, pos) {
            continue;
        }
        if let Some(pattern) = match_pattern(&CLOSE_ENDS, grid, pos) {
            let next = pattern.next(pos);
            grid[pos].clear();
            cleared += 1;
            work.push(next);
        }
    }

    cleared
}

/// Collapses dead ends from corridor intersections.
///
/// Below 100 percent each candidate intersection rolls once against
/// `percent`; at 100 every candidate is collapsed without a roll.
pub fn collapse_tunnels(grid: &mut Grid, percent: u32, rng: &mut StdRng) -> usize {
    let everything = percent >= 100;
    let starts: Vec<Position> = grid.intersections().collect();
    let mut cleared = 0;

    for pos in starts {
        if !is_collapsible(grid, pos) {
            continue;
        }
        if !everything && roll_percent(rng) >= percent {
            continue;
        }
        cleared += collapse(grid, pos);
    }

    cleared
}

/// Removes the configured share of dead ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeadEndCollapser;

impl DungeonPass for DeadEndCollapser {
    fn apply(&self, dungeon: &mut Dungeon, rng: &mut StdRng) -> GrottoResult<()> {
        let cleared = collapse_tunnels(&mut dungeon.grid, dungeon.config.remove_deadends, rng);
        debug!("Collapsed {} dead-end corridor cells", cleared);
        Ok(())
    }

    fn pass_name(&self) -> &'static str {
        "DeadEndCollapser"
    }
}

fn leads_somewhere(grid: &Grid, door: &Door) -> bool {
    grid.get(door.pos).map_or(false, Cell::is_door)
        && grid.get(door.outside()).map_or(false, Cell::is_open)
}

fn next_to_door(grid: &Grid, pos: Position) -> bool {
    pos.cardinal_adjacent_positions()
        .iter()
        .any(|&next| grid.get(next).map_or(false, Cell::is_door))
}

/// Seals doors that lead nowhere and mirrors room-to-room doors.
///
/// Returns the number of doors removed.
pub fn fix_doors(dungeon: &mut Dungeon) -> usize {
    let dead: Vec<Door> = dungeon
        .doors
        .iter()
        .filter(|door| !leads_somewhere(&dungeon.grid, door))
        .cloned()
        .collect();

    let grid = &mut dungeon.grid;
    for door in &dead {
        grid[door.pos].seal();
    }
    for door in &dead {
        for pos in [door.inside(), door.outside()] {
            if !next_to_door(grid, pos) {
                if let Some(cell) = grid.get_mut(pos) {
                    cell.clear_entrance();
                }
            }
        }
    }

    let dead_cells: BTreeSet<Position> = dead.iter().map(|door| door.pos).collect();
    dungeon.doors.retain(|door| !dead_cells.contains(&door.pos));
    for room in dungeon.rooms.values_mut() {
        for doors in room.doors.values_mut() {
            doors.retain(|door| !dead_cells.contains(&door.pos));
        }
        room.doors.retain(|_, doors| !doors.is_empty());
    }

    // Every room lists the doors it shares with a neighbour.
    let shared: Vec<(RoomId, Door)> = dungeon
        .rooms
        .values()
        .flat_map(|room| room.all_doors().map(move |door| (room.id, door.clone())))
        .filter(|(_, door)| door.out_id.is_some())
        .collect();
    for (owner, door) in shared {
        let far = match door.out_id.and_then(|id| dungeon.rooms.get_mut(&id)) {
            Some(far) => far,
            None => continue,
        };
        let wall = door.direction.opposite();
        if far.all_doors().any(|existing| existing.pos == door.pos) {
            continue;
        }
        far.doors.entry(wall).or_default().push(Door {
            pos: door.pos,
            direction: wall,
            kind: door.kind,
            out_id: Some(owner),
        });
    }

    dead.len()
}

/// Clears every blocked cell back to nothing. Returns the number cleared.
pub fn empty_blocks(grid: &mut Grid) -> usize {
    let blocked: Vec<Position> = grid
        .cells()
        .filter(|(_, cell)| cell.is_blocked())
        .map(|(pos, _)| pos)
        .collect();
    for &pos in &blocked {
        grid[pos].clear();
    }
    blocked.len()
}

/// Door fix-up followed by mask removal.
#[derive(Debug, Clone, Copy, Default)]
pub struct Finalizer;

impl DungeonPass for Finalizer {
    fn apply(&self, dungeon: &mut Dungeon, _rng: &mut StdRng) -> GrottoResult<()> {
        let sealed = fix_doors(dungeon);
        let emptied = empty_blocks(&mut dungeon.grid);
        debug!("Sealed {} dead doors, emptied {} blocked cells", sealed, emptied);
        Ok(())
    }

    fn pass_name(&self) -> &'static str {
        "Finalizer"
    }
}
