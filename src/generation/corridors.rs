//! # Corridor Carving
//!
//! Randomized depth-first carving over the intersection lattice.
//!
//! Every intersection that is still tunnelable seeds a walk. The walk tries
//! the four directions in a shuffled order, optionally moving the previous
//! direction to the front, and digs a two-cell tunnel (midpoint plus
//! destination) whenever both cells are free. The walk keeps its own frame
//! stack, so depth is bounded by memory rather than by the call stack.

use super::utils::roll_percent;
use super::DungeonPass;
use crate::grid::{Cell, Direction, Grid, Position};
use crate::{Dungeon, GrottoResult};
use log::debug;
use pathfinding::prelude::bfs_reach;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// A suspended walk step: the intersection and the directions left to try.
#[derive(Debug, Clone, Copy)]
struct Frame {
    i: i32,
    j: i32,
    dirs: [Direction; 4],
    next: usize,
}

/// Direction order for one walk step.
///
/// The four directions are shuffled; then, with `bias` percent chance, the
/// previous direction is moved to the front.
pub fn tunnel_dirs(last: Option<Direction>, bias: u32, rng: &mut StdRng) -> [Direction; 4] {
    let mut dirs = Direction::ALL;
    dirs.shuffle(rng);

    if let Some(last) = last {
        if bias > 0 && roll_percent(rng) < bias {
            if let Some(index) = dirs.iter().position(|&dir| dir == last) {
                dirs[..=index].rotate_right(1);
            }
        }
    }

    dirs
}

fn is_tunnelable(grid: &Grid, pos: Position) -> bool {
    grid.get(pos).map_or(false, Cell::is_tunnelable)
}

/// Digs from intersection `(i, j)` toward `dir` if the way is free.
///
/// The midpoint and the destination must both be tunnelable; the current
/// cell, the midpoint and the destination become corridor.
pub fn open_tunnel(grid: &mut Grid, i: i32, j: i32, dir: Direction) -> bool {
    let (d_i, d_j) = dir.delta();
    let here = Position::intersection(i, j);
    let mid = here.step(dir);
    let next = Position::intersection(i + d_i, j + d_j);

    if !is_tunnelable(grid, mid) || !is_tunnelable(grid, next) {
        return false;
    }

    for pos in [here, mid, next] {
        grid[pos].carve_corridor();
    }
    true
}

/// Carves one connected corridor tree starting at intersection `(i, j)`.
///
/// Returns the number of tunnels dug.
pub fn carve_from(grid: &mut Grid, i: i32, j: i32, bias: u32, rng: &mut StdRng) -> usize {
    let mut stack = vec![Frame {
        i,
        j,
        dirs: tunnel_dirs(None, bias, rng),
        next: 0,
    }];
    let mut tunnels = 0;

    while let Some(frame) = stack.last_mut() {
        if frame.next == frame.dirs.len() {
            stack.pop();
            continue;
        }
        let dir = frame.dirs[frame.next];
        frame.next += 1;
        let (i, j) = (frame.i, frame.j);

        if open_tunnel(grid, i, j, dir) {
            tunnels += 1;
            let (d_i, d_j) = dir.delta();
            stack.push(Frame {
                i: i + d_i,
                j: j + d_j,
                dirs: tunnel_dirs(Some(dir), bias, rng),
                next: 0,
            });
        }
    }

    tunnels
}

/// Erases corridor networks that no door opens onto.
///
/// Does nothing on a grid without doors, where corridors are all there is.
/// Runs after region joining, so only networks no room could reach are lost.
/// Returns the number of cells erased.
pub fn prune_orphans(grid: &mut Grid) -> usize {
    if grid.count(Cell::is_door) == 0 {
        return 0;
    }

    let corridors: Vec<Position> = grid
        .cells()
        .filter(|(_, cell)| cell.is_corridor())
        .map(|(pos, _)| pos)
        .collect();
    let mut seen = HashSet::new();
    let mut pruned = 0;

    for start in corridors {
        if seen.contains(&start) {
            continue;
        }

        let component: Vec<Position> = {
            let grid = &*grid;
            bfs_reach(start, |&pos| {
                pos.cardinal_adjacent_positions()
                    .into_iter()
                    .filter(move |&next| grid.get(next).map_or(false, Cell::is_corridor))
            })
            .collect()
        };
        seen.extend(component.iter().copied());

        let entered = component.iter().any(|pos| {
            pos.cardinal_adjacent_positions()
                .iter()
                .any(|&next| grid.get(next).map_or(false, Cell::is_door))
        });
        if !entered {
            for &pos in &component {
                grid[pos].clear();
            }
            pruned += component.len();
        }
    }

    pruned
}

/// Fills the free lattice with corridors.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorridorCarver;

impl DungeonPass for CorridorCarver {
    fn apply(&self, dungeon: &mut Dungeon, rng: &mut StdRng) -> GrottoResult<()> {
        let bias = dungeon.config.corridor_layout.bias();
        let (n_i, n_j) = (dungeon.grid.n_i() as i32, dungeon.grid.n_j() as i32);
        let mut tunnels = 0;

        for i in 0..n_i {
            for j in 0..n_j {
                if is_tunnelable(&dungeon.grid, Position::intersection(i, j)) {
                    tunnels += carve_from(&mut dungeon.grid, i, j, bias, rng);
                }
            }
        }

        debug!("Dug {} tunnels", tunnels);
        Ok(())
    }

    fn pass_name(&self) -> &'static str {
        "CorridorCarver"
    }
}
