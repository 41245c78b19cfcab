//! # Region Joining
//!
//! Carving fills each free pocket of the lattice with one corridor tree, but
//! rooms whose doors all open onto each other, or onto an intersection the
//! carver could not leave, can still end up walled off from the rest.
//!
//! [`RegionJoiner`] labels the passable regions, then cuts extra doors until
//! every region is merged into one wherever a wall allows it. Two kinds of
//! bridge are considered:
//!
//! - a sill whose far side is open floor of another region
//! - an uncarved intersection that sills or existing doors of rooms from
//!   different regions open onto; it is carved into a one-cell corridor
//!
//! Bridges are tried in random order and kept only when they merge regions
//! that are still apart. Corridor networks no door opens onto are erased
//! afterwards.

use super::{cut_door, prune_orphans, room_sills, DungeonPass, Sill};
use crate::grid::{Cell, Grid, Position, RoomId};
use crate::{Dungeon, GrottoResult};
use log::{debug, trace};
use pathfinding::prelude::bfs_reach;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;

/// 4-connected regions of passable cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMap {
    width: i32,
    labels: Vec<Option<usize>>,
    count: usize,
}

impl RegionMap {
    /// Labels every passable cell of `grid` with its region, row-major.
    pub fn build(grid: &Grid) -> Self {
        let width = grid.width();
        let mut labels = vec![None; grid.height() as usize * width as usize];
        let mut count = 0;

        for (start, cell) in grid.cells() {
            if !cell.is_passable() || labels[index(width, start)].is_some() {
                continue;
            }
            let reached = bfs_reach(start, |&pos| {
                pos.cardinal_adjacent_positions()
                    .into_iter()
                    .filter(move |&next| grid.get(next).map_or(false, Cell::is_passable))
            });
            for pos in reached {
                labels[index(width, pos)] = Some(count);
            }
            count += 1;
        }

        Self {
            width,
            labels,
            count,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Region holding `pos`, if it is passable.
    pub fn region_of(&self, pos: Position) -> Option<usize> {
        if pos.row < 0 || pos.col < 0 || pos.col >= self.width {
            return None;
        }
        self.labels.get(index(self.width, pos)).copied().flatten()
    }
}

fn index(width: i32, pos: Position) -> usize {
    pos.row as usize * width as usize + pos.col as usize
}

/// Equivalence classes of regions merged so far.
#[derive(Debug, Clone)]
struct RegionClasses {
    parent: Vec<usize>,
}

impl RegionClasses {
    fn new(regions: usize) -> Self {
        Self {
            parent: (0..regions).collect(),
        }
    }

    fn find(&mut self, mut region: usize) -> usize {
        while self.parent[region] != region {
            self.parent[region] = self.parent[self.parent[region]];
            region = self.parent[region];
        }
        region
    }

    /// Merges the classes of `a` and `b`. Returns false if they were already one.
    fn merge(&mut self, a: usize, b: usize) -> bool {
        let (a, b) = (self.find(a), self.find(b));
        if a == b {
            return false;
        }
        self.parent[b] = a;
        true
    }
}

/// A sill together with the room it belongs to and that room's region.
#[derive(Debug, Clone, Copy)]
struct Opening {
    room: RoomId,
    region: usize,
    sill: Sill,
}

#[derive(Debug, Clone)]
enum Bridge {
    /// A door straight onto open floor of region `far`.
    Direct { opening: Opening, far: usize },
    /// Doors from several rooms into one uncarved intersection. `reached`
    /// holds the regions whose doors already open onto it.
    Pocket {
        cell: Position,
        openings: Vec<Opening>,
        reached: Vec<usize>,
    },
}

#[derive(Debug, Default)]
struct PocketSides {
    openings: Vec<Opening>,
    reached: Vec<usize>,
}

impl PocketSides {
    fn sides(&self) -> usize {
        self.openings.len() + self.reached.len()
    }
}

fn find_bridges(dungeon: &Dungeon, regions: &RegionMap) -> Vec<Bridge> {
    let mut bridges = Vec::new();
    let mut pockets: BTreeMap<Position, PocketSides> = BTreeMap::new();
    let is_pocket = |pos: Position| {
        regions.region_of(pos).is_none()
            && dungeon.grid.get(pos).map_or(false, Cell::is_tunnelable)
    };

    for door in &dungeon.doors {
        let out = door.outside();
        if !is_pocket(out) {
            continue;
        }
        if let Some(region) = regions.region_of(door.pos) {
            pockets.entry(out).or_default().reached.push(region);
        }
    }

    for room in dungeon.rooms.values() {
        let floor = Position::new(room.bounds.north, room.bounds.west);
        let Some(region) = regions.region_of(floor) else {
            continue;
        };

        for sill in room_sills(&dungeon.grid, room.id, &room.bounds) {
            let opening = Opening {
                room: room.id,
                region,
                sill,
            };
            match regions.region_of(sill.out) {
                Some(far) if far != region => bridges.push(Bridge::Direct { opening, far }),
                Some(_) => {}
                None if is_pocket(sill.out) => {
                    pockets.entry(sill.out).or_default().openings.push(opening);
                }
                None => {}
            }
        }
    }

    bridges.extend(
        pockets
            .into_iter()
            .filter(|(_, sides)| !sides.openings.is_empty() && sides.sides() > 1)
            .map(|(cell, sides)| Bridge::Pocket {
                cell,
                openings: sides.openings,
                reached: sides.reached,
            }),
    );
    bridges
}

fn still_closed(grid: &Grid, sill: &Sill) -> bool {
    grid.get(sill.door).map_or(false, |cell| !cell.is_door())
}

/// Cuts doors until every region that can be reached through a wall is
/// merged. Returns the number of doors cut.
pub fn join_regions(dungeon: &mut Dungeon, rng: &mut StdRng) -> usize {
    let regions = RegionMap::build(&dungeon.grid);
    if regions.count() < 2 {
        return 0;
    }

    let mut classes = RegionClasses::new(regions.count());
    let mut bridges = find_bridges(dungeon, &regions);
    bridges.shuffle(rng);
    let mut cut = 0;

    for bridge in bridges {
        match bridge {
            Bridge::Direct { opening, far } => {
                if !still_closed(&dungeon.grid, &opening.sill) {
                    continue;
                }
                if !classes.merge(opening.region, far) {
                    continue;
                }
                cut_door(dungeon, opening.room, &opening.sill, rng);
                if dungeon.grid[opening.sill.out].is_corridor() {
                    dungeon.grid[opening.sill.out].carve_corridor();
                }
                cut += 1;
            }
            Bridge::Pocket {
                cell,
                openings,
                reached,
            } => {
                let mut joined: Vec<usize> = Vec::new();
                for region in reached {
                    let class = classes.find(region);
                    if !joined.contains(&class) {
                        joined.push(class);
                    }
                }
                let mut chosen = Vec::new();
                for opening in openings {
                    let class = classes.find(opening.region);
                    if still_closed(&dungeon.grid, &opening.sill) && !joined.contains(&class) {
                        joined.push(class);
                        chosen.push(opening);
                    }
                }
                if chosen.is_empty() || joined.len() < 2 {
                    continue;
                }

                for &class in &joined[1..] {
                    classes.merge(joined[0], class);
                }
                for opening in &chosen {
                    cut_door(dungeon, opening.room, &opening.sill, rng);
                }
                dungeon.grid[cell].carve_corridor();
                trace!("Carved junction at {:?} for {} regions", cell, joined.len());
                cut += chosen.len();
            }
        }
    }

    cut
}

/// Joins separated regions, then erases unreachable corridors.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionJoiner;

impl DungeonPass for RegionJoiner {
    fn apply(&self, dungeon: &mut Dungeon, rng: &mut StdRng) -> GrottoResult<()> {
        let cut = join_regions(dungeon, rng);
        let pruned = prune_orphans(&mut dungeon.grid);
        debug!(
            "Cut {} joining doors, pruned {} unreachable corridor cells",
            cut, pruned
        );
        Ok(())
    }

    fn pass_name(&self) -> &'static str {
        "RegionJoiner"
    }
}
