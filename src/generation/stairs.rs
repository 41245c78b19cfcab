//! # Stair Placement
//!
//! Stairs sit at the tip of straight corridor dead ends.

use super::utils::roll_index;
use super::{match_pattern, DungeonPass, WeightedTable, STAIR_ENDS};
use crate::grid::{Grid, Position, StairKind};
use crate::{Dungeon, GrottoResult};
use log::{debug, trace};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Stair kinds after the first two, which are always down.
pub const STAIR_KINDS: WeightedTable<StairKind> =
    WeightedTable::new(&[(StairKind::Down, 1), (StairKind::Up, 1)]);

/// Number of leading stairs forced to [`StairKind::Down`].
pub const GUARANTEED_DOWN_STAIRS: usize = 2;

/// A placed staircase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stair {
    pub pos: Position,
    /// Corridor cell the stair is entered from.
    pub next: Position,
    pub kind: StairKind,
}

/// A dead end able to host a stair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StairCandidate {
    pub pos: Position,
    pub next: Position,
}

/// Every bare-corridor intersection that ends a straight three-cell stub.
pub fn find_ends(grid: &Grid) -> Vec<StairCandidate> {
    grid.intersections()
        .filter(|&pos| grid.is_bare_corridor(pos))
        .filter_map(|pos| {
            match_pattern(&STAIR_ENDS, grid, pos).map(|pattern| StairCandidate {
                pos,
                next: pattern.next(pos),
            })
        })
        .collect()
}

/// Places up to `add_stairs` stairs on randomly chosen dead ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct StairPlacer;

impl DungeonPass for StairPlacer {
    fn apply(&self, dungeon: &mut Dungeon, rng: &mut StdRng) -> GrottoResult<()> {
        let wanted = dungeon.config.add_stairs as usize;
        let mut candidates = find_ends(&dungeon.grid);
        let found = candidates.len();

        for placed in 0..wanted {
            if candidates.is_empty() {
                break;
            }
            let candidate = candidates.remove(roll_index(rng, candidates.len()));
            let kind = if placed < GUARANTEED_DOWN_STAIRS {
                StairKind::Down
            } else {
                STAIR_KINDS.choose(rng).unwrap_or_default()
            };

            dungeon.grid[candidate.pos].place_stair(kind);
            trace!("Stair {:?} at {:?}", kind, candidate.pos);
            dungeon.stairs.push(Stair {
                pos: candidate.pos,
                next: candidate.next,
                kind,
            });
        }

        debug!(
            "Placed {} of {} requested stairs ({} dead ends found)",
            dungeon.stairs.len(),
            wanted,
            found
        );
        Ok(())
    }

    fn pass_name(&self) -> &'static str {
        "StairPlacer"
    }
}
