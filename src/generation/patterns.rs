//! # Dead-End Patterns
//!
//! Local adjacency templates that recognise corridor dead ends.
//!
//! A pattern is anchored on a cell and names the direction the corridor
//! continues in. It matches when every `corridor` offset is bare corridor and
//! every `walled` offset holds nothing passable. Offsets off the grid count
//! as walls.

use crate::grid::{Direction, Grid, Position};

/// A direction-specific dead-end template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadEndPattern {
    /// Direction the corridor continues away from the dead end.
    pub direction: Direction,
    /// `(row, col)` offsets that must not be passable.
    pub walled: &'static [(i32, i32)],
    /// `(row, col)` offsets that must be bare corridor.
    pub corridor: &'static [(i32, i32)],
}

impl DeadEndPattern {
    pub fn matches(&self, grid: &Grid, pos: Position) -> bool {
        self.corridor
            .iter()
            .all(|&(d_row, d_col)| grid.is_bare_corridor(pos.offset(d_row, d_col)))
            && self
                .walled
                .iter()
                .all(|&(d_row, d_col)| grid.is_walled(pos.offset(d_row, d_col)))
    }

    /// The cell one step along the corridor.
    pub fn next(&self, pos: Position) -> Position {
        pos.step(self.direction)
    }
}

/// Straight three-cell stubs walled on three sides: where stairs go.
pub const STAIR_ENDS: [DeadEndPattern; 4] = [
    DeadEndPattern {
        direction: Direction::South,
        walled: &[(1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1), (0, 1), (1, 1)],
        corridor: &[(0, 0), (1, 0), (2, 0)],
    },
    DeadEndPattern {
        direction: Direction::North,
        walled: &[(-1, -1), (0, -1), (1, -1), (1, 0), (1, 1), (0, 1), (-1, 1)],
        corridor: &[(0, 0), (-1, 0), (-2, 0)],
    },
    DeadEndPattern {
        direction: Direction::East,
        walled: &[(-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1), (1, 0), (1, 1)],
        corridor: &[(0, 0), (0, 1), (0, 2)],
    },
    DeadEndPattern {
        direction: Direction::West,
        walled: &[(-1, -1), (-1, 0), (-1, 1), (0, 1), (1, 1), (1, 0), (1, -1)],
        corridor: &[(0, 0), (0, -1), (0, -2)],
    },
];

/// Single cells open on one side only: what dead-end collapsing removes.
pub const CLOSE_ENDS: [DeadEndPattern; 4] = [
    DeadEndPattern {
        direction: Direction::North,
        walled: &[(0, -1), (1, -1), (1, 0), (1, 1), (0, 1)],
        corridor: &[],
    },
    DeadEndPattern {
        direction: Direction::South,
        walled: &[(0, -1), (-1, -1), (-1, 0), (-1, 1), (0, 1)],
        corridor: &[],
    },
    DeadEndPattern {
        direction: Direction::West,
        walled: &[(-1, 0), (-1, 1), (0, 1), (1, 1), (1, 0)],
        corridor: &[],
    },
    DeadEndPattern {
        direction: Direction::East,
        walled: &[(-1, 0), (-1, -1), (0, -1), (1, -1), (1, 0)],
        corridor: &[],
    },
];

/// First pattern in `patterns` matching at `pos`.
pub fn match_pattern<'a>(
    patterns: &'a [DeadEndPattern],
    grid: &Grid,
    pos: Position,
) -> Option<&'a DeadEndPattern> {
    patterns.iter().find(|pattern| pattern.matches(grid, pos))
}
