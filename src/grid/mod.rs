//! # Grid Module
//!
//! The cell matrix every generation pass reads and mutates in place.
//!
//! A grid configured for `rows` x `cols` holds `(rows + 1) x (cols + 1)` cells,
//! with `rows` and `cols` forced even. Cells on odd rows and odd columns are
//! *intersections*: the lattice that room floor and corridors are laid on.
//! Even lines carry walls, perimeters and doors.

pub mod cell;
pub mod mask;

pub use cell::*;
pub use mask::*;

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A cell coordinate on the grid.
///
/// # Examples
///
/// ```
/// use grotto::{Direction, Position};
///
/// let pos = Position::intersection(1, 2);
/// assert_eq!(pos, Position::new(3, 5));
/// assert_eq!(pos.step(Direction::North), Position::new(2, 5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Cell coordinate of lattice intersection `(i, j)`.
    pub fn intersection(i: i32, j: i32) -> Self {
        Self::new(i * 2 + 1, j * 2 + 1)
    }

    pub fn offset(self, d_row: i32, d_col: i32) -> Self {
        Self::new(self.row + d_row, self.col + d_col)
    }

    pub fn step(self, direction: Direction) -> Self {
        let (d_row, d_col) = direction.delta();
        self.offset(d_row, d_col)
    }

    /// Returns the 4 cardinal neighbours.
    pub fn cardinal_adjacent_positions(self) -> [Position; 4] {
        Direction::ALL.map(|direction| self.step(direction))
    }
}

/// Compass directions on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Row and column delta of one step.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
            Direction::East => (0, 1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }
}

/// The dungeon cell matrix.
///
/// Dimensions are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    n_i: u32,
    n_j: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an empty grid; odd `rows`/`cols` are rounded down to even.
    ///
    /// # Examples
    ///
    /// ```
    /// use grotto::Grid;
    ///
    /// let grid = Grid::new(17, 32);
    /// assert_eq!(grid.rows(), 16);
    /// assert_eq!(grid.height(), 17);
    /// assert_eq!(grid.width(), 33);
    /// ```
    pub fn new(rows: u32, cols: u32) -> Self {
        let n_i = rows / 2;
        let n_j = cols / 2;
        let len = (n_i as usize * 2 + 1) * (n_j as usize * 2 + 1);
        Self {
            n_i,
            n_j,
            cells: vec![Cell::default(); len],
        }
    }

    /// Intersection rows.
    pub fn n_i(&self) -> u32 {
        self.n_i
    }

    /// Intersection columns.
    pub fn n_j(&self) -> u32 {
        self.n_j
    }

    pub fn rows(&self) -> u32 {
        self.n_i * 2
    }

    pub fn cols(&self) -> u32 {
        self.n_j * 2
    }

    /// Number of cell rows, `rows + 1`.
    pub fn height(&self) -> i32 {
        self.rows() as i32 + 1
    }

    /// Number of cell columns, `cols + 1`.
    pub fn width(&self) -> i32 {
        self.cols() as i32 + 1
    }

    /// Last row a room may occupy.
    pub fn max_row(&self) -> i32 {
        self.rows() as i32 - 1
    }

    /// Last column a room may occupy.
    pub fn max_col(&self) -> i32 {
        self.cols() as i32 - 1
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row >= 0 && pos.col >= 0 && pos.row < self.height() && pos.col < self.width()
    }

    fn index_of(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.row as usize * self.width() as usize + pos.col as usize)
        } else {
            None
        }
    }

    pub fn get(&self, pos: Position) -> Option<&Cell> {
        self.index_of(pos).map(|index| &self.cells[index])
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        match self.index_of(pos) {
            Some(index) => Some(&mut self.cells[index]),
            None => None,
        }
    }

    /// True when `pos` is off the grid or holds nothing passable.
    pub fn is_walled(&self, pos: Position) -> bool {
        self.get(pos).map_or(true, |cell| !cell.is_passable())
    }

    pub fn is_bare_corridor(&self, pos: Position) -> bool {
        self.get(pos).map_or(false, Cell::is_bare_corridor)
    }

    /// Every cell position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let (height, width) = (self.height(), self.width());
        (0..height).flat_map(move |row| (0..width).map(move |col| Position::new(row, col)))
    }

    /// Every intersection in row-major order.
    pub fn intersections(&self) -> impl Iterator<Item = Position> {
        let (n_i, n_j) = (self.n_i as i32, self.n_j as i32);
        (0..n_i).flat_map(move |i| (0..n_j).map(move |j| Position::intersection(i, j)))
    }

    /// Cells paired with their positions, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        self.positions().zip(self.cells.iter())
    }

    /// Number of cells matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Cell) -> bool) -> usize {
        self.cells.iter().filter(|cell| predicate(cell)).count()
    }
}

impl Index<Position> for Grid {
    type Output = Cell;

    fn index(&self, pos: Position) -> &Cell {
        match self.index_of(pos) {
            Some(index) => &self.cells[index],
            None => panic!("position {:?} is outside the grid", pos),
        }
    }
}

impl IndexMut<Position> for Grid {
    fn index_mut(&mut self, pos: Position) -> &mut Cell {
        match self.index_of(pos) {
            Some(index) => &mut self.cells[index],
            None => panic!("position {:?} is outside the grid", pos),
        }
    }
}
