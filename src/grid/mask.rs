//! # Dungeon Masks
//!
//! Global shape constraints applied once, before anything is placed.
//! Masking only ever adds `Blocked`; blocked cells stay blocked for the
//! rest of the run and are emptied by the final pass.

use super::{Grid, Position};
use crate::{GrottoError, GrottoResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const BOX: &[&[bool]] = &[
    &[true, true, true],
    &[true, false, true],
    &[true, true, true],
];

const CROSS: &[&[bool]] = &[
    &[false, true, false],
    &[true, true, true],
    &[false, true, false],
];

/// Overall dungeon outline.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayoutShape {
    /// The full rectangle.
    #[default]
    #[serde(alias = "None")]
    Full,
    /// A ring with the middle ninth blocked.
    Box,
    /// A plus sign with the four corner ninths blocked.
    Cross,
    /// A disc centred on the grid.
    Round,
    /// Any rectangular stencil; `false` entries are blocked.
    Custom(Vec<Vec<bool>>),
}

impl LayoutShape {
    /// Checks that a custom stencil is non-empty and rectangular.
    pub fn validate(&self) -> GrottoResult<()> {
        if let LayoutShape::Custom(stencil) = self {
            let width = stencil.first().map_or(0, Vec::len);
            if width == 0 {
                return Err(GrottoError::InvalidConfig(
                    "custom layout stencil is empty".to_string(),
                ));
            }
            if stencil.iter().any(|row| row.len() != width) {
                return Err(GrottoError::InvalidConfig(
                    "custom layout stencil rows differ in length".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl FromStr for LayoutShape {
    type Err = GrottoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "full" => Ok(LayoutShape::Full),
            "box" => Ok(LayoutShape::Box),
            "cross" => Ok(LayoutShape::Cross),
            "round" => Ok(LayoutShape::Round),
            _ => Err(GrottoError::InvalidConfig(format!(
                "unknown dungeon layout '{}'",
                s
            ))),
        }
    }
}

/// Blocks every cell outside `shape`. Returns the number of cells blocked.
pub fn apply_mask(grid: &mut Grid, shape: &LayoutShape) -> usize {
    match shape {
        LayoutShape::Full => 0,
        LayoutShape::Box => mask_cells(grid, BOX),
        LayoutShape::Cross => mask_cells(grid, CROSS),
        LayoutShape::Round => round_mask(grid),
        LayoutShape::Custom(stencil) => mask_cells(grid, stencil.as_slice()),
    }
}

/// Scales the stencil over the grid by nearest-neighbour sampling.
fn mask_cells<R: AsRef<[bool]>>(grid: &mut Grid, stencil: &[R]) -> usize {
    let stencil_width = stencil.first().map_or(0, |row| row.as_ref().len());
    if stencil_width == 0 {
        return 0;
    }

    let row_scale = stencil.len() as f64 / grid.height() as f64;
    let col_scale = stencil_width as f64 / grid.width() as f64;
    let mut blocked = 0;

    for row in 0..grid.height() {
        let stencil_row = stencil[(row as f64 * row_scale) as usize].as_ref();
        for col in 0..grid.width() {
            let keep = stencil_row
                .get((col as f64 * col_scale) as usize)
                .copied()
                .unwrap_or(false);
            if !keep {
                grid[Position::new(row, col)].block();
                blocked += 1;
            }
        }
    }

    blocked
}

/// Blocks cells farther from the centre than half the column count.
fn round_mask(grid: &mut Grid) -> usize {
    let center_row = grid.rows() as i64 / 2;
    let center_col = grid.cols() as i64 / 2;
    let radius_sq = center_col * center_col;
    let mut blocked = 0;

    for row in 0..grid.height() {
        for col in 0..grid.width() {
            let d_row = row as i64 - center_row;
            let d_col = col as i64 - center_col;
            if d_row * d_row + d_col * d_col > radius_sq {
                grid[Position::new(row, col)].block();
                blocked += 1;
            }
        }
    }

    blocked
}
