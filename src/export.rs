//! # Export
//!
//! Adapters that turn a finished [`Dungeon`] into something outside the
//! crate can consume: a printable map, a tile matrix, or the full JSON dump.

use crate::{Cell, Dungeon, GrottoError, GrottoResult};
use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

/// Tile code for anything walkable.
pub const TILE_FLOOR: u8 = 0;
/// Tile code for walls and unused cells.
pub const TILE_WALL: u8 = 1;
/// Tile code for stairs.
pub const TILE_STAIR: u8 = 2;

/// Output formats understood by [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// One character per cell
    #[default]
    Ascii,
    /// Comma-separated tile codes, one line per row
    Tiles,
    /// Pretty-printed JSON of the whole dungeon
    Json,
}

impl FromStr for ExportFormat {
    type Err = GrottoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascii" => Ok(ExportFormat::Ascii),
            "tiles" => Ok(ExportFormat::Tiles),
            "json" => Ok(ExportFormat::Json),
            _ => Err(GrottoError::InvalidConfig(format!(
                "unknown export format '{}'",
                s
            ))),
        }
    }
}

fn glyph_for(cell: &Cell) -> char {
    if let Some(stair) = cell.stair() {
        stair.glyph()
    } else if let Some(door) = cell.door() {
        door.glyph()
    } else if cell.is_room() {
        cell.label().unwrap_or('.')
    } else if cell.is_open() {
        '.'
    } else if cell.is_perimeter() {
        '#'
    } else {
        ' '
    }
}

/// Draws the grid as text, one line per row.
pub fn render_ascii(dungeon: &Dungeon) -> String {
    let width = dungeon.grid.width();
    let mut out = String::with_capacity((dungeon.grid.height() * (width + 1)) as usize);

    for (pos, cell) in dungeon.grid.cells() {
        out.push(glyph_for(cell));
        if pos.col == width - 1 {
            out.push('\n');
        }
    }
    out
}

/// Tile codes for every cell, row by row.
pub fn tile_matrix(dungeon: &Dungeon) -> Vec<Vec<u8>> {
    let width = dungeon.grid.width() as usize;
    let mut rows = vec![Vec::with_capacity(width); dungeon.grid.height() as usize];

    for (pos, cell) in dungeon.grid.cells() {
        let tile = if cell.is_stair() {
            TILE_STAIR
        } else if cell.is_passable() {
            TILE_FLOOR
        } else {
            TILE_WALL
        };
        rows[pos.row as usize].push(tile);
    }
    rows
}

/// Renders `dungeon` in the requested format.
pub fn render(dungeon: &Dungeon, format: ExportFormat) -> GrottoResult<String> {
    match format {
        ExportFormat::Ascii => Ok(render_ascii(dungeon)),
        ExportFormat::Tiles => {
            let mut out = String::new();
            for row in tile_matrix(dungeon) {
                let line: Vec<String> = row.iter().map(u8::to_string).collect();
                // Writing into a String cannot fail.
                let _ = writeln!(out, "{}", line.join(","));
            }
            Ok(out)
        }
        ExportFormat::Json => serde_json::to_string_pretty(dungeon).map_err(GrottoError::from),
    }
}

/// Renders `dungeon` and writes it to `path`.
pub fn save(dungeon: &Dungeon, format: ExportFormat, path: impl AsRef<Path>) -> GrottoResult<()> {
    let rendered = render(dungeon, format)?;
    std::fs::write(path, rendered)?;
    Ok(())
}
