//! # Generation Module
//!
//! The dungeon generation pipeline and its configuration.
//!
//! Generation is a fixed sequence of passes over one [`Dungeon`]. Each pass
//! implements [`DungeonPass`], runs to completion before the next begins and
//! draws all of its randomness from the single [`StdRng`] threaded through
//! the pipeline by [`DungeonGenerator`].

pub mod cleanup;
pub mod connect;
pub mod corridors;
pub mod doors;
pub mod dungeon;
pub mod patterns;
pub mod rooms;
pub mod stairs;
pub mod weighted;

pub use cleanup::*;
pub use connect::*;
pub use corridors::*;
pub use doors::*;
pub use dungeon::*;
pub use patterns::*;
pub use rooms::*;
pub use stairs::*;
pub use weighted::*;

use crate::grid::LayoutShape;
use crate::{config, GrottoError, GrottoResult};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Configuration for one generation run.
///
/// Every field has a default, so a configuration file only needs to name the
/// options it changes. A file without a `seed` gets one from the wall clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    #[serde(default = "utils::clock_seed")]
    pub seed: u64,
    /// Grid height; odd values are rounded down to even
    pub rows: u32,
    /// Grid width; odd values are rounded down to even
    pub cols: u32,
    /// Global outline of the dungeon
    pub layout: LayoutShape,
    /// Smallest room edge, in cells
    pub room_min: u32,
    /// Largest room edge, in cells
    pub room_max: u32,
    /// Fixed room edge in intersections; overrides `room_min`/`room_max`
    pub room_size: Option<u32>,
    /// Room placement strategy
    pub room_layout: RoomLayout,
    /// Corridor straightness
    pub corridor_layout: CorridorLayout,
    /// Percentage of dead ends to collapse (0-100)
    pub remove_deadends: u32,
    /// Number of stairs to place
    pub add_stairs: u32,
}

impl GenerationConfig {
    /// Creates the reference configuration with the given seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use grotto::{CorridorLayout, GenerationConfig};
    ///
    /// let config = GenerationConfig::new(7);
    /// assert_eq!(config.rows, 32);
    /// assert_eq!(config.corridor_layout, CorridorLayout::Labyrinth);
    /// assert_eq!(config.remove_deadends, 100);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rows: config::DEFAULT_ROWS,
            cols: config::DEFAULT_COLS,
            layout: LayoutShape::Full,
            room_min: 4,
            room_max: 4,
            room_size: Some(4),
            room_layout: RoomLayout::Packed,
            corridor_layout: CorridorLayout::Labyrinth,
            remove_deadends: 100,
            add_stairs: 2,
        }
    }

    /// Creates a configuration for testing with a small grid and small rooms.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            rows: 18,
            cols: 18,
            layout: LayoutShape::Full,
            room_min: 2,
            room_max: 2,
            room_size: None,
            room_layout: RoomLayout::Packed,
            corridor_layout: CorridorLayout::Straight,
            remove_deadends: 0,
            add_stairs: 2,
        }
    }

    /// Parses a JSON configuration.
    ///
    /// Malformed documents and unknown option values are reported as
    /// [`GrottoError::InvalidConfig`].
    pub fn from_json(json: &str) -> GrottoResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| GrottoError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> GrottoResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Rejects options that are out of range.
    ///
    /// Degenerate but meaningful inputs (`room_min > room_max`, tiny grids,
    /// fully masked layouts) are accepted and simply yield sparse dungeons.
    pub fn validate(&self) -> GrottoResult<()> {
        if self.remove_deadends > 100 {
            return Err(GrottoError::InvalidConfig(format!(
                "remove_deadends must be a percentage, got {}",
                self.remove_deadends
            )));
        }
        if self.rows > config::MAX_DIMENSION || self.cols > config::MAX_DIMENSION {
            return Err(GrottoError::InvalidConfig(format!(
                "grid {}x{} exceeds the {} cell limit",
                self.rows,
                self.cols,
                config::MAX_DIMENSION
            )));
        }
        self.layout.validate()
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// How rooms are spread over the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoomLayout {
    /// One placement attempt per intersection, densely packed.
    #[default]
    Packed,
    /// A fixed number of randomly anchored attempts.
    Scattered,
}

impl FromStr for RoomLayout {
    type Err = GrottoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "packed" => Ok(RoomLayout::Packed),
            "scattered" => Ok(RoomLayout::Scattered),
            _ => Err(GrottoError::InvalidConfig(format!(
                "unknown room layout '{}'",
                s
            ))),
        }
    }
}

/// Corridor character, expressed as a bias toward continuing straight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CorridorLayout {
    #[default]
    Labyrinth,
    Bent,
    Straight,
}

impl CorridorLayout {
    /// Percent chance of keeping the previous direction.
    pub fn bias(self) -> u32 {
        match self {
            CorridorLayout::Labyrinth => 0,
            CorridorLayout::Bent => 50,
            CorridorLayout::Straight => 100,
        }
    }
}

impl FromStr for CorridorLayout {
    type Err = GrottoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "labyrinth" => Ok(CorridorLayout::Labyrinth),
            "bent" => Ok(CorridorLayout::Bent),
            "straight" => Ok(CorridorLayout::Straight),
            _ => Err(GrottoError::InvalidConfig(format!(
                "unknown corridor layout '{}'",
                s
            ))),
        }
    }
}

/// Trait for procedural generators.
///
/// A generator turns a configuration and a random stream into content and
/// can check content it produced against the same configuration.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> GrottoResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> GrottoResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// One stage of the generation pipeline.
///
/// Passes mutate the dungeon in place and must draw randomness only from
/// `rng`, in a fixed order, so that runs stay reproducible.
pub trait DungeonPass {
    fn apply(&self, dungeon: &mut Dungeon, rng: &mut StdRng) -> GrottoResult<()>;

    /// Gets the pass name for logging and debugging.
    fn pass_name(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use rand::{Rng, SeedableRng};
    use std::time::{SystemTime, UNIX_EPOCH};

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Seed derived from the wall clock, in whole seconds.
    pub fn clock_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default()
    }

    /// Uniform index into a collection of `len` elements.
    ///
    /// Rolls through `u32` so the stream does not depend on pointer width.
    /// `len` must be non-zero.
    pub fn roll_index(rng: &mut StdRng, len: usize) -> usize {
        debug_assert!(len > 0, "cannot roll an index into an empty collection");
        rng.gen_range(0..len as u32) as usize
    }

    /// A roll in `0..100`.
    pub fn roll_percent(rng: &mut StdRng) -> u32 {
        rng.gen_range(0..100)
    }
}
