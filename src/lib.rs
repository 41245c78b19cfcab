//! # Grotto
//!
//! A deterministic procedural dungeon generator.
//!
//! ## Architecture Overview
//!
//! A dungeon is produced by a strictly ordered pipeline of passes that all
//! read and mutate one shared [`Grid`]:
//!
//! - **Grid & Mask**: cell storage plus the global shape constraint
//! - **Rooms**: non-overlapping rectangular rooms, packed or scattered
//! - **Doors**: openings cut through room walls with weighted door kinds
//! - **Corridors**: randomized depth-first carving with a straightness bias
//! - **Stairs**: staircases placed on corridor dead ends
//! - **Cleanup**: dead-end collapsing, door fix-up and mask removal
//!
//! Every random draw comes from a single stream seeded from the
//! configuration, so the same configuration always reproduces the same
//! grid, rooms, doors and stairs.
//!
//! ```
//! use grotto::{DungeonGenerator, GenerationConfig};
//!
//! let config = GenerationConfig::for_testing(42);
//! let dungeon = DungeonGenerator::new().build(&config).unwrap();
//! assert!(dungeon.stairs.len() <= config.add_stairs as usize);
//! ```

pub mod export;
pub mod generation;
pub mod grid;

pub use generation::*;
pub use grid::*;

pub use export::ExportFormat;

/// Core error type for the Grotto generator.
#[derive(thiserror::Error, Debug)]
pub enum GrottoError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration option is out of range or unknown
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Dungeon state breaks a structural invariant
    #[error("Invalid dungeon state: {0}")]
    InvalidState(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Grotto codebase.
pub type GrottoResult<T> = Result<T, GrottoError>;

/// Version information for the generator.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generator configuration constants.
pub mod config {
    /// Default grid height in cells
    pub const DEFAULT_ROWS: u32 = 32;

    /// Default grid width in cells
    pub const DEFAULT_COLS: u32 = 32;

    /// Room placement stops once this many rooms exist
    pub const MAX_ROOMS: usize = 999;

    /// Largest accepted value for `rows` or `cols`
    pub const MAX_DIMENSION: u32 = 1024;

    /// Scale used when reporting room sizes
    pub const FEET_PER_CELL: u32 = 10;
}
