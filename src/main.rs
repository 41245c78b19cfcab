//! # Grotto Command Line
//!
//! Generates one dungeon and prints or saves it.

use clap::Parser;
use grotto::{
    export, generation::utils, DungeonGenerator, ExportFormat, GenerationConfig, GrottoResult,
};
use log::{info, LevelFilter};
use std::path::PathBuf;

/// Command line arguments for the Grotto generator.
#[derive(Parser, Debug)]
#[command(name = "grotto")]
#[command(about = "A deterministic procedural dungeon generator")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation (defaults to the clock)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Grid height in cells
    #[arg(long)]
    rows: Option<u32>,

    /// Grid width in cells
    #[arg(long)]
    cols: Option<u32>,

    /// Dungeon shape (none, box, cross, round)
    #[arg(long)]
    layout: Option<String>,

    /// Smallest room dimension
    #[arg(long)]
    room_min: Option<u32>,

    /// Largest room dimension
    #[arg(long)]
    room_max: Option<u32>,

    /// Fixed room dimension, overriding min and max
    #[arg(long)]
    room_size: Option<u32>,

    /// Room placement strategy (packed, scattered)
    #[arg(long)]
    room_layout: Option<String>,

    /// Corridor style (labyrinth, bent, straight)
    #[arg(long)]
    corridor_layout: Option<String>,

    /// Percentage of dead ends to remove
    #[arg(long)]
    remove_deadends: Option<u32>,

    /// Number of stairs to place
    #[arg(long)]
    add_stairs: Option<u32>,

    /// JSON configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format (ascii, tiles, json)
    #[arg(short, long, default_value = "ascii")]
    format: String,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> GrottoResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);

    info!("Starting Grotto v{}", grotto::VERSION);

    let config = build_config(&args)?;
    let format: ExportFormat = args.format.parse()?;
    let dungeon = DungeonGenerator::new().build(&config)?;

    match &args.output {
        Some(path) => {
            export::save(&dungeon, format, path)?;
            info!("Wrote dungeon to {}", path.display());
        }
        None => print!("{}", export::render(&dungeon, format)?),
    }

    Ok(())
}

/// Initializes the logger from the requested level name.
fn initialize_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .init();
}

/// Merges the config file (if any) with the command line flags.
fn build_config(args: &Args) -> GrottoResult<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => GenerationConfig::load(path)?,
        None => GenerationConfig::new(utils::clock_seed()),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    if let Some(cols) = args.cols {
        config.cols = cols;
    }
    if let Some(layout) = &args.layout {
        config.layout = layout.parse()?;
    }
    if let Some(room_min) = args.room_min {
        config.room_min = room_min;
    }
    if let Some(room_max) = args.room_max {
        config.room_max = room_max;
    }
    // Explicit bounds replace any fixed size unless one is given too.
    if args.room_size.is_some() || args.room_min.is_some() || args.room_max.is_some() {
        config.room_size = args.room_size;
    }
    if let Some(room_layout) = &args.room_layout {
        config.room_layout = room_layout.parse()?;
    }
    if let Some(corridor_layout) = &args.corridor_layout {
        config.corridor_layout = corridor_layout.parse()?;
    }
    if let Some(percent) = args.remove_deadends {
        config.remove_deadends = percent;
    }
    if let Some(stairs) = args.add_stairs {
        config.add_stairs = stairs;
    }

    info!("Generating with seed {}", config.seed);
    Ok(config)
}
