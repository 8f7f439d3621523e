use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tileshot_capture::{CaptureConfig, CaptureGrid, capture, verify_grid};
use tileshot_common::{TileRect, WorldSize};
use tileshot_format::World;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tileshot", about = "Inspect world files and capture tile regions")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the header and info section of a world file
    Info {
        world: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Walk the tile section and check it covers the whole grid
    Verify { world: PathBuf },
    /// Locate every sampled tile of a rectangle
    Capture {
        world: PathBuf,
        /// Left column, 0-based
        left: u32,
        /// Top row, 0-based
        top: u32,
        width: u32,
        height: u32,
        /// Zoom level 1-5; each cell covers 2^(zoom-1) tiles per axis
        #[arg(short, long, default_value = "1")]
        zoom: u8,
        /// Give up after decoding this many tile records
        #[arg(long)]
        max_records: Option<u64>,
        /// Print the full grid as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct InfoReport {
    path: String,
    version: i32,
    bytes: usize,
    sections: Vec<i32>,
    tile_types: usize,
    title: String,
    size: WorldSize,
}

fn open(path: &Path) -> anyhow::Result<World> {
    let world =
        World::open(path).with_context(|| format!("failed to open world {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = world.len(), "world loaded");
    Ok(world)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info { world: path, json } => {
            let world = open(&path)?;
            let info = world.info().context("failed to read info section")?;
            let report = InfoReport {
                path: path.display().to_string(),
                version: world.version().0,
                bytes: world.len(),
                sections: world.sections().iter().collect(),
                tile_types: world.tile_type_count(),
                title: info.title,
                size: info.size,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.path);
                println!("  version:    {}", report.version);
                println!("  bytes:      {}", report.bytes);
                println!("  sections:   {}", report.sections.len());
                println!("  tile types: {}", report.tile_types);
                println!("  title:      {}", report.title);
                println!("  size:       {}x{}", report.size.width, report.size.height);
            }
        }
        Commands::Verify { world: path } => {
            let world = open(&path)?;
            let report = verify_grid(&world)
                .with_context(|| format!("tile grid of {} is invalid", path.display()))?;
            println!(
                "OK: {} records cover {} tiles ({} bytes)",
                report.records, report.tiles, report.bytes
            );
        }
        Commands::Capture {
            world: path,
            left,
            top,
            width,
            height,
            zoom,
            max_records,
            json,
        } => {
            let world = open(&path)?;
            let config = CaptureConfig { zoom, max_records };
            let region = TileRect::new(left, top, width, height);
            let grid = capture(&world, region, &config)
                .with_context(|| format!("capture of {region:?} failed"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&grid)?);
            } else {
                print_summary(&grid);
            }
        }
    }

    Ok(())
}

fn print_summary(grid: &CaptureGrid) {
    let region = grid.region;
    println!(
        "Captured {}x{} tiles at ({}, {}) as a {}x{} grid (scale {})",
        region.width, region.height, region.left, region.top, grid.columns, grid.rows, grid.scale
    );
    println!(
        "  {} samples in {} distinct records, {} records decoded",
        grid.cells.len(),
        grid.distinct_records(),
        grid.records_decoded
    );
    if let (Some(first), Some(last)) = (grid.cells.first(), grid.cells.last()) {
        println!(
            "  first record at {:#x}, last record at {:#x}",
            first.record_offset, last.record_offset
        );
    }
}
