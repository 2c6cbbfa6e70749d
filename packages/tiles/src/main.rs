#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! CLI tool for slicing a lunar mosaic into a `{z}/{y}/{x}.png` tile
//! pyramid served by the `AstraLens` server.

use std::path::PathBuf;
use std::sync::Arc;

use astralens_geometry_models::TILE_SIZE;
use astralens_tiles::progress::{LogProgress, ProgressCallback};
use clap::Parser;

#[derive(Parser)]
#[command(name = "astralens_tiles", about = "Tile pyramid generator")]
struct Cli {
    /// Source image (TIFF, PNG or JPEG)
    #[arg(short, long, default_value = "assets/moon.tiff")]
    input: PathBuf,

    /// Output directory; tiles land in `{output}/{z}/{y}/{x}.png`
    #[arg(short, long, default_value = "tiles/moon")]
    output: PathBuf,

    /// Tile edge length in pixels
    #[arg(long, default_value_t = TILE_SIZE)]
    tile_size: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let progress: Arc<dyn ProgressCallback> = Arc::new(LogProgress::default());
    let summary =
        astralens_tiles::generate_pyramid(&cli.input, &cli.output, cli.tile_size, &progress)?;

    for level in &summary.levels {
        log::info!(
            "Z={} {}x{}: {} tiles",
            level.zoom,
            level.dimensions.width,
            level.dimensions.height,
            level.tiles
        );
    }
    log::info!(
        "Pyramid complete: {} tiles in {}",
        summary.total_tiles(),
        summary.output_dir.display()
    );

    Ok(())
}
