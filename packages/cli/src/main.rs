#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive CLI for the `AstraLens` lunar map toolchain.
//!
//! Provides a single entry point that lets users pick a tool (server, tile
//! generation, feature conversion, map exploration, AI assistant) and
//! guides them through its configuration.
//!
//! Uses `indicatif-log-bridge` (via [`astralens_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod assistant;
mod explore;

use std::path::PathBuf;

use astralens_cli_utils::{IndicatifProgress, MultiProgress};
use astralens_geometry_models::TILE_SIZE;
use dialoguer::{Input, Select};

/// Top-level tool selection.
enum Tool {
    Explore,
    Assistant,
    Server,
    GenerateTiles,
    ConvertFeatures,
}

impl Tool {
    const ALL: &[Self] = &[
        Self::Explore,
        Self::Assistant,
        Self::Server,
        Self::GenerateTiles,
        Self::ConvertFeatures,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Explore => "Explore the map (features, measure, analyze)",
            Self::Assistant => "Ask the AI assistant",
            Self::Server => "Start server",
            Self::GenerateTiles => "Generate tile pyramid",
            Self::ConvertFeatures => "Convert feature CSV to JSON",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = astralens_cli_utils::init_logger();

    println!("AstraLens Toolchain");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Explore => explore::run()?,
        Tool::Assistant => assistant::run().await?,
        Tool::Server => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(astralens_server::interactive::run())
            })
            .await??;
        }
        Tool::GenerateTiles => generate_tiles(&multi).await?,
        Tool::ConvertFeatures => convert_features()?,
    }

    Ok(())
}

async fn generate_tiles(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let input: String = Input::new()
        .with_prompt("Source image")
        .default("assets/moon.tiff".to_string())
        .interact_text()?;
    let output: String = Input::new()
        .with_prompt("Output directory")
        .default("tiles/moon".to_string())
        .interact_text()?;
    let tile_size: u32 = Input::new()
        .with_prompt("Tile size")
        .default(TILE_SIZE)
        .interact_text()?;

    let progress = IndicatifProgress::tiles_bar(multi, "Opening source image...");
    let summary = tokio::task::spawn_blocking(move || {
        astralens_tiles::generate_pyramid(
            &PathBuf::from(input),
            &PathBuf::from(output),
            tile_size,
            &progress,
        )
    })
    .await??;

    println!(
        "Wrote {} tiles over {} zoom levels to {}",
        summary.total_tiles(),
        summary.levels.len(),
        summary.output_dir.display()
    );
    Ok(())
}

fn convert_features() -> Result<(), Box<dyn std::error::Error>> {
    let csv_path: String = Input::new()
        .with_prompt("Feature CSV")
        .default("data/moon_features.csv".to_string())
        .interact_text()?;
    let json_path: String = Input::new()
        .with_prompt("Output JSON")
        .default("data/moon_features.json".to_string())
        .interact_text()?;

    let count =
        astralens_features::convert::convert_file(&PathBuf::from(csv_path), &PathBuf::from(&json_path))?;
    println!("Wrote {count} features to {json_path}");
    Ok(())
}
