#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Slices a large source image into a `{z}/{y}/{x}.png` tile pyramid.
//!
//! Zoom `0` is the source at full resolution. Each lower level halves both
//! edges (Lanczos3 resampling) down to the level where the whole image fits
//! in a single tile. Edge tiles are padded to the full tile size.

pub mod progress;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use astralens_geometry::pyramid::{level_dimensions, min_zoom, tile_grid, tile_path};
use astralens_geometry_models::{ImageDimensions, NATIVE_ZOOM};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImage, ImageReader};
use thiserror::Error;

use crate::progress::ProgressCallback;

/// Errors that can occur while generating tiles.
#[derive(Debug, Error)]
pub enum TileError {
    /// I/O error reading the source or writing tiles.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Decoding or encoding failed.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The tile size is unusable.
    #[error("Invalid tile size: {tile_size}")]
    InvalidTileSize {
        /// The rejected size.
        tile_size: u32,
    },
}

/// Summary of one generated level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSummary {
    /// Zoom level.
    pub zoom: i32,
    /// Scaled image size at this level.
    pub dimensions: ImageDimensions,
    /// Number of tiles written.
    pub tiles: u32,
}

/// Result of a pyramid run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyramidSummary {
    /// Directory the tiles were written to.
    pub output_dir: PathBuf,
    /// Source image size.
    pub source: ImageDimensions,
    /// Generated levels, most zoomed-out first.
    pub levels: Vec<LevelSummary>,
}

impl PyramidSummary {
    /// Total number of tiles written.
    #[must_use]
    pub fn total_tiles(&self) -> u64 {
        self.levels.iter().map(|l| u64::from(l.tiles)).sum()
    }
}

/// Opens `input` without decoder size limits.
///
/// # Errors
///
/// Returns [`TileError`] if the file can't be read or decoded.
pub fn open_source(input: &Path) -> Result<DynamicImage, TileError> {
    let mut reader = ImageReader::open(input)?.with_guessed_format()?;
    reader.no_limits();
    Ok(reader.decode()?)
}

/// Generates the full pyramid for the image at `input`.
///
/// # Errors
///
/// Returns [`TileError`] if the source can't be decoded or a tile can't be
/// written.
pub fn generate_pyramid(
    input: &Path,
    output_dir: &Path,
    tile_size: u32,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<PyramidSummary, TileError> {
    progress.set_message(format!("Opening {}", input.display()));
    let source = open_source(input)?;
    generate_from_image(&source, output_dir, tile_size, progress)
}

/// Generates the full pyramid for an already decoded image.
///
/// # Errors
///
/// Returns [`TileError`] if a tile can't be written.
pub fn generate_from_image(
    source: &DynamicImage,
    output_dir: &Path,
    tile_size: u32,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<PyramidSummary, TileError> {
    if tile_size == 0 {
        return Err(TileError::InvalidTileSize { tile_size });
    }

    let dims = ImageDimensions::new(source.width(), source.height());
    let lowest = min_zoom(dims, tile_size);
    log::info!(
        "Source {}x{}, zoom range {lowest}..={NATIVE_ZOOM}",
        dims.width,
        dims.height
    );

    let total: u64 = (lowest..=NATIVE_ZOOM)
        .map(|z| {
            let (cols, rows) = tile_grid(level_dimensions(dims, z), tile_size);
            u64::from(cols) * u64::from(rows)
        })
        .sum();
    progress.set_total(total);

    std::fs::create_dir_all(output_dir)?;

    let mut levels = Vec::new();
    for zoom in lowest..=NATIVE_ZOOM {
        let level = level_dimensions(dims, zoom);
        if level.width < 1 || level.height < 1 {
            log::debug!("Skipping zoom {zoom}: scaled image is empty");
            continue;
        }

        progress.set_message(format!(
            "Zoom {zoom} ({}x{})",
            level.width, level.height
        ));

        let scaled = if level == dims {
            source.clone()
        } else {
            source.resize_exact(level.width, level.height, FilterType::Lanczos3)
        };

        let tiles = write_level(&scaled, output_dir, zoom, tile_size, progress)?;
        levels.push(LevelSummary {
            zoom,
            dimensions: level,
            tiles,
        });
    }

    let summary = PyramidSummary {
        output_dir: output_dir.to_path_buf(),
        source: dims,
        levels,
    };
    progress.finish(format!("Wrote {} tiles", summary.total_tiles()));
    Ok(summary)
}

/// Slices one scaled level into tiles. Returns the number written.
fn write_level(
    scaled: &DynamicImage,
    output_dir: &Path,
    zoom: i32,
    tile_size: u32,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<u32, TileError> {
    let level = ImageDimensions::new(scaled.width(), scaled.height());
    let (cols, rows) = tile_grid(level, tile_size);
    let zoom_dir = zoom.to_string();

    for row in 0..rows {
        let row_dir = output_dir.join(&zoom_dir).join(row.to_string());
        std::fs::create_dir_all(&row_dir)?;

        for col in 0..cols {
            let tile = extract_tile(scaled, col * tile_size, row * tile_size, tile_size)?;
            tile.save(tile_path(output_dir, &zoom_dir, row, col))?;
            progress.inc(1);
        }
    }

    Ok(cols * rows)
}

/// Copies the `tile_size` square at (`x`, `y`) into a new image. Parts
/// outside the source stay zeroed.
fn extract_tile(
    scaled: &DynamicImage,
    x: u32,
    y: u32,
    tile_size: u32,
) -> Result<DynamicImage, TileError> {
    let width = tile_size.min(scaled.width() - x);
    let height = tile_size.min(scaled.height() - y);
    let view = scaled.crop_imm(x, y, width, height);

    if width == tile_size && height == tile_size {
        return Ok(view);
    }

    let mut tile = DynamicImage::new(tile_size, tile_size, scaled.color());
    tile.copy_from(&view, 0, 0)?;
    Ok(tile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{LogProgress, null_progress};
    use image::{GenericImageView, Rgba, RgbaImage};

    fn checker(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        }))
    }

    #[test]
    fn writes_every_level() {
        let dir = tempfile::tempdir().unwrap();
        let summary =
            generate_from_image(&checker(100, 60), dir.path(), 32, &null_progress()).unwrap();

        // 100 / 32 = 3.125 -> two halvings needed.
        let zooms: Vec<i32> = summary.levels.iter().map(|l| l.zoom).collect();
        assert_eq!(zooms, vec![-2, -1, 0]);
        assert_eq!(summary.levels[0].dimensions, ImageDimensions::new(25, 15));
        assert_eq!(summary.levels[0].tiles, 1);
        assert_eq!(summary.levels[1].tiles, 2);
        assert_eq!(summary.levels[2].tiles, 4 * 2);
        assert_eq!(summary.total_tiles(), 11);

        assert!(dir.path().join("0/1/3.png").is_file());
        assert!(dir.path().join("-2/0/0.png").is_file());
        assert!(!dir.path().join("-2/0/1.png").exists());
    }

    #[test]
    fn edge_tiles_are_padded() {
        let dir = tempfile::tempdir().unwrap();
        generate_from_image(&checker(40, 40), dir.path(), 32, &null_progress()).unwrap();

        let edge = image::open(dir.path().join("0/1/1.png")).unwrap();
        assert_eq!((edge.width(), edge.height()), (32, 32));
        // Inside the source: opaque. Outside: transparent padding.
        assert_eq!(edge.get_pixel(0, 0)[3], 255);
        assert_eq!(edge.get_pixel(31, 31)[3], 0);
    }

    #[test]
    fn progress_counts_tiles() {
        let dir = tempfile::tempdir().unwrap();
        let progress = Arc::new(LogProgress::default());
        let callback: Arc<dyn ProgressCallback> = progress.clone();
        let summary = generate_from_image(&checker(64, 64), dir.path(), 32, &callback).unwrap();
        assert_eq!(progress.done(), summary.total_tiles());
        assert_eq!(progress.done(), 1 + 4);
    }

    #[test]
    fn reads_source_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("moon.png");
        checker(16, 16).save(&input).unwrap();

        let out = dir.path().join("tiles");
        let summary = generate_pyramid(&input, &out, 256, &null_progress()).unwrap();
        assert_eq!(summary.levels.len(), 1);
        assert!(out.join("0/0/0.png").is_file());
    }

    #[test]
    fn zero_tile_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            generate_from_image(&checker(8, 8), dir.path(), 0, &null_progress()),
            Err(TileError::InvalidTileSize { tile_size: 0 })
        ));
    }
}
