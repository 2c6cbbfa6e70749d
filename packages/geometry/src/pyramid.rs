//! Tile pyramid arithmetic.
//!
//! Zoom `0` is the full-resolution image; every negative level halves both
//! edges. Tiles are addressed `{z}/{y}/{x}` with `y` counting rows from the
//! top of the scaled image.

use std::path::{Path, PathBuf};

use astralens_geometry_models::ImageDimensions;

/// Most zoomed-out level at which the whole image fits into one tile.
///
/// `-ceil(log2(max_dim / tile_size))`, never positive.
#[must_use]
pub fn min_zoom(dimensions: ImageDimensions, tile_size: u32) -> i32 {
    if tile_size == 0 || dimensions.max_dimension() <= tile_size {
        return 0;
    }
    let ratio = f64::from(dimensions.max_dimension()) / f64::from(tile_size);
    #[allow(clippy::cast_possible_truncation)]
    let levels = ratio.log2().ceil() as i32;
    -levels
}

/// Scale factor of zoom `z` relative to native resolution.
#[must_use]
pub fn scale_for_zoom(zoom: i32) -> f64 {
    2f64.powi(zoom)
}

/// Dimensions of the image rendered at `zoom`, rounded to whole pixels.
#[must_use]
pub fn level_dimensions(dimensions: ImageDimensions, zoom: i32) -> ImageDimensions {
    let scale = scale_for_zoom(zoom);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scaled = |v: u32| (f64::from(v) * scale).round().max(0.0) as u32;
    ImageDimensions::new(scaled(dimensions.width), scaled(dimensions.height))
}

/// Number of tile columns and rows needed to cover a level.
#[must_use]
pub const fn tile_grid(level: ImageDimensions, tile_size: u32) -> (u32, u32) {
    if tile_size == 0 {
        return (0, 0);
    }
    (
        level.width.div_ceil(tile_size),
        level.height.div_ceil(tile_size),
    )
}

/// Expands a `{z}/{y}/{x}` URL template.
#[must_use]
pub fn tile_url(template: &str, zoom: i32, y: u32, x: u32) -> String {
    template
        .replace("{z}", &zoom.to_string())
        .replace("{y}", &y.to_string())
        .replace("{x}", &x.to_string())
}

/// On-disk location of a tile under `root`: `{root}/{z}/{y}/{x}.png`.
#[must_use]
pub fn tile_path(root: &Path, zoom: &str, y: u32, x: u32) -> PathBuf {
    root.join(zoom).join(y.to_string()).join(format!("{x}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moon_pyramid_bottoms_out_at_minus_eight() {
        assert_eq!(min_zoom(ImageDimensions::MOON, 256), -8);
    }

    #[test]
    fn image_smaller_than_a_tile_has_only_native_zoom() {
        assert_eq!(min_zoom(ImageDimensions::new(200, 100), 256), 0);
        assert_eq!(min_zoom(ImageDimensions::new(512, 100), 256), -1);
    }

    #[test]
    fn level_dimensions_round() {
        let level = level_dimensions(ImageDimensions::MOON, -8);
        assert_eq!(level, ImageDimensions::new(136, 136));
        assert_eq!(tile_grid(level, 256), (1, 1));

        let native = level_dimensions(ImageDimensions::MOON, 0);
        assert_eq!(native, ImageDimensions::MOON);
        assert_eq!(tile_grid(native, 256), (136, 136));
    }

    #[test]
    fn expands_url_template() {
        assert_eq!(
            tile_url("https://host/tiles/{z}/{y}/{x}.png", -3, 4, 7),
            "https://host/tiles/-3/4/7.png"
        );
    }

    #[test]
    fn builds_tile_path() {
        let p = tile_path(Path::new("tiles/moon"), "-2", 1, 3);
        assert_eq!(p, Path::new("tiles/moon/-2/1/3.png"));
    }
}
