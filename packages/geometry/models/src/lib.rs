#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Lunar coordinate, pixel-space and map definition types.
//!
//! Two coordinate spaces are used across the workspace:
//!
//! - [`GeoPoint`]: selenographic latitude/longitude in degrees.
//! - [`PixelPoint`]: a position inside the image pyramid at native zoom.
//!   `x` grows left to right from `0` to the image width, and `y` is `0` at
//!   the top edge and becomes more negative moving down (south), ending at
//!   `-height`. This matches the Leaflet simple-CRS convention the viewer
//!   uses.

use serde::{Deserialize, Serialize};

/// Width in pixels of the full-resolution Moon mosaic.
pub const MOON_IMAGE_WIDTH: u32 = 34_748;

/// Height in pixels of the full-resolution Moon mosaic.
pub const MOON_IMAGE_HEIGHT: u32 = 34_748;

/// Edge length of a single pyramid tile.
pub const TILE_SIZE: u32 = 256;

/// Zoom level at which one image pixel maps to one screen pixel.
pub const NATIVE_ZOOM: i32 = 0;

/// Most zoomed-out level of the Moon pyramid.
pub const MIN_ZOOM: i32 = -8;

/// A selenographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    /// Latitude in degrees, valid range `[-90, 90]`.
    pub latitude: f64,
    /// Longitude in degrees, valid range `[-180, 180]`.
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a point without validating or clamping.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns a copy with latitude clamped to `[-90, 90]` and longitude
    /// clamped to `[-180, 180]`. `NaN` components collapse to `0`.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            latitude: clamp_or_zero(self.latitude, -90.0, 90.0),
            longitude: clamp_or_zero(self.longitude, -180.0, 180.0),
        }
    }

    /// Whether both components already lie in their valid ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A position in native-zoom pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Horizontal offset from the left edge.
    pub x: f64,
    /// Vertical offset from the top edge (zero or negative).
    pub y: f64,
}

impl PixelPoint {
    /// Creates a pixel point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line distance to `other` in pixels.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Pixel dimensions of a full-resolution image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageDimensions {
    /// The Moon mosaic dimensions.
    pub const MOON: Self = Self {
        width: MOON_IMAGE_WIDTH,
        height: MOON_IMAGE_HEIGHT,
    };

    /// Creates a new set of dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width as a float, for coordinate arithmetic.
    #[must_use]
    pub fn width_f64(&self) -> f64 {
        f64::from(self.width)
    }

    /// Height as a float, for coordinate arithmetic.
    #[must_use]
    pub fn height_f64(&self) -> f64 {
        f64::from(self.height)
    }

    /// Larger of the two edges.
    #[must_use]
    pub const fn max_dimension(&self) -> u32 {
        if self.width > self.height {
            self.width
        } else {
            self.height
        }
    }
}

impl Default for ImageDimensions {
    fn default() -> Self {
        Self::MOON
    }
}

/// A rectangle as the user dragged it, corners in arbitrary order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRectangle {
    /// Where the drag started.
    pub corner1: PixelPoint,
    /// Where the drag ended.
    pub corner2: PixelPoint,
}

impl SelectionRectangle {
    /// Creates a rectangle from two opposite corners.
    #[must_use]
    pub const fn new(corner1: PixelPoint, corner2: PixelPoint) -> Self {
        Self { corner1, corner2 }
    }

    /// Orders the corners into south-west / north-east.
    ///
    /// South is numerically smaller `y` in pixel space.
    #[must_use]
    pub fn normalized(&self) -> PixelBounds {
        PixelBounds {
            south_west: PixelPoint::new(
                self.corner1.x.min(self.corner2.x),
                self.corner1.y.min(self.corner2.y),
            ),
            north_east: PixelPoint::new(
                self.corner1.x.max(self.corner2.x),
                self.corner1.y.max(self.corner2.y),
            ),
        }
    }
}

/// An axis-aligned pixel rectangle with ordered corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelBounds {
    /// Minimum `x`, minimum `y`.
    pub south_west: PixelPoint,
    /// Maximum `x`, maximum `y`.
    pub north_east: PixelPoint,
}

impl PixelBounds {
    /// Horizontal extent.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.north_east.x - self.south_west.x
    }

    /// Vertical extent.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.north_east.y - self.south_west.y
    }

    /// Midpoint of the rectangle.
    #[must_use]
    pub fn center(&self) -> PixelPoint {
        PixelPoint::new(
            f64::midpoint(self.south_west.x, self.north_east.x),
            f64::midpoint(self.south_west.y, self.north_east.y),
        )
    }
}

/// Description of a tiled image pyramid, loaded from embedded TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDefinition {
    /// Short identifier (e.g. `"moon"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Full-resolution width in pixels.
    pub width: u32,
    /// Full-resolution height in pixels.
    pub height: u32,
    /// Tile edge length.
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    /// Zoom level of the full-resolution image.
    #[serde(default)]
    pub native_zoom: i32,
    /// Most zoomed-out level that has tiles.
    pub min_zoom: i32,
    /// Tile URL with `{z}`, `{y}` and `{x}` placeholders.
    pub tile_url_template: String,
    /// Attribution shown under the map.
    #[serde(default)]
    pub attribution: Option<String>,
}

impl MapDefinition {
    /// Dimensions of the full-resolution image.
    #[must_use]
    pub const fn dimensions(&self) -> ImageDimensions {
        ImageDimensions::new(self.width, self.height)
    }
}

const fn default_tile_size() -> u32 {
    TILE_SIZE
}

fn clamp_or_zero(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(min, max)
    }
}

/// Serde adapter that stores a [`GeoPoint`] as a `[latitude, longitude]`
/// array, the layout used by the feature database files.
pub mod lat_lon_pair {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::GeoPoint;

    /// Serializes as `[latitude, longitude]`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(point: &GeoPoint, serializer: S) -> Result<S::Ok, S::Error> {
        [point.latitude, point.longitude].serialize(serializer)
    }

    /// Deserializes from `[latitude, longitude]`.
    ///
    /// # Errors
    ///
    /// Fails if the input is not a two-element numeric array.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<GeoPoint, D::Error> {
        let [latitude, longitude] = <[f64; 2]>::deserialize(deserializer)?;
        Ok(GeoPoint::new(latitude, longitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_components() {
        let p = GeoPoint::new(120.0, -500.0).clamped();
        assert!((p.latitude - 90.0).abs() < f64::EPSILON);
        assert!((p.longitude - -180.0).abs() < f64::EPSILON);
        assert!(p.is_valid());
    }

    #[test]
    fn nan_clamps_to_zero() {
        let p = GeoPoint::new(f64::NAN, 10.0).clamped();
        assert!(p.latitude.abs() < f64::EPSILON);
    }

    #[test]
    fn normalizes_rectangle_corners() {
        let rect = SelectionRectangle::new(PixelPoint::new(10.0, -2.0), PixelPoint::new(3.0, -8.0));
        let bounds = rect.normalized();
        assert_eq!(bounds.south_west, PixelPoint::new(3.0, -8.0));
        assert_eq!(bounds.north_east, PixelPoint::new(10.0, -2.0));
        assert!((bounds.width() - 7.0).abs() < f64::EPSILON);
        assert!((bounds.height() - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn lat_lon_pair_uses_array_layout() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            #[serde(with = "lat_lon_pair")]
            point: GeoPoint,
        }

        let w: Wrapper = serde_json::from_str(r#"{"point":[12.5,-45.0]}"#).unwrap();
        assert!((w.point.latitude - 12.5).abs() < f64::EPSILON);
        assert!((w.point.longitude - -45.0).abs() < f64::EPSILON);
        assert_eq!(serde_json::to_string(&w).unwrap(), r#"{"point":[12.5,-45.0]}"#);
    }
}
