#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate transforms, tile pyramid math and risk-zone overlay projection
//! for the lunar map.
//!
//! Everything here operates on the fixed native-zoom pixel space described
//! in [`astralens_geometry_models`]. The viewer never fetches or caches tiles
//! through this crate; it only needs the arithmetic to place markers,
//! selections and overlays on top of them.

pub mod overlay;
pub mod pyramid;
pub mod registry;
pub mod transform;

pub use transform::CoordinateTransform;

use thiserror::Error;

/// Errors that can occur during geometry operations.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `GeoJSON` parsing or conversion failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The `GeoJSON` document was well-formed JSON but not a shape this
    /// crate understands.
    #[error("Invalid GeoJSON: {message}")]
    InvalidGeoJson {
        /// Description of what went wrong.
        message: String,
    },

    /// I/O error while reading an overlay file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
