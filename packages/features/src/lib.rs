#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Lunar feature database.
//!
//! Features (craters, maria, montes, ...) are stored as a JSON array of
//! [`FeatureRecord`]s generated from the IAU/USGS nomenclature CSV export by
//! [`convert::convert_csv`]. [`catalog::FeatureCatalog`] loads that file and
//! answers ID lookups and name searches for the viewer and the AI agent.

pub mod catalog;
pub mod convert;

pub use catalog::FeatureCatalog;

use astralens_geometry_models::{GeoPoint, lat_lon_pair};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during feature database operations.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// The feature data hasn't been loaded, so the action can't run.
    #[error("Feature data is not loaded yet")]
    NotLoaded,

    /// No feature with the requested ID exists.
    #[error("No feature found with ID \"{id}\"")]
    NotFound {
        /// The ID that was searched for.
        id: String,
    },

    /// I/O error while reading or writing a feature file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The CSV file is missing a required column.
    #[error("CSV is missing required column \"{column}\"")]
    MissingColumn {
        /// The column header that was expected.
        column: String,
    },
}

/// A named surface feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRecord {
    /// Short identifier, e.g. `"TYC-1412"`.
    pub id: String,
    /// Official name.
    pub name: String,
    /// Center position, stored as `[latitude, longitude]`.
    #[serde(with = "lat_lon_pair")]
    pub coordinates: GeoPoint,
    /// One-sentence description.
    #[serde(default)]
    pub description: String,
    /// Optional preview image.
    #[serde(default)]
    pub image_url: String,
}
