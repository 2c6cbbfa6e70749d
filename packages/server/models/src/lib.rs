#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the `AstraLens` server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the domain types to allow independent evolution of the API
//! contract. The chat pair ([`AskRequest`] / [`AskResponse`]) keeps the
//! snake-case field names the viewer has always sent.

use astralens_analysis_models::AnalysisResult;
use astralens_geometry_models::{MapDefinition, PixelPoint};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
    /// Number of features loaded (zero when the feature file is missing).
    pub feature_count: usize,
}

/// Map configuration for the tile layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMap {
    /// Map identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Full-resolution width in pixels.
    pub width: u32,
    /// Full-resolution height in pixels.
    pub height: u32,
    /// Tile edge length.
    pub tile_size: u32,
    /// Zoom level of the full-resolution image.
    pub native_zoom: i32,
    /// Most zoomed-out level.
    pub min_zoom: i32,
    /// Tile URL template with `{z}/{y}/{x}` placeholders.
    pub tile_url_template: String,
    /// Attribution text.
    pub attribution: Option<String>,
}

impl From<MapDefinition> for ApiMap {
    fn from(map: MapDefinition) -> Self {
        Self {
            id: map.id,
            name: map.name,
            width: map.width,
            height: map.height,
            tile_size: map.tile_size,
            native_zoom: map.native_zoom,
            min_zoom: map.min_zoom,
            tile_url_template: map.tile_url_template,
            attribution: map.attribution,
        }
    }
}

/// Query parameters for the feature search endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureQueryParams {
    /// Name substring to search for. Without it the first `limit`
    /// features are listed.
    pub q: Option<String>,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

/// A feature as returned by the API, with its marker position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFeature {
    /// Feature ID.
    pub id: String,
    /// Feature name.
    pub name: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Marker position in pixel space.
    pub pixel: PixelPoint,
    /// Description.
    pub description: String,
    /// Preview image URL (may be empty).
    pub image_url: String,
}

/// Query parameters for geo/pixel conversion and zone lookups.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeoQueryParams {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

/// A risk zone containing a queried point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRiskZoneHit {
    /// Zone name.
    pub name: String,
    /// Risk level, if the dataset provides one.
    pub level: Option<String>,
}

/// Request body for the analysis endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// One corner of the selection.
    pub corner1: PixelPoint,
    /// The opposite corner.
    pub corner2: PixelPoint,
    /// Seed for reproducible synthetic terrain.
    pub seed: Option<u64>,
}

/// Response from the analysis endpoint.
pub type AnalysisResponse = AnalysisResult;

/// Request body for the measurement endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureRequest {
    /// Points in click order. Fed through the same reset-on-third rule as
    /// the viewer, so only the trailing one or two points count.
    pub points: Vec<PixelPoint>,
}

/// Response from the measurement endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureResponse {
    /// Distance in kilometres, when exactly two points remain.
    pub distance: Option<f64>,
    /// Distance formatted for display.
    pub formatted: Option<String>,
}

/// Request body for the AI ask endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    /// The user's question.
    pub user_question: String,
}

/// Response from the AI ask endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    /// The assistant's answer.
    pub answer: String,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error message.
    pub error: String,
}
