//! Map tools exposed to the model.
//!
//! Each tool takes camelCase JSON parameters, runs one of the core map
//! operations and returns a JSON result. Geographic inputs are degrees;
//! they are projected to pixel space with the map's transform before the
//! pixel-space operations run.

use astralens_analysis::{AreaAnalyzer, UniformRandomTerrain};
use astralens_analysis_models::{AnalysisStats, SAFE_SLOPE_DEGREES};
use astralens_features::FeatureCatalog;
use astralens_geometry::CoordinateTransform;
use astralens_geometry::overlay::RiskZoneIndex;
use astralens_geometry_models::{GeoPoint, PixelPoint, SelectionRectangle};
use astralens_measurement::{MeasurementSet, format_distance};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::AiError;

/// Default number of search results.
const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Hard cap on search results.
const MAX_SEARCH_LIMIT: usize = 50;

/// Data the tools operate on.
#[derive(Clone, Copy)]
pub struct ToolContext<'a> {
    /// Feature database.
    pub catalog: &'a FeatureCatalog,
    /// Transform for the current map.
    pub transform: &'a CoordinateTransform,
    /// Risk zones for hazard lookups.
    pub zones: &'a RiskZoneIndex,
}

/// Parameters for `lookup_feature`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupFeatureParams {
    /// Feature ID, e.g. `"TYC-1412"`.
    pub id: String,
}

/// Parameters for `search_features`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFeaturesParams {
    /// Name substring.
    pub query: String,
    /// Maximum results (default 10, max 50).
    pub limit: Option<usize>,
}

/// Parameters for `analyze_area`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeAreaParams {
    /// Latitude of one corner.
    pub lat1: f64,
    /// Longitude of one corner.
    pub lon1: f64,
    /// Latitude of the opposite corner.
    pub lat2: f64,
    /// Longitude of the opposite corner.
    pub lon2: f64,
    /// Seed for reproducible terrain.
    pub seed: Option<u64>,
}

/// Parameters for `measure_distance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureDistanceParams {
    /// Latitude of the first point.
    pub lat1: f64,
    /// Longitude of the first point.
    pub lon1: f64,
    /// Latitude of the second point.
    pub lat2: f64,
    /// Longitude of the second point.
    pub lon2: f64,
}

/// A feature as reported to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSummary {
    /// Feature ID.
    pub id: String,
    /// Feature name.
    pub name: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Description.
    pub description: String,
    /// Names of risk zones containing the feature center.
    pub risk_zones: Vec<String>,
}

/// Result of `search_features`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFeaturesResult {
    /// Matching features, in catalog order.
    pub features: Vec<FeatureSummary>,
}

/// Result of `analyze_area`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeAreaResult {
    /// Number of grid cells sampled.
    pub cells: usize,
    /// Summary statistics.
    pub stats: AnalysisStats,
    /// Slope threshold for a safe cell, in degrees.
    pub safe_slope_degrees: f64,
    /// Caveat about the terrain data.
    pub note: String,
}

/// Result of `measure_distance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureDistanceResult {
    /// Distance in kilometres.
    pub distance: f64,
    /// Formatted distance.
    pub formatted: String,
}

/// Tool definitions in the neutral `{ name, description, parameters }`
/// shape the providers expect.
#[must_use]
pub fn tool_definitions() -> Vec<Value> {
    vec![
        serde_json::json!({
            "name": "lookup_feature",
            "description": "Look up a named lunar surface feature by its ID (e.g. 'TYC-1412'). Returns its coordinates, description and any risk zones it lies in.",
            "parameters": {
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "Feature ID" }
                },
                "required": ["id"]
            }
        }),
        serde_json::json!({
            "name": "search_features",
            "description": "Search lunar features by name (case-insensitive substring). Use this to find the ID and coordinates of a crater, mare or mountain mentioned by the user.",
            "parameters": {
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Part of the feature name (e.g. 'Tycho')" },
                    "limit": { "type": "integer", "description": "Maximum number of results (default 10)" }
                },
                "required": ["query"]
            }
        }),
        serde_json::json!({
            "name": "analyze_area",
            "description": "Score a rectangular area for landing suitability. Samples a 15x15 grid of slopes and returns the average slope, the percentage of cells under 8 degrees and a grade from A+ to D.",
            "parameters": {
                "type": "object",
                "properties": {
                    "lat1": { "type": "number", "description": "Latitude of one corner in degrees" },
                    "lon1": { "type": "number", "description": "Longitude of one corner in degrees" },
                    "lat2": { "type": "number", "description": "Latitude of the opposite corner in degrees" },
                    "lon2": { "type": "number", "description": "Longitude of the opposite corner in degrees" },
                    "seed": { "type": "integer", "description": "Optional seed for reproducible results" }
                },
                "required": ["lat1", "lon1", "lat2", "lon2"]
            }
        }),
        serde_json::json!({
            "name": "measure_distance",
            "description": "Measure the map distance in kilometres between two points given in degrees.",
            "parameters": {
                "type": "object",
                "properties": {
                    "lat1": { "type": "number", "description": "Latitude of the first point" },
                    "lon1": { "type": "number", "description": "Longitude of the first point" },
                    "lat2": { "type": "number", "description": "Latitude of the second point" },
                    "lon2": { "type": "number", "description": "Longitude of the second point" }
                },
                "required": ["lat1", "lon1", "lat2", "lon2"]
            }
        }),
    ]
}

/// Executes a single tool by name with the given parameters.
///
/// # Errors
///
/// Returns [`AiError::UnknownTool`] for unknown names, [`AiError::Json`]
/// for malformed parameters and [`AiError::Feature`] when a feature lookup
/// fails.
pub fn execute_tool(ctx: ToolContext<'_>, name: &str, input: &Value) -> Result<Value, AiError> {
    match name {
        "lookup_feature" => {
            let params: LookupFeatureParams = serde_json::from_value(input.clone())?;
            let feature = ctx.catalog.find_by_id(&params.id)?;
            Ok(serde_json::to_value(summarize_feature(ctx, feature))?)
        }
        "search_features" => {
            let params: SearchFeaturesParams = serde_json::from_value(input.clone())?;
            let limit = params
                .limit
                .unwrap_or(DEFAULT_SEARCH_LIMIT)
                .clamp(1, MAX_SEARCH_LIMIT);
            let features = ctx
                .catalog
                .search(&params.query, limit)?
                .into_iter()
                .map(|f| summarize_feature(ctx, f))
                .collect();
            Ok(serde_json::to_value(SearchFeaturesResult { features })?)
        }
        "analyze_area" => {
            let params: AnalyzeAreaParams = serde_json::from_value(input.clone())?;
            Ok(serde_json::to_value(analyze_area(ctx, &params))?)
        }
        "measure_distance" => {
            let params: MeasureDistanceParams = serde_json::from_value(input.clone())?;
            Ok(serde_json::to_value(measure_distance(ctx, &params))?)
        }
        other => Err(AiError::UnknownTool {
            name: other.to_string(),
        }),
    }
}

fn summarize_feature(
    ctx: ToolContext<'_>,
    feature: &astralens_features::FeatureRecord,
) -> FeatureSummary {
    FeatureSummary {
        id: feature.id.clone(),
        name: feature.name.clone(),
        latitude: feature.coordinates.latitude,
        longitude: feature.coordinates.longitude,
        description: feature.description.clone(),
        risk_zones: ctx
            .zones
            .zones_at(feature.coordinates)
            .into_iter()
            .map(|z| z.name.clone())
            .collect(),
    }
}

fn project(ctx: ToolContext<'_>, latitude: f64, longitude: f64) -> PixelPoint {
    ctx.transform.to_pixel(GeoPoint::new(latitude, longitude))
}

fn analyze_area(ctx: ToolContext<'_>, params: &AnalyzeAreaParams) -> AnalyzeAreaResult {
    let rect = SelectionRectangle::new(
        project(ctx, params.lat1, params.lon1),
        project(ctx, params.lat2, params.lon2),
    );
    let mut terrain = params
        .seed
        .map_or_else(UniformRandomTerrain::from_entropy, UniformRandomTerrain::seeded);
    let result = AreaAnalyzer::default().analyze(&rect, &mut terrain);

    AnalyzeAreaResult {
        cells: result.cells.len(),
        stats: result.stats,
        safe_slope_degrees: SAFE_SLOPE_DEGREES,
        note: "Slopes are synthetic placeholder values, not measured elevation data.".to_string(),
    }
}

fn measure_distance(ctx: ToolContext<'_>, params: &MeasureDistanceParams) -> MeasureDistanceResult {
    let mut set = MeasurementSet::new();
    set.add_point(project(ctx, params.lat1, params.lon1));
    set.add_point(project(ctx, params.lat2, params.lon2));
    let distance = set.distance().unwrap_or_default();

    MeasureDistanceResult {
        distance,
        formatted: format_distance(distance),
    }
}

/// Creates a brief human-readable summary of a tool result for logging.
#[must_use]
pub fn summarize_tool_result(tool_name: &str, result: &Value) -> String {
    match tool_name {
        "lookup_feature" => {
            let name = result["name"].as_str().unwrap_or("unknown feature");
            format!("Found {name}")
        }
        "search_features" => {
            let count = result["features"].as_array().map_or(0, Vec::len);
            format!("{count} matching features")
        }
        "analyze_area" => {
            let grade = result["stats"]["suitabilityGrade"].as_str().unwrap_or("?");
            format!("Grade {grade}")
        }
        "measure_distance" => result["formatted"]
            .as_str()
            .unwrap_or("distance measured")
            .to_string(),
        _ => "Result received".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astralens_features::FeatureError;
    use serde_json::json;

    const FEATURES: &str = r#"[
        {"id":"TYC-1","name":"Tycho","coordinates":[-43.31,-11.36],"description":"A crater on the Moon with a diameter of 85.29 km."},
        {"id":"COP-2","name":"Copernicus","coordinates":[9.62,-20.08]}
    ]"#;

    fn fixtures() -> (FeatureCatalog, CoordinateTransform, RiskZoneIndex) {
        (
            FeatureCatalog::from_json_str(FEATURES).unwrap(),
            CoordinateTransform::MOON,
            RiskZoneIndex::bundled().unwrap(),
        )
    }

    #[test]
    fn lookup_reports_risk_zones() {
        let (catalog, transform, zones) = fixtures();
        let ctx = ToolContext {
            catalog: &catalog,
            transform: &transform,
            zones: &zones,
        };
        let result = execute_tool(ctx, "lookup_feature", &json!({ "id": "tyc-1" })).unwrap();
        assert_eq!(result["name"], "Tycho");
        assert_eq!(result["riskZones"][0], "Tycho Ejecta Blanket");
        assert_eq!(summarize_tool_result("lookup_feature", &result), "Found Tycho");
    }

    #[test]
    fn lookup_miss_is_a_feature_error() {
        let (catalog, transform, zones) = fixtures();
        let ctx = ToolContext {
            catalog: &catalog,
            transform: &transform,
            zones: &zones,
        };
        let err = execute_tool(ctx, "lookup_feature", &json!({ "id": "NOPE" })).unwrap_err();
        assert!(matches!(err, AiError::Feature(FeatureError::NotFound { .. })));
    }

    #[test]
    fn search_respects_limit() {
        let (catalog, transform, zones) = fixtures();
        let ctx = ToolContext {
            catalog: &catalog,
            transform: &transform,
            zones: &zones,
        };
        let result =
            execute_tool(ctx, "search_features", &json!({ "query": "c", "limit": 1 })).unwrap();
        assert_eq!(result["features"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn seeded_analysis_is_reproducible() {
        let (catalog, transform, zones) = fixtures();
        let ctx = ToolContext {
            catalog: &catalog,
            transform: &transform,
            zones: &zones,
        };
        let input = json!({ "lat1": -45.0, "lon1": -15.0, "lat2": -40.0, "lon2": -8.0, "seed": 7 });
        let a = execute_tool(ctx, "analyze_area", &input).unwrap();
        let b = execute_tool(ctx, "analyze_area", &input).unwrap();
        assert_eq!(a, b);
        assert_eq!(a["cells"], 225);
    }

    #[test]
    fn measures_between_geo_points() {
        let (catalog, transform, zones) = fixtures();
        let ctx = ToolContext {
            catalog: &catalog,
            transform: &transform,
            zones: &zones,
        };
        // 1 degree of longitude is 34748 / 360 pixels, scaled by 0.1.
        let result = execute_tool(
            ctx,
            "measure_distance",
            &json!({ "lat1": 0.0, "lon1": 0.0, "lat2": 0.0, "lon2": 36.0 }),
        )
        .unwrap();
        let distance = result["distance"].as_f64().unwrap();
        assert!((distance - 347.48).abs() < 1e-6);
        assert_eq!(result["formatted"], "347.48 km");
    }

    #[test]
    fn unknown_tool_is_rejected() {
        let (catalog, transform, zones) = fixtures();
        let ctx = ToolContext {
            catalog: &catalog,
            transform: &transform,
            zones: &zones,
        };
        assert!(matches!(
            execute_tool(ctx, "launch_rocket", &json!({})),
            Err(AiError::UnknownTool { .. })
        ));
    }

    #[test]
    fn every_definition_has_a_schema() {
        let defs = tool_definitions();
        assert_eq!(defs.len(), 4);
        for def in &defs {
            assert!(def["name"].is_string());
            assert_eq!(def["parameters"]["type"], "object");
        }
    }
}
