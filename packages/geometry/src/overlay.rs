//! Risk-zone overlay projection and lookup.
//!
//! Risk zones ship as a static `GeoJSON` `FeatureCollection` whose polygon
//! and multipolygon rings are `[longitude, latitude]` pairs. Before the
//! viewer can draw them over the tile layer every position has to be moved
//! into pixel space, at whatever nesting depth it sits (ring, polygon,
//! multipolygon part).
//!
//! The projected output keeps `GeoJSON` axis order, `[x, y]`, which the
//! simple-CRS map layer reads as `[lng, lat]`.

use std::path::Path;

use astralens_geometry_models::GeoPoint;
use geo::{Contains, MultiPolygon};
use geojson::GeoJson;
use serde_json::Value;

use crate::{CoordinateTransform, GeometryError};

/// The risk-zone dataset bundled with the viewer.
pub const BUNDLED_RISK_ZONES: &str = include_str!("../data/risk_zones.geojson");

/// Recursively projects a nested `GeoJSON` coordinate array.
///
/// A leaf is any array whose first element is a number; its first two
/// numbers are read as `[longitude, latitude]` and replaced by the pixel
/// pair. Extra ordinates (altitude) are dropped. Anything that is not an
/// array is returned unchanged.
#[must_use]
pub fn project_coordinates(transform: &CoordinateTransform, coordinates: &Value) -> Value {
    let Value::Array(items) = coordinates else {
        return coordinates.clone();
    };

    if let Some(Value::Number(_)) = items.first() {
        let longitude = items.first().and_then(Value::as_f64).unwrap_or(0.0);
        let latitude = items.get(1).and_then(Value::as_f64).unwrap_or(0.0);
        let [x, y] = transform.project_lon_lat(longitude, latitude);
        return serde_json::json!([x, y]);
    }

    Value::Array(
        items
            .iter()
            .map(|item| project_coordinates(transform, item))
            .collect(),
    )
}

/// Projects every geometry inside a `GeoJSON` document.
///
/// Accepts a `FeatureCollection`, a `Feature`, a `GeometryCollection`, or a
/// bare geometry object. Properties and other members are preserved.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidGeoJson`] if the document has no `type`
/// member or a feature collection is missing its `features` array.
pub fn project_geojson(
    transform: &CoordinateTransform,
    document: &Value,
) -> Result<Value, GeometryError> {
    let kind = document["type"]
        .as_str()
        .ok_or_else(|| GeometryError::InvalidGeoJson {
            message: "missing \"type\" member".to_string(),
        })?;

    let mut projected = document.clone();

    match kind {
        "FeatureCollection" => {
            let features = document["features"].as_array().ok_or_else(|| {
                GeometryError::InvalidGeoJson {
                    message: "FeatureCollection without a features array".to_string(),
                }
            })?;
            projected["features"] = Value::Array(
                features
                    .iter()
                    .map(|f| project_geojson(transform, f))
                    .collect::<Result<_, _>>()?,
            );
        }
        "Feature" => {
            if !document["geometry"].is_null() {
                projected["geometry"] = project_geojson(transform, &document["geometry"])?;
            }
        }
        "GeometryCollection" => {
            let geometries = document["geometries"].as_array().ok_or_else(|| {
                GeometryError::InvalidGeoJson {
                    message: "GeometryCollection without a geometries array".to_string(),
                }
            })?;
            projected["geometries"] = Value::Array(
                geometries
                    .iter()
                    .map(|g| project_geojson(transform, g))
                    .collect::<Result<_, _>>()?,
            );
        }
        _ => {
            projected["coordinates"] = project_coordinates(transform, &document["coordinates"]);
        }
    }

    Ok(projected)
}

/// A single named risk zone.
#[derive(Debug, Clone)]
pub struct RiskZone {
    /// Zone name from the `name` property.
    pub name: String,
    /// Free-form risk level from the `level` property (e.g. `"high"`).
    pub level: Option<String>,
    polygon: MultiPolygon<f64>,
}

impl RiskZone {
    /// Whether the zone contains the given point.
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        let point = point.clamped();
        self.polygon
            .contains(&geo::Point::new(point.longitude, point.latitude))
    }
}

/// In-memory set of risk zones for point lookups.
#[derive(Debug, Clone, Default)]
pub struct RiskZoneIndex {
    zones: Vec<RiskZone>,
    raw: Option<Value>,
}

impl RiskZoneIndex {
    /// Loads the dataset bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] if the bundled file fails to parse.
    pub fn bundled() -> Result<Self, GeometryError> {
        Self::from_geojson_str(BUNDLED_RISK_ZONES)
    }

    /// Loads zones from a `GeoJSON` file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] if the file can't be read or parsed.
    pub fn load(path: &Path) -> Result<Self, GeometryError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_geojson_str(&contents)
    }

    /// Parses zones from a `GeoJSON` `FeatureCollection` string.
    ///
    /// Features that aren't polygons or multipolygons are skipped with a
    /// warning.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] if the string isn't a `FeatureCollection`.
    pub fn from_geojson_str(geojson_str: &str) -> Result<Self, GeometryError> {
        let raw: Value = serde_json::from_str(geojson_str)?;
        let GeoJson::FeatureCollection(collection) = GeoJson::from_json_value(raw.clone())? else {
            return Err(GeometryError::InvalidGeoJson {
                message: "risk zones must be a FeatureCollection".to_string(),
            });
        };

        let mut zones = Vec::new();

        for (idx, feature) in collection.features.into_iter().enumerate() {
            let name = feature
                .property("name")
                .and_then(Value::as_str)
                .map_or_else(|| format!("Zone {}", idx + 1), ToString::to_string);
            let level = feature
                .property("level")
                .and_then(Value::as_str)
                .map(ToString::to_string);

            let Some(geometry) = feature.geometry else {
                log::warn!("Risk zone {name} has no geometry, skipping");
                continue;
            };

            let polygon = match geo::Geometry::<f64>::try_from(geometry) {
                Ok(geo::Geometry::Polygon(p)) => MultiPolygon(vec![p]),
                Ok(geo::Geometry::MultiPolygon(mp)) => mp,
                Ok(_) => {
                    log::warn!("Risk zone {name} is not a polygon, skipping");
                    continue;
                }
                Err(e) => {
                    log::warn!("Risk zone {name} failed to convert: {e}");
                    continue;
                }
            };

            zones.push(RiskZone {
                name,
                level,
                polygon,
            });
        }

        log::debug!("Loaded {} risk zones", zones.len());

        Ok(Self {
            zones,
            raw: Some(raw),
        })
    }

    /// All loaded zones.
    #[must_use]
    pub fn zones(&self) -> &[RiskZone] {
        &self.zones
    }

    /// Zones that contain `point`.
    #[must_use]
    pub fn zones_at(&self, point: GeoPoint) -> Vec<&RiskZone> {
        self.zones.iter().filter(|z| z.contains(point)).collect()
    }

    /// The source document projected into pixel space, ready to hand to the
    /// map layer.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] if the stored document can't be projected.
    pub fn projected(&self, transform: &CoordinateTransform) -> Result<Value, GeometryError> {
        self.raw.as_ref().map_or_else(
            || {
                Ok(serde_json::json!({
                    "type": "FeatureCollection",
                    "features": [],
                }))
            },
            |raw| project_geojson(transform, raw),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astralens_geometry_models::ImageDimensions;

    fn small() -> CoordinateTransform {
        CoordinateTransform::new(ImageDimensions::new(360, 180))
    }

    #[test]
    fn projects_a_single_position() {
        let out = project_coordinates(&small(), &serde_json::json!([0.0, 0.0]));
        assert_eq!(out, serde_json::json!([180.0, -90.0]));
    }

    #[test]
    fn projects_polygon_rings() {
        let polygon = serde_json::json!([[[-180.0, -90.0], [180.0, -90.0], [180.0, 90.0], [-180.0, -90.0]]]);
        let out = project_coordinates(&small(), &polygon);
        assert_eq!(
            out,
            serde_json::json!([[[0.0, 0.0], [360.0, 0.0], [360.0, -180.0], [0.0, 0.0]]])
        );
    }

    #[test]
    fn projects_multipolygon_parts_and_drops_altitude() {
        let multi = serde_json::json!([
            [[[0.0, 0.0, 12.0], [90.0, 0.0, 12.0], [0.0, 0.0, 12.0]]],
            [[[-90.0, 45.0], [-90.0, 45.0]]]
        ]);
        let out = project_coordinates(&small(), &multi);
        assert_eq!(out[0][0][1], serde_json::json!([270.0, -90.0]));
        assert_eq!(out[1][0][0], serde_json::json!([90.0, -135.0]));
    }

    #[test]
    fn projects_feature_collection_and_keeps_properties() {
        let doc = serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "name": "Crater rim" },
                "geometry": { "type": "Point", "coordinates": [0.0, 0.0] }
            }]
        });
        let out = project_geojson(&small(), &doc).unwrap();
        assert_eq!(out["features"][0]["properties"]["name"], "Crater rim");
        assert_eq!(
            out["features"][0]["geometry"]["coordinates"],
            serde_json::json!([180.0, -90.0])
        );
    }

    #[test]
    fn rejects_document_without_type() {
        let err = project_geojson(&small(), &serde_json::json!({ "features": [] })).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidGeoJson { .. }));
    }

    #[test]
    fn looks_up_zones_containing_a_point() {
        let index = RiskZoneIndex::from_geojson_str(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "properties": { "name": "Box", "level": "high" },
                        "geometry": {
                            "type": "Polygon",
                            "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]]
                        }
                    },
                    {
                        "type": "Feature",
                        "properties": { "name": "Marker" },
                        "geometry": { "type": "Point", "coordinates": [5, 5] }
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(index.zones().len(), 1);
        let hits = index.zones_at(GeoPoint::new(5.0, 5.0));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Box");
        assert_eq!(hits[0].level.as_deref(), Some("high"));
        assert!(index.zones_at(GeoPoint::new(-5.0, 5.0)).is_empty());
    }

    #[test]
    fn bundled_dataset_parses() {
        let index = RiskZoneIndex::bundled().unwrap();
        assert!(!index.zones().is_empty());
        let projected = index.projected(&CoordinateTransform::MOON).unwrap();
        assert_eq!(projected["type"], "FeatureCollection");
    }
}
