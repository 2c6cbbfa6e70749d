#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Two-point distance measurement on the lunar map.
//!
//! The user clicks two points and gets the ground distance between them.
//! A third click does **not** slide the window: it throws both previous
//! points away and starts over with just the new one. That reset is the
//! intended interaction, so keep it when touching this code.

use astralens_geometry_models::PixelPoint;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kilometres of lunar surface per native-zoom pixel.
///
/// The global mosaic is roughly 100 m/pixel at the equator.
pub const SCALE_FACTOR: f64 = 0.1;

/// Unit label that goes with [`SCALE_FACTOR`].
pub const DISTANCE_UNIT: &str = "km";

/// Maximum number of points held at once.
pub const MAX_POINTS: usize = 2;

/// A point the user dropped on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementPoint {
    /// Unique identifier, used by the map layer as a marker key.
    pub id: Uuid,
    /// Where the point sits in pixel space.
    pub pixel_position: PixelPoint,
}

impl MeasurementPoint {
    /// Creates a point with a fresh identifier.
    #[must_use]
    pub fn new(pixel_position: PixelPoint) -> Self {
        Self {
            id: Uuid::new_v4(),
            pixel_position,
        }
    }
}

/// Holds zero, one or two measurement points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSet {
    points: Vec<MeasurementPoint>,
}

impl MeasurementSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Adds a point. With two points already held, the set is reset to
    /// contain only the new one.
    ///
    /// Returns the stored point.
    pub fn add_point(&mut self, position: PixelPoint) -> MeasurementPoint {
        let point = MeasurementPoint::new(position);
        if self.points.len() >= MAX_POINTS {
            log::debug!("Measurement set full, starting over");
            self.points.clear();
        }
        self.points.push(point);
        point
    }

    /// Distance between the two held points, in [`DISTANCE_UNIT`]s.
    ///
    /// `None` unless exactly two points are held.
    #[must_use]
    pub fn distance(&self) -> Option<f64> {
        distance(&self.points)
    }

    /// Removes all points.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Points currently held, in insertion order.
    #[must_use]
    pub fn points(&self) -> &[MeasurementPoint] {
        &self.points
    }

    /// Number of points held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no points are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Scaled distance between exactly two points, otherwise `None`.
#[must_use]
pub fn distance(points: &[MeasurementPoint]) -> Option<f64> {
    match points {
        [a, b] => Some(a.pixel_position.distance_to(&b.pixel_position) * SCALE_FACTOR),
        _ => None,
    }
}

/// Renders a distance for display, e.g. `"10.00 km"`.
#[must_use]
pub fn format_distance(distance: f64) -> String {
    format!("{distance:.2} {DISTANCE_UNIT}")
}
