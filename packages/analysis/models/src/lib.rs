#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Landing-site suitability analysis result types.
//!
//! An analysis samples a user-selected rectangle on a fixed grid, assigns
//! every cell a slope, and condenses the grid into an [`AnalysisStats`]
//! summary with a [`SuitabilityGrade`].

use astralens_geometry_models::PixelPoint;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Cells per side of the sampling grid.
pub const DEFAULT_GRID_SIZE: usize = 15;

/// A cell is safe to land on when its slope is strictly below this many
/// degrees.
pub const SAFE_SLOPE_DEGREES: f64 = 8.0;

/// Discrete terrain-safety classification, best to worst.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum SuitabilityGrade {
    /// Nearly all flat, very gentle average slope.
    #[serde(rename = "A+")]
    #[strum(serialize = "A+")]
    APlus,
    /// Mostly safe.
    #[serde(rename = "A")]
    #[strum(serialize = "A")]
    A,
    /// Acceptable with care.
    #[serde(rename = "B")]
    #[strum(serialize = "B")]
    B,
    /// Marginal.
    #[serde(rename = "C")]
    #[strum(serialize = "C")]
    C,
    /// Unsuitable.
    #[serde(rename = "D")]
    #[strum(serialize = "D")]
    D,
}

impl SuitabilityGrade {
    /// Grades an area from its summary statistics.
    ///
    /// Thresholds are checked top-down and the first match wins:
    ///
    /// | grade | safe area | average slope |
    /// |-------|-----------|---------------|
    /// | A+    | > 85 %    | < 5°          |
    /// | A     | > 70 %    | < 8°          |
    /// | B     | > 50 %    | < 12°         |
    /// | C     | > 30 %    | any           |
    /// | D     | otherwise |               |
    #[must_use]
    pub fn from_stats(average_slope: f64, safe_area_percent: u32) -> Self {
        if safe_area_percent > 85 && average_slope < 5.0 {
            Self::APlus
        } else if safe_area_percent > 70 && average_slope < 8.0 {
            Self::A
        } else if safe_area_percent > 50 && average_slope < 12.0 {
            Self::B
        } else if safe_area_percent > 30 {
            Self::C
        } else {
            Self::D
        }
    }

    /// Returns all variants, best first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::APlus, Self::A, Self::B, Self::C, Self::D]
    }
}

/// One sampled grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisCell {
    /// Row index in `[0, grid_size)`.
    pub row: usize,
    /// Column index in `[0, grid_size)`.
    pub col: usize,
    /// Cell corners: origin and the opposite corner one grid step further.
    pub bounds: [PixelPoint; 2],
    /// Terrain slope in degrees.
    pub slope_value: f64,
}

impl AnalysisCell {
    /// Whether the cell is flat enough to land on.
    #[must_use]
    pub fn is_safe(&self) -> bool {
        self.slope_value < SAFE_SLOPE_DEGREES
    }
}

/// Summary of an analysis grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisStats {
    /// Mean slope over all cells, in degrees.
    pub average_slope: f64,
    /// Share of safe cells, rounded to a whole percent.
    pub safe_area_percent: u32,
    /// Grade derived from the two values above.
    pub suitability_grade: SuitabilityGrade,
}

/// Cells plus summary for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Cells in row-major order.
    pub cells: Vec<AnalysisCell>,
    /// Aggregate statistics.
    pub stats: AnalysisStats,
}
