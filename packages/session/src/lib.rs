#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Viewer session state.
//!
//! [`MapSession`] owns everything the map tools mutate: the interaction
//! mode, the measurement points, the latest analysis result, the labeled
//! features and the panel toggles. Components receive the session by
//! reference and change it only through the methods below; nothing reaches
//! for shared global state.

use astralens_analysis::{TerrainSampler, run_analysis};
use astralens_analysis_models::AnalysisResult;
use astralens_features::{FeatureCatalog, FeatureError, FeatureRecord};
use astralens_geometry::CoordinateTransform;
use astralens_geometry_models::{PixelPoint, SelectionRectangle};
use astralens_measurement::{MeasurementPoint, MeasurementSet};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// What a click or drag on the map does.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionMode {
    /// Plain pan/zoom.
    #[default]
    Browse,
    /// Clicks drop measurement points.
    Measure,
    /// Drags select an area to analyze.
    Analyze,
}

/// Snapshot for the sidebar status panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    /// Number of features in the loaded catalog.
    pub feature_count: usize,
    /// Number of labeled features.
    pub labeled_count: usize,
    /// Current interaction mode.
    pub mode: InteractionMode,
    /// Number of measurement points held.
    pub measurement_points: usize,
    /// Whether an analysis result is on screen.
    pub has_analysis: bool,
    /// Whether the risk-zone overlay is shown.
    pub risk_overlay_visible: bool,
    /// Whether the AI panel is open.
    pub ai_panel_open: bool,
}

/// A labeled feature together with its marker position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledFeature {
    /// The feature record.
    pub feature: FeatureRecord,
    /// Marker position in pixel space.
    pub marker: PixelPoint,
}

/// All mutable viewer state.
#[derive(Debug, Default)]
pub struct MapSession {
    transform: CoordinateTransform,
    catalog: FeatureCatalog,
    mode: InteractionMode,
    measurement: MeasurementSet,
    analysis: Option<AnalysisResult>,
    labeled: Vec<LabeledFeature>,
    risk_overlay_visible: bool,
    ai_panel_open: bool,
}

impl MapSession {
    /// Creates a session over the given catalog.
    #[must_use]
    pub fn new(transform: CoordinateTransform, catalog: FeatureCatalog) -> Self {
        Self {
            transform,
            catalog,
            ..Self::default()
        }
    }

    /// Replaces the feature catalog (e.g. once loading finishes).
    pub fn set_catalog(&mut self, catalog: FeatureCatalog) {
        self.catalog = catalog;
    }

    /// The feature catalog.
    #[must_use]
    pub const fn catalog(&self) -> &FeatureCatalog {
        &self.catalog
    }

    /// The coordinate transform of the current map.
    #[must_use]
    pub const fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    /// Current interaction mode.
    #[must_use]
    pub const fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Switches interaction mode.
    ///
    /// Entering [`InteractionMode::Analyze`] discards the previous result.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        log::debug!("Mode {} -> {mode}", self.mode);
        if mode == InteractionMode::Analyze {
            self.analysis = None;
        }
        self.mode = mode;
    }

    /// Handles a map click. Only does something in measure mode, where it
    /// adds (or resets to) a measurement point.
    pub fn click(&mut self, position: PixelPoint) -> Option<MeasurementPoint> {
        (self.mode == InteractionMode::Measure).then(|| self.measurement.add_point(position))
    }

    /// Measurement points currently held.
    #[must_use]
    pub fn measurement_points(&self) -> &[MeasurementPoint] {
        self.measurement.points()
    }

    /// Measured distance, when two points are held.
    #[must_use]
    pub fn distance(&self) -> Option<f64> {
        self.measurement.distance()
    }

    /// Removes all measurement points.
    pub fn clear_points(&mut self) {
        self.measurement.clear();
    }

    /// Handles the end of a drag gesture. Only does something in analyze
    /// mode, where it runs an analysis and replaces the stored result.
    pub fn complete_drag(
        &mut self,
        rect: &SelectionRectangle,
        terrain: &mut dyn TerrainSampler,
    ) -> Option<&AnalysisResult> {
        if self.mode != InteractionMode::Analyze {
            return None;
        }
        self.analysis = Some(run_analysis(rect, terrain));
        self.analysis.as_ref()
    }

    /// Latest analysis result.
    #[must_use]
    pub const fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    /// Looks a feature up by ID and labels it on the map.
    ///
    /// Labeling an already labeled feature is a no-op that still returns
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::NotLoaded`] or [`FeatureError::NotFound`];
    /// the caller reports these to the user.
    pub fn label_feature(&mut self, id: &str) -> Result<&LabeledFeature, FeatureError> {
        let feature = self.catalog.find_by_id(id)?.clone();

        let idx = if let Some(idx) = self.labeled.iter().position(|l| l.feature.id == feature.id) {
            idx
        } else {
            let marker = self.transform.to_pixel(feature.coordinates);
            log::debug!("Labeling {} at ({:.0}, {:.0})", feature.id, marker.x, marker.y);
            self.labeled.push(LabeledFeature { feature, marker });
            self.labeled.len() - 1
        };

        Ok(&self.labeled[idx])
    }

    /// Labeled features in labeling order.
    #[must_use]
    pub fn labeled(&self) -> &[LabeledFeature] {
        &self.labeled
    }

    /// Removes every label.
    pub fn clear_labels(&mut self) {
        self.labeled.clear();
    }

    /// Shows or hides the risk-zone overlay. Returns the new state.
    pub const fn toggle_risk_overlay(&mut self) -> bool {
        self.risk_overlay_visible = !self.risk_overlay_visible;
        self.risk_overlay_visible
    }

    /// Opens or closes the AI panel. Returns the new state.
    pub const fn toggle_ai_panel(&mut self) -> bool {
        self.ai_panel_open = !self.ai_panel_open;
        self.ai_panel_open
    }

    /// Sidebar snapshot.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            feature_count: self.catalog.len(),
            labeled_count: self.labeled.len(),
            mode: self.mode,
            measurement_points: self.measurement.len(),
            has_analysis: self.analysis.is_some(),
            risk_overlay_visible: self.risk_overlay_visible,
            ai_panel_open: self.ai_panel_open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astralens_analysis::terrain::FlatTerrain;
    use astralens_analysis_models::SuitabilityGrade;

    fn session() -> MapSession {
        let catalog = FeatureCatalog::from_json_str(
            r#"[{"id":"TYC-1","name":"Tycho","coordinates":[0.0,0.0]}]"#,
        )
        .unwrap();
        MapSession::new(CoordinateTransform::MOON, catalog)
    }

    fn rect() -> SelectionRectangle {
        SelectionRectangle::new(PixelPoint::new(0.0, 0.0), PixelPoint::new(10.0, 10.0))
    }

    #[test]
    fn clicks_only_measure_in_measure_mode() {
        let mut s = session();
        assert!(s.click(PixelPoint::new(1.0, 1.0)).is_none());
        s.set_mode(InteractionMode::Measure);
        s.click(PixelPoint::new(0.0, 0.0));
        s.click(PixelPoint::new(100.0, 0.0));
        assert!((s.distance().unwrap() - 10.0).abs() < 1e-9);
        s.click(PixelPoint::new(5.0, 5.0));
        assert_eq!(s.measurement_points().len(), 1);
    }

    #[test]
    fn drag_runs_analysis_only_in_analyze_mode() {
        let mut s = session();
        assert!(s.complete_drag(&rect(), &mut FlatTerrain(1.0)).is_none());

        s.set_mode(InteractionMode::Analyze);
        let grade = s
            .complete_drag(&rect(), &mut FlatTerrain(1.0))
            .unwrap()
            .stats
            .suitability_grade;
        assert_eq!(grade, SuitabilityGrade::APlus);

        s.complete_drag(&rect(), &mut FlatTerrain(20.0));
        assert_eq!(
            s.analysis().unwrap().stats.suitability_grade,
            SuitabilityGrade::D
        );
    }

    #[test]
    fn reentering_analyze_mode_clears_result() {
        let mut s = session();
        s.set_mode(InteractionMode::Analyze);
        s.complete_drag(&rect(), &mut FlatTerrain(1.0));
        s.set_mode(InteractionMode::Browse);
        assert!(s.analysis().is_some());
        s.set_mode(InteractionMode::Analyze);
        assert!(s.analysis().is_none());
    }

    #[test]
    fn labels_features_once() {
        let mut s = session();
        let labeled = s.label_feature("tyc-1").unwrap();
        assert!((labeled.marker.x - 17_374.0).abs() < 1e-9);
        s.label_feature("TYC-1").unwrap();
        assert_eq!(s.labeled().len(), 1);
        assert!(matches!(
            s.label_feature("NOPE-1"),
            Err(FeatureError::NotFound { .. })
        ));
        s.clear_labels();
        assert!(s.labeled().is_empty());
    }

    #[test]
    fn labeling_without_data_reports_not_loaded() {
        let mut s = MapSession::default();
        assert!(matches!(
            s.label_feature("TYC-1"),
            Err(FeatureError::NotLoaded)
        ));
    }

    #[test]
    fn status_reflects_state() {
        let mut s = session();
        s.toggle_risk_overlay();
        s.set_mode(InteractionMode::Measure);
        s.click(PixelPoint::default());
        let status = s.status();
        assert_eq!(status.feature_count, 1);
        assert_eq!(status.measurement_points, 1);
        assert_eq!(status.mode, InteractionMode::Measure);
        assert!(status.risk_overlay_visible);
        assert!(!status.ai_panel_open);
        assert!(!status.has_analysis);

        assert!(s.toggle_ai_panel());
        assert!(s.status().ai_panel_open);
    }

    #[test]
    fn catalog_can_arrive_late() {
        let mut s = MapSession::new(CoordinateTransform::MOON, FeatureCatalog::default());
        assert_eq!(s.status().feature_count, 0);
        s.set_catalog(session().catalog().clone());
        assert!(s.label_feature("TYC-1").is_ok());
    }
}
