//! Area sampling and aggregation.

use astralens_analysis_models::{
    AnalysisCell, AnalysisResult, AnalysisStats, DEFAULT_GRID_SIZE, SuitabilityGrade,
};
use astralens_geometry_models::{PixelPoint, SelectionRectangle};

use crate::AnalysisError;
use crate::terrain::TerrainSampler;

/// Lays a `grid_size × grid_size` grid over a selection and scores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaAnalyzer {
    grid_size: usize,
}

impl Default for AreaAnalyzer {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
        }
    }
}

impl AreaAnalyzer {
    /// Creates an analyzer with a custom grid size.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::EmptyGrid`] if `grid_size` is zero.
    pub const fn new(grid_size: usize) -> Result<Self, AnalysisError> {
        if grid_size == 0 {
            return Err(AnalysisError::EmptyGrid);
        }
        Ok(Self { grid_size })
    }

    /// Cells per side.
    #[must_use]
    pub const fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Samples `rect` and returns every cell plus summary statistics.
    ///
    /// Row `i` advances along `y` from the south edge, column `j` along `x`
    /// from the west edge. Each cell's position is
    /// `sw + (ne - sw) * (i / g, j / g)`.
    #[must_use]
    pub fn analyze(
        &self,
        rect: &SelectionRectangle,
        terrain: &mut dyn TerrainSampler,
    ) -> AnalysisResult {
        let bounds = rect.normalized();
        let sw = bounds.south_west;
        let g = self.grid_size;
        #[allow(clippy::cast_precision_loss)]
        let g_f = g as f64;
        let step_x = bounds.width() / g_f;
        let step_y = bounds.height() / g_f;

        let mut cells = Vec::with_capacity(g * g);

        for row in 0..g {
            for col in 0..g {
                #[allow(clippy::cast_precision_loss)]
                let origin = PixelPoint::new(
                    (col as f64 / g_f).mul_add(bounds.width(), sw.x),
                    (row as f64 / g_f).mul_add(bounds.height(), sw.y),
                );
                let opposite = PixelPoint::new(origin.x + step_x, origin.y + step_y);

                cells.push(AnalysisCell {
                    row,
                    col,
                    bounds: [origin, opposite],
                    slope_value: terrain.slope_at(origin),
                });
            }
        }

        let stats = summarize(&cells);
        log::debug!(
            "Analyzed {} cells: avg slope {:.2}°, {}% safe, grade {}",
            cells.len(),
            stats.average_slope,
            stats.safe_area_percent,
            stats.suitability_grade
        );

        AnalysisResult { cells, stats }
    }
}

/// Runs an analysis at the default grid size.
#[must_use]
pub fn run_analysis(rect: &SelectionRectangle, terrain: &mut dyn TerrainSampler) -> AnalysisResult {
    AreaAnalyzer::default().analyze(rect, terrain)
}

/// Aggregates cells into mean slope, safe percentage and grade.
#[must_use]
pub fn summarize(cells: &[AnalysisCell]) -> AnalysisStats {
    if cells.is_empty() {
        return AnalysisStats {
            average_slope: 0.0,
            safe_area_percent: 0,
            suitability_grade: SuitabilityGrade::D,
        };
    }

    #[allow(clippy::cast_precision_loss)]
    let total = cells.len() as f64;
    let average_slope = cells.iter().map(|c| c.slope_value).sum::<f64>() / total;
    #[allow(clippy::cast_precision_loss)]
    let safe = cells.iter().filter(|c| c.is_safe()).count() as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let safe_area_percent = (100.0 * safe / total).round() as u32;

    AnalysisStats {
        average_slope,
        safe_area_percent,
        suitability_grade: SuitabilityGrade::from_stats(average_slope, safe_area_percent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{FlatTerrain, UniformRandomTerrain};

    fn unit_rect() -> SelectionRectangle {
        SelectionRectangle::new(PixelPoint::new(0.0, 0.0), PixelPoint::new(10.0, 10.0))
    }

    #[test]
    fn produces_full_grid() {
        let result = run_analysis(&unit_rect(), &mut UniformRandomTerrain::from_entropy());
        assert_eq!(result.cells.len(), 225);
        for cell in &result.cells {
            assert!(cell.row < 15);
            assert!(cell.col < 15);
        }
        let mut seen: Vec<(usize, usize)> = result.cells.iter().map(|c| (c.row, c.col)).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 225);
    }

    #[test]
    fn cells_tile_the_selection() {
        let rect = SelectionRectangle::new(PixelPoint::new(30.0, -10.0), PixelPoint::new(0.0, -40.0));
        let result = run_analysis(&rect, &mut FlatTerrain(1.0));
        let first = &result.cells[0];
        assert_eq!(first.bounds[0], PixelPoint::new(0.0, -40.0));
        assert!((first.bounds[1].x - 2.0).abs() < 1e-9);
        assert!((first.bounds[1].y - -38.0).abs() < 1e-9);
        let last = result.cells.last().unwrap();
        assert!((last.bounds[1].x - 30.0).abs() < 1e-9);
        assert!((last.bounds[1].y - -10.0).abs() < 1e-9);
    }

    #[test]
    fn flat_terrain_is_a_plus() {
        let result = run_analysis(&unit_rect(), &mut FlatTerrain(2.0));
        assert_eq!(result.stats.safe_area_percent, 100);
        assert!((result.stats.average_slope - 2.0).abs() < 1e-9);
        assert_eq!(result.stats.suitability_grade, SuitabilityGrade::APlus);
    }

    #[test]
    fn steep_terrain_is_d() {
        let result = run_analysis(&unit_rect(), &mut FlatTerrain(20.0));
        assert_eq!(result.stats.safe_area_percent, 0);
        assert_eq!(result.stats.suitability_grade, SuitabilityGrade::D);
    }

    #[test]
    fn safe_percent_rounds() {
        // One safe column of three: 33.33% rounds to 33.
        let analyzer = AreaAnalyzer::new(3).unwrap();
        let mut by_column = |p: PixelPoint| if p.x < 1.0 { 0.0 } else { 10.0 };
        let rect = SelectionRectangle::new(PixelPoint::new(0.0, 0.0), PixelPoint::new(3.0, 3.0));
        let result = analyzer.analyze(&rect, &mut by_column);
        assert_eq!(result.cells.len(), 9);
        assert_eq!(result.stats.safe_area_percent, 33);
        assert_eq!(result.stats.suitability_grade, SuitabilityGrade::C);
    }

    #[test]
    fn seeded_runs_are_identical() {
        let a = run_analysis(&unit_rect(), &mut UniformRandomTerrain::seeded(7));
        let b = run_analysis(&unit_rect(), &mut UniformRandomTerrain::seeded(7));
        assert_eq!(a, b);
    }

    #[test]
    fn zero_grid_is_rejected() {
        assert_eq!(AreaAnalyzer::new(0), Err(AnalysisError::EmptyGrid));
    }
}
