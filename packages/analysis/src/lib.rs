#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Grid sampling and suitability scoring over a selected lunar area.
//!
//! The user drags a rectangle, [`sampler::AreaAnalyzer`] lays a fixed grid
//! over it, asks a [`terrain::TerrainSampler`] for every cell's slope, and
//! condenses the grid into an
//! [`AnalysisResult`](astralens_analysis_models::AnalysisResult).
//!
//! No elevation model is wired in yet. The shipped sampler,
//! [`terrain::UniformRandomTerrain`], draws slopes uniformly from
//! `[0, 25)` degrees: its grades are a placeholder for UI work, not a
//! scientific result. Seed it (or plug in a real terrain lookup) when
//! results must be reproducible.

pub mod sampler;
pub mod terrain;

pub use sampler::{AreaAnalyzer, run_analysis};
pub use terrain::{TerrainSampler, UniformRandomTerrain};

use thiserror::Error;

/// Errors that can occur while configuring an analysis.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// A grid with no cells can't produce statistics.
    #[error("Grid size must be at least 1")]
    EmptyGrid,
}
