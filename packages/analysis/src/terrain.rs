//! Pluggable terrain slope sources.

use astralens_geometry_models::PixelPoint;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Upper bound (exclusive) of the synthetic slope range, in degrees.
pub const MAX_SYNTHETIC_SLOPE: f64 = 25.0;

/// Supplies a slope in degrees for a position in pixel space.
///
/// Implementations may keep state (e.g. an RNG), hence `&mut self`.
pub trait TerrainSampler {
    /// Slope at `position`, in degrees.
    fn slope_at(&mut self, position: PixelPoint) -> f64;
}

impl<F> TerrainSampler for F
where
    F: FnMut(PixelPoint) -> f64,
{
    fn slope_at(&mut self, position: PixelPoint) -> f64 {
        self(position)
    }
}

/// Stand-in terrain: every call draws uniformly from
/// `[0, MAX_SYNTHETIC_SLOPE)`, ignoring the position.
///
/// Unseeded instances are not reproducible. Use [`Self::seeded`] when the
/// same rectangle has to yield the same result twice.
#[derive(Debug, Clone)]
pub struct UniformRandomTerrain {
    rng: StdRng,
}

impl UniformRandomTerrain {
    /// Creates a sampler seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a deterministic sampler.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for UniformRandomTerrain {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl TerrainSampler for UniformRandomTerrain {
    fn slope_at(&mut self, _position: PixelPoint) -> f64 {
        self.rng.gen_range(0.0..MAX_SYNTHETIC_SLOPE)
    }
}

/// Returns the same slope everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatTerrain(pub f64);

impl TerrainSampler for FlatTerrain {
    fn slope_at(&mut self, _position: PixelPoint) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_slopes_stay_in_range() {
        let mut terrain = UniformRandomTerrain::from_entropy();
        for _ in 0..1000 {
            let s = terrain.slope_at(PixelPoint::default());
            assert!((0.0..MAX_SYNTHETIC_SLOPE).contains(&s), "{s} out of range");
        }
    }

    #[test]
    fn seeded_sampler_is_reproducible() {
        let mut a = UniformRandomTerrain::seeded(42);
        let mut b = UniformRandomTerrain::seeded(42);
        for _ in 0..50 {
            let p = PixelPoint::new(1.0, -1.0);
            assert!((a.slope_at(p) - b.slope_at(p)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn closures_are_samplers() {
        let mut by_x = |p: PixelPoint| p.x / 2.0;
        assert!((by_x.slope_at(PixelPoint::new(10.0, 0.0)) - 5.0).abs() < f64::EPSILON);
    }
}
