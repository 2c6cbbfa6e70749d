//! Geographic ⇄ pixel coordinate transform.
//!
//! The forward mapping is a plain equirectangular stretch of the
//! `[-90, 90] × [-180, 180]` degree range onto `[-H, 0] × [0, W]`:
//!
//! ```text
//! pixel_y = -(((latitude + 90) / 180) * H)
//! pixel_x = ((longitude + 180) / 360) * W
//! ```
//!
//! Inputs outside the valid range are clamped silently, so malformed
//! feature data can never land outside the canvas.

use astralens_geometry_models::{GeoPoint, ImageDimensions, PixelPoint};

/// Converts between [`GeoPoint`] and [`PixelPoint`] for one image pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoordinateTransform {
    dimensions: ImageDimensions,
}

impl CoordinateTransform {
    /// Transform for the Moon mosaic.
    pub const MOON: Self = Self {
        dimensions: ImageDimensions::MOON,
    };

    /// Creates a transform for an image of the given size.
    #[must_use]
    pub const fn new(dimensions: ImageDimensions) -> Self {
        Self { dimensions }
    }

    /// Image dimensions this transform maps onto.
    #[must_use]
    pub const fn dimensions(&self) -> ImageDimensions {
        self.dimensions
    }

    /// Projects a geographic point into pixel space, clamping first.
    #[must_use]
    pub fn to_pixel(&self, geo: GeoPoint) -> PixelPoint {
        let geo = geo.clamped();
        let width = self.dimensions.width_f64();
        let height = self.dimensions.height_f64();

        PixelPoint::new(
            ((geo.longitude + 180.0) / 360.0) * width,
            -(((geo.latitude + 90.0) / 180.0) * height),
        )
    }

    /// Inverse of [`Self::to_pixel`].
    ///
    /// Pixel input is clamped into `[0, W] × [-H, 0]` so the result is
    /// always a valid [`GeoPoint`].
    #[must_use]
    pub fn to_geo(&self, pixel: PixelPoint) -> GeoPoint {
        let width = self.dimensions.width_f64();
        let height = self.dimensions.height_f64();
        if width <= 0.0 || height <= 0.0 {
            return GeoPoint::new(0.0, 0.0);
        }

        let x = clamp_or_zero(pixel.x, 0.0, width);
        let y = clamp_or_zero(pixel.y, -height, 0.0);

        GeoPoint::new((-y / height) * 180.0 - 90.0, (x / width) * 360.0 - 180.0)
    }

    /// Projects a `[longitude, latitude]` pair (GeoJSON axis order) into a
    /// `[x, y]` pixel pair.
    #[must_use]
    pub fn project_lon_lat(&self, longitude: f64, latitude: f64) -> [f64; 2] {
        let p = self.to_pixel(GeoPoint::new(latitude, longitude));
        [p.x, p.y]
    }
}

fn clamp_or_zero(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < TOLERANCE, "{a} != {b}");
    }

    #[test]
    fn equator_prime_meridian_maps_to_center() {
        let p = CoordinateTransform::MOON.to_pixel(GeoPoint::new(0.0, 0.0));
        assert_close(p.x, 17_374.0);
        assert_close(p.y, -17_374.0);
    }

    #[test]
    fn north_west_corner() {
        let p = CoordinateTransform::MOON.to_pixel(GeoPoint::new(90.0, -180.0));
        assert_close(p.x, 0.0);
        assert_close(p.y, -34_748.0);
    }

    #[test]
    fn round_trips_across_the_valid_range() {
        let t = CoordinateTransform::MOON;
        let mut lat = -90.0;
        while lat <= 90.0 {
            let mut lon = -180.0;
            while lon <= 180.0 {
                let back = t.to_geo(t.to_pixel(GeoPoint::new(lat, lon)));
                assert!((back.latitude - lat).abs() < 1e-9, "lat {lat} -> {back:?}");
                assert!((back.longitude - lon).abs() < 1e-9, "lon {lon} -> {back:?}");
                lon += 22.5;
            }
            lat += 7.5;
        }
    }

    #[test]
    fn out_of_range_input_matches_clamped_input() {
        let t = CoordinateTransform::MOON;
        let cases = [
            (95.0, 10.0, 90.0, 10.0),
            (-120.0, 10.0, -90.0, 10.0),
            (10.0, 200.0, 10.0, 180.0),
            (10.0, -999.0, 10.0, -180.0),
            (400.0, 400.0, 90.0, 180.0),
        ];
        for (lat, lon, clat, clon) in cases {
            assert_eq!(
                t.to_pixel(GeoPoint::new(lat, lon)),
                t.to_pixel(GeoPoint::new(clat, clon)),
                "({lat}, {lon}) should clamp to ({clat}, {clon})"
            );
        }
    }

    #[test]
    fn pixel_outside_canvas_is_clamped_on_the_way_back() {
        let g = CoordinateTransform::MOON.to_geo(PixelPoint::new(-50.0, 100.0));
        assert!(g.is_valid());
        assert_close(g.longitude, -180.0);
        assert_close(g.latitude, -90.0);
    }

    #[test]
    fn custom_dimensions() {
        let t = CoordinateTransform::new(ImageDimensions::new(360, 180));
        let p = t.to_pixel(GeoPoint::new(45.0, 90.0));
        assert_close(p.x, 270.0);
        assert_close(p.y, -135.0);
        assert_eq!(t.project_lon_lat(90.0, 45.0), [p.x, p.y]);
    }
}
