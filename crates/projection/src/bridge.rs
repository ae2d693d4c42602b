//! Forward/inverse coordinate conversion between two named CRSs.

use crate::ProjectionRegistry;
use proj4rs::Proj;
use radar_common::{Extent, RadarResult};
use std::sync::Arc;

/// One-directional coordinate conversion between two compiled projections.
///
/// The API surface works in conventional units: degrees for geographic CRSs,
/// projected units (meters) otherwise. proj4rs itself expects radians for
/// geographic coordinates; the conversion happens at this boundary.
#[derive(Debug, Clone)]
pub struct Converter {
    from: Arc<Proj>,
    to: Arc<Proj>,
}

impl Converter {
    /// Convert a coordinate.
    ///
    /// Returns None when the conversion fails or produces a non-finite
    /// coordinate (e.g. through a degenerate region of the projection);
    /// callers treat that as "unmappable", not as an error.
    pub fn convert(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let mut point = if self.from.is_latlong() {
            (x.to_radians(), y.to_radians(), 0.0)
        } else {
            (x, y, 0.0)
        };

        proj4rs::transform::transform(&self.from, &self.to, &mut point).ok()?;

        let (out_x, out_y) = if self.to.is_latlong() {
            (point.0.to_degrees(), point.1.to_degrees())
        } else {
            (point.0, point.1)
        };

        (out_x.is_finite() && out_y.is_finite()).then_some((out_x, out_y))
    }

    /// Convert an extent by converting its two opposite corners and
    /// re-normalizing. None if either corner is unmappable.
    pub fn convert_extent(&self, extent: &Extent) -> Option<Extent> {
        let a = self.convert(extent.min_x, extent.min_y)?;
        let b = self.convert(extent.max_x, extent.max_y)?;
        Some(Extent::from_corners(a, b))
    }
}

/// Build the forward and inverse converters between two CRS identifiers.
///
/// Forward converts `crs_a` coordinates to `crs_b`; inverse the other way.
/// Fails with `UnknownProjection` for unregistered identifiers.
pub fn converters(
    registry: &ProjectionRegistry,
    crs_a: &str,
    crs_b: &str,
) -> RadarResult<(Converter, Converter)> {
    let a = Arc::new(registry.resolve(crs_a)?);
    let b = Arc::new(registry.resolve(crs_b)?);

    let forward = Converter {
        from: a.clone(),
        to: b.clone(),
    };
    let inverse = Converter { from: b, to: a };
    Ok((forward, inverse))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ProjectionRegistry {
        ProjectionRegistry::with_defaults()
    }

    #[test]
    fn test_known_utm_to_web_mercator_values() {
        let (forward, inverse) = converters(&registry(), "EPSG:3067", "EPSG:3857").unwrap();

        let (x, y) = forward.convert(372_150.0, 7_313_985.0).unwrap();
        assert!((x - 2_692_930.1).abs() < 1.0, "x = {x}");
        assert!((y - 9_855_302.9).abs() < 1.0, "y = {y}");

        let (bx, by) = inverse.convert(x, y).unwrap();
        assert!((bx - 372_150.0).abs() < 0.1);
        assert!((by - 7_313_985.0).abs() < 0.1);
    }

    #[test]
    fn test_geographic_to_web_mercator_analytic() {
        let (forward, _) = converters(&registry(), "EPSG:4326", "EPSG:3857").unwrap();

        let (x, y) = forward.convert(25.0, 60.0).unwrap();
        let r = 6_378_137.0_f64;
        let expected_x = r * 25.0_f64.to_radians();
        let expected_y = r * (std::f64::consts::FRAC_PI_4 + 30.0_f64.to_radians()).tan().ln();
        assert!((x - expected_x).abs() < 0.01, "x = {x}, expected {expected_x}");
        assert!((y - expected_y).abs() < 0.01, "y = {y}, expected {expected_y}");
    }

    #[test]
    fn test_round_trip_law() {
        let (forward, inverse) = converters(&registry(), "EPSG:4326", "EPSG:3857").unwrap();
        for &(lon, lat) in &[(19.9, 61.6), (25.0, 65.0), (-70.0, -33.0), (0.0, 0.0)] {
            let (mx, my) = forward.convert(lon, lat).unwrap();
            let (rl, rp) = inverse.convert(mx, my).unwrap();
            assert!((rl - lon).abs() < 1e-6, "lon {lon} -> {rl}");
            assert!((rp - lat).abs() < 1e-6, "lat {lat} -> {rp}");
        }
    }

    #[test]
    fn test_convert_extent_normalizes() {
        let (forward, _) = converters(&registry(), "EPSG:4326", "EPSG:3857").unwrap();
        let e = Extent::new(19.0, 60.0, 28.0, 65.0);
        let m = forward.convert_extent(&e).unwrap();
        assert!(m.min_x < m.max_x);
        assert!(m.min_y < m.max_y);
    }

    #[test]
    fn test_unknown_crs_fails() {
        assert!(converters(&registry(), "EPSG:4326", "EPSG:12345").is_err());
    }
}
