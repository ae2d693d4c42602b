//! Axis-aligned extents in some coordinate reference system.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box.
///
/// For geographic CRS (EPSG:4326), coordinates are in degrees.
/// For projected CRS (EPSG:3857, etc.), coordinates are in meters.
/// Always normalized so `min_x <= max_x` and `min_y <= max_y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// Create a new extent from already-ordered bounds.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Create an extent from two opposite corners in any order,
    /// normalizing with componentwise min/max.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            min_x: a.0.min(b.0),
            min_y: a.1.min(b.1),
            max_x: a.0.max(b.0),
            max_y: a.1.max(b.1),
        }
    }

    /// Width of the extent in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the extent in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if a point is contained within this extent (inclusive, no tolerance).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Quantize to micro-units for use inside hashable cache keys.
    ///
    /// Quantization to 1e-6 units sidesteps floating point noise between
    /// otherwise identical render requests.
    pub fn quantized(&self) -> [i64; 4] {
        [
            (self.min_x * 1e6).round() as i64,
            (self.min_y * 1e6).round() as i64,
            (self.max_x * 1e6).round() as i64,
            (self.max_y * 1e6).round() as i64,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_normalizes() {
        let e = Extent::from_corners((10.0, 5.0), (-10.0, 50.0));
        assert_eq!(e.min_x, -10.0);
        assert_eq!(e.min_y, 5.0);
        assert_eq!(e.max_x, 10.0);
        assert_eq!(e.max_y, 50.0);
    }

    #[test]
    fn test_contains() {
        let e = Extent::new(0.0, 0.0, 10.0, 10.0);
        assert!(e.contains(5.0, 5.0));
        assert!(e.contains(0.0, 10.0));
        assert!(!e.contains(10.000001, 5.0));
        assert!(!e.contains(5.0, -0.000001));
    }

    #[test]
    fn test_quantized_is_stable() {
        let a = Extent::new(19.88, 61.62, 21.77, 62.52);
        let b = Extent::new(19.88, 61.62, 21.77, 62.52);
        assert_eq!(a.quantized(), b.quantized());
        assert_eq!(a.quantized()[0], 19_880_000);
    }
}
