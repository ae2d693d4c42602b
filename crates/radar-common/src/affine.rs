//! GDAL-style affine transforms between raster pixels and native coordinates.

use crate::Extent;
use serde::{Deserialize, Serialize};

/// Affine geotransform with GDAL coefficient order:
///
/// ```text
/// [x0, a, b, y0, c, d]
/// x_native = x0 + a * x_pixel + b * y_pixel
/// y_native = y0 + c * x_pixel + d * y_pixel
/// ```
///
/// `a` and `d` are the pixel sizes and must be non-zero. `d` is commonly
/// negative for north-up rasters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AffineTransform(pub [f64; 6]);

impl AffineTransform {
    pub fn new(coefficients: [f64; 6]) -> Self {
        Self(coefficients)
    }

    /// Map a pixel coordinate to a native CRS coordinate.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [x0, a, b, y0, c, d] = self.0;
        (x0 + a * x + b * y, y0 + c * x + d * y)
    }

    /// Native extent spanned by the centers of the first and last pixels.
    ///
    /// Normalized per axis, so a negative row or column scale still yields
    /// `min <= max`.
    pub fn extent(&self, width: usize, height: usize) -> Extent {
        let top_left_center = self.apply(0.5, 0.5);
        let bottom_right_center = self.apply(width as f64 - 0.5, height as f64 - 0.5);
        Extent::from_corners(top_left_center, bottom_right_center)
    }

    /// Bit patterns of the coefficients, for value-equality cache keys.
    pub fn to_bits(&self) -> [u64; 6] {
        let mut bits = [0u64; 6];
        for (out, c) in bits.iter_mut().zip(self.0.iter()) {
            *out = c.to_bits();
        }
        bits
    }
}
