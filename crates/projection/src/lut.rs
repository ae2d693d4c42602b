//! Geographic lookup table (LUT) for fast raster reprojection.
//!
//! A render touches up to a few million canvas pixels, and a true projection
//! call per pixel dominates the render cost. The LUT samples the
//! map-CRS↔native-CRS conversion on a coarse grid in geographic space and
//! answers per-pixel queries with a binary search plus per-axis linear
//! interpolation.
//!
//! # Performance
//!
//! Building the LUT runs a few hundred projection calls; resolving a pixel
//! runs none.
//!
//! # Supported projections
//!
//! The table stores one map/native sample per longitude step and per latitude
//! step, so the target projection's distortion must be axis-separable over
//! the product's extent (true of Web Mercator and other cylindrical
//! projections; not of arbitrary oblique ones).

use crate::Converter;
use radar_common::{AffineTransform, Extent, RadarError, RadarResult};
use tracing::debug;

/// Interior longitude samples per degree of span are `1 / LON_STEP_DIVISOR`.
/// Empirical; validated by the interpolation-error tests.
const LON_STEP_DIVISOR: f64 = 2.0;

/// Latitude is sampled 8x finer than longitude per degree, bounding
/// north-south interpolation error from anisotropic projection distortion.
const LAT_STEPS_PER_DEGREE: f64 = 4.0;

/// Minimum interior step count per axis; keeps degenerate extents away from
/// zero-length steps.
const MIN_STEPS: usize = 3;

/// Degrees of padding beyond each edge so boundary lookups stay inside the
/// sampled range.
const EDGE_PADDING_DEG: f32 = 0.1;

/// Identity of a built LUT: a new table is needed whenever any of these
/// change between renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LutKey {
    pub product_crs: String,
    pub affine: [u64; 6],
    pub product_size: (usize, usize),
    pub canvas_crs: String,
    pub canvas_extent: [i64; 4],
    pub canvas_size: (u32, u32),
}

impl LutKey {
    pub fn new(
        product_crs: &str,
        affine: &AffineTransform,
        product_size: (usize, usize),
        canvas_crs: &str,
        canvas_extent: &Extent,
        canvas_size: (u32, u32),
    ) -> Self {
        Self {
            product_crs: product_crs.to_string(),
            affine: affine.to_bits(),
            product_size,
            canvas_crs: canvas_crs.to_string(),
            canvas_extent: canvas_extent.quantized(),
            canvas_size,
        }
    }
}

/// Coarse grid of coordinate correspondences over a product's extent.
///
/// `x_steps`/`y_steps` hold strictly increasing geographic samples (with one
/// out-of-range padding sample at each end); `map_*` and `native_*` hold the
/// same grid positions converted to the canvas CRS and the product's native
/// CRS. Grid points where conversion failed stay NaN and simply make nearby
/// lookups unmappable.
#[derive(Debug, Clone)]
pub struct GeoGridLut {
    x_steps: Vec<f32>,
    y_steps: Vec<f32>,
    map_xs: Vec<f32>,
    map_ys: Vec<f32>,
    native_xs: Vec<f32>,
    native_ys: Vec<f32>,
}

impl GeoGridLut {
    /// Build a LUT covering `native_extent`.
    ///
    /// `native_to_wgs84` bounds the product in geographic space;
    /// `wgs84_to_map` and `map_to_native` fill the correspondence arrays.
    pub fn build(
        native_extent: &Extent,
        native_to_wgs84: &Converter,
        wgs84_to_map: &Converter,
        map_to_native: &Converter,
    ) -> RadarResult<Self> {
        let geo_extent = native_to_wgs84.convert_extent(native_extent).ok_or_else(|| {
            RadarError::ProjectionError(
                "product extent is unmappable to geographic coordinates".to_string(),
            )
        })?;

        let x_degrees = geo_extent.width();
        let y_degrees = geo_extent.height();

        let x_step_count = ((x_degrees.floor() / LON_STEP_DIVISOR) as usize).max(MIN_STEPS);
        let y_step_count = ((y_degrees * LAT_STEPS_PER_DEGREE).floor() as usize).max(MIN_STEPS);

        let x_steps = build_steps(geo_extent.min_x, geo_extent.max_x, x_step_count);
        let y_steps = build_steps(geo_extent.min_y, geo_extent.max_y, y_step_count);

        debug!(
            x_samples = x_steps.len(),
            y_samples = y_steps.len(),
            "building reprojection LUT"
        );

        let mut map_xs = vec![f32::NAN; x_steps.len()];
        let mut map_ys = vec![f32::NAN; y_steps.len()];
        let mut native_xs = vec![f32::NAN; x_steps.len()];
        let mut native_ys = vec![f32::NAN; y_steps.len()];

        for (i, &lon) in x_steps.iter().enumerate() {
            for (j, &lat) in y_steps.iter().enumerate() {
                let Some((map_x, map_y)) = wgs84_to_map.convert(lon as f64, lat as f64) else {
                    continue;
                };
                map_xs[i] = map_x as f32;
                map_ys[j] = map_y as f32;

                let Some((native_x, native_y)) = map_to_native.convert(map_x, map_y) else {
                    continue;
                };
                native_xs[i] = native_x as f32;
                native_ys[j] = native_y as f32;
            }
        }

        Ok(Self {
            x_steps,
            y_steps,
            map_xs,
            map_ys,
            native_xs,
            native_ys,
        })
    }

    /// Approximate a map-CRS coordinate's position in the native CRS.
    ///
    /// Returns None when the coordinate falls outside the sampled coverage
    /// or a bracketing sample is unusable.
    #[inline]
    pub fn resolve(&self, map_x: f64, map_y: f64) -> Option<(f64, f64)> {
        let x = interpolate_axis(&self.map_xs, &self.native_xs, map_x)?;
        let y = interpolate_axis(&self.map_ys, &self.native_ys, map_y)?;
        Some((x, y))
    }

    /// Number of samples per axis, padding included.
    pub fn grid_size(&self) -> (usize, usize) {
        (self.x_steps.len(), self.y_steps.len())
    }

    #[cfg(test)]
    fn geographic_steps(&self) -> (&[f32], &[f32]) {
        (&self.x_steps, &self.y_steps)
    }
}

/// Evenly spaced samples over `[min, max]` with one padding sample beyond
/// each edge; length `step_count + 2`, strictly increasing for any nonzero
/// span.
fn build_steps(min: f64, max: f64, step_count: usize) -> Vec<f32> {
    let step_size = (max - min) / step_count as f64;
    let mut steps = vec![0.0f32; step_count + 2];

    steps[0] = min as f32 - EDGE_PADDING_DEG;
    steps[step_count + 1] = max as f32 + EDGE_PADDING_DEG;

    // Interior samples sit half a step inside the bounds on each side.
    let base = min - step_size * 0.5;
    for i in 0..step_count {
        steps[i + 1] = (base + (i + 1) as f64 * step_size) as f32;
    }

    steps
}

/// Binary search for the index whose value is closest to `target`.
///
/// Exact matches short-circuit to the first found equal index. Assumes the
/// array is approximately locally monotonic; NaN entries lose every
/// comparison and never win.
pub fn find_closest_index(samples: &[f32], target: f32) -> usize {
    let mut start = 0isize;
    let mut end = samples.len() as isize - 1;

    let mut smallest_difference = f32::MAX;
    let mut smallest_difference_index = 0usize;

    while start <= end {
        let mid = (start + end) / 2;
        let sample = samples[mid as usize];
        let difference = (target - sample).abs();

        if sample == target {
            return mid as usize;
        } else if sample < target {
            start = mid + 1;
        } else {
            end = mid - 1;
        }

        if difference < smallest_difference {
            smallest_difference = difference;
            smallest_difference_index = mid as usize;
        }
    }

    smallest_difference_index
}

/// Resolve one axis: bracket `target` between the closest and second-closest
/// map samples, then lerp the corresponding native samples.
#[inline]
fn interpolate_axis(map: &[f32], native: &[f32], target: f64) -> Option<f64> {
    let nearest = find_closest_index(map, target as f32);

    // Neighbor on the side of the target. A nearest sample already at the
    // array boundary means the target is outside the sampled coverage.
    let second = if (map[nearest] as f64) < target {
        let i = nearest + 1;
        if i >= map.len() {
            return None;
        }
        i
    } else {
        nearest.checked_sub(1)?
    };

    let (m0, m1) = in_sorted_order(map[nearest] as f64, map[second] as f64);
    let (n0, n1) = in_sorted_order(native[nearest] as f64, native[second] as f64);

    let span = m1 - m0;
    if !(span > 0.0) {
        return None;
    }

    let fraction = (target - m0) / span;
    let value = lerp(n0, n1, fraction);
    value.is_finite().then_some(value)
}

#[inline]
fn in_sorted_order(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[inline]
fn lerp(a: f64, b: f64, fraction: f64) -> f64 {
    a * (1.0 - fraction) + b * fraction
}
