//! Canvas-to-raster pixel mapping.
//!
//! A render walks every canvas pixel and asks which product raster cell it
//! shows. The expensive part, converting between the canvas CRS and the
//! product's native CRS, goes through the LUT; the rest is linear pixel
//! arithmetic over the two extents.

use projection::{converters, Converter, GeoGridLut, LutKey, ProjectionRegistry};
use radar_common::{Extent, ProductDescriptor, RadarResult};

/// Geographic CRS used as the LUT sampling space.
pub const WGS84: &str = "EPSG:4326";

/// The canvas a render targets: its CRS, the extent it covers in that CRS,
/// and its pixel dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderView {
    pub crs: String,
    pub extent: Extent,
    pub width: u32,
    pub height: u32,
}

impl RenderView {
    pub fn new(crs: impl Into<String>, extent: Extent, width: u32, height: u32) -> Self {
        Self {
            crs: crs.into(),
            extent,
            width,
            height,
        }
    }

    /// Identity of the pixel mapping this view needs for a product.
    pub fn lut_key(&self, product: &ProductDescriptor) -> LutKey {
        LutKey::new(
            &product.projection,
            &product.affine,
            (product.width, product.height),
            &self.crs,
            &self.extent,
            (self.width, self.height),
        )
    }
}

/// Maps canvas pixels of one view onto raster pixels of one product.
///
/// Valid as long as the view and the product geometry are unchanged; the
/// renderer rebuilds it when the [`LutKey`] differs.
#[derive(Debug)]
pub struct CanvasMapper {
    lut: GeoGridLut,
    view_extent: Extent,
    view_size: (u32, u32),
    native_extent: Extent,
    raster_size: (usize, usize),
}

impl CanvasMapper {
    pub fn new(
        registry: &ProjectionRegistry,
        product: &ProductDescriptor,
        view: &RenderView,
    ) -> RadarResult<Self> {
        let (native_to_wgs84, _) = converters(registry, &product.projection, WGS84)?;
        let (wgs84_to_map, _) = converters(registry, WGS84, &view.crs)?;
        let (_, map_to_native) = converters(registry, &product.projection, &view.crs)?;

        let native_extent = product.native_extent();
        let lut = GeoGridLut::build(
            &native_extent,
            &native_to_wgs84,
            &wgs84_to_map,
            &map_to_native,
        )?;

        Ok(Self {
            lut,
            view_extent: view.extent,
            view_size: (view.width, view.height),
            native_extent,
            raster_size: (product.width, product.height),
        })
    }

    /// Product raster pixel shown at a canvas pixel, or None when the canvas
    /// pixel falls outside the product's coverage.
    #[inline]
    pub fn product_px(&self, canvas_x: u32, canvas_y: u32) -> Option<(usize, usize)> {
        let (map_x, map_y) = self.canvas_to_map(canvas_x, canvas_y);
        let (native_x, native_y) = self.lut.resolve(map_x, map_y)?;
        native_to_raster_px(&self.native_extent, self.raster_size, native_x, native_y)
    }

    /// Map-CRS coordinate at a canvas pixel. Canvas row 0 is the top of the
    /// view, so the y proportion runs against the extent's y axis.
    #[inline]
    fn canvas_to_map(&self, canvas_x: u32, canvas_y: u32) -> (f64, f64) {
        let prop_x = canvas_x as f64 / self.view_size.0 as f64;
        let prop_y = 1.0 - canvas_y as f64 / self.view_size.1 as f64;
        (
            self.view_extent.min_x + prop_x * self.view_extent.width(),
            self.view_extent.min_y + prop_y * self.view_extent.height(),
        )
    }

    pub fn grid_size(&self) -> (usize, usize) {
        self.lut.grid_size()
    }
}

/// Maps geographic coordinates onto raster pixels with true projection
/// calls, for value probing at a clicked location.
#[derive(Debug)]
pub struct GeoProbe {
    wgs84_to_native: Converter,
    native_extent: Extent,
    raster_size: (usize, usize),
}

impl GeoProbe {
    pub fn new(registry: &ProjectionRegistry, product: &ProductDescriptor) -> RadarResult<Self> {
        let (_, wgs84_to_native) = converters(registry, &product.projection, WGS84)?;
        Ok(Self {
            wgs84_to_native,
            native_extent: product.native_extent(),
            raster_size: (product.width, product.height),
        })
    }

    /// Raster pixel at a geographic coordinate, or None outside coverage.
    pub fn pixel(&self, lon: f64, lat: f64) -> Option<(usize, usize)> {
        let (native_x, native_y) = self.wgs84_to_native.convert(lon, lat)?;
        native_to_raster_px(&self.native_extent, self.raster_size, native_x, native_y)
    }
}

/// Snap a native-CRS coordinate to the nearest raster pixel.
///
/// Raster row 0 holds the cells at the top (maximum y) of the extent.
/// Coordinates outside the extent, exactly on the boundary excepted, map to
/// None.
fn native_to_raster_px(
    extent: &Extent,
    raster_size: (usize, usize),
    x: f64,
    y: f64,
) -> Option<(usize, usize)> {
    if !x.is_finite() || !y.is_finite() || !extent.contains(x, y) {
        return None;
    }

    let (width, height) = raster_size;
    let span_x = extent.width();
    let span_y = extent.height();

    // A one-pixel axis has a zero-span extent; everything inside it is
    // that single pixel.
    let px = if span_x > 0.0 {
        ((x - extent.min_x) / span_x * (width - 1) as f64).round() as usize
    } else {
        0
    };
    let py = if span_y > 0.0 {
        ((extent.max_y - y) / span_y * (height - 1) as f64).round() as usize
    } else {
        0
    };

    (px < width && py < height).then_some((px, py))
}
