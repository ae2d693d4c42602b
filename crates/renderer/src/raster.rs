//! Raster rendering: product bytes in, RGBA canvas out.

use crate::color::{Color, ColorTableCache};
use crate::mapping::{CanvasMapper, GeoProbe, RenderView};
use crate::render_cache::RenderCache;
use chrono::{DateTime, Utc};
use projection::{LutKey, ProjectionRegistry};
use radar_common::{DataValue, Extent, ProductDescriptor, RadarResult};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// A finished RGBA8 render, row-major from the top-left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba.repeat((width as usize) * (height as usize));
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, 4 per pixel.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = 4 * (y as usize * self.width as usize + x as usize);
        Some(Color::new(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ))
    }
}

/// Cache identity of one render: which product instant was drawn, where,
/// and at what size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderKey {
    selection: String,
    time: DateTime<Utc>,
    extent: [i64; 4],
    width: u32,
    height: u32,
}

impl RenderKey {
    pub fn new(
        selection: &str,
        time: DateTime<Utc>,
        extent: &Extent,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            selection: selection.to_string(),
            time,
            extent: extent.quantized(),
            width,
            height,
        }
    }
}

/// Renders radar products into RGBA rasters.
///
/// Holds the pixel mapping for the most recent (product, view) geometry,
/// the per-scale color tables, and the raster cache. One renderer serves
/// one drawing surface; it is not shared across threads.
pub struct RadarRenderer {
    registry: ProjectionRegistry,
    mapping: Option<(LutKey, CanvasMapper, GeoProbe)>,
    color_tables: ColorTableCache,
    cache: RenderCache,
}

impl RadarRenderer {
    pub fn new(registry: ProjectionRegistry) -> Self {
        Self::with_cache(registry, RenderCache::default())
    }

    pub fn with_cache(registry: ProjectionRegistry, cache: RenderCache) -> Self {
        Self {
            registry,
            mapping: None,
            color_tables: ColorTableCache::new(),
            cache,
        }
    }

    /// Render a product into the view, reusing a cached raster when the key
    /// matches a fresh entry.
    pub fn render(
        &mut self,
        key: &RenderKey,
        product: &ProductDescriptor,
        view: &RenderView,
    ) -> RadarResult<Arc<Raster>> {
        product.validate()?;
        self.ensure_mapping(product, view)?;
        let table = self
            .color_tables
            .get_or_build(product.data_type, &product.scale);
        let (_, mapper, _) = self.mapping.as_ref().expect("mapping built above");

        self.cache.get_or_render(key, || {
            let start = Instant::now();
            let raster = Arc::new(render_raster(mapper, product, view, |raw| table.get(raw)));
            log_render_timing(view, start.elapsed());
            Ok(raster)
        })
    }

    /// Decoded value and display color at a geographic coordinate, or None
    /// outside the product's coverage.
    pub fn probe(
        &mut self,
        product: &ProductDescriptor,
        view: &RenderView,
        lon: f64,
        lat: f64,
    ) -> RadarResult<Option<(DataValue, Color)>> {
        product.validate()?;
        self.ensure_mapping(product, view)?;
        let (_, _, probe) = self.mapping.as_ref().expect("mapping built above");

        let Some((px, py)) = probe.pixel(lon, lat) else {
            return Ok(None);
        };
        let Some(raw) = product.value_at(px, py) else {
            return Ok(None);
        };

        let value = product.scale.decode(raw)?;
        let color = self
            .color_tables
            .get_or_build(product.data_type, &product.scale)
            .get(raw);
        Ok(Some((value, color)))
    }

    pub fn cache_stats(&self) -> crate::render_cache::CacheStats {
        self.cache.stats()
    }

    /// Rebuild the pixel mapping when the (product, view) geometry differs
    /// from the last render.
    fn ensure_mapping(
        &mut self,
        product: &ProductDescriptor,
        view: &RenderView,
    ) -> RadarResult<()> {
        let lut_key = view.lut_key(product);
        let stale = match &self.mapping {
            Some((key, _, _)) => *key != lut_key,
            None => true,
        };
        if stale {
            info!(
                product_crs = %product.projection,
                canvas_crs = %view.crs,
                "building new pixel mapping"
            );
            let mapper = CanvasMapper::new(&self.registry, product, view)?;
            let probe = GeoProbe::new(&self.registry, product)?;
            self.mapping = Some((lut_key, mapper, probe));
        }
        Ok(())
    }
}

/// Fill an RGBA buffer for the view. Rows render in parallel; canvas pixels
/// outside the product's coverage stay transparent.
fn render_raster(
    mapper: &CanvasMapper,
    product: &ProductDescriptor,
    view: &RenderView,
    color_of: impl Fn(u8) -> Color + Sync,
) -> Raster {
    let width = view.width as usize;
    let mut pixels = vec![0u8; width * view.height as usize * 4];

    pixels
        .par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width {
                let Some((px, py)) = mapper.product_px(x as u32, y as u32) else {
                    continue;
                };
                let Some(raw) = product.value_at(px, py) else {
                    continue;
                };
                let color = color_of(raw);
                let i = x * 4;
                row[i] = color.r;
                row[i + 1] = color.g;
                row[i + 2] = color.b;
                row[i + 3] = color.a;
            }
        });

    Raster {
        width: view.width,
        height: view.height,
        pixels,
    }
}

fn log_render_timing(view: &RenderView, elapsed: Duration) {
    let kilopixels = (view.width as f64 * view.height as f64) / 1000.0;
    let seconds = elapsed.as_secs_f64().max(f64::EPSILON);
    info!(
        width = view.width,
        height = view.height,
        elapsed_ms = elapsed.as_millis() as u64,
        kpx_per_s = (kilopixels / seconds) as u64,
        "rendered raster"
    );
}
