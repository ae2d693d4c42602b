//! Rendering of radar rasters onto a web-map canvas.
//!
//! The pipeline per canvas pixel: canvas pixel → map coordinate → (via the
//! reprojection LUT) native raster pixel → raw byte → color. A color table
//! per data scale and an LRU render cache keep repeated work off the hot
//! path.

pub mod color;
pub mod mapping;
pub mod raster;
pub mod render_cache;

pub use color::{
    class_color, reflectivity_color, reflectivity_legend, Color, ColorTable, ColorTableCache,
    LegendEntry, NOT_SCANNED_COLOR, NO_ECHO_COLOR,
};
pub use mapping::{CanvasMapper, GeoProbe, RenderView, WGS84};
pub use raster::{RadarRenderer, Raster, RenderKey};
pub use render_cache::{CacheStats, RenderCache, DEFAULT_CAPACITY, DEFAULT_TTL};
