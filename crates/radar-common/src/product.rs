//! Radar product descriptors.
//!
//! A product descriptor carries everything the renderer needs to place and
//! decode one radar raster: the native CRS, the pixel-to-coordinate affine
//! transform, raster dimensions, the raw byte array and its decoding scale.
//! Loading and decompression are collaborator concerns.

use crate::{AffineTransform, DataScale, Extent, RadarError, RadarResult};
use serde::{Deserialize, Serialize};

/// Kind of quantity a product measures, selecting the color treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Radar reflectivity in dBZ.
    #[serde(rename = "REFLECTIVITY")]
    Reflectivity,
    /// Hydrometeor classification.
    #[serde(rename = "hclass")]
    HydrometeorClass,
}

/// A single loaded radar product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDescriptor {
    /// Native CRS identifier: a registry id like "EPSG:3067" or a raw
    /// proj4 definition string.
    #[serde(rename = "projectionRef")]
    pub projection: String,
    #[serde(rename = "affineTransform")]
    pub affine: AffineTransform,
    pub width: usize,
    pub height: usize,
    /// Raw raster bytes, row-major, one byte per cell.
    #[serde(skip)]
    pub data: Vec<u8>,
    #[serde(rename = "dataType")]
    pub data_type: DataType,
    #[serde(rename = "dataScale")]
    pub scale: DataScale,
    /// Display unit, e.g. "dBZ".
    #[serde(rename = "dataUnit", default)]
    pub unit: Option<String>,
}

impl ProductDescriptor {
    /// Validate raster dimensions against the data length.
    pub fn validate(&self) -> RadarResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RadarError::InvalidProduct(format!(
                "zero raster dimension: {}x{}",
                self.width, self.height
            )));
        }
        if self.data.len() != self.width * self.height {
            return Err(RadarError::InvalidProduct(format!(
                "data length {} does not match {}x{} raster",
                self.data.len(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    /// Native extent spanned by this product's raster.
    pub fn native_extent(&self) -> Extent {
        self.affine.extent(self.width, self.height)
    }

    /// Raw byte at a raster pixel, or None when out of bounds.
    #[inline]
    pub fn value_at(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }
}
