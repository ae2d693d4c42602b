//! Color resolution for decoded radar values.
//!
//! Raw raster bytes resolve to RGBA through the product's data scale. The
//! resolution for a whole scale is precomputed into a 256-entry table, and
//! tables are cached per (data type, scale) so repeated renders of the same
//! product kind pay nothing.

use radar_common::{DataScale, DataType, DataValue, HydrometeorClass, RadarResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// An RGBA color, straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

/// Translucent gray marking cells outside the scanned area.
pub const NOT_SCANNED_COLOR: Color = Color::new(211, 211, 211, 76);

/// Fully transparent: the beam scanned the cell and saw nothing.
pub const NO_ECHO_COLOR: Color = Color::transparent();

/// Discrete NOAA reflectivity scale, 5 dBZ buckets from -30 dBZ up.
/// Each entry is the lower threshold of its bucket.
const REFLECTIVITY_RAMP: [(f64, Color); 22] = [
    (-30.0, Color::opaque(208, 255, 255)),
    (-25.0, Color::opaque(198, 152, 189)),
    (-20.0, Color::opaque(154, 104, 155)),
    (-15.0, Color::opaque(95, 47, 99)),
    (-10.0, Color::opaque(205, 205, 155)),
    (-5.0, Color::opaque(155, 154, 106)),
    (0.0, Color::opaque(100, 101, 96)),
    (5.0, Color::opaque(12, 230, 231)),
    (10.0, Color::opaque(1, 161, 249)),
    (15.0, Color::opaque(0, 0, 238)),
    (20.0, Color::opaque(4, 252, 5)),
    (25.0, Color::opaque(0, 200, 6)),
    (30.0, Color::opaque(0, 141, 1)),
    (35.0, Color::opaque(250, 242, 0)),
    (40.0, Color::opaque(229, 188, 0)),
    (45.0, Color::opaque(255, 157, 7)),
    (50.0, Color::opaque(253, 0, 2)),
    (55.0, Color::opaque(215, 0, 0)),
    (60.0, Color::opaque(189, 1, 0)),
    (65.0, Color::opaque(253, 0, 246)),
    (70.0, Color::opaque(154, 86, 195)),
    (75.0, Color::opaque(248, 246, 247)),
];

/// Color for a reflectivity value: the bucket with the highest threshold
/// at or below the value, clamped to the last bucket. Values below the
/// first threshold carry no usable echo and render transparent.
pub fn reflectivity_color(dbz: f64) -> Color {
    let mut selected = None;
    for (threshold, color) in REFLECTIVITY_RAMP {
        if dbz >= threshold {
            selected = Some(color);
        } else {
            break;
        }
    }
    selected.unwrap_or(NO_ECHO_COLOR)
}

/// Fixed colors for hydrometeor classification products.
pub fn class_color(class: HydrometeorClass) -> Color {
    match class {
        HydrometeorClass::NonMet => Color::opaque(102, 102, 102),
        HydrometeorClass::Rain => Color::opaque(30, 110, 250),
        HydrometeorClass::WetSnow => Color::opaque(100, 230, 255),
        HydrometeorClass::DrySnow => Color::opaque(220, 245, 255),
        HydrometeorClass::Graupel => Color::opaque(255, 170, 40),
        HydrometeorClass::Hail => Color::opaque(255, 40, 40),
    }
}

/// Resolve one raw byte through a scale.
///
/// Surfaces `UnknownCategory` for unmapped categorical bytes; the render
/// path falls back to the not-scanned color instead (see [`ColorTable`]).
pub fn resolve_color(scale: &DataScale, raw: u8) -> RadarResult<Color> {
    Ok(match scale.decode(raw)? {
        DataValue::NoEcho => NO_ECHO_COLOR,
        DataValue::NotScanned => NOT_SCANNED_COLOR,
        DataValue::Number(value) => reflectivity_color(value),
        DataValue::Class(class) => class_color(class),
    })
}

/// One legend row for a discrete scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendEntry {
    pub start: f64,
    /// None for the open-ended last bucket.
    pub end: Option<f64>,
    pub color: Color,
}

/// Legend description of the reflectivity ramp, for scale UI rendering.
pub fn reflectivity_legend() -> Vec<LegendEntry> {
    REFLECTIVITY_RAMP
        .iter()
        .enumerate()
        .map(|(i, &(start, color))| LegendEntry {
            start,
            end: REFLECTIVITY_RAMP.get(i + 1).map(|&(next, _)| next),
            color,
        })
        .collect()
}

/// Precomputed raw byte → color table for one (data type, scale) pair.
#[derive(Debug, Clone)]
pub struct ColorTable([Color; 256]);

impl ColorTable {
    /// Build the full table. Categorical bytes without a mapping resolve to
    /// the not-scanned color and are reported once.
    pub fn build(scale: &DataScale) -> Self {
        let mut colors = [NOT_SCANNED_COLOR; 256];
        let mut unknown = 0u32;
        for (raw, slot) in colors.iter_mut().enumerate() {
            match resolve_color(scale, raw as u8) {
                Ok(color) => *slot = color,
                Err(_) => unknown += 1,
            }
        }
        if unknown > 0 {
            warn!(
                unknown_values = unknown,
                "categorical scale leaves raw values unmapped; rendering them as not-scanned"
            );
        }
        Self(colors)
    }

    #[inline]
    pub fn get(&self, raw: u8) -> Color {
        self.0[raw as usize]
    }
}

/// Value-identity of a scale, for partitioning cached color tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ScaleIdentity {
    Linear {
        step: u64,
        offset: u64,
        not_scanned: u8,
        no_echo: u8,
    },
    Categorical {
        mapping: Vec<(u8, HydrometeorClass)>,
        not_scanned: u8,
        no_echo: u8,
    },
}

/// Cache key derived from (data type, scale contents).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorTableKey {
    data_type: DataType,
    scale: ScaleIdentity,
}

impl ColorTableKey {
    pub fn new(data_type: DataType, scale: &DataScale) -> Self {
        let scale = match scale {
            DataScale::Linear(s) => ScaleIdentity::Linear {
                step: s.step.to_bits(),
                offset: s.offset.to_bits(),
                not_scanned: s.not_scanned,
                no_echo: s.no_echo,
            },
            DataScale::Categorical(s) => ScaleIdentity::Categorical {
                mapping: s.mapping.iter().map(|(k, v)| (*k, *v)).collect(),
                not_scanned: s.not_scanned,
                no_echo: s.no_echo,
            },
        };
        Self { data_type, scale }
    }
}

/// Color tables per scale identity, persisting across renders of the same
/// product type.
#[derive(Debug, Default)]
pub struct ColorTableCache {
    tables: HashMap<ColorTableKey, Arc<ColorTable>>,
}

impl ColorTableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the table for a scale, building it on first use.
    pub fn get_or_build(&mut self, data_type: DataType, scale: &DataScale) -> Arc<ColorTable> {
        self.tables
            .entry(ColorTableKey::new(data_type, scale))
            .or_insert_with(|| Arc::new(ColorTable::build(scale)))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radar_common::{CategoricalScale, LinearScale, RadarError};
    use std::collections::BTreeMap;

    fn reflectivity_scale() -> DataScale {
        DataScale::Linear(LinearScale {
            step: 0.5,
            offset: -32.0,
            not_scanned: 255,
            no_echo: 0,
        })
    }

    #[test]
    fn test_sentinel_colors_ignore_scale_parameters() {
        for (step, offset) in [(0.5, -32.0), (1.0, 0.0), (0.1, 100.0)] {
            let scale = DataScale::Linear(LinearScale {
                step,
                offset,
                not_scanned: 255,
                no_echo: 0,
            });
            assert_eq!(resolve_color(&scale, 0).unwrap(), NO_ECHO_COLOR);
            assert_eq!(resolve_color(&scale, 255).unwrap(), NOT_SCANNED_COLOR);
        }
    }

    #[test]
    fn test_reflectivity_bucket_selection() {
        // Exact thresholds select their own bucket.
        assert_eq!(reflectivity_color(-30.0), Color::opaque(208, 255, 255));
        assert_eq!(reflectivity_color(0.0), Color::opaque(100, 101, 96));
        assert_eq!(reflectivity_color(5.0), Color::opaque(12, 230, 231));
        // Values inside a bucket select the bucket below them.
        assert_eq!(reflectivity_color(7.3), Color::opaque(12, 230, 231));
        // Clamped to the last bucket.
        assert_eq!(reflectivity_color(120.0), Color::opaque(248, 246, 247));
        // Below the scale there is no echo to show.
        assert_eq!(reflectivity_color(-31.0), NO_ECHO_COLOR);
    }

    #[test]
    fn test_color_table_matches_pointwise_resolution() {
        let scale = reflectivity_scale();
        let table = ColorTable::build(&scale);
        for raw in 0..=255u8 {
            assert_eq!(table.get(raw), resolve_color(&scale, raw).unwrap());
        }
    }

    #[test]
    fn test_unmapped_category_falls_back_to_not_scanned() {
        let scale = DataScale::Categorical(CategoricalScale {
            mapping: BTreeMap::from([(4, HydrometeorClass::Rain)]),
            not_scanned: 0,
            no_echo: 1,
        });
        let table = ColorTable::build(&scale);
        assert_eq!(table.get(4), class_color(HydrometeorClass::Rain));
        assert_eq!(table.get(5), NOT_SCANNED_COLOR);
        // The standalone resolver still surfaces the data error.
        assert!(matches!(
            resolve_color(&scale, 5),
            Err(RadarError::UnknownCategory { value: 5 })
        ));
    }

    #[test]
    fn test_table_cache_reuses_by_scale_identity() {
        let mut cache = ColorTableCache::new();
        let a = cache.get_or_build(DataType::Reflectivity, &reflectivity_scale());
        let b = cache.get_or_build(DataType::Reflectivity, &reflectivity_scale());
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        let other = DataScale::Linear(LinearScale {
            step: 1.0,
            offset: 0.0,
            not_scanned: 255,
            no_echo: 0,
        });
        let c = cache.get_or_build(DataType::Reflectivity, &other);
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_legend_covers_ramp_with_open_end() {
        let legend = reflectivity_legend();
        assert_eq!(legend.len(), 22);
        assert_eq!(legend[0].start, -30.0);
        assert_eq!(legend[0].end, Some(-25.0));
        assert_eq!(legend.last().unwrap().end, None);
    }
}
