//! Data scales: decoding raw raster bytes into physical or categorical values.

use crate::{RadarError, RadarResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Linear scale: `value = offset + raw * step`, with reserved sentinel bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub step: f64,
    pub offset: f64,
    #[serde(rename = "notScanned")]
    pub not_scanned: u8,
    #[serde(rename = "noEcho")]
    pub no_echo: u8,
}

/// Hydrometeor classification categories carried by hclass products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HydrometeorClass {
    NonMet,
    Rain,
    WetSnow,
    DrySnow,
    Graupel,
    Hail,
}

/// Categorical scale: an explicit raw byte to category mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalScale {
    pub mapping: BTreeMap<u8, HydrometeorClass>,
    #[serde(rename = "notScanned")]
    pub not_scanned: u8,
    #[serde(rename = "noEcho")]
    pub no_echo: u8,
}

/// Decoding rule for a product's raw raster bytes.
///
/// Sentinel raw values (`no_echo`, `not_scanned`) never pass through the
/// linear formula or the categorical mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DataScale {
    Linear(LinearScale),
    Categorical(CategoricalScale),
}

/// A decoded raster sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DataValue {
    /// The beam covered this cell and measured nothing.
    NoEcho,
    /// The cell is outside the scanned area.
    NotScanned,
    /// A physical value on a linear scale (e.g. dBZ for reflectivity).
    Number(f64),
    /// A category from a categorical scale.
    Class(HydrometeorClass),
}

impl DataScale {
    /// Decode a raw raster byte.
    ///
    /// Returns `UnknownCategory` when a categorical scale has no mapping for
    /// a non-sentinel byte.
    pub fn decode(&self, raw: u8) -> RadarResult<DataValue> {
        match self {
            DataScale::Linear(scale) => {
                if raw == scale.no_echo {
                    Ok(DataValue::NoEcho)
                } else if raw == scale.not_scanned {
                    Ok(DataValue::NotScanned)
                } else {
                    Ok(DataValue::Number(scale.offset + raw as f64 * scale.step))
                }
            }
            DataScale::Categorical(scale) => {
                if raw == scale.no_echo {
                    Ok(DataValue::NoEcho)
                } else if raw == scale.not_scanned {
                    Ok(DataValue::NotScanned)
                } else {
                    scale
                        .mapping
                        .get(&raw)
                        .map(|class| DataValue::Class(*class))
                        .ok_or(RadarError::UnknownCategory { value: raw })
                }
            }
        }
    }

    pub fn no_echo(&self) -> u8 {
        match self {
            DataScale::Linear(s) => s.no_echo,
            DataScale::Categorical(s) => s.no_echo,
        }
    }

    pub fn not_scanned(&self) -> u8 {
        match self {
            DataScale::Linear(s) => s.not_scanned,
            DataScale::Categorical(s) => s.not_scanned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reflectivity_scale() -> DataScale {
        DataScale::Linear(LinearScale {
            step: 0.5,
            offset: -32.0,
            not_scanned: 255,
            no_echo: 0,
        })
    }

    fn hclass_scale() -> DataScale {
        let mapping = BTreeMap::from([
            (2, HydrometeorClass::NonMet),
            (4, HydrometeorClass::Rain),
            (6, HydrometeorClass::WetSnow),
            (8, HydrometeorClass::DrySnow),
            (10, HydrometeorClass::Graupel),
            (12, HydrometeorClass::Hail),
        ]);
        DataScale::Categorical(CategoricalScale {
            mapping,
            not_scanned: 0,
            no_echo: 1,
        })
    }

    #[test]
    fn test_linear_decode() {
        let scale = reflectivity_scale();
        assert_eq!(scale.decode(0).unwrap(), DataValue::NoEcho);
        assert_eq!(scale.decode(255).unwrap(), DataValue::NotScanned);
        assert_eq!(scale.decode(64).unwrap(), DataValue::Number(0.0));
        assert_eq!(scale.decode(100).unwrap(), DataValue::Number(18.0));
    }

    #[test]
    fn test_sentinels_bypass_formula() {
        // no_echo of 0 would otherwise decode to offset itself
        let scale = reflectivity_scale();
        assert_ne!(scale.decode(0).unwrap(), DataValue::Number(-32.0));
    }

    #[test]
    fn test_categorical_decode() {
        let scale = hclass_scale();
        assert_eq!(scale.decode(0).unwrap(), DataValue::NotScanned);
        assert_eq!(scale.decode(1).unwrap(), DataValue::NoEcho);
        assert_eq!(
            scale.decode(4).unwrap(),
            DataValue::Class(HydrometeorClass::Rain)
        );
        assert_eq!(
            scale.decode(12).unwrap(),
            DataValue::Class(HydrometeorClass::Hail)
        );
    }

    #[test]
    fn test_unknown_category_is_an_error() {
        let scale = hclass_scale();
        match scale.decode(7) {
            Err(RadarError::UnknownCategory { value }) => assert_eq!(value, 7),
            other => panic!("expected UnknownCategory, got {:?}", other),
        }
    }

    #[test]
    fn test_scale_json_round_trip() {
        let scale = reflectivity_scale();
        let json = serde_json::to_string(&scale).unwrap();
        let parsed: DataScale = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, scale);
    }
}
