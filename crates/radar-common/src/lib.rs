//! Common types shared across the radar rendering crates.

pub mod affine;
pub mod error;
pub mod extent;
pub mod product;
pub mod scale;

pub use affine::AffineTransform;
pub use error::{RadarError, RadarResult};
pub use extent::Extent;
pub use product::{DataType, ProductDescriptor};
pub use scale::{CategoricalScale, DataScale, DataValue, HydrometeorClass, LinearScale};
