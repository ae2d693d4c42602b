//! Coordinate reference system transformations.
//!
//! Wraps proj4rs behind a small registry/converter API and provides the
//! geographic lookup table used to approximate per-pixel reprojection.

pub mod bridge;
pub mod lut;
pub mod registry;

pub use bridge::{converters, Converter};
pub use lut::{find_closest_index, GeoGridLut, LutKey};
pub use registry::ProjectionRegistry;
