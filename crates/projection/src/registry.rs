//! Registry of named coordinate reference system definitions.

use proj4rs::Proj;
use radar_common::{RadarError, RadarResult};
use std::collections::HashMap;

/// Maps CRS identifiers to proj4 definition strings.
///
/// Identifiers are opaque; anything starting with `+proj` is treated as a raw
/// definition and resolved directly. Products may also carry definitions not
/// known here, registered by the loading collaborator via [`register`].
///
/// [`register`]: ProjectionRegistry::register
#[derive(Debug, Clone)]
pub struct ProjectionRegistry {
    definitions: HashMap<String, String>,
}

/// WGS84 geographic coordinates.
pub const EPSG_4326: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// Web Mercator, the display projection of the map widget.
pub const EPSG_3857: &str =
    "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 \
     +units=m +nadgrids=@null +no_defs";

/// ETRS-TM35FIN, the native CRS of FMI radar composites.
pub const EPSG_3067: &str =
    "+proj=utm +zone=35 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs";

impl ProjectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
        }
    }

    /// Create a registry seeded with the well-known CRSs.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("EPSG:4326", EPSG_4326);
        registry.register("EPSG:3857", EPSG_3857);
        registry.register("EPSG:3067", EPSG_3067);
        registry
    }

    /// Register a CRS definition under an identifier.
    pub fn register(&mut self, id: impl Into<String>, definition: impl Into<String>) {
        self.definitions.insert(id.into(), definition.into());
    }

    /// Resolve an identifier to a compiled projection.
    pub fn resolve(&self, id: &str) -> RadarResult<Proj> {
        let definition = if id.trim_start().starts_with("+proj") {
            id
        } else {
            self.definitions
                .get(id)
                .map(String::as_str)
                .ok_or_else(|| RadarError::UnknownProjection(id.to_string()))?
        };

        Proj::from_proj_string(definition)
            .map_err(|e| RadarError::ProjectionError(format!("{id}: {e}")))
    }

    /// Whether an identifier can be resolved without compiling it.
    pub fn knows(&self, id: &str) -> bool {
        id.trim_start().starts_with("+proj") || self.definitions.contains_key(id)
    }
}

impl Default for ProjectionRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
