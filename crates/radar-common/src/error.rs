//! Error types for the radar rendering crates.

use thiserror::Error;

/// Result type alias using RadarError.
pub type RadarResult<T> = Result<T, RadarError>;

/// Primary error type for reprojection and rendering operations.
#[derive(Debug, Error)]
pub enum RadarError {
    // === Projection errors ===
    #[error("Unknown projection: {0}")]
    UnknownProjection(String),

    #[error("Projection error: {0}")]
    ProjectionError(String),

    // === Data errors ===
    #[error("Unknown category value {value} for categorical scale")]
    UnknownCategory { value: u8 },

    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    // === Rendering errors ===
    #[error("Rendering failed: {0}")]
    RenderError(String),
}
