use thiserror::Error;

/// Malformed top-level input, reported before any placement is attempted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("envelope must have positive, finite dimensions (got {width} x {height})")]
    InvalidEnvelope { width: f32, height: f32 },
    #[error("room footprint must have positive, finite dimensions (got {width} x {depth})")]
    InvalidFootprint { width: f32, depth: f32 },
    #[error("corridor width must be positive and finite (got {0})")]
    InvalidCorridorWidth(f32),
    #[error("invalid layout configuration: {0}")]
    InvalidConfig(String),
}
