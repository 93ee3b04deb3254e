use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain an extraction filter.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("failed to read extraction filter {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid extraction filter: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure to turn a geometry into points.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InterpolateError {
    #[error("entity type {kind} has no interpolation rule")]
    UnsupportedGeometry { kind: String },
    #[error("density must be finite and > 0, got {0}")]
    InvalidDensity(f64),
    #[error("{kind} entity has non-finite coordinates")]
    NonFiniteGeometry { kind: String },
}
