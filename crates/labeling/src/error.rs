use thiserror::Error;

/// Invalid labeling parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LabelError {
    #[error("distance threshold must be finite and >= 0, got {0}")]
    InvalidThreshold(f64),
    #[error("sample rate must be within [0, 1], got {0}")]
    InvalidSampleRate(f64),
    #[error("expected one classification per point: {points} points, {classes} classes")]
    LengthMismatch { points: usize, classes: usize },
}

/// Failure to move between classifications and labeled records.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    #[error("point count mismatch: {expected} points, {actual} labels")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("foreground and background share the code {0}")]
    AmbiguousCodes(i32),
    #[error("overlay cloud carries no colors")]
    MissingColors,
    #[error("row {row} has {found} columns, expected 7")]
    BadRowWidth { row: usize, found: usize },
    #[error("row {row}: column {column} holds {value}, expected an integer in {min}..={max}")]
    BadCell {
        row: usize,
        column: usize,
        value: f64,
        min: i64,
        max: i64,
    },
}
