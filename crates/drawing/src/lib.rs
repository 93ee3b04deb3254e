//! Wall geometry for mask building.
//!
//! A [`Drawing`] holds the model-space entities of a vector drawing. An
//! [`ExtractionFilter`] selects the wall entities by layer, entity type and
//! line type, [`interpolate`] turns each selected curve into evenly spaced
//! points and [`build_reference_mask`] gathers them into one reference cloud.

#![forbid(unsafe_code)]

pub mod entity;
pub mod error;
pub mod extract;
pub mod filter;
pub mod interpolate;
pub mod mask;
pub mod stats;

pub use entity::{Drawing, DrawingEntity, Geometry};
pub use error::{FilterError, InterpolateError};
pub use extract::{extract, EntityGroup, ExtractedEntities};
pub use filter::ExtractionFilter;
pub use interpolate::{interpolate, interpolate_arc, interpolate_line, interpolate_polyline};
pub use mask::{build_reference_mask, ReferenceMask};
pub use stats::DrawingStats;
