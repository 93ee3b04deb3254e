//! Wall labeling of scanned point clouds from 2D vector floor plans.
//!
//! The pipeline runs drawing -> [`drawing::extract`] ->
//! [`drawing::build_reference_mask`] -> [`labeling::label_cloud`] ->
//! [`labeling::encode`]; [`io`] reads and writes every file involved.

#![forbid(unsafe_code)]

pub use wallmask_core as model;
pub use wallmask_drawing as drawing;
pub use wallmask_io as io;
pub use wallmask_labeling as labeling;
pub use wallmask_spatial as spatial;

pub use wallmask_core::{Classification, LabelCodes, PointCloud};
