//! Wall/other labeling of point clouds.
//!
//! [`ProximityLabeler`] classifies target points by their plan-view distance
//! to a reference mask; [`encode`] and [`decode`] move between
//! classifications, color-coded overlay clouds and the dense
//! `[x, y, z, r, g, b, label]` table used for training data.

#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod proximity;
pub mod sampling;

pub use codec::{classify_overlay, decode, encode, DecodedClouds, LabeledPointCloud, LabeledRecord};
pub use error::{CodecError, LabelError};
pub use proximity::{
    label_cloud, label_preview, label_preview_seeded, overlay_cloud, PreviewLabels,
    ProximityLabeler,
};
pub use sampling::{preview_sample_size, sample_indices};
