#![forbid(unsafe_code)]

pub mod planar_index;

pub use planar_index::PlanarIndex;
