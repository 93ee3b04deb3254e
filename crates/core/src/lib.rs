#![forbid(unsafe_code)]

pub mod bbox;
pub mod cloud;
pub mod label;

pub use bbox::Aabb;
pub use cloud::{channel_to_byte, Colors, PointCloud};
pub use label::{count_foreground, Classification, LabelCodes, UNLABELED_COLOR, WALL_COLOR};
