//! File formats: point clouds (PLY, LAS), drawings (DXF) and the labeled
//! `.npy` table.

#![forbid(unsafe_code)]

pub mod dxf;
pub mod las;
pub mod npy;
pub mod ply;

pub use self::dxf::{parse_dxf, read_dxf};
pub use las::read_las;
pub use npy::{read_labeled_npy, read_npy_rows, write_labeled_npy, write_npy_rows};
pub use ply::{parse_ply, read_ply, write_ply, write_ply_binary};

use std::io;
use std::path::Path;
use wallmask_core::PointCloud;

/// Read a point cloud, choosing the format from the file extension.
pub fn read_cloud(path: impl AsRef<Path>) -> io::Result<PointCloud> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("ply") => read_ply(path),
        Some("las") => read_las(path),
        _ => Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("unsupported point cloud format: {}", path.display()),
        )),
    }
}
