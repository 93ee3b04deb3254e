use std::io;
use std::path::Path;
use wallmask_core::{Colors, PointCloud};

/// Read positions, and RGB when the point format carries it.
///
/// LAS stores 16-bit channels, but many writers put 8-bit values in them; a
/// file whose channels never exceed 255 is scaled by 255, otherwise by 65535.
pub fn read_las(path: impl AsRef<Path>) -> io::Result<PointCloud> {
    let mut reader = las::Reader::from_path(path.as_ref())
        .map_err(|e| io::Error::other(format!("failed to open LAS file: {}", e)))?;

    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut z = Vec::new();
    let mut rgb: Vec<[u16; 3]> = Vec::new();
    let mut all_colored = true;

    for point_result in reader.points() {
        let point = point_result.map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to read LAS point: {}", e),
            )
        })?;
        x.push(point.x);
        y.push(point.y);
        z.push(point.z);
        match point.color {
            Some(c) if all_colored => rgb.push([c.red, c.green, c.blue]),
            _ => all_colored = false,
        }
    }

    let mut cloud = PointCloud::from_xyz(x, y, z);
    if all_colored && !cloud.is_empty() {
        let max = rgb.iter().flatten().copied().max().unwrap_or(0);
        let scale = if max <= 255 { 255.0 } else { 65535.0 };
        let mut colors = Colors::with_capacity(rgb.len());
        for c in &rgb {
            colors.push(c.map(|v| f32::from(v) / scale));
        }
        cloud = cloud.with_colors(colors);
    }

    log::debug!(
        "read {} LAS points ({})",
        cloud.len(),
        if cloud.colors.is_some() { "rgb" } else { "no color" }
    );
    Ok(cloud)
}
