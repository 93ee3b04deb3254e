use crate::Aabb;

/// A structure-of-arrays point cloud.
///
/// Positions are `f64` so that georeferenced coordinates (easting/northing in
/// the millions) keep sub-millimetre resolution. Colors, when present, hold
/// one `f32` per channel in `[0, 1]`. Point order
/// is significant: every per-point output (classifications, labeled records)
/// is aligned index-for-index with the cloud it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub colors: Option<Colors>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Colors {
    pub r: Vec<f32>,
    pub g: Vec<f32>,
    pub b: Vec<f32>,
}

impl Colors {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            r: Vec::with_capacity(n),
            g: Vec::with_capacity(n),
            b: Vec::with_capacity(n),
        }
    }

    /// Every point painted with the same color.
    pub fn uniform(n: usize, rgb: [f32; 3]) -> Self {
        Self {
            r: vec![rgb[0]; n],
            g: vec![rgb[1]; n],
            b: vec![rgb[2]; n],
        }
    }

    pub fn push(&mut self, rgb: [f32; 3]) {
        self.r.push(rgb[0]);
        self.g.push(rgb[1]);
        self.b.push(rgb[2]);
    }

    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    pub fn get(&self, i: usize) -> [f32; 3] {
        [self.r[i], self.g[i], self.b[i]]
    }

    /// Color of point `i` as 8-bit channels.
    pub fn get_bytes(&self, i: usize) -> [u8; 3] {
        self.get(i).map(channel_to_byte)
    }

    pub fn push_bytes(&mut self, rgb: [u8; 3]) {
        self.push(rgb.map(|c| f32::from(c) / 255.0));
    }
}

/// Map a `[0, 1]` channel to a byte: `round(c * 255)`, clamped. NaN maps to 0.
pub fn channel_to_byte(c: f32) -> u8 {
    (c * 255.0).round().clamp(0.0, 255.0) as u8
}

impl PointCloud {
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            colors: None,
        }
    }

    pub fn from_xyz(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Self {
        assert_eq!(x.len(), y.len(), "x and y must have same length");
        assert_eq!(x.len(), z.len(), "x and z must have same length");

        Self {
            x,
            y,
            z,
            colors: None,
        }
    }

    pub fn from_points(points: &[[f64; 3]]) -> Self {
        let mut x = Vec::with_capacity(points.len());
        let mut y = Vec::with_capacity(points.len());
        let mut z = Vec::with_capacity(points.len());

        for p in points {
            x.push(p[0]);
            y.push(p[1]);
            z.push(p[2]);
        }

        Self::from_xyz(x, y, z)
    }

    /// Attach colors to the cloud.
    ///
    /// # Panics
    ///
    /// Panics if the color count differs from the point count.
    pub fn with_colors(mut self, colors: Colors) -> Self {
        assert_eq!(
            colors.len(),
            self.len(),
            "color count must match point count"
        );
        self.colors = Some(colors);
        self
    }

    pub fn len(&self) -> usize {
        debug_assert_eq!(self.x.len(), self.y.len());
        debug_assert_eq!(self.x.len(), self.z.len());
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_xyz(&self.x, &self.y, &self.z)
    }

    pub fn point(&self, i: usize) -> [f64; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }

    /// Color of point `i`, if the cloud carries colors.
    pub fn color(&self, i: usize) -> Option<[f32; 3]> {
        self.colors.as_ref().map(|c| c.get(i))
    }

    pub fn iter_points(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((x, y), z)| [*x, *y, *z])
    }

    /// Gather the points at `indices`, in the given order.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    pub fn select(&self, indices: &[usize]) -> Self {
        let mut x = Vec::with_capacity(indices.len());
        let mut y = Vec::with_capacity(indices.len());
        let mut z = Vec::with_capacity(indices.len());

        for &idx in indices {
            assert!(idx < self.len(), "index out of bounds in select");
            x.push(self.x[idx]);
            y.push(self.y[idx]);
            z.push(self.z[idx]);
        }

        let colors = self.colors.as_ref().map(|c| Colors {
            r: indices.iter().map(|&idx| c.r[idx]).collect(),
            g: indices.iter().map(|&idx| c.g[idx]).collect(),
            b: indices.iter().map(|&idx| c.b[idx]).collect(),
        });

        Self { x, y, z, colors }
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}
