/// Axis-aligned bounds of the finite points of a cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct Aabb {
    pub min: [f64; 3],
    pub max: [f64; 3],
    empty: bool,
}

impl Aabb {
    pub fn empty() -> Self {
        Self {
            min: [f64::INFINITY; 3],
            max: [f64::NEG_INFINITY; 3],
            empty: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn expand_with_point(&mut self, point: [f64; 3]) {
        if !point.iter().all(|v| v.is_finite()) {
            return;
        }

        if self.empty {
            self.min = point;
            self.max = point;
            self.empty = false;
            return;
        }

        for (axis, &val) in point.iter().enumerate() {
            self.min[axis] = self.min[axis].min(val);
            self.max[axis] = self.max[axis].max(val);
        }
    }

    /// Whether the XY footprints of the two boxes overlap once `self` is
    /// grown by `margin` on every side. Height is ignored.
    pub fn intersects_xy(&self, other: &Aabb, margin: f64) -> bool {
        if self.empty || other.empty {
            return false;
        }

        (0..2).all(|axis| {
            self.min[axis] - margin <= other.max[axis] && other.min[axis] <= self.max[axis] + margin
        })
    }

    pub fn from_xyz(x: &[f64], y: &[f64], z: &[f64]) -> Self {
        let n = x.len().min(y.len()).min(z.len());
        let mut aabb = Self::empty();
        for i in 0..n {
            aabb.expand_with_point([x[i], y[i], z[i]]);
        }
        aabb
    }
}
