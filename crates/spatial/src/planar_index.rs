use hashbrown::HashSet;
use kiddo::float::distance::SquaredEuclidean;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use wallmask_core::PointCloud;

/// A static kd-tree over the XY projection of a point set.
///
/// Built on kiddo's `ImmutableKdTree`, which is constructed once in a
/// cache-friendly layout and never modified. Height is dropped when the tree
/// is built, so every query answers "how close is this point in plan view".
///
/// Points that project onto the same XY position are stored once, and
/// non-finite points are not stored at all.
#[derive(Debug, Clone)]
pub struct PlanarIndex {
    tree: Option<ImmutableKdTree<f64, u32, 2, 32>>,
    len: usize,
}

impl PlanarIndex {
    /// Build an index from the XY coordinates of every point in `cloud`.
    pub fn build(cloud: &PointCloud) -> Self {
        let xy: Vec<[f64; 2]> = (0..cloud.len())
            .map(|i| [cloud.x[i], cloud.y[i]])
            .collect();
        Self::from_xy(&xy)
    }

    pub fn from_xy(xy: &[[f64; 2]]) -> Self {
        let mut seen: HashSet<(u64, u64)> = HashSet::with_capacity(xy.len());
        let mut points = Vec::with_capacity(xy.len());

        for p in xy {
            if !p[0].is_finite() || !p[1].is_finite() {
                continue;
            }
            // +0.0 and -0.0 are the same position
            let key = ((p[0] + 0.0).to_bits(), (p[1] + 0.0).to_bits());
            if seen.insert(key) {
                points.push(*p);
            }
        }

        let tree = if points.is_empty() {
            None
        } else {
            Some(ImmutableKdTree::new_from_slice(&points))
        };

        Self {
            tree,
            len: points.len(),
        }
    }

    /// Number of distinct XY positions stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether any stored position lies within `radius` of `query`,
    /// boundary included.
    ///
    /// A negative or NaN radius never matches; a radius of zero matches only
    /// an exact hit.
    pub fn any_within(&self, query: &[f64; 2], radius: f64) -> bool {
        if radius.is_nan() || radius < 0.0 {
            return false;
        }
        if !query.iter().all(|v| v.is_finite()) {
            return false;
        }
        let Some(tree) = self.tree.as_ref() else {
            return false;
        };
        if radius.is_infinite() {
            return true;
        }

        // Compare squared distances so an exact boundary hit is not lost to
        // a square root.
        let nn = tree.nearest_one::<SquaredEuclidean>(query);
        nn.distance <= radius * radius
    }
}
