use crate::{sample_indices, LabelError};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use wallmask_core::{Aabb, Classification, Colors, PointCloud};
use wallmask_spatial::PlanarIndex;

/// Clouds at least this large fan their queries out over rayon.
const PARALLEL_MIN_POINTS: usize = 50_000;

/// Classifies points by plan-view distance to a reference mask.
///
/// A point is [`Classification::Foreground`] when some mask point lies within
/// the distance threshold in the XY plane, boundary included. Height plays no
/// part: walls extend vertically, so a point anywhere above or below a wall
/// line is on the wall.
#[derive(Debug, Clone)]
pub struct ProximityLabeler {
    index: PlanarIndex,
    mask_bounds: Aabb,
    distance_threshold: f64,
}

impl ProximityLabeler {
    /// Index the XY projection of `mask`.
    ///
    /// # Errors
    ///
    /// [`LabelError::InvalidThreshold`] unless the threshold is finite and
    /// non-negative.
    pub fn new(mask: &PointCloud, distance_threshold: f64) -> Result<Self, LabelError> {
        if !distance_threshold.is_finite() || distance_threshold < 0.0 {
            return Err(LabelError::InvalidThreshold(distance_threshold));
        }
        let index = PlanarIndex::build(mask);
        if index.is_empty() {
            log::warn!("reference mask is empty, every point will be background");
        }
        Ok(Self {
            index,
            mask_bounds: mask.aabb(),
            distance_threshold,
        })
    }

    pub fn distance_threshold(&self) -> f64 {
        self.distance_threshold
    }

    /// Distinct XY positions in the mask.
    pub fn mask_positions(&self) -> usize {
        self.index.len()
    }

    /// Whether the plan-view bounds of `cloud` come within the threshold of
    /// the mask's bounds. False for an empty mask or cloud.
    pub fn overlaps(&self, cloud: &PointCloud) -> bool {
        self.mask_bounds
            .intersects_xy(&cloud.aabb(), self.distance_threshold)
    }

    fn warn_if_disjoint(&self, cloud: &PointCloud) {
        if !self.mask_bounds.is_empty() && !cloud.is_empty() && !self.overlaps(cloud) {
            log::warn!(
                "point cloud and wall mask do not overlap in plan view; \
                 check that the drawing and the scan share units and origin"
            );
        }
    }

    pub fn classify_point(&self, point: [f64; 3]) -> Classification {
        if self
            .index
            .any_within(&[point[0], point[1]], self.distance_threshold)
        {
            Classification::Foreground
        } else {
            Classification::Background
        }
    }

    /// One classification per point of `cloud`, in cloud order.
    pub fn classify(&self, cloud: &PointCloud) -> Vec<Classification> {
        let n = cloud.len();
        if n >= PARALLEL_MIN_POINTS {
            (0..n)
                .into_par_iter()
                .map(|i| self.classify_point(cloud.point(i)))
                .collect()
        } else {
            cloud.iter_points().map(|p| self.classify_point(p)).collect()
        }
    }

    /// Classifications for the points at `indices`, in index order.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    pub fn classify_indices(&self, cloud: &PointCloud, indices: &[usize]) -> Vec<Classification> {
        if indices.len() >= PARALLEL_MIN_POINTS {
            indices
                .par_iter()
                .map(|&i| self.classify_point(cloud.point(i)))
                .collect()
        } else {
            indices
                .iter()
                .map(|&i| self.classify_point(cloud.point(i)))
                .collect()
        }
    }
}

/// Label every point of `target` against `mask`.
pub fn label_cloud(
    target: &PointCloud,
    mask: &PointCloud,
    distance_threshold: f64,
) -> Result<Vec<Classification>, LabelError> {
    let labeler = ProximityLabeler::new(mask, distance_threshold)?;
    labeler.warn_if_disjoint(target);
    let classes = labeler.classify(target);
    log::debug!(
        "labeled {} points against {} mask positions",
        classes.len(),
        labeler.mask_positions()
    );
    Ok(classes)
}

/// Result of labeling a random subset of a cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewLabels {
    /// Sampled indices into the target cloud, ascending.
    pub indices: Vec<usize>,
    /// One classification per sampled index.
    pub classes: Vec<Classification>,
    /// The sampled points only, painted with overlay colors.
    pub cloud: PointCloud,
}

/// Label a random `sample_rate` share of `target` for quick inspection.
///
/// Uses a random (non-deterministic) seed. For reproducible results, use
/// [`label_preview_seeded`] instead.
pub fn label_preview(
    target: &PointCloud,
    mask: &PointCloud,
    distance_threshold: f64,
    sample_rate: f64,
) -> Result<PreviewLabels, LabelError> {
    let seed = rand::thread_rng().next_u64();
    label_preview_seeded(target, mask, distance_threshold, sample_rate, seed)
}

/// Label `round(sample_rate * N)` points of `target`, drawn without
/// replacement with a deterministic seed.
///
/// The returned cloud holds only the sampled points; it is not the full
/// cloud with gaps.
pub fn label_preview_seeded(
    target: &PointCloud,
    mask: &PointCloud,
    distance_threshold: f64,
    sample_rate: f64,
    seed: u64,
) -> Result<PreviewLabels, LabelError> {
    let labeler = ProximityLabeler::new(mask, distance_threshold)?;
    labeler.warn_if_disjoint(target);
    let mut rng = StdRng::seed_from_u64(seed);
    let indices = sample_indices(target.len(), sample_rate, &mut rng)?;
    let classes = labeler.classify_indices(target, &indices);
    let cloud = overlay_cloud(&target.select(&indices), &classes)?;

    Ok(PreviewLabels {
        indices,
        classes,
        cloud,
    })
}

/// A copy of `target` painted with the wall / unlabeled sentinel colors.
pub fn overlay_cloud(
    target: &PointCloud,
    classes: &[Classification],
) -> Result<PointCloud, LabelError> {
    if classes.len() != target.len() {
        return Err(LabelError::LengthMismatch {
            points: target.len(),
            classes: classes.len(),
        });
    }

    let mut colors = Colors::with_capacity(classes.len());
    for class in classes {
        colors.push(class.overlay_color());
    }

    Ok(PointCloud::from_xyz(target.x.clone(), target.y.clone(), target.z.clone()).with_colors(colors))
}
