use crate::{interpolate, ExtractedEntities, InterpolateError};
use std::collections::BTreeMap;
use wallmask_core::PointCloud;

/// Densely sampled wall geometry, the reference for proximity labeling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceMask {
    /// Interpolated points, grouped by entity type in extraction order.
    /// Carries no colors.
    pub points: PointCloud,
    /// Selected entities that produced (possibly zero) points.
    pub sampled_entities: usize,
    /// Selected entities skipped for lack of an interpolation rule, by kind.
    pub skipped: BTreeMap<String, usize>,
}

impl ReferenceMask {
    pub fn skipped_count(&self) -> usize {
        self.skipped.values().sum()
    }
}

/// Interpolate every extracted entity at `density` points per unit length
/// and gather the results into one reference point set.
///
/// Entities whose kind has no interpolation rule are logged and skipped;
/// every other interpolation failure aborts the build.
pub fn build_reference_mask(
    extracted: &ExtractedEntities<'_>,
    density: f64,
) -> Result<ReferenceMask, InterpolateError> {
    let mut mask = ReferenceMask::default();

    for group in extracted.groups() {
        let before = mask.points.len();

        for entity in &group.entities {
            match interpolate(&entity.geometry, density) {
                Ok(points) => {
                    for p in points {
                        mask.points.x.push(p.x);
                        mask.points.y.push(p.y);
                        mask.points.z.push(p.z);
                    }
                    mask.sampled_entities += 1;
                }
                Err(InterpolateError::UnsupportedGeometry { kind }) => {
                    log::warn!(
                        "skipping {kind} entity on layer {:?}: no interpolation rule",
                        entity.layer
                    );
                    *mask.skipped.entry(kind).or_default() += 1;
                }
                Err(e) => return Err(e),
            }
        }

        log::debug!(
            "{}: {} entities -> {} mask points",
            group.entity_type,
            group.entities.len(),
            mask.points.len() - before
        );
    }

    Ok(mask)
}
