use crate::{Geometry, InterpolateError};
use nalgebra::{Point3, Vector3};

/// `count` parameters uniformly spaced on `[0, 1]`, both ends included.
///
/// A single sample sits at 0; zero samples yield nothing.
fn unit_steps(count: usize) -> impl Iterator<Item = f64> {
    let denom = count.saturating_sub(1).max(1) as f64;
    (0..count).map(move |i| i as f64 / denom)
}

fn sample_count(length: f64, density: f64) -> usize {
    // `as` saturates; callers have already rejected non-finite input
    (length * density).floor() as usize
}

/// Sample a straight segment at `density` points per unit length.
///
/// Yields `floor(length * density)` points from `start` to `end`, both
/// endpoints included once at least two points are produced. Segments too
/// short for a single point contribute nothing.
pub fn interpolate_line(start: &Point3<f64>, end: &Point3<f64>, density: f64) -> Vec<Point3<f64>> {
    let delta = end - start;
    let count = sample_count(delta.norm(), density);
    unit_steps(count).map(|t| start + delta * t).collect()
}

/// Sample every consecutive vertex pair of a polyline and concatenate.
///
/// A vertex shared by two segments is emitted by both.
pub fn interpolate_polyline(vertices: &[Point3<f64>], density: f64) -> Vec<Point3<f64>> {
    vertices
        .windows(2)
        .flat_map(|pair| interpolate_line(&pair[0], &pair[1], density))
        .collect()
}

/// Sample a counter-clockwise arc, angles in degrees.
///
/// The sweep runs from `start_angle` to `end_angle`, wrapping past 360 when
/// the end is smaller than the start. The point count is
/// `floor(arc_length * density)`, spaced evenly in angle.
pub fn interpolate_arc(
    center: &Point3<f64>,
    radius: f64,
    start_angle: f64,
    end_angle: f64,
    density: f64,
) -> Vec<Point3<f64>> {
    let mut sweep = end_angle - start_angle;
    if sweep < 0.0 {
        sweep += 360.0;
    }
    let start = start_angle.to_radians();
    let sweep = sweep.to_radians();
    let count = sample_count(sweep * radius.abs(), density);

    unit_steps(count)
        .map(|t| {
            let angle = start + sweep * t;
            center + Vector3::new(radius * angle.cos(), radius * angle.sin(), 0.0)
        })
        .collect()
}

fn all_finite<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> bool {
    points
        .into_iter()
        .all(|p| p.coords.iter().all(|v| v.is_finite()))
}

/// Turn a geometry into an ordered point sequence.
///
/// # Errors
///
/// - [`InterpolateError::InvalidDensity`] unless `density` is finite and
///   positive.
/// - [`InterpolateError::NonFiniteGeometry`] if a coordinate, radius or
///   angle is NaN or infinite.
/// - [`InterpolateError::UnsupportedGeometry`] for kinds without an
///   interpolation rule.
pub fn interpolate(geometry: &Geometry, density: f64) -> Result<Vec<Point3<f64>>, InterpolateError> {
    if !density.is_finite() || density <= 0.0 {
        return Err(InterpolateError::InvalidDensity(density));
    }

    let non_finite = || InterpolateError::NonFiniteGeometry {
        kind: geometry.type_name().to_string(),
    };

    match geometry {
        Geometry::Line { start, end } => {
            if !all_finite([start, end]) {
                return Err(non_finite());
            }
            Ok(interpolate_line(start, end, density))
        }
        Geometry::Polyline { vertices } | Geometry::VertexPolyline { vertices } => {
            if !all_finite(vertices) {
                return Err(non_finite());
            }
            Ok(interpolate_polyline(vertices, density))
        }
        Geometry::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        } => {
            let params_finite =
                radius.is_finite() && start_angle.is_finite() && end_angle.is_finite();
            if !params_finite || !all_finite([center]) {
                return Err(non_finite());
            }
            Ok(interpolate_arc(center, *radius, *start_angle, *end_angle, density))
        }
        Geometry::Unsupported { kind } => {
            Err(InterpolateError::UnsupportedGeometry { kind: kind.clone() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    #[test]
    fn three_unit_line_at_density_two() {
        let pts = interpolate_line(&p(0.0, 0.0, 0.0), &p(3.0, 0.0, 0.0), 2.0);
        assert_eq!(pts.len(), 6);
        assert_eq!(pts[0], p(0.0, 0.0, 0.0));
        assert_eq!(pts[5], p(3.0, 0.0, 0.0));
        for w in pts.windows(2) {
            assert!((w[1].x - w[0].x - 0.6).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_length_line_is_empty() {
        let a = p(1.0, 2.0, 3.0);
        assert!(interpolate_line(&a, &a, 100.0).is_empty());
    }

    #[test]
    fn single_sample_sits_at_start() {
        // length 1.5 at density 1 -> one point
        let pts = interpolate_line(&p(1.0, 1.0, 0.0), &p(2.5, 1.0, 0.0), 1.0);
        assert_eq!(pts, vec![p(1.0, 1.0, 0.0)]);
    }

    #[test]
    fn line_keeps_height() {
        let pts = interpolate_line(&p(0.0, 0.0, 2.0), &p(0.0, 1.0, 4.0), 10.0);
        assert!((pts[0].z - 2.0).abs() < 1e-12);
        assert!((pts.last().unwrap().z - 4.0).abs() < 1e-12);
    }

    #[test]
    fn polyline_does_not_dedupe_shared_vertices() {
        let vertices = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)];
        let pts = interpolate_polyline(&vertices, 3.0);
        assert_eq!(pts.len(), 6);
        assert_eq!(pts[2], p(1.0, 0.0, 0.0));
        assert_eq!(pts[3], p(1.0, 0.0, 0.0));
    }

    #[test]
    fn polyline_with_one_vertex_is_empty() {
        assert!(interpolate_polyline(&[p(0.0, 0.0, 0.0)], 10.0).is_empty());
        assert!(interpolate_polyline(&[], 10.0).is_empty());
    }

    #[test]
    fn quarter_arc_lies_on_circle() {
        let center = p(1.0, 1.0, 0.5);
        let pts = interpolate_arc(&center, 2.0, 0.0, 90.0, 10.0);
        // length = pi, floor(pi * 10) = 31
        assert_eq!(pts.len(), 31);
        for q in &pts {
            let r = ((q.x - 1.0).powi(2) + (q.y - 1.0).powi(2)).sqrt();
            assert!((r - 2.0).abs() < 1e-9);
            assert_eq!(q.z, 0.5);
        }
        assert!((pts[0].x - 3.0).abs() < 1e-9);
        assert!((pts[30].y - 3.0).abs() < 1e-9);
    }

    #[test]
    fn arc_wraps_through_zero() {
        let pts = interpolate_arc(&p(0.0, 0.0, 0.0), 1.0, 270.0, 90.0, 10.0);
        // 180 degree sweep through angle 0
        assert_eq!(pts.len(), 31);
        let mid = pts[15];
        assert!((mid.x - 1.0).abs() < 1e-9);
        assert!(mid.y.abs() < 1e-9);
    }

    #[test]
    fn unsupported_kind_is_signalled() {
        let geometry = Geometry::Unsupported {
            kind: "SPLINE".to_string(),
        };
        assert_eq!(
            interpolate(&geometry, 10.0),
            Err(InterpolateError::UnsupportedGeometry {
                kind: "SPLINE".to_string()
            })
        );
    }

    #[test]
    fn density_must_be_positive() {
        let geometry = Geometry::Line {
            start: p(0.0, 0.0, 0.0),
            end: p(1.0, 0.0, 0.0),
        };
        for density in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                interpolate(&geometry, density),
                Err(InterpolateError::InvalidDensity(_))
            ));
        }
    }

    #[test]
    fn non_finite_geometry_is_rejected() {
        let geometry = Geometry::Polyline {
            vertices: vec![p(0.0, 0.0, 0.0), p(f64::INFINITY, 0.0, 0.0)],
        };
        assert_eq!(
            interpolate(&geometry, 1.0),
            Err(InterpolateError::NonFiniteGeometry {
                kind: "LWPOLYLINE".to_string()
            })
        );
    }

    proptest! {
        #[test]
        fn line_count_is_floor_of_length_times_density(
            a in (-100.0f64..100.0, -100.0f64..100.0, -10.0f64..10.0),
            b in (-100.0f64..100.0, -100.0f64..100.0, -10.0f64..10.0),
            density in 0.01f64..20.0,
        ) {
            let start = p(a.0, a.1, a.2);
            let end = p(b.0, b.1, b.2);
            let expected = ((end - start).norm() * density).floor() as usize;
            prop_assert_eq!(interpolate_line(&start, &end, density).len(), expected);
        }

        #[test]
        fn polyline_is_concatenation_of_segments(
            verts in prop::collection::vec((-50.0f64..50.0, -50.0f64..50.0, -5.0f64..5.0), 0..8),
            density in 0.1f64..5.0,
        ) {
            let vertices: Vec<Point3<f64>> = verts.iter().map(|v| p(v.0, v.1, v.2)).collect();
            let mut expected = Vec::new();
            for pair in vertices.windows(2) {
                expected.extend(interpolate_line(&pair[0], &pair[1], density));
            }
            prop_assert_eq!(interpolate_polyline(&vertices, density), expected);
        }
    }
}
