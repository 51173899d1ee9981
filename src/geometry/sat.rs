//! Separating axis theorem overlap test for convex polygons.

use crate::geometry::GEOMETRY_EPS;
use crate::types::Point2;

/// Whether two convex polygons overlap.
///
/// Every edge normal of both polygons is tried as a separating axis. The
/// polygons overlap iff no axis separates their projections. Touching
/// projections count as overlap; zero-length edges are skipped. An empty
/// polygon overlaps nothing.
///
/// # Example
///
/// ```
/// use detect3d_eval::geometry::{bev_corners, separating_axis_overlap};
/// use detect3d_eval::types::OrientedBox3D;
///
/// let a = OrientedBox3D::new([0.0, 0.0, 0.0], [2.0, 2.0, 2.0], 0.0);
/// let b = OrientedBox3D::new([1.5, 0.0, 0.0], [2.0, 2.0, 2.0], 0.7);
/// let c = OrientedBox3D::new([9.0, 0.0, 0.0], [2.0, 2.0, 2.0], 0.0);
/// assert!(separating_axis_overlap(&bev_corners(&a), &bev_corners(&b)));
/// assert!(!separating_axis_overlap(&bev_corners(&a), &bev_corners(&c)));
/// ```
pub fn separating_axis_overlap(a: &[Point2], b: &[Point2]) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }

    !edge_normals(a).chain(edge_normals(b)).any(|axis| {
        let (min_a, max_a) = project(a, axis);
        let (min_b, max_b) = project(b, axis);
        max_a < min_b || max_b < min_a
    })
}

/// Normals of every non-degenerate edge of the ring.
fn edge_normals(vertices: &[Point2]) -> impl Iterator<Item = Point2> + '_ {
    let n = vertices.len();
    (0..n).filter_map(move |i| {
        let edge = vertices[(i + 1) % n].sub(vertices[i]);
        if edge.dot(edge) <= GEOMETRY_EPS {
            None
        } else {
            Some(Point2::new(-edge.y, edge.x))
        }
    })
}

/// Interval covered by the polygon projected onto `axis`.
fn project(vertices: &[Point2], axis: Point2) -> (f64, f64) {
    vertices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        let d = p.dot(axis);
        (lo.min(d), hi.max(d))
    })
}
