//! Convex polygon clipping and intersection area.

use crate::geometry::sat::separating_axis_overlap;
use crate::geometry::GEOMETRY_EPS;
use crate::types::Point2;

/// Outcome of intersecting two ground-plane footprints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    /// Both footprints have positive area; the payload is the shared area,
    /// which is `0.0` for disjoint footprints.
    Overlap(f64),
    /// At least one footprint has zero area.
    Degenerate,
}

impl Intersection {
    /// Shared area, treating degenerate inputs as no overlap.
    pub fn area(self) -> f64 {
        match self {
            Intersection::Overlap(area) => area,
            Intersection::Degenerate => 0.0,
        }
    }
}

/// Signed shoelace area of a vertex ring; positive for counter-clockwise
/// winding.
pub fn polygon_area(vertices: &[Point2]) -> f64 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }

    let twice_area: f64 = (0..n)
        .map(|i| vertices[i].cross(vertices[(i + 1) % n]))
        .sum();
    twice_area / 2.0
}

/// Clip `subject` against every edge of the convex, counter-clockwise
/// `clip` polygon (Sutherland-Hodgman).
///
/// Points lying on a clip edge count as inside, so clipping a polygon against
/// itself returns it unchanged.
pub fn clip_polygon(subject: &[Point2], clip: &[Point2]) -> Vec<Point2> {
    let mut output = subject.to_vec();

    for i in 0..clip.len() {
        if output.is_empty() {
            break;
        }

        let a = clip[i];
        let edge = clip[(i + 1) % clip.len()].sub(a);
        let side = |p: Point2| edge.cross(p.sub(a));

        let input = std::mem::take(&mut output);
        for (j, &current) in input.iter().enumerate() {
            let previous = input[(j + input.len() - 1) % input.len()];
            let current_side = side(current);
            let previous_side = side(previous);

            if current_side >= 0.0 {
                if previous_side < 0.0 {
                    output.extend(crossing(previous, current, previous_side, current_side));
                }
                output.push(current);
            } else if previous_side >= 0.0 {
                output.extend(crossing(previous, current, previous_side, current_side));
            }
        }
    }

    output
}

/// Point where segment `p -> q` crosses the clip line, given the signed
/// distances of its endpoints. Near-parallel segments yield nothing.
fn crossing(p: Point2, q: Point2, p_side: f64, q_side: f64) -> Option<Point2> {
    let denom = p_side - q_side;
    if denom.abs() < GEOMETRY_EPS {
        return None;
    }

    let t = p_side / denom;
    Some(Point2::new(p.x + t * (q.x - p.x), p.y + t * (q.y - p.y)))
}

/// Return the ring in counter-clockwise order.
fn counter_clockwise(vertices: &[Point2]) -> Vec<Point2> {
    let mut ring = vertices.to_vec();
    if polygon_area(&ring) < 0.0 {
        ring.reverse();
    }
    ring
}

/// Intersection area of two convex polygons.
///
/// # Example
///
/// ```
/// use detect3d_eval::geometry::{bev_corners, intersection_area, Intersection};
/// use detect3d_eval::types::OrientedBox3D;
///
/// let a = OrientedBox3D::new([0.0, 0.0, 0.0], [2.0, 2.0, 2.0], 0.0);
/// let b = OrientedBox3D::new([1.0, 0.0, 0.0], [2.0, 2.0, 2.0], 0.0);
/// let area = intersection_area(&bev_corners(&a), &bev_corners(&b));
/// assert!((area.area() - 2.0).abs() < 1e-9);
/// ```
pub fn intersection_area(a: &[Point2], b: &[Point2]) -> Intersection {
    let area_a = polygon_area(a).abs();
    let area_b = polygon_area(b).abs();
    if area_a <= GEOMETRY_EPS || area_b <= GEOMETRY_EPS {
        return Intersection::Degenerate;
    }

    if !separating_axis_overlap(a, b) {
        return Intersection::Overlap(0.0);
    }

    let clipped = clip_polygon(&counter_clockwise(a), &counter_clockwise(b));
    let area = polygon_area(&clipped).abs();
    Intersection::Overlap(area.min(area_a).min(area_b))
}
