//! Oriented box vertex construction.
//!
//! Vertex order is fixed: in the box's local frame the footprint corners are
//! `(+dx/2, +dy/2)`, `(-dx/2, +dy/2)`, `(-dx/2, -dy/2)`, `(+dx/2, -dy/2)`,
//! i.e. counter-clockwise starting at the front-left corner. Rotation by the
//! heading preserves that winding. Sizes are used by magnitude.

use crate::types::{OrientedBox3D, Point2};

/// Local-frame corner signs in counter-clockwise order.
const CORNER_SIGNS: [(f64, f64); 4] = [(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)];

/// Ground-plane footprint corners, counter-clockwise.
///
/// # Example
///
/// ```
/// use detect3d_eval::geometry::bev_corners;
/// use detect3d_eval::types::OrientedBox3D;
///
/// let b = OrientedBox3D::new([0.0, 0.0, 0.0], [2.0, 2.0, 2.0], 0.0);
/// let corners = bev_corners(&b);
/// assert_eq!((corners[0].x, corners[0].y), (1.0, 1.0));
/// assert_eq!((corners[2].x, corners[2].y), (-1.0, -1.0));
/// ```
pub fn bev_corners(bbox: &OrientedBox3D) -> [Point2; 4] {
    let half_x = bbox.size[0].abs() / 2.0;
    let half_y = bbox.size[1].abs() / 2.0;
    let (sin, cos) = bbox.heading.sin_cos();
    let [cx, cy, _] = bbox.center;

    CORNER_SIGNS.map(|(sx, sy)| {
        let lx = sx * half_x;
        let ly = sy * half_y;
        Point2::new(cx + cos * lx - sin * ly, cy + sin * lx + cos * ly)
    })
}

/// All eight corners: the four bottom corners followed by the four top
/// corners, each in footprint order.
pub fn box_corners_3d(bbox: &OrientedBox3D) -> [[f64; 3]; 8] {
    let footprint = bev_corners(bbox);
    let (bottom, top) = bbox.z_range();

    let mut corners = [[0.0; 3]; 8];
    for (i, p) in footprint.iter().enumerate() {
        corners[i] = [p.x, p.y, bottom];
        corners[i + 4] = [p.x, p.y, top];
    }
    corners
}
