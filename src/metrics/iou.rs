//! Intersection over Union (IoU) for oriented 3D boxes.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geometry::{bev_corners, intersection_area, Intersection};
use crate::types::OrientedBox3D;

/// Volumetric and bird's-eye-view IoU of a box pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoxIou {
    pub iou_3d: f64,
    pub iou_2d: f64,
}

/// Calculate the 3D and bird's-eye-view IoU between two oriented boxes.
///
/// The footprint intersection comes from clipping the two ground-plane
/// rectangles; the 3D intersection additionally multiplies by the overlap
/// of the vertical extents. Degenerate or disjoint footprints, and boxes
/// with non-finite fields, give `0.0` for both ratios.
///
/// # Example
///
/// ```
/// use detect3d_eval::metrics::iou::iou_3d;
/// use detect3d_eval::types::OrientedBox3D;
///
/// let a = OrientedBox3D::new([0.0, 0.0, 0.0], [2.0, 2.0, 2.0], 0.0);
/// let b = OrientedBox3D::new([1.0, 0.0, 1.0], [2.0, 2.0, 2.0], 0.0);
/// let iou = iou_3d(&a, &b);
/// // footprint: 2 / (4 + 4 - 2), volume: 2 / (8 + 8 - 2)
/// assert!((iou.iou_2d - 1.0 / 3.0).abs() < 1e-9);
/// assert!((iou.iou_3d - 1.0 / 7.0).abs() < 1e-9);
/// ```
pub fn iou_3d(a: &OrientedBox3D, b: &OrientedBox3D) -> BoxIou {
    if !a.is_finite() || !b.is_finite() {
        return BoxIou::default();
    }

    let inter_area = match intersection_area(&bev_corners(a), &bev_corners(b)) {
        Intersection::Overlap(area) if area > 0.0 => area,
        _ => return BoxIou::default(),
    };

    let area_a = a.bev_area();
    let area_b = b.bev_area();
    let union_area = area_a + area_b - inter_area;
    let iou_2d = ratio(inter_area, union_area);

    let (bottom_a, top_a) = a.z_range();
    let (bottom_b, top_b) = b.z_range();
    let height_overlap = (top_a.min(top_b) - bottom_a.max(bottom_b)).max(0.0);
    let inter_volume = inter_area * height_overlap;
    let union_volume = a.volume() + b.volume() - inter_volume;
    let iou_3d = ratio(inter_volume, union_volume);

    BoxIou { iou_3d, iou_2d }
}

/// Clamped `intersection / union`, `0.0` for an empty union.
fn ratio(intersection: f64, union: f64) -> f64 {
    if union <= 0.0 {
        return 0.0;
    }
    let value = intersection / union;
    debug_assert!(
        (0.0..=1.0 + 1e-9).contains(&value),
        "IoU out of bounds: {intersection} / {union}"
    );
    value.clamp(0.0, 1.0)
}

/// Calculate the IoU matrix between two sets of boxes.
///
/// Rows are computed in parallel; `result[i][j]` is the IoU between
/// `boxes1[i]` and `boxes2[j]`.
///
/// # Example
///
/// ```
/// use detect3d_eval::metrics::iou::iou_matrix;
/// use detect3d_eval::types::OrientedBox3D;
///
/// let boxes1 = vec![OrientedBox3D::new([0.0; 3], [2.0; 3], 0.0)];
/// let boxes2 = vec![
///     OrientedBox3D::new([0.0; 3], [2.0; 3], 0.0),
///     OrientedBox3D::new([9.0, 0.0, 0.0], [2.0; 3], 0.0),
/// ];
/// let matrix = iou_matrix(&boxes1, &boxes2);
/// assert_eq!(matrix.len(), 1);
/// assert_eq!(matrix[0].len(), 2);
/// ```
pub fn iou_matrix(boxes1: &[OrientedBox3D], boxes2: &[OrientedBox3D]) -> Vec<Vec<BoxIou>> {
    boxes1
        .par_iter()
        .map(|b1| boxes2.iter().map(|b2| iou_3d(b1, b2)).collect())
        .collect()
}
