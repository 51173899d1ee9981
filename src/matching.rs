//! Matching of predicted boxes against ground-truth positives.

use crate::metrics::iou::{iou_3d, BoxIou};
use crate::types::OrientedBox3D;

/// Best ground-truth match for one prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    /// Index of the matched box in the ground-truth slice
    pub target_index: usize,
    pub iou: BoxIou,
}

/// Matching outcome of one prediction across all thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionMatch {
    pub best: Option<Match>,
    /// `hits[i]` is true when the prediction is a true positive at
    /// threshold `i`
    pub hits: Vec<bool>,
}

impl PredictionMatch {
    /// Highest bird's-eye-view IoU reached, `0.0` without any positive target.
    pub fn best_iou_2d(&self) -> f64 {
        self.best.map_or(0.0, |m| m.iou.iou_2d)
    }
}

/// Find the positive ground-truth box with the highest bird's-eye-view IoU.
///
/// Only boxes labelled `1` take part. Ties keep the earliest box. Returns
/// `None` when there is no positive ground truth.
///
/// # Example
///
/// ```
/// use detect3d_eval::matching::best_match;
/// use detect3d_eval::types::OrientedBox3D;
///
/// let pred = OrientedBox3D::new([0.0; 3], [2.0; 3], 0.0);
/// let targets = vec![
///     OrientedBox3D::new([0.0; 3], [2.0; 3], 0.0).with_label(0),
///     OrientedBox3D::new([1.0, 0.0, 0.0], [2.0; 3], 0.0).with_label(1),
/// ];
/// let m = best_match(&pred, &targets).unwrap();
/// assert_eq!(m.target_index, 1);
/// ```
pub fn best_match(prediction: &OrientedBox3D, ground_truth: &[OrientedBox3D]) -> Option<Match> {
    let mut best: Option<Match> = None;

    for (target_index, target) in ground_truth.iter().enumerate() {
        if !target.is_positive() {
            continue;
        }

        let iou = iou_3d(prediction, target);
        if best.map_or(true, |b| iou.iou_2d > b.iou.iou_2d) {
            best = Some(Match { target_index, iou });
        }
    }

    best
}

/// Per-threshold true-positive flags: `best_iou_2d` must strictly exceed
/// the threshold.
pub fn threshold_hits(best_iou_2d: f64, iou_thresholds: &[f64]) -> Vec<bool> {
    iou_thresholds.iter().map(|&t| best_iou_2d > t).collect()
}

/// Match every prediction against the positive ground truth, in order.
///
/// Several predictions may hit the same ground-truth box; each is judged
/// only by its own best overlap.
pub fn match_predictions(
    predictions: &[OrientedBox3D],
    ground_truth: &[OrientedBox3D],
    iou_thresholds: &[f64],
) -> Vec<PredictionMatch> {
    predictions
        .iter()
        .map(|prediction| {
            let best = best_match(prediction, ground_truth);
            let hits = threshold_hits(best.map_or(0.0, |m| m.iou.iou_2d), iou_thresholds);
            PredictionMatch { best, hits }
        })
        .collect()
}

/// Number of ground-truth boxes labelled as positive.
pub fn count_positives(ground_truth: &[OrientedBox3D]) -> usize {
    ground_truth.iter().filter(|b| b.is_positive()).count()
}
