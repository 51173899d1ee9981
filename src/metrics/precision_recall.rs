//! Precision and Recall calculation.

use crate::types::{PrSeries, PrecisionRecallPoint};

/// Container for precision and recall values.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecisionRecall {
    pub precision: f64,
    pub recall: f64,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

/// Calculate epsilon-guarded precision and recall from running totals.
///
/// `precision = TP / (predictions + epsilon)` and
/// `recall = TP / (targets + epsilon)`. False positives and false negatives
/// are derived as `predictions - TP` and `targets - TP`.
///
/// # Example
///
/// ```
/// use detect3d_eval::metrics::precision_recall::calculate_precision_recall;
///
/// let pr = calculate_precision_recall(8, 10, 11, 0.01);
/// assert!((pr.precision - 8.0 / 10.01).abs() < 1e-12);
/// assert_eq!(pr.false_positives, 2);
/// assert_eq!(pr.false_negatives, 3);
/// ```
pub fn calculate_precision_recall(
    true_positives: usize,
    num_predictions: usize,
    num_targets: usize,
    epsilon: f64,
) -> PrecisionRecall {
    PrecisionRecall {
        precision: true_positives as f64 / (num_predictions as f64 + epsilon),
        recall: true_positives as f64 / (num_targets as f64 + epsilon),
        true_positives,
        false_positives: num_predictions.saturating_sub(true_positives),
        false_negatives: num_targets.saturating_sub(true_positives),
    }
}

/// Replay per-prediction counter snapshots into a precision-recall series.
///
/// The series starts at `(precision = 1, recall = 0)`. The k-th snapshot
/// (1-based) adds `precision = TP_k / k` and `recall = TP_k / num_targets`,
/// with recall `0` while there are no targets.
///
/// # Arguments
///
/// * `snapshots` - True-positive counters recorded after each prediction
/// * `threshold_index` - Which counter of each snapshot to read
/// * `iou_threshold` - Threshold the series is labelled with
/// * `num_targets` - Ground-truth positives seen in the session
pub fn build_pr_series(
    snapshots: &[Vec<usize>],
    threshold_index: usize,
    iou_threshold: f64,
    num_targets: usize,
) -> PrSeries {
    let mut points = Vec::with_capacity(snapshots.len() + 1);
    points.push(PrecisionRecallPoint {
        precision: 1.0,
        recall: 0.0,
    });

    for (k, snapshot) in snapshots.iter().enumerate() {
        let tp = snapshot[threshold_index] as f64;
        let recall = if num_targets > 0 {
            tp / num_targets as f64
        } else {
            0.0
        };
        points.push(PrecisionRecallPoint {
            precision: tp / (k + 1) as f64,
            recall,
        });
    }

    PrSeries {
        iou_threshold,
        points,
    }
}

/// Interpolate precision values for standard recall levels.
///
/// Uses 101-point interpolation: for every recall level `0.00, 0.01, ..., 1.00`
/// the highest precision reached at that recall or beyond.
pub fn interpolate_precision(precision: &[f64], recall: &[f64]) -> Vec<f64> {
    (0..=100)
        .map(|i| {
            let recall_level = f64::from(i) / 100.0;
            precision
                .iter()
                .zip(recall.iter())
                .filter(|(_, &r)| r >= recall_level)
                .map(|(&p, _)| p)
                .fold(0.0f64, f64::max)
        })
        .collect()
}
