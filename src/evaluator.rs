//! Evaluation session accumulating detection counts across batches.

use log::{debug, info};
use ndarray::{ArrayView3, ArrayView4};

use crate::config::EvalConfig;
use crate::decoder::{decode_ground_truth, decode_prediction};
use crate::error::{Detect3dError, Result};
use crate::matching::{count_positives, match_predictions};
use crate::metrics::ap::{calculate_map, calculate_series_ap};
use crate::metrics::f1_score::calculate_f1_score;
use crate::metrics::precision_recall::{build_pr_series, calculate_precision_recall};
use crate::nms::{order_candidates, suppress};
use crate::stats::EvaluationStats;
use crate::types::{EvaluationMetrics, OrientedBox3D, SuppressedSet, ThresholdCounters};

/// Running evaluation over a stream of batches.
///
/// Every prediction is matched against the positive ground truth of its
/// batch element and counted as a true positive at each IoU threshold its
/// best bird's-eye-view IoU strictly exceeds. After each prediction the
/// counters are snapshotted so the precision-recall series can be replayed
/// in arrival order.
///
/// # Example
///
/// ```
/// use detect3d_eval::config::EvalConfig;
/// use detect3d_eval::evaluator::EvaluationSession;
/// use detect3d_eval::types::OrientedBox3D;
///
/// # fn main() -> detect3d_eval::Result<()> {
/// let mut session = EvaluationSession::new(EvalConfig::default())?;
/// let target = OrientedBox3D::new([0.0; 3], [4.0, 2.0, 1.5], 0.0).with_label(1);
/// let prediction = OrientedBox3D::new([0.0; 3], [4.0, 2.0, 1.5], 0.0);
///
/// session.evaluate_step(&[prediction], &[target]);
/// let metrics = session.compute_metrics();
/// assert_eq!(metrics.num_predictions, 1);
/// assert_eq!(session.true_positives().get(0.95), Some(1));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct EvaluationSession {
    config: EvalConfig,
    true_positives: Vec<usize>,
    num_predictions: usize,
    num_targets: usize,
    snapshots: Vec<Vec<usize>>,
    stats: EvaluationStats,
}

impl EvaluationSession {
    /// Start an empty session.
    ///
    /// # Errors
    ///
    /// Returns `InvalidThreshold` if the configuration does not validate.
    pub fn new(config: EvalConfig) -> Result<Self> {
        config.validate()?;
        let true_positives = vec![0; config.iou_thresholds.len()];
        Ok(Self {
            config,
            true_positives,
            num_predictions: 0,
            num_targets: 0,
            snapshots: Vec::new(),
            stats: EvaluationStats::new(),
        })
    }

    /// Account for one batch element.
    ///
    /// `suppressed` are the element's predictions in suppression order and
    /// `ground_truth` its annotated boxes; only boxes labelled `1` count as
    /// targets.
    pub fn evaluate_step(&mut self, suppressed: &[OrientedBox3D], ground_truth: &[OrientedBox3D]) {
        let matches = match_predictions(suppressed, ground_truth, &self.config.iou_thresholds);

        for prediction in &matches {
            self.num_predictions += 1;
            for (count, &hit) in self.true_positives.iter_mut().zip(&prediction.hits) {
                if hit {
                    *count += 1;
                }
            }
            self.snapshots.push(self.true_positives.clone());
        }

        let positives = count_positives(ground_truth);
        self.num_targets += positives;
        self.stats.record_element(ground_truth.len());

        debug!(
            "step: {} predictions against {positives} targets, totals P={} T={}",
            suppressed.len(),
            self.num_predictions,
            self.num_targets
        );
    }

    /// Run [`evaluate_step`](Self::evaluate_step) for every batch element.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the two batches differ in length. Nothing is
    /// counted in that case.
    pub fn evaluate_batch(
        &mut self,
        suppressed: &[SuppressedSet],
        ground_truth: &[Vec<OrientedBox3D>],
    ) -> Result<()> {
        if suppressed.len() != ground_truth.len() {
            return Err(Detect3dError::ShapeMismatch(format!(
                "Prediction batch has {} elements, ground truth has {}",
                suppressed.len(),
                ground_truth.len()
            )));
        }

        for (predictions, targets) in suppressed.iter().zip(ground_truth) {
            self.evaluate_step(predictions, targets);
        }
        Ok(())
    }

    /// Decode, suppress and evaluate one raw batch.
    ///
    /// `prediction` is the `[batch, 32, W, H]` network output, `ground_truth`
    /// the `[batch, max_boxes, 8]` annotation tensor and `counts` the number
    /// of valid rows per element. Returns the suppressed boxes of each
    /// element.
    pub fn evaluate_prediction_tensor(
        &mut self,
        prediction: ArrayView4<'_, f32>,
        ground_truth: &ArrayView3<'_, f32>,
        counts: &[usize],
    ) -> Result<Vec<SuppressedSet>> {
        let targets = decode_ground_truth(ground_truth, counts)?;
        let candidates = decode_prediction(
            prediction,
            self.config.score_threshold,
            self.config.field_block,
        )?;

        if candidates.len() != targets.len() {
            return Err(Detect3dError::ShapeMismatch(format!(
                "Prediction batch has {} elements, ground truth has {}",
                candidates.len(),
                targets.len()
            )));
        }

        let mut kept = Vec::with_capacity(candidates.len());
        for element in candidates {
            let decoded = element.len();
            let ordered = order_candidates(element, self.config.suppression_order);
            let survivors = suppress(&ordered, &self.config.nms);
            self.stats.record_suppression(decoded, survivors.len());
            kept.push(survivors);
        }

        self.evaluate_batch(&kept, &targets)?;
        Ok(kept)
    }

    /// Precision, recall, F1, AP and the precision-recall series for every
    /// configured threshold.
    pub fn compute_metrics(&self) -> EvaluationMetrics {
        let thresholds = &self.config.iou_thresholds;
        let mut metrics = EvaluationMetrics::new();
        metrics.num_predictions = self.num_predictions;
        metrics.num_targets = self.num_targets;

        for (i, (&threshold, &tp)) in thresholds.iter().zip(&self.true_positives).enumerate() {
            let pr = calculate_precision_recall(
                tp,
                self.num_predictions,
                self.num_targets,
                self.config.epsilon,
            );
            let series = build_pr_series(&self.snapshots, i, threshold, self.num_targets);
            let ap = calculate_series_ap(&series);

            metrics.precision_at_thresholds.push((threshold, pr.precision));
            metrics.recall_at_thresholds.push((threshold, pr.recall));
            metrics
                .f1_at_thresholds
                .push((threshold, calculate_f1_score(pr.precision, pr.recall)));
            metrics.ap_at_thresholds.push((threshold, ap));
            metrics.curves.push(series);
        }

        let ap_values: Vec<f64> = metrics.ap_at_thresholds.iter().map(|&(_, ap)| ap).collect();
        metrics.map = calculate_map(&ap_values);
        metrics.ap50 = ap_at(&metrics.ap_at_thresholds, 0.5);
        metrics.ap75 = ap_at(&metrics.ap_at_thresholds, 0.75);

        info!(
            "mAP {:.4} over {} thresholds (P={}, T={})",
            metrics.map,
            thresholds.len(),
            self.num_predictions,
            self.num_targets
        );
        metrics
    }

    /// Zero every counter and drop the recorded snapshots and statistics.
    pub fn reset(&mut self) {
        info!(
            "resetting session after {} predictions and {} targets",
            self.num_predictions, self.num_targets
        );
        self.true_positives.iter_mut().for_each(|c| *c = 0);
        self.num_predictions = 0;
        self.num_targets = 0;
        self.snapshots.clear();
        self.stats = EvaluationStats::new();
    }

    /// Compute the final metrics and close the session.
    pub fn finish(self) -> EvaluationMetrics {
        self.stats.log_summary();
        self.compute_metrics()
    }

    /// Ground-truth positives seen so far.
    pub fn num_targets(&self) -> usize {
        self.num_targets
    }

    /// Predictions seen so far.
    pub fn num_predictions(&self) -> usize {
        self.num_predictions
    }

    /// Current true-positive count per threshold.
    pub fn true_positives(&self) -> ThresholdCounters {
        ThresholdCounters {
            iou_thresholds: self.config.iou_thresholds.clone(),
            true_positives: self.true_positives.clone(),
        }
    }

    /// Evaluation IoU thresholds, in reporting order.
    pub fn iou_thresholds(&self) -> &[f64] {
        &self.config.iou_thresholds
    }

    /// Configuration the session was created with.
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Pipeline statistics gathered since creation or the last reset.
    pub fn stats(&self) -> &EvaluationStats {
        &self.stats
    }
}

fn ap_at(ap_at_thresholds: &[(f64, f64)], threshold: f64) -> Option<f64> {
    ap_at_thresholds
        .iter()
        .find(|(t, _)| (t - threshold).abs() < 1e-6)
        .map(|&(_, ap)| ap)
}
