//! Evaluation configuration.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::decoder::FieldBlock;
use crate::error::{Detect3dError, Result};
use crate::nms::{NmsStrategy, SuppressionOrder};
use crate::threshold::{default_iou_thresholds, validate_iou_thresholds, validate_threshold};

/// Default foreground score cutoff for decoding.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.8;

/// Default `IoU` cutoff when the `IoU` suppression strategy is selected.
pub const DEFAULT_NMS_IOU_THRESHOLD: f64 = 0.01;

/// Default division guard for precision and recall.
pub const DEFAULT_EPSILON: f64 = 0.01;

/// Settings for one evaluation session.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use detect3d_eval::config::EvalConfig;
/// use detect3d_eval::nms::NmsStrategy;
///
/// let config: EvalConfig = serde_json::from_str(
///     r#"{"score_threshold": 0.6, "nms": {"type": "iou", "threshold": 0.1}}"#,
/// ).unwrap();
/// assert_eq!(config.score_threshold, 0.6);
/// assert_eq!(config.nms, NmsStrategy::Iou { threshold: 0.1 });
/// assert_eq!(config.iou_thresholds.len(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Foreground score a cell must exceed to emit a candidate
    pub score_threshold: f64,
    /// Suppression strategy
    pub nms: NmsStrategy,
    /// Evaluation `IoU` thresholds, in reporting order
    pub iou_thresholds: Vec<f64>,
    /// Division guard for precision and recall totals
    pub epsilon: f64,
    /// Candidate ordering before suppression
    pub suppression_order: SuppressionOrder,
    /// Prediction block that holds the box fields
    pub field_block: FieldBlock,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            nms: NmsStrategy::Sat,
            iou_thresholds: default_iou_thresholds(),
            epsilon: DEFAULT_EPSILON,
            suppression_order: SuppressionOrder::Emission,
            field_block: FieldBlock::Regression,
        }
    }
}

impl EvalConfig {
    /// Use volumetric `IoU` suppression with the given cutoff.
    #[must_use]
    pub fn with_iou_nms(mut self, threshold: f64) -> Self {
        self.nms = NmsStrategy::Iou { threshold };
        self
    }

    /// Replace the evaluation `IoU` thresholds.
    #[must_use]
    pub fn with_iou_thresholds(mut self, iou_thresholds: Vec<f64>) -> Self {
        self.iou_thresholds = iou_thresholds;
        self
    }

    /// Check every field.
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.score_threshold, "Score")?;
        self.nms.validate()?;
        validate_iou_thresholds(&self.iou_thresholds)?;

        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(Detect3dError::InvalidThreshold(format!(
                "Epsilon must be positive and finite, got {}",
                self.epsilon
            )));
        }

        if let NmsStrategy::Iou { threshold } = self.nms {
            if threshold == 0.0 {
                warn!("IoU suppression threshold is 0; any volumetric overlap suppresses");
            }
        }
        Ok(())
    }
}
