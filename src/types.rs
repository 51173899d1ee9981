//! Core data types for oriented boxes and evaluation results.

use serde::{Deserialize, Serialize};

use crate::error::{Detect3dError, Result};

/// Number of geometry fields per box: x, y, z, dx, dy, dz, heading.
pub const BOX_FIELDS: usize = 7;

/// A point on the ground plane (bird's-eye view).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Difference vector `self - other`.
    pub fn sub(self, other: Point2) -> Point2 {
        Point2::new(self.x - other.x, self.y - other.y)
    }

    /// Dot product with another vector.
    pub fn dot(self, other: Point2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z component of the cross product with another vector.
    pub fn cross(self, other: Point2) -> f64 {
        self.x * other.y - self.y * other.x
    }
}

/// An oriented 3D box in a shared coordinate frame.
///
/// `z` is the vertical axis and `heading` is a counter-clockwise rotation
/// around it, in radians. Ground truth carries a `label` (`1` marks a valid
/// positive instance); decoded candidates carry the foreground `score` of the
/// cell that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrientedBox3D {
    pub center: [f64; 3],
    pub size: [f64; 3],
    pub heading: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl OrientedBox3D {
    /// Create a new unlabeled, unscored box.
    pub fn new(center: [f64; 3], size: [f64; 3], heading: f64) -> Self {
        Self {
            center,
            size,
            heading,
            label: None,
            score: None,
        }
    }

    /// Create a box, rejecting non-finite geometry.
    pub fn try_new(center: [f64; 3], size: [f64; 3], heading: f64) -> Result<Self> {
        let candidate = Self::new(center, size, heading);
        if !candidate.is_finite() {
            return Err(Detect3dError::InvalidBox(format!(
                "Non-finite box geometry: center={center:?}, size={size:?}, heading={heading}"
            )));
        }
        Ok(candidate)
    }

    /// Build a box from the seven geometry fields `x, y, z, dx, dy, dz, heading`.
    pub fn from_fields(fields: [f64; BOX_FIELDS]) -> Self {
        Self::new(
            [fields[0], fields[1], fields[2]],
            [fields[3], fields[4], fields[5]],
            fields[6],
        )
    }

    /// Return a copy carrying the given ground-truth label.
    #[must_use]
    pub fn with_label(mut self, label: u8) -> Self {
        self.label = Some(label);
        self
    }

    /// Return a copy carrying the given confidence score.
    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Whether this is a ground-truth box flagged as a positive instance.
    pub fn is_positive(&self) -> bool {
        self.label == Some(1)
    }

    /// Whether every geometry field is finite.
    pub fn is_finite(&self) -> bool {
        self.center.iter().chain(self.size.iter()).all(|v| v.is_finite()) && self.heading.is_finite()
    }

    /// Footprint area on the ground plane.
    pub fn bev_area(&self) -> f64 {
        (self.size[0] * self.size[1]).abs()
    }

    /// Box volume.
    pub fn volume(&self) -> f64 {
        (self.size[0] * self.size[1] * self.size[2]).abs()
    }

    /// Vertical extent as `(bottom, top)`.
    pub fn z_range(&self) -> (f64, f64) {
        let half = self.size[2].abs() / 2.0;
        (self.center[2] - half, self.center[2] + half)
    }
}

/// Candidate boxes for one batch element, in decoder emission order.
pub type CandidateSet = Vec<OrientedBox3D>;

/// Boxes surviving suppression, a subsequence of a [`CandidateSet`].
pub type SuppressedSet = Vec<OrientedBox3D>;

/// True-positive counts for each IoU threshold of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCounters {
    pub iou_thresholds: Vec<f64>,
    pub true_positives: Vec<usize>,
}

impl ThresholdCounters {
    /// Create zeroed counters for the given thresholds.
    pub fn new(iou_thresholds: Vec<f64>) -> Self {
        let true_positives = vec![0; iou_thresholds.len()];
        Self {
            iou_thresholds,
            true_positives,
        }
    }

    /// True-positive count for a threshold, if it is configured.
    pub fn get(&self, iou_threshold: f64) -> Option<usize> {
        self.iou_thresholds
            .iter()
            .position(|&t| (t - iou_threshold).abs() < 1e-9)
            .map(|i| self.true_positives[i])
    }

    /// Iterate `(threshold, count)` pairs in threshold order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, usize)> + '_ {
        self.iou_thresholds
            .iter()
            .copied()
            .zip(self.true_positives.iter().copied())
    }
}

/// Precision-Recall curve point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrecisionRecallPoint {
    pub precision: f64,
    pub recall: f64,
}

/// Precision-recall series for one IoU threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrSeries {
    pub iou_threshold: f64,
    pub points: Vec<PrecisionRecallPoint>,
}

impl PrSeries {
    /// Precision values in curve order.
    pub fn precisions(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.precision).collect()
    }

    /// Recall values in curve order.
    pub fn recalls(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.recall).collect()
    }
}

/// Evaluation metrics for a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    /// Mean Average Precision across all IoU thresholds
    pub map: f64,
    /// Average Precision at IoU=0.50, when that threshold is configured
    pub ap50: Option<f64>,
    /// Average Precision at IoU=0.75, when that threshold is configured
    pub ap75: Option<f64>,
    /// Total predictions processed
    pub num_predictions: usize,
    /// Total ground-truth positives processed
    pub num_targets: usize,
    /// Average Precision per IoU threshold
    pub ap_at_thresholds: Vec<(f64, f64)>,
    /// Epsilon-guarded precision per IoU threshold
    pub precision_at_thresholds: Vec<(f64, f64)>,
    /// Epsilon-guarded recall per IoU threshold
    pub recall_at_thresholds: Vec<(f64, f64)>,
    /// F1 score per IoU threshold
    pub f1_at_thresholds: Vec<(f64, f64)>,
    /// Precision-recall series per IoU threshold
    pub curves: Vec<PrSeries>,
}

impl EvaluationMetrics {
    /// Create a new empty EvaluationMetrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Series for a given threshold, if configured.
    pub fn curve(&self, iou_threshold: f64) -> Option<&PrSeries> {
        self.curves
            .iter()
            .find(|c| (c.iou_threshold - iou_threshold).abs() < 1e-9)
    }
}
