//! Decoding of dense detector output into candidate boxes.
//!
//! Class scores are laid out as `[batch, 2 * anchors, W, H]`, with channel
//! `2a` holding the background score and `2a + 1` the foreground score of
//! anchor `a`. Box fields are `[batch, 7 * anchors, W, H]`, channels
//! `7a..7a + 7` holding `x, y, z, dx, dy, dz, heading`.

use log::debug;
use ndarray::{ArrayView2, ArrayView3, ArrayView4, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Detect3dError, Result};
use crate::types::{CandidateSet, OrientedBox3D, BOX_FIELDS};

/// Class channels per anchor (background, foreground).
pub const CLASS_CHANNELS_PER_ANCHOR: usize = 2;

/// Anchors in the raw prediction tensor.
pub const PREDICTION_ANCHORS: usize = 2;

/// Channel counts of the raw prediction blocks: classification, regression,
/// auxiliary box fields.
pub const PREDICTION_LAYOUT: [usize; 3] = [
    CLASS_CHANNELS_PER_ANCHOR * PREDICTION_ANCHORS,
    BOX_FIELDS * PREDICTION_ANCHORS,
    BOX_FIELDS * PREDICTION_ANCHORS,
];

/// Fields per ground-truth row: seven geometry fields and a label.
pub const GROUND_TRUTH_FIELDS: usize = BOX_FIELDS + 1;

/// Which box-field block of the raw prediction feeds the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldBlock {
    /// The second block, directly after the class scores.
    #[default]
    Regression,
    /// The trailing auxiliary block.
    Auxiliary,
}

/// Views into the three channel blocks of a raw prediction tensor.
#[derive(Debug, Clone)]
pub struct PredictionBlocks<'a> {
    pub classification: ArrayView4<'a, f32>,
    pub regression: ArrayView4<'a, f32>,
    pub auxiliary: ArrayView4<'a, f32>,
}

impl<'a> PredictionBlocks<'a> {
    /// The box-field block selected by `block`.
    pub fn fields(&self, block: FieldBlock) -> ArrayView4<'a, f32> {
        match block {
            FieldBlock::Regression => self.regression.clone(),
            FieldBlock::Auxiliary => self.auxiliary.clone(),
        }
    }
}

/// Split a `[batch, 4 + 14 + 14, W, H]` prediction into its blocks without
/// copying.
///
/// # Errors
///
/// Returns `ShapeMismatch` if the channel count is not 32.
pub fn split_prediction(prediction: ArrayView4<'_, f32>) -> Result<PredictionBlocks<'_>> {
    let expected: usize = PREDICTION_LAYOUT.iter().sum();
    let channels = prediction.shape()[1];
    if channels != expected {
        return Err(Detect3dError::ShapeMismatch(format!(
            "Prediction tensor must have {expected} channels ({PREDICTION_LAYOUT:?}), got {channels}"
        )));
    }

    let (classification, rest) = prediction.split_at(Axis(1), PREDICTION_LAYOUT[0]);
    let (regression, auxiliary) = rest.split_at(Axis(1), PREDICTION_LAYOUT[1]);
    Ok(PredictionBlocks {
        classification,
        regression,
        auxiliary,
    })
}

/// Number of anchors implied by a pair of class/field tensors.
fn anchor_count(class_scores: &ArrayView4<'_, f32>, fields: &ArrayView4<'_, f32>) -> Result<usize> {
    let cls_shape = class_scores.shape();
    let reg_shape = fields.shape();

    if cls_shape[1] == 0 || cls_shape[1] % CLASS_CHANNELS_PER_ANCHOR != 0 {
        return Err(Detect3dError::ShapeMismatch(format!(
            "Class scores need a positive multiple of {CLASS_CHANNELS_PER_ANCHOR} channels, got {}",
            cls_shape[1]
        )));
    }
    let anchors = cls_shape[1] / CLASS_CHANNELS_PER_ANCHOR;

    if reg_shape[1] != anchors * BOX_FIELDS {
        return Err(Detect3dError::ShapeMismatch(format!(
            "{anchors} anchors need {} box-field channels, got {}",
            anchors * BOX_FIELDS,
            reg_shape[1]
        )));
    }

    if cls_shape[0] != reg_shape[0] || cls_shape[2..] != reg_shape[2..] {
        return Err(Detect3dError::ShapeMismatch(format!(
            "Class scores {cls_shape:?} and box fields {reg_shape:?} disagree on batch or grid size"
        )));
    }

    Ok(anchors)
}

/// Decode dense scores and box fields into candidate boxes per batch element.
///
/// A cell emits a candidate for an anchor when its foreground score is
/// strictly greater than `score_threshold`. Emission is anchor-major, then
/// row-major over the grid; no sorting happens here.
///
/// # Example
///
/// ```
/// use detect3d_eval::decoder::decode;
/// use ndarray::Array4;
///
/// let mut scores = Array4::<f32>::zeros((1, 2, 2, 2));
/// scores[[0, 1, 1, 0]] = 0.9;
/// let mut fields = Array4::<f32>::zeros((1, 7, 2, 2));
/// fields[[0, 3, 1, 0]] = 4.0;
///
/// let candidates = decode(&scores.view(), &fields.view(), 0.5).unwrap();
/// assert_eq!(candidates.len(), 1);
/// assert_eq!(candidates[0].len(), 1);
/// assert_eq!(candidates[0][0].size[0], 4.0);
/// ```
pub fn decode(
    class_scores: &ArrayView4<'_, f32>,
    fields: &ArrayView4<'_, f32>,
    score_threshold: f64,
) -> Result<Vec<CandidateSet>> {
    let anchors = anchor_count(class_scores, fields)?;
    let batch = class_scores.shape()[0];

    let decoded = (0..batch)
        .into_par_iter()
        .map(|b| {
            let candidates = decode_element(
                class_scores.index_axis(Axis(0), b),
                fields.index_axis(Axis(0), b),
                anchors,
                score_threshold,
            );
            debug!(
                "batch element {b}: {} candidates above score {score_threshold}",
                candidates.len()
            );
            candidates
        })
        .collect();

    Ok(decoded)
}

/// Decode the raw prediction tensor, reading box fields from `block`.
pub fn decode_prediction(
    prediction: ArrayView4<'_, f32>,
    score_threshold: f64,
    block: FieldBlock,
) -> Result<Vec<CandidateSet>> {
    let blocks = split_prediction(prediction)?;
    decode(&blocks.classification, &blocks.fields(block), score_threshold)
}

fn decode_element(
    class_scores: ArrayView3<'_, f32>,
    fields: ArrayView3<'_, f32>,
    anchors: usize,
    score_threshold: f64,
) -> CandidateSet {
    let mut candidates = Vec::new();
    // compare in tensor precision so a cell holding exactly the threshold is rejected
    let threshold = score_threshold as f32;

    for anchor in 0..anchors {
        let foreground = class_scores.index_axis(Axis(0), CLASS_CHANNELS_PER_ANCHOR * anchor + 1);
        let base = BOX_FIELDS * anchor;

        for ((w, h), &score) in foreground.indexed_iter() {
            if score.is_nan() || score <= threshold {
                continue;
            }

            let mut values = [0.0; BOX_FIELDS];
            for (k, value) in values.iter_mut().enumerate() {
                *value = f64::from(fields[[base + k, w, h]]);
            }
            candidates.push(OrientedBox3D::from_fields(values).with_score(f64::from(score)));
        }
    }

    candidates
}

/// Unpack a `[batch, max_boxes, 8]` ground-truth tensor, keeping the first
/// `counts[b]` rows of every batch element.
///
/// # Errors
///
/// Returns `ShapeMismatch` when rows have fewer than 8 fields, `counts` does
/// not cover the batch, or a count exceeds `max_boxes`.
pub fn decode_ground_truth(
    ground_truth: &ArrayView3<'_, f32>,
    counts: &[usize],
) -> Result<Vec<Vec<OrientedBox3D>>> {
    let [batch, max_boxes, width] = [
        ground_truth.shape()[0],
        ground_truth.shape()[1],
        ground_truth.shape()[2],
    ];

    if width < GROUND_TRUTH_FIELDS {
        return Err(Detect3dError::ShapeMismatch(format!(
            "Ground-truth rows need {GROUND_TRUTH_FIELDS} fields, got {width}"
        )));
    }
    if counts.len() != batch {
        return Err(Detect3dError::ShapeMismatch(format!(
            "Got {} box counts for a batch of {batch}",
            counts.len()
        )));
    }
    if let Some(&count) = counts.iter().find(|&&c| c > max_boxes) {
        return Err(Detect3dError::ShapeMismatch(format!(
            "Box count {count} exceeds the {max_boxes} rows available"
        )));
    }

    Ok(ground_truth
        .outer_iter()
        .zip(counts)
        .map(|(rows, &count)| ground_truth_rows(rows, count))
        .collect())
}

fn ground_truth_rows(rows: ArrayView2<'_, f32>, count: usize) -> Vec<OrientedBox3D> {
    rows.outer_iter()
        .take(count)
        .map(|row| {
            let mut values = [0.0; BOX_FIELDS];
            for (k, value) in values.iter_mut().enumerate() {
                *value = f64::from(row[k]);
            }
            let label = row[BOX_FIELDS].round().clamp(0.0, f32::from(u8::MAX)) as u8;
            OrientedBox3D::from_fields(values).with_label(label)
        })
        .collect()
}
