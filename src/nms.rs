/// Non-Maximum Suppression (`NMS`) for oriented 3D boxes
///
/// This module provides a greedy single-pass suppression loop parameterised
/// by an overlap predicate, so callers choose between volumetric `IoU` and
/// separating axis tests without changing the loop.
use log::{debug, trace};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::{bev_corners, separating_axis_overlap};
use crate::metrics::iou::iou_3d;
use crate::threshold::validate_threshold;
use crate::types::{CandidateSet, OrientedBox3D, SuppressedSet};

/// Decides whether a candidate overlaps an already accepted box.
pub trait OverlapPredicate {
    /// `true` when `candidate` should be suppressed by `accepted`.
    fn overlaps(&self, candidate: &OrientedBox3D, accepted: &OrientedBox3D) -> bool;
}

/// Suppress when the volumetric `IoU` exceeds a threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IouPredicate {
    threshold: f64,
}

impl IouPredicate {
    /// Create an `IoU` predicate.
    ///
    /// # Errors
    ///
    /// Returns error if `threshold` is not in range [0.0, 1.0]
    pub fn new(threshold: f64) -> Result<Self> {
        validate_threshold(threshold, "NMS IoU")?;
        Ok(Self { threshold })
    }

    /// The suppression threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl OverlapPredicate for IouPredicate {
    fn overlaps(&self, candidate: &OrientedBox3D, accepted: &OrientedBox3D) -> bool {
        iou_3d(candidate, accepted).iou_3d > self.threshold
    }
}

/// Suppress on any footprint overlap, using the separating axis theorem.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SatPredicate;

impl OverlapPredicate for SatPredicate {
    fn overlaps(&self, candidate: &OrientedBox3D, accepted: &OrientedBox3D) -> bool {
        separating_axis_overlap(&bev_corners(candidate), &bev_corners(accepted))
    }
}

/// Configurable suppression strategy.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NmsStrategy {
    /// Volumetric `IoU` above `threshold` suppresses.
    Iou { threshold: f64 },
    /// Any footprint overlap suppresses.
    #[default]
    Sat,
}

impl NmsStrategy {
    /// Check the strategy's parameters.
    pub fn validate(&self) -> Result<()> {
        match *self {
            NmsStrategy::Iou { threshold } => IouPredicate::new(threshold).map(|_| ()),
            NmsStrategy::Sat => Ok(()),
        }
    }
}

impl OverlapPredicate for NmsStrategy {
    fn overlaps(&self, candidate: &OrientedBox3D, accepted: &OrientedBox3D) -> bool {
        match *self {
            NmsStrategy::Iou { threshold } => IouPredicate { threshold }.overlaps(candidate, accepted),
            NmsStrategy::Sat => SatPredicate.overlaps(candidate, accepted),
        }
    }
}

/// Order in which candidates enter the greedy pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressionOrder {
    /// Decoder emission order, unchanged.
    #[default]
    Emission,
    /// Descending score; ties and unscored boxes keep emission order.
    Score,
}

/// Arrange candidates for suppression according to `order`.
///
/// The sort is stable, and unscored boxes sort after scored ones. Scores
/// compare by their IEEE total order, so NaN scores keep the sort total.
pub fn order_candidates(candidates: CandidateSet, order: SuppressionOrder) -> CandidateSet {
    match order {
        SuppressionOrder::Emission => candidates,
        SuppressionOrder::Score => {
            let mut ordered = candidates;
            ordered.sort_by(|a, b| {
                let sa = a.score.unwrap_or(f64::NEG_INFINITY);
                let sb = b.score.unwrap_or(f64::NEG_INFINITY);
                sb.total_cmp(&sa)
            });
            ordered
        }
    }
}

/// Indices of the candidates accepted by greedy suppression.
///
/// Candidates are visited in input order. The first is always accepted; each
/// later one is accepted only if `predicate` reports no overlap with every
/// box accepted so far. Discarded candidates are never revisited. The
/// returned indices are strictly increasing.
///
/// # Examples
///
/// ```
/// # use detect3d_eval::nms::{suppress_indices, SatPredicate};
/// # use detect3d_eval::types::OrientedBox3D;
/// let candidates = vec![
///     OrientedBox3D::new([0.0, 0.0, 0.0], [2.0, 2.0, 2.0], 0.0),
///     OrientedBox3D::new([0.5, 0.0, 0.0], [2.0, 2.0, 2.0], 0.0),
///     OrientedBox3D::new([10.0, 0.0, 0.0], [2.0, 2.0, 2.0], 0.0),
/// ];
/// assert_eq!(suppress_indices(&candidates, &SatPredicate), vec![0, 2]);
/// ```
pub fn suppress_indices<P>(candidates: &[OrientedBox3D], predicate: &P) -> Vec<usize>
where
    P: OverlapPredicate + ?Sized,
{
    let mut accepted: Vec<usize> = Vec::new();

    for (idx, candidate) in candidates.iter().enumerate() {
        let suppressed_by = accepted
            .iter()
            .copied()
            .find(|&kept| predicate.overlaps(candidate, &candidates[kept]));

        match suppressed_by {
            Some(kept) => trace!("candidate {idx} suppressed by accepted candidate {kept}"),
            None => accepted.push(idx),
        }
    }

    debug!(
        "suppression kept {} of {} candidates",
        accepted.len(),
        candidates.len()
    );
    accepted
}

/// Apply greedy suppression and return the surviving boxes in acceptance
/// order.
pub fn suppress<P>(candidates: &[OrientedBox3D], predicate: &P) -> SuppressedSet
where
    P: OverlapPredicate + ?Sized,
{
    suppress_indices(candidates, predicate)
        .into_iter()
        .map(|idx| candidates[idx].clone())
        .collect()
}

/// Suppress every batch element independently, in parallel.
///
/// The output keeps batch order.
pub fn suppress_batch<P>(batch: &[CandidateSet], predicate: &P) -> Vec<SuppressedSet>
where
    P: OverlapPredicate + Sync + ?Sized,
{
    batch
        .par_iter()
        .map(|candidates| suppress(candidates, predicate))
        .collect()
}
