/// Pipeline statistics for an evaluation session
///
/// This module tracks how many candidates each stage of the pipeline saw,
/// so a run can be summarised without re-deriving counts from the metrics.
use log::info;
use serde::{Deserialize, Serialize};

/// Statistics collected while a session processes batches
///
/// Counts decoded candidates, suppression survivors and batch elements that
/// ended up without any candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationStats {
    /// Number of batch elements evaluated
    pub batch_elements: usize,

    /// Number of candidates produced by the decoder
    pub decoded_candidates: usize,

    /// Number of candidates surviving suppression
    pub kept_candidates: usize,

    /// Number of batch elements whose candidate set was empty after decoding
    pub empty_candidate_sets: usize,

    /// Number of ground-truth boxes read, positive or not
    pub ground_truth_boxes: usize,
}

impl EvaluationStats {
    /// Create a new `EvaluationStats` with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one batch element and the ground-truth boxes it carried
    pub fn record_element(&mut self, ground_truth_boxes: usize) {
        self.batch_elements += 1;
        self.ground_truth_boxes += ground_truth_boxes;
    }

    /// Record the candidate count of one element before and after suppression
    pub fn record_suppression(&mut self, decoded: usize, kept: usize) {
        self.decoded_candidates += decoded;
        self.kept_candidates += kept;
        if decoded == 0 {
            self.empty_candidate_sets += 1;
        }
    }

    /// Candidates removed by suppression
    pub fn suppressed_candidates(&self) -> usize {
        self.decoded_candidates.saturating_sub(self.kept_candidates)
    }

    /// Emit a summary of the statistics through the `log` facade
    pub fn log_summary(&self) {
        info!("{}", self.summary_string());
    }

    /// Get a formatted string summary of the statistics
    pub fn summary_string(&self) -> String {
        format!(
            "EvaluationStats {{ elements: {}, decoded: {}, kept: {}, suppressed: {}, empty: {}, ground_truth: {} }}",
            self.batch_elements,
            self.decoded_candidates,
            self.kept_candidates,
            self.suppressed_candidates(),
            self.empty_candidate_sets,
            self.ground_truth_boxes
        )
    }
}
