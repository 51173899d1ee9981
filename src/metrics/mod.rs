//! Metrics calculation modules for 3D detection evaluation.

pub mod ap;
pub mod f1_score;
pub mod iou;
pub mod precision_recall;

pub use ap::{calculate_ap, calculate_map, calculate_series_ap};
pub use f1_score::calculate_f1_score;
pub use iou::{iou_3d, iou_matrix, BoxIou};
pub use precision_recall::{build_pr_series, calculate_precision_recall, PrecisionRecall};
