//! # detect3d-eval
//!
//! A Rust library for evaluating 3D object detectors that emit dense,
//! per-cell box predictions.
//!
//! This library provides:
//! - **Decoding** of anchor-based prediction tensors into oriented 3D boxes
//! - **Non-Maximum Suppression** with a volumetric IoU or a separating-axis predicate
//! - **IoU** between oriented boxes, in 3D and in bird's-eye view
//! - **Precision** and **Recall** at several IoU thresholds, accumulated across batches
//! - **AP** and **mAP** from per-prediction precision-recall series
//!
//! ## Quick Start
//!
//! ```rust
//! use detect3d_eval::config::EvalConfig;
//! use detect3d_eval::evaluator::EvaluationSession;
//! use detect3d_eval::nms::{suppress, SatPredicate};
//! use detect3d_eval::types::OrientedBox3D;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let candidates = vec![
//!     OrientedBox3D::new([0.0, 0.0, 0.0], [4.0, 2.0, 1.5], 0.0),
//!     OrientedBox3D::new([0.3, 0.0, 0.0], [4.0, 2.0, 1.5], 0.0),
//! ];
//! let ground_truth = vec![OrientedBox3D::new([0.0, 0.0, 0.0], [4.0, 2.0, 1.5], 0.0).with_label(1)];
//!
//! let kept = suppress(&candidates, &SatPredicate);
//! assert_eq!(kept.len(), 1);
//!
//! let mut session = EvaluationSession::new(EvalConfig::default())?;
//! session.evaluate_step(&kept, &ground_truth);
//!
//! let metrics = session.finish();
//! println!("mAP: {:.4}", metrics.map);
//! # Ok(())
//! # }
//! ```
//!
//! ## Tensor Layout
//!
//! Predictions arrive as `[batch, 32, W, H]`: four classification channels
//! (background/foreground for two anchors) followed by two blocks of
//! fourteen box fields (`x, y, z, dx, dy, dz, heading` per anchor). Ground
//! truth arrives as `[batch, max_boxes, 8]` with the label in the last
//! field, plus the number of valid rows per batch element.

pub mod config;
pub mod decoder;
pub mod error;
pub mod evaluator;
pub mod geometry;
pub mod loader;
pub mod matching;
pub mod metrics;
pub mod nms;
pub mod stats;
pub mod threshold;
pub mod types;

// Re-export commonly used types and functions
pub use config::EvalConfig;
pub use decoder::{decode, decode_ground_truth, decode_prediction, split_prediction, FieldBlock};
pub use error::{Detect3dError, Result};
pub use evaluator::EvaluationSession;
pub use loader::{load_config_from_file, load_config_from_str};
pub use nms::{
    suppress, suppress_batch, suppress_indices, IouPredicate, NmsStrategy, OverlapPredicate,
    SatPredicate, SuppressionOrder,
};
pub use stats::EvaluationStats;
pub use threshold::{default_iou_thresholds, generate_threshold_range};
pub use types::{
    EvaluationMetrics, OrientedBox3D, PrSeries, PrecisionRecallPoint, ThresholdCounters,
};
