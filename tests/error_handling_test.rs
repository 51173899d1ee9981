//! Error handling and validation tests.

use detect3d_eval::config::EvalConfig;
use detect3d_eval::decoder::{decode, decode_ground_truth, split_prediction};
use detect3d_eval::error::Detect3dError;
use detect3d_eval::evaluator::EvaluationSession;
use detect3d_eval::loader::{load_config_from_file, load_config_from_str};
use detect3d_eval::nms::{IouPredicate, NmsStrategy};
use detect3d_eval::threshold::generate_threshold_range;
use detect3d_eval::types::OrientedBox3D;
use ndarray::{Array3, Array4};
use std::io::Write;

// ============================================================================
// TENSOR SHAPE ERRORS
// ============================================================================

#[test]
fn test_prediction_with_wrong_channel_count() {
    let prediction = Array4::<f32>::zeros((1, 31, 2, 2));
    let err = split_prediction(prediction.view()).unwrap_err();
    assert!(matches!(err, Detect3dError::ShapeMismatch(_)));
    assert!(err.to_string().contains("32"));
}

#[test]
fn test_odd_class_channels() {
    let scores = Array4::<f32>::zeros((1, 3, 2, 2));
    let fields = Array4::<f32>::zeros((1, 7, 2, 2));
    let result = decode(&scores.view(), &fields.view(), 0.5);
    assert!(matches!(result, Err(Detect3dError::ShapeMismatch(_))));
}

#[test]
fn test_field_channels_disagree_with_anchors() {
    let scores = Array4::<f32>::zeros((1, 4, 2, 2));
    let fields = Array4::<f32>::zeros((1, 7, 2, 2));
    let result = decode(&scores.view(), &fields.view(), 0.5);
    assert!(matches!(result, Err(Detect3dError::ShapeMismatch(_))));
}

#[test]
fn test_grid_size_mismatch() {
    let scores = Array4::<f32>::zeros((1, 2, 2, 2));
    let fields = Array4::<f32>::zeros((1, 7, 3, 2));
    let result = decode(&scores.view(), &fields.view(), 0.5);
    assert!(matches!(result, Err(Detect3dError::ShapeMismatch(_))));
}

#[test]
fn test_ground_truth_too_narrow() {
    let ground_truth = Array3::<f32>::zeros((1, 2, 7));
    let result = decode_ground_truth(&ground_truth.view(), &[1]);
    assert!(matches!(result, Err(Detect3dError::ShapeMismatch(_))));
}

#[test]
fn test_ground_truth_counts_mismatch() {
    let ground_truth = Array3::<f32>::zeros((2, 2, 8));
    assert!(decode_ground_truth(&ground_truth.view(), &[1]).is_err());
    assert!(decode_ground_truth(&ground_truth.view(), &[1, 3]).is_err());
}

#[test]
fn test_tensor_pipeline_rejects_batch_mismatch() {
    let prediction = Array4::<f32>::zeros((2, 32, 2, 2));
    let ground_truth = Array3::<f32>::zeros((1, 2, 8));
    let mut session = EvaluationSession::new(EvalConfig::default()).unwrap();

    let result = session.evaluate_prediction_tensor(prediction.view(), &ground_truth.view(), &[0]);
    assert!(matches!(result, Err(Detect3dError::ShapeMismatch(_))));
    assert_eq!(session.num_predictions(), 0);
    assert_eq!(session.stats().batch_elements, 0);
}

// ============================================================================
// THRESHOLD ERRORS
// ============================================================================

#[test]
fn test_nms_threshold_out_of_range() {
    assert!(matches!(IouPredicate::new(1.01), Err(Detect3dError::InvalidThreshold(_))));
    assert!(IouPredicate::new(f64::NAN).is_err());
    assert!(NmsStrategy::Iou { threshold: -1.0 }.validate().is_err());
}

#[test]
fn test_session_rejects_bad_config() {
    let config = EvalConfig {
        score_threshold: -0.2,
        ..EvalConfig::default()
    };
    assert!(matches!(
        EvaluationSession::new(config),
        Err(Detect3dError::InvalidThreshold(_))
    ));

    let config = EvalConfig {
        epsilon: f64::INFINITY,
        ..EvalConfig::default()
    };
    assert!(EvaluationSession::new(config).is_err());
}

#[test]
fn test_invalid_threshold_range() {
    assert!(generate_threshold_range(0.9, 0.1, 5).is_err());
    assert!(generate_threshold_range(-0.5, 0.5, 5).is_err());
}

// ============================================================================
// BOX ERRORS
// ============================================================================

#[test]
fn test_non_finite_box() {
    let result = OrientedBox3D::try_new([0.0, f64::NEG_INFINITY, 0.0], [1.0; 3], 0.0);
    assert!(matches!(result, Err(Detect3dError::InvalidBox(_))));
}

// ============================================================================
// CONFIG LOADING ERRORS
// ============================================================================

#[test]
fn test_malformed_json() {
    let result = load_config_from_str("{ not json");
    assert!(matches!(result, Err(Detect3dError::JsonError(_))));
}

#[test]
fn test_unknown_nms_strategy() {
    let result = load_config_from_str(r#"{"nms": {"type": "soft"}}"#);
    assert!(matches!(result, Err(Detect3dError::JsonError(_))));
}

#[test]
fn test_config_with_invalid_values() {
    let result = load_config_from_str(r#"{"iou_thresholds": [0.5, 1.5]}"#);
    assert!(matches!(result, Err(Detect3dError::InvalidThreshold(_))));
}

#[test]
fn test_missing_config_file() {
    let result = load_config_from_file("/nonexistent/path/eval_config.json");
    assert!(matches!(result, Err(Detect3dError::IoError(_))));
}

#[test]
fn test_config_file_roundtrip() {
    let path = std::env::temp_dir().join(format!("detect3d_eval_config_{}.json", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"score_threshold": 0.6, "suppression_order": "score"}}"#).unwrap();
    }

    let config = load_config_from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.score_threshold, 0.6);
    assert_eq!(config.nms, NmsStrategy::Sat);
}
