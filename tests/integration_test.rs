//! Integration tests for the complete decode, suppress and evaluate pipeline.

use detect3d_eval::config::EvalConfig;
use detect3d_eval::decoder::{decode_prediction, FieldBlock, PREDICTION_LAYOUT};
use detect3d_eval::evaluator::EvaluationSession;
use detect3d_eval::nms::{suppress, suppress_batch, NmsStrategy, SatPredicate};
use detect3d_eval::types::OrientedBox3D;
use ndarray::{Array3, Array4};

fn create_box(x: f64, y: f64, heading: f64) -> OrientedBox3D {
    OrientedBox3D::new([x, y, 0.0], [4.0, 2.0, 1.5], heading)
}

fn create_target(x: f64, y: f64, heading: f64) -> OrientedBox3D {
    create_box(x, y, heading).with_label(1)
}

/// Write one anchor-0 prediction into cell `(w, h)` of a prediction tensor.
fn set_cell(prediction: &mut Array4<f32>, w: usize, h: usize, score: f32, fields: [f32; 7]) {
    prediction[[0, 1, w, h]] = score;
    for (k, &value) in fields.iter().enumerate() {
        prediction[[0, PREDICTION_LAYOUT[0] + k, w, h]] = value;
    }
}

#[test]
fn test_two_identical_boxes_sat() {
    let candidates = vec![create_box(1.0, 1.0, 0.3), create_box(1.0, 1.0, 0.3)];
    let kept = suppress(&candidates, &SatPredicate);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0], candidates[0]);
}

#[test]
fn test_exact_match_all_thresholds() {
    let mut session = EvaluationSession::new(EvalConfig::default()).unwrap();
    session.evaluate_step(&[create_box(5.0, -3.0, 0.7)], &[create_target(5.0, -3.0, 0.7)]);

    let counters = session.true_positives();
    assert_eq!(counters.iou_thresholds.len(), 10);
    for (threshold, tp) in counters.iter() {
        assert_eq!(tp, 1, "expected a hit at IoU {threshold}");
    }
}

#[test]
fn test_zero_overlap_counts_miss() {
    let mut session = EvaluationSession::new(EvalConfig::default()).unwrap();
    session.evaluate_step(&[create_box(0.0, 0.0, 0.0)], &[create_target(40.0, 40.0, 0.0)]);

    assert!(session.true_positives().iter().all(|(_, tp)| tp == 0));
    assert_eq!(session.num_predictions(), 1);
    assert_eq!(session.num_targets(), 1);

    let metrics = session.compute_metrics();
    assert_eq!(metrics.map, 0.0);
}

#[test]
fn test_perfect_predictions_across_batches() {
    let mut session = EvaluationSession::new(EvalConfig::default()).unwrap();
    let targets = vec![
        vec![create_target(0.0, 0.0, 0.0), create_target(10.0, 0.0, 1.0)],
        vec![create_target(-5.0, 5.0, -0.4)],
    ];
    let predictions: Vec<Vec<OrientedBox3D>> = targets
        .iter()
        .map(|element| element.iter().map(|t| create_box(t.center[0], t.center[1], t.heading)).collect())
        .collect();

    session.evaluate_batch(&predictions, &targets).unwrap();
    let metrics = session.finish();

    assert_eq!(metrics.num_predictions, 3);
    assert_eq!(metrics.num_targets, 3);
    assert!(metrics.map > 0.99, "mAP should be ~1.0 for perfect predictions, got {}", metrics.map);
    assert!(metrics.ap50.unwrap() > 0.99);
    assert!(metrics.ap75.unwrap() > 0.99);
}

#[test]
fn test_partial_predictions() {
    let mut session = EvaluationSession::new(EvalConfig::default()).unwrap();
    let targets = vec![create_target(0.0, 0.0, 0.0), create_target(20.0, 0.0, 0.0)];
    // one exact hit, one false positive far away
    let predictions = vec![create_box(0.0, 0.0, 0.0), create_box(-30.0, 0.0, 0.0)];

    session.evaluate_step(&predictions, &targets);
    let metrics = session.compute_metrics();

    let (_, recall) = metrics.recall_at_thresholds[0];
    assert!((recall - 1.0 / 2.01).abs() < 1e-12);
    let (_, precision) = metrics.precision_at_thresholds[0];
    assert!((precision - 1.0 / 2.01).abs() < 1e-12);
    assert!(metrics.map > 0.0 && metrics.map < 1.0);
}

#[test]
fn test_shifted_prediction_crosses_some_thresholds() {
    // footprint IoU of a 4x2 box shifted by 1 along x: 6 / 10 = 0.6
    let mut session = EvaluationSession::new(EvalConfig::default()).unwrap();
    session.evaluate_step(&[create_box(1.0, 0.0, 0.0)], &[create_target(0.0, 0.0, 0.0)]);

    let counters = session.true_positives();
    assert_eq!(counters.get(0.5), Some(1));
    assert_eq!(counters.get(0.55), Some(1));
    assert_eq!(counters.get(0.65), Some(0));
    assert_eq!(counters.get(0.95), Some(0));
}

#[test]
fn test_tensor_pipeline_end_to_end() {
    let channels: usize = PREDICTION_LAYOUT.iter().sum();
    let mut prediction = Array4::<f32>::zeros((1, channels, 4, 4));
    // duplicate detections of the first car, one detection of the second,
    // and a low-confidence cell that must not be decoded
    set_cell(&mut prediction, 0, 0, 0.95, [0.0, 0.0, 0.0, 4.0, 2.0, 1.5, 0.0]);
    set_cell(&mut prediction, 0, 1, 0.90, [0.2, 0.1, 0.0, 4.0, 2.0, 1.5, 0.0]);
    set_cell(&mut prediction, 2, 2, 0.85, [10.0, 5.0, 0.0, 4.0, 2.0, 1.5, 0.5]);
    set_cell(&mut prediction, 3, 3, 0.50, [-10.0, 5.0, 0.0, 4.0, 2.0, 1.5, 0.0]);

    let mut ground_truth = Array3::<f32>::zeros((1, 3, 8));
    for (row, values) in [
        [0.0, 0.0, 0.0, 4.0, 2.0, 1.5, 0.0, 1.0],
        [10.0, 5.0, 0.0, 4.0, 2.0, 1.5, 0.5, 1.0],
        [99.0, 99.0, 0.0, 4.0, 2.0, 1.5, 0.0, 1.0],
    ]
    .iter()
    .enumerate()
    {
        for (k, &value) in values.iter().enumerate() {
            ground_truth[[0, row, k]] = value;
        }
    }

    let mut session = EvaluationSession::new(EvalConfig::default()).unwrap();
    // the third row lies past the valid count and is ignored
    let kept = session
        .evaluate_prediction_tensor(prediction.view(), &ground_truth.view(), &[2])
        .unwrap();

    assert_eq!(kept[0].len(), 2);
    assert_eq!(session.num_targets(), 2);
    assert_eq!(session.num_predictions(), 2);
    assert_eq!(session.true_positives().get(0.9), Some(2));
    assert_eq!(session.stats().decoded_candidates, 3);
}

#[test]
fn test_iou_strategy_keeps_light_overlap() {
    let config = EvalConfig::default().with_iou_nms(0.5);
    assert_eq!(config.nms, NmsStrategy::Iou { threshold: 0.5 });

    let batch = vec![vec![create_box(0.0, 0.0, 0.0), create_box(3.0, 0.0, 0.0)]];
    let by_iou = suppress_batch(&batch, &config.nms);
    let by_sat = suppress_batch(&batch, &NmsStrategy::Sat);
    assert_eq!(by_iou[0].len(), 2);
    assert_eq!(by_sat[0].len(), 1);
}

#[test]
fn test_auxiliary_block_decoding() {
    let channels: usize = PREDICTION_LAYOUT.iter().sum();
    let mut prediction = Array4::<f32>::zeros((1, channels, 1, 1));
    prediction[[0, 1, 0, 0]] = 0.9;
    prediction[[0, PREDICTION_LAYOUT[0] + 3, 0, 0]] = 4.0;
    prediction[[0, PREDICTION_LAYOUT[0] + PREDICTION_LAYOUT[1] + 3, 0, 0]] = 7.0;

    let regression = decode_prediction(prediction.view(), 0.8, FieldBlock::Regression).unwrap();
    let auxiliary = decode_prediction(prediction.view(), 0.8, FieldBlock::Auxiliary).unwrap();
    assert_eq!(regression[0][0].size[0], 4.0);
    assert_eq!(auxiliary[0][0].size[0], 7.0);
}

#[test]
fn test_metrics_serialize_to_json() {
    let mut session = EvaluationSession::new(EvalConfig::default()).unwrap();
    session.evaluate_step(&[create_box(0.0, 0.0, 0.0)], &[create_target(0.0, 0.0, 0.0)]);
    let metrics = session.compute_metrics();

    let json = serde_json::to_string(&metrics).unwrap();
    assert!(json.contains("\"map\""));
    assert!(json.contains("\"curves\""));
}
