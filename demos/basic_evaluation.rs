//! Basic evaluation example demonstrating core functionality.
//!
//! Run with `RUST_LOG=debug` to see per-element decoding and suppression logs.

use detect3d_eval::{
    load_config_from_str,
    metrics::iou::iou_3d,
    metrics::precision_recall::calculate_precision_recall,
    nms::{suppress, SatPredicate},
    EvaluationSession, OrientedBox3D,
};
use ndarray::{Array3, Array4};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== 3D Detection Evaluation Example ===\n");

    // Example 1: IoU Calculation
    println!("1. IoU Calculation");
    let car = OrientedBox3D::new([0.0, 0.0, 0.0], [4.0, 2.0, 1.5], 0.0);
    let shifted = OrientedBox3D::new([1.0, 0.3, 0.1], [4.0, 2.0, 1.5], 0.2);
    let iou = iou_3d(&car, &shifted);
    println!("   BEV IoU: {:.4}, 3D IoU: {:.4}", iou.iou_2d, iou.iou_3d);
    println!();

    // Example 2: Load configuration
    println!("2. Loading Configuration");
    let config = load_config_from_str(
        r#"{
            "score_threshold": 0.8,
            "nms": {"type": "sat"},
            "iou_thresholds": [0.5, 0.55, 0.6, 0.65, 0.7, 0.75, 0.8, 0.85, 0.9, 0.95]
        }"#,
    )?;
    println!("   Score threshold: {}", config.score_threshold);
    println!("   Suppression: {:?}", config.nms);
    println!("   IoU thresholds: {}", config.iou_thresholds.len());
    println!();

    // Example 3: Suppression
    println!("3. Suppressing Duplicate Candidates");
    let candidates = vec![car.clone(), shifted.clone(), OrientedBox3D::new([12.0, 0.0, 0.0], [4.0, 2.0, 1.5], 1.2)];
    let kept = suppress(&candidates, &SatPredicate);
    println!("   {} candidates -> {} after SAT suppression", candidates.len(), kept.len());
    println!();

    // Example 4: Full tensor pipeline
    println!("4. Evaluating a Raw Prediction Tensor");
    let mut prediction = Array4::<f32>::zeros((1, 32, 8, 8));
    let detections = [
        ((1, 1), 0.95, [0.0, 0.0, 0.0, 4.0, 2.0, 1.5, 0.0]),
        ((1, 2), 0.90, [0.4, 0.1, 0.0, 4.1, 2.0, 1.5, 0.05]),
        ((5, 5), 0.85, [20.0, 8.0, 0.0, 4.0, 2.0, 1.5, 1.0]),
        ((6, 2), 0.82, [-15.0, 3.0, 0.0, 4.0, 2.0, 1.5, 0.0]),
    ];
    for ((w, h), score, fields) in detections {
        prediction[[0, 1, w, h]] = score;
        for (k, value) in fields.into_iter().enumerate() {
            prediction[[0, 4 + k, w, h]] = value;
        }
    }

    let mut ground_truth = Array3::<f32>::zeros((1, 4, 8));
    let targets = [
        [0.0, 0.0, 0.0, 4.0, 2.0, 1.5, 0.0, 1.0],
        [20.2, 8.1, 0.0, 4.0, 2.0, 1.5, 1.0, 1.0],
        [35.0, -5.0, 0.0, 4.0, 2.0, 1.5, 0.0, 1.0],
    ];
    for (row, values) in targets.iter().enumerate() {
        for (k, &value) in values.iter().enumerate() {
            ground_truth[[0, row, k]] = value;
        }
    }

    let mut session = EvaluationSession::new(config)?;
    let kept = session.evaluate_prediction_tensor(prediction.view(), &ground_truth.view(), &[targets.len()])?;
    println!("   Boxes after suppression: {}", kept[0].len());
    println!("   {}", session.stats().summary_string());
    println!();

    // Example 5: Metrics
    println!("5. Metrics");
    let metrics = session.finish();
    println!("   Overall Metrics:");
    println!("   ├─ mAP (all IoU thresholds): {:.4}", metrics.map);
    println!("   ├─ AP50 (IoU=0.50): {:.4}", metrics.ap50.unwrap_or_default());
    println!("   └─ AP75 (IoU=0.75): {:.4}", metrics.ap75.unwrap_or_default());
    println!();
    println!("   IoU Threshold | Precision | Recall | F1 Score");
    println!("   --------------|-----------|--------|----------");
    for i in 0..metrics.precision_at_thresholds.len() {
        let (threshold, precision) = metrics.precision_at_thresholds[i];
        let (_, recall) = metrics.recall_at_thresholds[i];
        let (_, f1) = metrics.f1_at_thresholds[i];
        println!("   {:>12.2} | {:>9.4} | {:>6.4} | {:>8.4}", threshold, precision, recall, f1);
    }
    println!();

    // Example 6: Manual precision/recall
    println!("6. Computing Precision and Recall (Manual Example)");
    let pr = calculate_precision_recall(8, 10, 11, 0.01);
    println!("   For TP=8 over 10 predictions and 11 targets:");
    println!("   ├─ Precision: {:.4} (FP={})", pr.precision, pr.false_positives);
    println!("   └─ Recall: {:.4} (FN={})", pr.recall, pr.false_negatives);
    println!();

    println!("=== Example Complete ===");

    Ok(())
}
