//! Sweep the decoder score threshold and report mAP at each setting.

use detect3d_eval::{generate_threshold_range, EvalConfig, EvaluationSession};
use ndarray::{Array3, Array4};

/// A synthetic scene: cars on a line, detected with decreasing confidence,
/// plus spurious low-confidence detections in between.
fn scene() -> (Array4<f32>, Array3<f32>, usize) {
    let cars = 8;
    let mut prediction = Array4::<f32>::zeros((1, 32, 16, 16));
    let mut ground_truth = Array3::<f32>::zeros((1, cars, 8));

    for i in 0..cars {
        let x = i as f32 * 10.0;
        let row = [x, 0.0, 0.0, 4.0, 2.0, 1.5, 0.1 * i as f32, 1.0];
        for (k, &value) in row.iter().enumerate() {
            ground_truth[[0, i, k]] = value;
        }

        // true detection
        prediction[[0, 1, i, 0]] = 0.99 - 0.05 * i as f32;
        for k in 0..7 {
            prediction[[0, 4 + k, i, 0]] = row[k];
        }
        prediction[[0, 4, i, 0]] += 0.3;

        // spurious detection between cars
        prediction[[0, 1, i, 8]] = 0.9 - 0.1 * i as f32;
        prediction[[0, 4, i, 8]] = x + 5.0;
        prediction[[0, 5, i, 8]] = 6.0;
        prediction[[0, 7, i, 8]] = 2.0;
        prediction[[0, 8, i, 8]] = 2.0;
        prediction[[0, 9, i, 8]] = 1.5;
    }

    (prediction, ground_truth, cars)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== Score Threshold Sweep ===\n");

    let (prediction, ground_truth, cars) = scene();
    let thresholds = generate_threshold_range(0.0, 0.9, 10)?;

    println!("   Score | Kept |    mAP |   AP50 | Recall@0.5");
    println!("   ------|------|--------|--------|-----------");

    let mut best = (0.0, f64::NEG_INFINITY);
    for score_threshold in thresholds {
        let config = EvalConfig {
            score_threshold,
            ..EvalConfig::default()
        };
        let mut session = EvaluationSession::new(config)?;
        let kept = session.evaluate_prediction_tensor(prediction.view(), &ground_truth.view(), &[cars])?;
        let metrics = session.compute_metrics();

        let recall = metrics.recall_at_thresholds.first().map_or(0.0, |&(_, r)| r);
        println!(
            "   {:>5.2} | {:>4} | {:>6.4} | {:>6.4} | {:>9.4}",
            score_threshold,
            kept[0].len(),
            metrics.map,
            metrics.ap50.unwrap_or_default(),
            recall
        );

        if metrics.map > best.1 {
            best = (score_threshold, metrics.map);
        }
    }

    println!();
    println!("   Best score threshold: {:.2} (mAP {:.4})", best.0, best.1);

    Ok(())
}
