use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use detect3d_eval::config::EvalConfig;
use detect3d_eval::decoder::decode;
use detect3d_eval::evaluator::EvaluationSession;
use detect3d_eval::geometry::{bev_corners, separating_axis_overlap};
use detect3d_eval::metrics::ap::calculate_ap;
use detect3d_eval::metrics::iou::{iou_3d, iou_matrix};
use detect3d_eval::nms::{suppress, IouPredicate, SatPredicate};
use detect3d_eval::types::OrientedBox3D;
use ndarray::Array4;

fn create_boxes(n: usize, spacing: f64) -> Vec<OrientedBox3D> {
    (0..n)
        .map(|i| {
            let offset = i as f64 * spacing;
            OrientedBox3D::new([offset, offset * 0.5, 0.0], [4.0, 2.0, 1.5], i as f64 * 0.1)
        })
        .collect()
}

fn bench_iou_calculation(c: &mut Criterion) {
    let box1 = OrientedBox3D::new([0.0, 0.0, 0.0], [4.0, 2.0, 1.5], 0.0);
    let box2 = OrientedBox3D::new([1.0, 0.5, 0.2], [4.2, 1.9, 1.6], 0.4);

    c.bench_function("iou_3d_single", |b| {
        b.iter(|| iou_3d(black_box(&box1), black_box(&box2)));
    });

    c.bench_function("sat_single", |b| {
        let a = bev_corners(&box1);
        let d = bev_corners(&box2);
        b.iter(|| separating_axis_overlap(black_box(&a), black_box(&d)));
    });
}

fn bench_iou_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("iou_matrix");

    for size in [10, 50, 100, 500].iter() {
        let boxes = create_boxes(*size, 1.0);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| iou_matrix(black_box(&boxes), black_box(&boxes)));
        });
    }
    group.finish();
}

fn bench_nms(c: &mut Criterion) {
    let mut group = c.benchmark_group("nms");

    for num_boxes in [10, 50, 100, 500].iter() {
        // half overlap their neighbour, so both accept and discard paths run
        let candidates = create_boxes(*num_boxes, 3.0);
        let iou = IouPredicate::new(0.01).unwrap();

        group.bench_with_input(BenchmarkId::new("sat", num_boxes), num_boxes, |b, _| {
            b.iter(|| suppress(black_box(&candidates), &SatPredicate));
        });
        group.bench_with_input(BenchmarkId::new("iou", num_boxes), num_boxes, |b, _| {
            b.iter(|| suppress(black_box(&candidates), &iou));
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for grid in [32, 128].iter() {
        let mut scores = Array4::<f32>::zeros((4, 4, *grid, *grid));
        let fields = Array4::<f32>::ones((4, 14, *grid, *grid));
        // roughly one cell in ten fires
        for ((_, channel, w, h), value) in scores.indexed_iter_mut() {
            if channel % 2 == 1 && (w * 7 + h * 3) % 10 == 0 {
                *value = 0.9;
            }
        }

        group.bench_with_input(BenchmarkId::from_parameter(grid), grid, |b, _| {
            b.iter(|| decode(black_box(&scores.view()), black_box(&fields.view()), 0.8));
        });
    }
    group.finish();
}

fn bench_ap_calculation(c: &mut Criterion) {
    let mut group = c.benchmark_group("ap_calculation");

    for num_detections in [10, 50, 100, 500].iter() {
        let precision: Vec<f64> = (0..*num_detections)
            .map(|i| 1.0 - (i as f64) / (*num_detections as f64))
            .collect();
        let recall: Vec<f64> = (0..*num_detections)
            .map(|i| (i as f64) / (*num_detections as f64))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(num_detections), num_detections, |b, _| {
            b.iter(|| calculate_ap(black_box(&precision), black_box(&recall)));
        });
    }
    group.finish();
}

fn bench_session(c: &mut Criterion) {
    let predictions = create_boxes(200, 3.0);
    let targets: Vec<_> = predictions.iter().cloned().map(|b| b.with_label(1)).collect();

    c.bench_function("session_step_and_metrics_200", |b| {
        b.iter(|| {
            let mut session = EvaluationSession::new(EvalConfig::default()).unwrap();
            session.evaluate_step(black_box(&predictions), black_box(&targets));
            session.compute_metrics()
        });
    });
}

criterion_group!(
    benches,
    bench_iou_calculation,
    bench_iou_matrix,
    bench_nms,
    bench_decode,
    bench_ap_calculation,
    bench_session,
);
criterion_main!(benches);
