//! Average Precision (AP) and mean Average Precision (mAP) calculation.

use crate::metrics::precision_recall::interpolate_precision;
use crate::types::PrSeries;

/// Calculate Average Precision (AP) from a precision-recall curve.
///
/// Uses 101-point interpolation.
///
/// # Example
///
/// ```
/// use detect3d_eval::metrics::ap::calculate_ap;
///
/// let precisions = vec![1.0, 1.0, 0.67, 0.75, 0.6];
/// let recalls = vec![0.25, 0.5, 0.5, 0.75, 0.75];
/// let ap = calculate_ap(&precisions, &recalls);
/// assert!(ap >= 0.0 && ap <= 1.0);
/// ```
pub fn calculate_ap(precisions: &[f64], recalls: &[f64]) -> f64 {
    if precisions.is_empty() || recalls.is_empty() {
        return 0.0;
    }

    let interpolated = interpolate_precision(precisions, recalls);

    // Average over all 101 recall levels
    interpolated.iter().sum::<f64>() / interpolated.len() as f64
}

/// Average Precision of a recorded series.
///
/// The `(1, 0)` seed point only anchors plots and is left out, so a session
/// without predictions scores `0.0`.
pub fn calculate_series_ap(series: &PrSeries) -> f64 {
    let measured = series.points.get(1..).unwrap_or_default();
    let precisions: Vec<f64> = measured.iter().map(|p| p.precision).collect();
    let recalls: Vec<f64> = measured.iter().map(|p| p.recall).collect();
    calculate_ap(&precisions, &recalls)
}

/// Calculate mean Average Precision (mAP) across IoU thresholds.
///
/// # Example
///
/// ```
/// use detect3d_eval::metrics::ap::calculate_map;
///
/// let ap_values = vec![0.9, 0.85, 0.8, 0.75, 0.7, 0.65, 0.6, 0.55, 0.5, 0.45];
/// let map = calculate_map(&ap_values);
/// assert!((map - 0.675).abs() < 1e-10);
/// ```
pub fn calculate_map(ap_values: &[f64]) -> f64 {
    if ap_values.is_empty() {
        return 0.0;
    }

    ap_values.iter().sum::<f64>() / ap_values.len() as f64
}
