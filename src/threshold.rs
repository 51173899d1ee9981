//! IoU and score threshold utilities.

use crate::error::{Detect3dError, Result};

/// Default evaluation IoU thresholds: 0.50 to 0.95 in steps of 0.05.
///
/// # Example
///
/// ```
/// use detect3d_eval::threshold::default_iou_thresholds;
///
/// let thresholds = default_iou_thresholds();
/// assert_eq!(thresholds.len(), 10);
/// assert_eq!(thresholds[0], 0.5);
/// assert_eq!(thresholds[9], 0.95);
/// ```
pub fn default_iou_thresholds() -> Vec<f64> {
    (0..10).map(|i| f64::from(50 + 5 * i) / 100.0).collect()
}

/// Generate a range of threshold values for evaluation.
///
/// # Arguments
///
/// * `start` - Starting threshold value (inclusive)
/// * `end` - Ending threshold value (inclusive)
/// * `steps` - Number of threshold values to generate
///
/// # Returns
///
/// Returns a vector of evenly-spaced threshold values.
///
/// # Example
///
/// ```
/// use detect3d_eval::threshold::generate_threshold_range;
///
/// let thresholds = generate_threshold_range(0.5, 0.95, 10).unwrap();
/// assert_eq!(thresholds.len(), 10);
/// assert_eq!(thresholds[0], 0.5);
/// assert!((thresholds[9] - 0.95).abs() < 1e-12);
/// ```
pub fn generate_threshold_range(start: f64, end: f64, steps: usize) -> Result<Vec<f64>> {
    if steps == 0 {
        return Err(Detect3dError::InvalidThreshold(
            "Number of steps must be greater than 0".to_string(),
        ));
    }

    validate_threshold(start, "start")?;
    validate_threshold(end, "end")?;

    if start > end {
        return Err(Detect3dError::InvalidThreshold(format!(
            "Start threshold ({start}) must be <= end threshold ({end})"
        )));
    }

    if steps == 1 {
        return Ok(vec![start]);
    }

    let step_size = (end - start) / (steps - 1) as f64;
    Ok((0..steps).map(|i| start + step_size * i as f64).collect())
}

/// Validate that a threshold is finite and in the range [0.0, 1.0].
pub fn validate_threshold(threshold: f64, name: &str) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(Detect3dError::InvalidThreshold(format!(
            "{name} threshold must be between 0.0 and 1.0, got {threshold}"
        )));
    }
    Ok(())
}

/// Validate an evaluation IoU threshold ladder.
pub fn validate_iou_thresholds(thresholds: &[f64]) -> Result<()> {
    if thresholds.is_empty() {
        return Err(Detect3dError::InvalidThreshold(
            "At least one IoU threshold is required".to_string(),
        ));
    }
    for &threshold in thresholds {
        validate_threshold(threshold, "IoU")?;
    }
    Ok(())
}
