//! JSON loading utilities for evaluation configuration.

use crate::config::EvalConfig;
use crate::error::Result;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load an evaluation configuration from a JSON file.
///
/// Missing fields take their defaults; the result is validated.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or fails validation.
///
/// # Example
///
/// ```no_run
/// use detect3d_eval::loader::load_config_from_file;
///
/// let config = load_config_from_file("eval.json").unwrap();
/// println!("Evaluating at {} IoU thresholds", config.iou_thresholds.len());
/// ```
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> Result<EvalConfig> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let config: EvalConfig = serde_json::from_reader(reader)?;

    config.validate()?;

    Ok(config)
}

/// Load an evaluation configuration from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON cannot be parsed or fails validation.
///
/// # Example
///
/// ```
/// use detect3d_eval::loader::load_config_from_str;
///
/// let config = load_config_from_str(r#"{"iou_thresholds": [0.5, 0.7]}"#).unwrap();
/// assert_eq!(config.iou_thresholds, vec![0.5, 0.7]);
/// ```
pub fn load_config_from_str(json_str: &str) -> Result<EvalConfig> {
    let config: EvalConfig = serde_json::from_str(json_str)?;
    config.validate()?;
    Ok(config)
}
