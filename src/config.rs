//! Configuration for the annotation core.
//!
//! All tunables (class names, rounding precision, label folders) are carried
//! in an explicit [`LabelConfig`] value that is passed into store, codec and
//! picking construction. Nothing in the crate reads ambient global state.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Current configuration file format version.
pub const CONFIG_VERSION: u32 = 1;

/// Configuration shared by the annotation store and the label codecs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Version of the configuration file format
    #[serde(default = "default_version")]
    pub version: u32,

    /// Name written into the `annotator` header field of exported files
    #[serde(default = "default_annotator")]
    pub annotator: String,

    /// Class assigned to newly created annotations
    #[serde(default = "default_class")]
    pub default_class: String,

    /// Known class names, in dropdown order
    #[serde(default)]
    pub classes: Vec<String>,

    /// Lower bound for each bounding box dimension
    #[serde(default = "default_min_dimension")]
    pub min_dimension: f64,

    /// Number of decimal places for numbers written to label files
    #[serde(default = "default_export_precision")]
    pub export_precision: usize,

    /// Folder where label files are read from and written to
    #[serde(default)]
    pub label_folder: PathBuf,

    /// Folder holding per-frame KITTI calibration files
    #[serde(default)]
    pub calib_folder: PathBuf,

    /// Store rotations relative to the x-axis (radians) instead of absolute
    #[serde(default)]
    pub relative_rotation: bool,

    /// Transform KITTI labels between camera and sensor frame
    #[serde(default = "default_true")]
    pub kitti_transformed: bool,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_annotator() -> String {
    "default_annotator".to_string()
}

fn default_class() -> String {
    "cart".to_string()
}

fn default_min_dimension() -> f64 {
    0.01
}

fn default_export_precision() -> usize {
    3
}

fn default_true() -> bool {
    true
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            annotator: default_annotator(),
            default_class: default_class(),
            classes: vec![default_class()],
            min_dimension: default_min_dimension(),
            export_precision: default_export_precision(),
            label_folder: PathBuf::from("labels"),
            calib_folder: PathBuf::from("calib"),
            relative_rotation: false,
            kitti_transformed: true,
        }
    }
}

impl LabelConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the label folder.
    pub fn with_label_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.label_folder = folder.into();
        self
    }

    /// Set the calibration folder.
    pub fn with_calib_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.calib_folder = folder.into();
        self
    }

    /// Enable or disable relative rotation storage.
    pub fn with_relative_rotation(mut self, relative: bool) -> Self {
        self.relative_rotation = relative;
        self
    }

    /// Set the number of decimal places for exported numbers.
    pub fn with_export_precision(mut self, precision: usize) -> Self {
        self.export_precision = precision;
        self
    }

    /// Round a value to the configured export precision.
    pub fn round_dec(&self, value: f64) -> f64 {
        let factor = 10f64.powi(self.export_precision as i32);
        (value * factor).round() / factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_dec() {
        let config = LabelConfig::default();
        assert_eq!(config.round_dec(1.23456), 1.235);

        let precise = LabelConfig::default().with_export_precision(6);
        assert_eq!(precise.round_dec(0.1234564), 0.123456);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = LabelConfig::default()
            .with_label_folder("my_labels")
            .with_relative_rotation(true);

        let json = serde_json::to_string(&config).unwrap();
        let loaded: LabelConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded.label_folder, PathBuf::from("my_labels"));
        assert!(loaded.relative_rotation);
        assert_eq!(loaded.export_precision, 3);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let loaded: LabelConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(loaded.default_class, "cart");
        assert_eq!(loaded.min_dimension, 0.01);
        assert!(loaded.kitti_transformed);
    }
}
