//! Unit tests for the label format implementations.

mod kitti_tests;

use std::path::Path;

use crate::config::LabelConfig;

/// Config rooted in a temporary label folder.
pub(crate) fn test_config(label_folder: &Path) -> LabelConfig {
    LabelConfig::default().with_label_folder(label_folder)
}

pub(crate) fn assert_close(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() < eps, "{a} != {b} (eps {eps})");
}
