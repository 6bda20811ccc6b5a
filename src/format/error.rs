//! Error types for label format operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during label import/export.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No calibration file for a point cloud that requires a frame transform
    #[error(
        "no calibration file at {calib_path:?} for point cloud {pcd_name}; \
         use the untransformed KITTI format to load labels in the sensor frame"
    )]
    CalibrationNotFound {
        /// Path where the calibration file was expected
        calib_path: PathBuf,
        /// Name of the affected point cloud
        pcd_name: String,
    },

    /// Invalid file structure or content
    #[error("Invalid format: {message}")]
    InvalidFormat {
        /// Description of the format error
        message: String,
    },

    /// Required field is missing
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the missing field
        field: String,
    },
}

impl FormatError {
    /// Create an invalid format error with a message.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Whether this is the distinct missing-calibration condition that
    /// aborts a single file's import/export.
    pub fn is_calibration_not_found(&self) -> bool {
        matches!(self, Self::CalibrationNotFound { .. })
    }
}
