//! Trait definition for label format implementations.

use std::path::{Path, PathBuf};

use crate::format::error::FormatError;
use crate::model::AnnotationItem;

/// A paired import/export implementation for one on-disk label format.
///
/// Formats are keyed by the point cloud path: the label file shares the
/// cloud's file stem and lives in the configured label folder. A missing
/// label file is not an error; import returns an empty list.
pub trait LabelFormat {
    /// Unique identifier (e.g. "centroid_abs", "vertices", "kitti").
    fn id(&self) -> &'static str;

    /// Human-readable name for UI display.
    fn display_name(&self) -> &'static str;

    /// File extension of the label files, including the dot.
    fn file_ending(&self) -> &'static str;

    /// Read the labels stored for `pcd_path`.
    fn import(&self, pcd_path: &Path) -> Result<Vec<AnnotationItem>, FormatError>;

    /// Write `items` as the labels for `pcd_path`.
    fn export(
        &self,
        items: &[AnnotationItem],
        pcd_path: &Path,
    ) -> Result<ExportSummary, FormatError>;
}

/// Result of an export operation.
#[derive(Debug, Default)]
pub struct ExportSummary {
    /// Number of annotations written
    pub items_exported: usize,

    /// Files created during export
    pub files_created: Vec<PathBuf>,

    /// Warnings generated during export (e.g. skipped items)
    pub warnings: Vec<String>,
}

impl ExportSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Path of the label file belonging to `pcd_path`.
pub(crate) fn label_path(label_folder: &Path, pcd_path: &Path, ending: &str) -> PathBuf {
    let stem = pcd_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    label_folder.join(format!("{stem}{ending}"))
}

/// Write a label file, creating the label folder if needed.
pub(crate) fn write_label_file(path: &Path, contents: &str) -> Result<(), FormatError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}
