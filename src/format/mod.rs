//! Label import/export system.
//!
//! A trait-based codec layer over the three on-disk label formats. Each
//! format implements [`LabelFormat`] for bidirectional conversion between
//! the annotation items and its file layout, keyed by the point cloud path.
//!
//! ## Supported formats
//!
//! - **Centroid JSON**: center + dimensions + rotations (absolute or
//!   relative rotation variant)
//! - **Vertex JSON**: eight corner vertices per box, plus a keypoint
//!   artifact for point items
//! - **KITTI TXT**: 15-token KITTI lines with an optional camera frame
//!   transform, plus a point extension line

pub mod calib;
mod error;
pub mod formats;
mod registry;
mod traits;

pub use calib::{CalibCache, CalibTransforms};
pub use error::FormatError;
pub use formats::{CentroidFormat, KittiFormat, VerticesFormat};
pub use registry::FormatRegistry;
pub use traits::{ExportSummary, LabelFormat};
