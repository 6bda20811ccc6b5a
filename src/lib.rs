//! cloudlabel - 3D point cloud annotation core
//!
//! The data model, persistence and picking geometry behind an interactive
//! point cloud labeling tool. Annotations are oriented bounding boxes and
//! single labeled points; they can be stored in three interchange formats
//! (centroid JSON, vertex JSON and KITTI text).

pub mod config;
pub mod format;
pub mod geometry;
pub mod model;
pub mod picking;
pub mod store;

pub use config::LabelConfig;
pub use model::{AnnotationItem, BBox, Point};
pub use store::AnnotationStore;
