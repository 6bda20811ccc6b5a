//! Label format implementations.

mod centroid;
mod kitti;
mod vertices;

#[cfg(test)]
mod tests;

pub use centroid::CentroidFormat;
pub use kitti::KittiFormat;
pub use vertices::VerticesFormat;
