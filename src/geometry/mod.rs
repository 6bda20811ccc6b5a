//! Pure 3D math shared by the label codecs and the picking engine.

pub mod math3d;
pub mod ray;

pub use math3d::{
    abs_to_rel, box_vertices, rel_to_abs, rotation_matrix, rotations_from_matrix,
    vertices_to_rotations, wrap_degrees,
};
pub use ray::{BoxHit, BoxSide, Ray};
