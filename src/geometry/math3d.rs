//! Rotation conversions and oriented-box vertex math.
//!
//! Rotation angles are stored internally as absolute degrees in `[0, 360)`
//! per axis. Label files may instead carry rotations relative to the x-axis
//! in radians within `(-pi, pi]`; [`abs_to_rel`] and [`rel_to_abs`] convert
//! between the two representations and are exact inverses mod 2pi.
//!
//! The full rotation of a box is `Rz * Ry * Rx` applied about its centroid.

use std::f64::consts::PI;

use nalgebra::{Matrix3, Point3, Rotation3, Vector3};

/// Corner sign pattern for an axis-aligned box, in file order.
///
/// Index 0 is the `(-x, -y, -z)` corner; the bottom face is `0..=3` counter
/// clockwise, the top face `4..=7` directly above it. The vertex label
/// formats rely on this exact ordering.
pub const CORNER_SIGNS: [[f64; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [1.0, 1.0, -1.0],
    [1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, -1.0, 1.0],
];

/// Wrap an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}

/// Convert an absolute rotation in `[0, 360)` degrees into a relative
/// rotation in `(-pi, pi]` radians from the x-axis.
pub fn abs_to_rel(abs_rotation: f64) -> f64 {
    let mut rel_rotation = abs_rotation.to_radians();
    if rel_rotation > PI {
        rel_rotation -= 2.0 * PI;
    }
    rel_rotation
}

/// Convert a relative rotation in `(-pi, pi]` radians into an absolute
/// rotation in `[0, 360)` degrees from the x-axis.
pub fn rel_to_abs(rel_rotation: f64) -> f64 {
    let mut abs_rotation = rel_rotation.to_degrees();
    if abs_rotation < 0.0 {
        abs_rotation += 360.0;
    }
    abs_rotation
}

/// Rotation matrix `Rz * Ry * Rx` for per-axis angles in degrees.
pub fn rotation_matrix(x_angle: f64, y_angle: f64, z_angle: f64) -> Rotation3<f64> {
    Rotation3::from_euler_angles(
        x_angle.to_radians(),
        y_angle.to_radians(),
        z_angle.to_radians(),
    )
}

/// Recover per-axis angles in `[0, 360)` degrees from a rotation matrix.
///
/// Inverse of [`rotation_matrix`] for y-rotations away from the +-90 degree
/// gimbal singularity.
pub fn rotations_from_matrix(m: &Matrix3<f64>) -> (f64, f64, f64) {
    let x_angle = m[(2, 1)].atan2(m[(2, 2)]);
    let y_angle = (-m[(2, 0)]).atan2((m[(2, 1)].powi(2) + m[(2, 2)].powi(2)).sqrt());
    let z_angle = m[(1, 0)].atan2(m[(0, 0)]);
    (
        wrap_degrees(x_angle.to_degrees()),
        wrap_degrees(y_angle.to_degrees()),
        wrap_degrees(z_angle.to_degrees()),
    )
}

/// The eight corner vertices of an oriented box, in [`CORNER_SIGNS`] order.
pub fn box_vertices(
    center: &Point3<f64>,
    dimensions: (f64, f64, f64),
    rotations: (f64, f64, f64),
) -> [Point3<f64>; 8] {
    let (length, width, height) = dimensions;
    let rotation = rotation_matrix(rotations.0, rotations.1, rotations.2);
    CORNER_SIGNS.map(|[sx, sy, sz]| {
        let local = Vector3::new(sx * length / 2.0, sy * width / 2.0, sz * height / 2.0);
        center + rotation * local
    })
}

/// Recover the per-axis rotation angles of a box from its eight vertices.
///
/// The vertices must follow the [`CORNER_SIGNS`] winding; the box frame is
/// read off the edges at vertex 0 (length towards vertex 3, width towards
/// vertex 1, height towards vertex 4). Degenerate edges or an unexpected
/// winding leave the result undefined; this is a precondition on the input
/// file, not a validated error.
pub fn vertices_to_rotations(vertices: &[Point3<f64>; 8]) -> (f64, f64, f64) {
    let length_axis = (vertices[3] - vertices[0]).normalize();
    let width_axis = (vertices[1] - vertices[0]).normalize();
    let height_axis = (vertices[4] - vertices[0]).normalize();
    let rotation = Matrix3::from_columns(&[length_axis, width_axis, height_axis]);
    rotations_from_matrix(&rotation)
}
