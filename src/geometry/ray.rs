//! Ray tests against oriented boxes and points.

use nalgebra::{Point3, Unit, Vector3};

use super::math3d::rotation_matrix;

/// One of the six faces of an oriented box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxSide {
    /// +x face (length direction)
    Right,
    /// -x face
    Left,
    /// +y face (width direction)
    Back,
    /// -y face
    Front,
    /// +z face (height direction)
    Top,
    /// -z face
    Bottom,
}

impl BoxSide {
    /// Indices into the box vertex array for the four corners of this face.
    pub fn corner_indices(&self) -> [usize; 4] {
        match self {
            BoxSide::Right => [2, 3, 7, 6],
            BoxSide::Left => [0, 1, 5, 4],
            BoxSide::Back => [1, 2, 6, 5],
            BoxSide::Front => [0, 3, 7, 4],
            BoxSide::Top => [4, 5, 6, 7],
            BoxSide::Bottom => [0, 1, 2, 3],
        }
    }

    fn from_axis(axis: usize, positive: bool) -> Self {
        match (axis, positive) {
            (0, true) => BoxSide::Right,
            (0, false) => BoxSide::Left,
            (1, true) => BoxSide::Back,
            (1, false) => BoxSide::Front,
            (2, true) => BoxSide::Top,
            _ => BoxSide::Bottom,
        }
    }
}

/// Intersection of a ray with an oriented box.
#[derive(Debug, Clone, Copy)]
pub struct BoxHit {
    /// Distance along the ray to the entry point
    pub t: f64,
    /// Face through which the ray enters the box
    pub side: BoxSide,
}

/// A half-line in world space.
#[derive(Debug, Clone)]
pub struct Ray {
    pub origin: Point3<f64>,
    pub direction: Unit<Vector3<f64>>,
}

impl Ray {
    /// Ray from `origin` towards `target`.
    pub fn through_points(origin: Point3<f64>, target: Point3<f64>) -> Self {
        Self {
            origin,
            direction: Unit::new_normalize(target - origin),
        }
    }

    /// Slab test against an oriented box given by centroid, dimensions
    /// (length, width, height) and per-axis rotations in degrees.
    ///
    /// Returns the entry distance and entry face, or `None` if the ray
    /// misses or the box lies entirely behind the origin.
    pub fn intersect_box(
        &self,
        center: &Point3<f64>,
        dimensions: (f64, f64, f64),
        rotations: (f64, f64, f64),
    ) -> Option<BoxHit> {
        let rotation = rotation_matrix(rotations.0, rotations.1, rotations.2);
        // Transform the ray into the box-local frame.
        let local_origin = rotation.inverse() * (self.origin - center);
        let local_dir = rotation.inverse() * self.direction.into_inner();

        let half = [dimensions.0 / 2.0, dimensions.1 / 2.0, dimensions.2 / 2.0];

        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;
        let mut entry_axis = 0;
        let mut entry_positive = false;

        for axis in 0..3 {
            let o = local_origin[axis];
            let d = local_dir[axis];
            if d.abs() < 1e-12 {
                if o.abs() > half[axis] {
                    return None;
                }
                continue;
            }
            let t1 = (-half[axis] - o) / d;
            let t2 = (half[axis] - o) / d;
            let (near, far) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
            if near > t_min {
                t_min = near;
                entry_axis = axis;
                // Entering from the side the ray travels towards negatively.
                entry_positive = d < 0.0;
            }
            t_max = t_max.min(far);
        }

        if t_max < t_min.max(0.0) {
            return None;
        }

        Some(BoxHit {
            t: t_min.max(0.0),
            side: BoxSide::from_axis(entry_axis, entry_positive),
        })
    }

    /// Parameter of the closest approach to `point` and the distance there.
    pub fn distance_to_point(&self, point: &Point3<f64>) -> (f64, f64) {
        let t = (point - self.origin).dot(&self.direction);
        let closest = self.origin + self.direction.into_inner() * t;
        (t, (point - closest).norm())
    }
}
