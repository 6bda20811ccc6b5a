//! Oriented bounding box annotation.

use nalgebra::{Point3, Vector3};

use crate::geometry::{box_vertices, wrap_degrees, BoxSide};

/// Pass-through metadata from a KITTI label line.
///
/// KITTI lines carry fields the annotation tool does not edit (truncation,
/// occlusion, observation angle, 2D bbox). They are kept verbatim as the
/// original tokens and written back unchanged on export; only the geometric
/// fields and the class name are regenerated from the box state.
#[derive(Debug, Clone, PartialEq)]
pub struct KittiMeta {
    pub object_type: String,
    pub truncated: String,
    pub occluded: String,
    pub alpha: String,
    pub bbox_2d: String,
    pub dimensions: String,
    pub location: String,
    pub rotation_y: String,
}

impl Default for KittiMeta {
    fn default() -> Self {
        Self {
            object_type: String::new(),
            truncated: "0".to_string(),
            occluded: "0".to_string(),
            alpha: "0".to_string(),
            bbox_2d: "0 0 0 0".to_string(),
            dimensions: "0 0 0".to_string(),
            location: "0 0 0".to_string(),
            rotation_y: "0".to_string(),
        }
    }
}

/// An oriented 3D bounding box.
///
/// The box is defined by its geometric center, its dimensions (length along
/// x, width along y, height along z before rotation) and absolute per-axis
/// rotation angles in `[0, 360)` degrees. Corner vertices are a derived
/// view, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct BBox {
    center: Point3<f64>,
    length: f64,
    width: f64,
    height: f64,
    rotations: (f64, f64, f64),
    classname: String,
    /// Metadata carried through from a KITTI import, if any.
    pub kitti_meta: Option<KittiMeta>,
}

impl BBox {
    /// Create an axis-aligned box with the given center and dimensions.
    pub fn new(
        center: Point3<f64>,
        dimensions: (f64, f64, f64),
        classname: impl Into<String>,
    ) -> Self {
        Self {
            center,
            length: dimensions.0,
            width: dimensions.1,
            height: dimensions.2,
            rotations: (0.0, 0.0, 0.0),
            classname: classname.into(),
            kitti_meta: None,
        }
    }

    /// Set the rotation angles, builder style. Angles in degrees.
    pub fn with_rotations(mut self, x: f64, y: f64, z: f64) -> Self {
        self.set_rotations(x, y, z);
        self
    }

    pub fn center(&self) -> Point3<f64> {
        self.center
    }

    pub fn set_center(&mut self, center: Point3<f64>) {
        self.center = center;
    }

    /// Dimensions as (length, width, height).
    pub fn dimensions(&self) -> (f64, f64, f64) {
        (self.length, self.width, self.height)
    }

    /// Set the dimensions, clamping each to `min_dimension`.
    pub fn set_dimensions(&mut self, length: f64, width: f64, height: f64, min_dimension: f64) {
        self.length = length.max(min_dimension);
        self.width = width.max(min_dimension);
        self.height = height.max(min_dimension);
    }

    /// Absolute rotation angles in degrees, `[0, 360)` per axis.
    pub fn rotations(&self) -> (f64, f64, f64) {
        self.rotations
    }

    /// Set the absolute rotation angles (degrees, wrapped into `[0, 360)`).
    pub fn set_rotations(&mut self, x: f64, y: f64, z: f64) {
        self.rotations = (wrap_degrees(x), wrap_degrees(y), wrap_degrees(z));
    }

    pub fn z_rotation(&self) -> f64 {
        self.rotations.2
    }

    pub fn set_z_rotation(&mut self, angle: f64) {
        self.rotations.2 = wrap_degrees(angle);
    }

    pub fn classname(&self) -> &str {
        &self.classname
    }

    /// Set the class name; an empty name is ignored.
    pub fn set_classname(&mut self, classname: &str) {
        if !classname.is_empty() {
            self.classname = classname.to_string();
        }
    }

    /// Move the box center by the given offset.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        self.center += offset;
    }

    /// The eight corner vertices, derived from center/dimensions/rotations.
    pub fn vertices(&self) -> [Point3<f64>; 8] {
        box_vertices(&self.center, self.dimensions(), self.rotations)
    }

    /// The four corner vertices of one face, for side highlighting.
    pub fn side_vertices(&self, side: BoxSide) -> [Point3<f64>; 4] {
        let vertices = self.vertices();
        side.corner_indices().map(|i| vertices[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotations_wrap() {
        let mut bbox = BBox::new(Point3::origin(), (1.0, 1.0, 1.0), "cart");
        bbox.set_rotations(-90.0, 370.0, 720.0);
        assert_eq!(bbox.rotations(), (270.0, 10.0, 0.0));
    }

    #[test]
    fn test_empty_classname_ignored() {
        let mut bbox = BBox::new(Point3::origin(), (1.0, 1.0, 1.0), "cart");
        bbox.set_classname("");
        assert_eq!(bbox.classname(), "cart");
        bbox.set_classname("tree");
        assert_eq!(bbox.classname(), "tree");
    }

    #[test]
    fn test_dimensions_clamped() {
        let mut bbox = BBox::new(Point3::origin(), (1.0, 1.0, 1.0), "cart");
        bbox.set_dimensions(0.0, -1.0, 2.0, 0.01);
        assert_eq!(bbox.dimensions(), (0.01, 0.01, 2.0));
    }

    #[test]
    fn test_vertices_of_unit_box() {
        let bbox = BBox::new(Point3::new(1.0, 2.0, 3.0), (2.0, 2.0, 2.0), "cart");
        let vertices = bbox.vertices();
        assert_eq!(vertices[0], Point3::new(0.0, 1.0, 2.0));
        assert_eq!(vertices[6], Point3::new(2.0, 3.0, 4.0));
    }
}
