//! Single labeled point annotation.

use nalgebra::{Point3, Vector3};

/// A labeled point in the cloud.
///
/// `point_id` optionally back-references the index of the nearest raw cloud
/// sample. It is a non-owning association used by picking and by the
/// keypoint export; the cloud itself lives elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    coords: Point3<f64>,
    classname: String,
    pub point_id: Option<usize>,
}

impl Point {
    pub fn new(coords: Point3<f64>, classname: impl Into<String>) -> Self {
        Self {
            coords,
            classname: classname.into(),
            point_id: None,
        }
    }

    /// Attach the index of the cloud sample this point was snapped to.
    pub fn with_point_id(mut self, point_id: usize) -> Self {
        self.point_id = Some(point_id);
        self
    }

    pub fn coords(&self) -> Point3<f64> {
        self.coords
    }

    pub fn set_coords(&mut self, coords: Point3<f64>) {
        self.coords = coords;
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

    pub fn translate(&mut self, offset: Vector3<f64>) {
        self.coords += offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate() {
        let mut point = Point::new(Point3::new(1.0, 2.0, 3.0), "tree");
        point.translate(Vector3::new(0.5, -0.5, 0.0));
        assert_eq!(point.coords(), Point3::new(1.5, 1.5, 3.0));
    }

    #[test]
    fn test_point_id_association() {
        let point = Point::new(Point3::origin(), "tree").with_point_id(42);
        assert_eq!(point.point_id, Some(42));
    }
}
