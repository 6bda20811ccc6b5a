//! Tagged union over the two annotation kinds.

use nalgebra::Vector3;

use super::{BBox, Point};

/// A single annotation: either an oriented box or a labeled point.
///
/// Codec and store logic match exhaustively on this enum; there are no
/// runtime type tests anywhere in the crate.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationItem {
    BBox(BBox),
    Point(Point),
}

impl AnnotationItem {
    pub fn classname(&self) -> &str {
        match self {
            AnnotationItem::BBox(bbox) => bbox.classname(),
            AnnotationItem::Point(point) => point.classname(),
        }
    }

    /// Set the class name; an empty name is ignored.
    pub fn set_classname(&mut self, classname: &str) {
        match self {
            AnnotationItem::BBox(bbox) => bbox.set_classname(classname),
            AnnotationItem::Point(point) => point.set_classname(classname),
        }
    }

    /// Move the annotation by the given offset.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        match self {
            AnnotationItem::BBox(bbox) => bbox.translate(offset),
            AnnotationItem::Point(point) => point.translate(offset),
        }
    }

    pub fn is_bbox(&self) -> bool {
        matches!(self, AnnotationItem::BBox(_))
    }

    pub fn as_bbox(&self) -> Option<&BBox> {
        match self {
            AnnotationItem::BBox(bbox) => Some(bbox),
            AnnotationItem::Point(_) => None,
        }
    }

    pub fn as_bbox_mut(&mut self) -> Option<&mut BBox> {
        match self {
            AnnotationItem::BBox(bbox) => Some(bbox),
            AnnotationItem::Point(_) => None,
        }
    }

    pub fn as_point(&self) -> Option<&Point> {
        match self {
            AnnotationItem::BBox(_) => None,
            AnnotationItem::Point(point) => Some(point),
        }
    }
}

impl From<BBox> for AnnotationItem {
    fn from(bbox: BBox) -> Self {
        AnnotationItem::BBox(bbox)
    }
}

impl From<Point> for AnnotationItem {
    fn from(point: Point) -> Self {
        AnnotationItem::Point(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_shared_capabilities() {
        let mut item: AnnotationItem =
            BBox::new(Point3::origin(), (1.0, 1.0, 1.0), "cart").into();
        assert_eq!(item.classname(), "cart");

        item.set_classname("chair");
        assert_eq!(item.classname(), "chair");

        item.translate(Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(
            item.as_bbox().unwrap().center(),
            Point3::new(1.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_variant_access() {
        let item: AnnotationItem = Point::new(Point3::origin(), "tree").into();
        assert!(!item.is_bbox());
        assert!(item.as_bbox().is_none());
        assert!(item.as_point().is_some());
    }
}
