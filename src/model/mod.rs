//! Annotation value types.

mod bbox;
mod item;
mod point;

pub use bbox::{BBox, KittiMeta};
pub use item::AnnotationItem;
pub use point::Point;
