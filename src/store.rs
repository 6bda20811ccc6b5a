//! The annotation store.
//!
//! Holds the ordered list of annotations for the currently loaded point
//! cloud frame and the single "active" item that edit operations apply to.
//! Insertion order is display order and keyboard-stepping order.
//!
//! Invalid indices and operations without an active item never fail; they
//! leave the store unchanged and report back through `bool`/`Option` so the
//! interactive layer can show a message and do nothing.

use nalgebra::Vector3;

use crate::model::AnnotationItem;

/// Ordered collection of annotations with an optional active selection.
///
/// Invariant: if the active index is set, it lies in `0..items.len()`.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    items: Vec<AnnotationItem>,
    active_index: Option<usize>,
}

impl AnnotationStore {
    /// Create an empty store for a freshly loaded frame.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[AnnotationItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn has_active(&self) -> bool {
        self.get_active().is_some()
    }

    /// Append an item and make it the active one.
    pub fn add(&mut self, item: impl Into<AnnotationItem>) {
        self.items.push(item.into());
        self.active_index = Some(self.items.len() - 1);
        log::debug!("Added annotation, {} items in store", self.items.len());
    }

    /// Select the item at `index`. Out-of-range indices leave the current
    /// selection untouched and return `false`.
    pub fn set_active(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.active_index = Some(index);
            true
        } else {
            false
        }
    }

    /// Clear the selection without touching the items.
    pub fn deselect(&mut self) {
        self.active_index = None;
    }

    pub fn get_active(&self) -> Option<&AnnotationItem> {
        self.items.get(self.active_index?)
    }

    pub fn get_active_mut(&mut self) -> Option<&mut AnnotationItem> {
        self.items.get_mut(self.active_index?)
    }

    /// Remove the active item.
    ///
    /// The cursor keeps its numeric position, so the item that followed the
    /// deleted one becomes active. Deleting the last element moves the
    /// cursor to the new last element, or clears it on an empty store.
    /// Returns the removed item, or `None` when nothing was active.
    pub fn delete_active(&mut self) -> Option<AnnotationItem> {
        let index = self.active_index?;
        if index >= self.items.len() {
            self.active_index = None;
            return None;
        }

        let removed = self.items.remove(index);
        self.active_index = if self.items.is_empty() {
            None
        } else if index >= self.items.len() {
            Some(self.items.len() - 1)
        } else {
            Some(index)
        };
        log::debug!("Deleted annotation, {} items remain", self.items.len());
        Some(removed)
    }

    /// Step the selection by `step` items. Stepping past the last index
    /// jumps to the first, stepping below the first jumps to the last.
    /// No-op on an empty store; on a store with no selection the step is
    /// taken from the first item.
    pub fn select_relative(&mut self, step: isize) {
        if self.items.is_empty() {
            return;
        }
        let len = self.items.len() as isize;
        let next = self.active_index.unwrap_or(0) as isize + step;
        let next = if (0..len).contains(&next) {
            next
        } else if step > 0 {
            0
        } else {
            len - 1
        };
        self.active_index = Some(next as usize);
    }

    /// Replace all items, e.g. after a codec import or label propagation
    /// from the previous frame. Nothing is selected afterwards; the caller
    /// selects explicitly.
    pub fn set_items(&mut self, items: Vec<AnnotationItem>) {
        self.items = items;
        self.active_index = None;
    }

    /// Clear items and selection, used on frame change before repopulation.
    pub fn reset(&mut self) {
        self.items.clear();
        self.active_index = None;
    }

    /// Rename the active item. Returns `false` when nothing is active.
    pub fn set_active_classname(&mut self, classname: &str) -> bool {
        match self.get_active_mut() {
            Some(item) => {
                item.set_classname(classname);
                true
            }
            None => false,
        }
    }

    /// Translate the active item. Returns `false` when nothing is active.
    pub fn translate_active(&mut self, offset: Vector3<f64>) -> bool {
        match self.get_active_mut() {
            Some(item) => {
                item.translate(offset);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Point};
    use nalgebra::Point3;

    fn bbox(name: &str) -> BBox {
        BBox::new(Point3::origin(), (1.0, 1.0, 1.0), name)
    }

    fn store_with(names: &[&str]) -> AnnotationStore {
        let mut store = AnnotationStore::new();
        for name in names {
            store.add(bbox(name));
        }
        store
    }

    #[test]
    fn test_add_selects_new_item() {
        let mut store = AnnotationStore::new();
        assert!(!store.has_active());

        store.add(bbox("a"));
        assert_eq!(store.active_index(), Some(0));

        store.add(Point::new(Point3::origin(), "b"));
        assert_eq!(store.active_index(), Some(1));
        assert_eq!(store.get_active().unwrap().classname(), "b");
    }

    #[test]
    fn test_set_active_out_of_range_is_noop() {
        let mut store = store_with(&["a", "b"]);
        store.set_active(0);
        assert!(!store.set_active(2));
        assert_eq!(store.active_index(), Some(0));
    }

    #[test]
    fn test_delete_keeps_cursor_position() {
        let mut store = store_with(&["a", "b", "c"]);
        store.set_active(1);

        let removed = store.delete_active().unwrap();
        assert_eq!(removed.classname(), "b");
        // "c" shifted into the deleted slot and is now active.
        assert_eq!(store.active_index(), Some(1));
        assert_eq!(store.get_active().unwrap().classname(), "c");
    }

    #[test]
    fn test_delete_last_element_moves_cursor_back() {
        let mut store = store_with(&["a", "b", "c"]);
        store.set_active(2);
        store.delete_active();
        assert_eq!(store.active_index(), Some(1));
    }

    #[test]
    fn test_delete_to_empty() {
        let mut store = store_with(&["a"]);
        store.delete_active();
        assert!(store.is_empty());
        assert_eq!(store.active_index(), None);
        assert!(store.delete_active().is_none());
    }

    #[test]
    fn test_select_relative_wraps() {
        let mut store = store_with(&["a", "b", "c"]);

        store.set_active(2);
        store.select_relative(1);
        assert_eq!(store.active_index(), Some(0));

        store.select_relative(-1);
        assert_eq!(store.active_index(), Some(2));

        store.select_relative(-7);
        assert_eq!(store.active_index(), Some(2));
    }

    #[test]
    fn test_select_relative_multistep_jumps_to_corner() {
        let mut store = store_with(&["a", "b", "c"]);

        // Any step past the end lands on the first item, not the modulo
        // position; any step below the start lands on the last.
        store.set_active(2);
        store.select_relative(2);
        assert_eq!(store.active_index(), Some(0));

        store.select_relative(-2);
        assert_eq!(store.active_index(), Some(2));

        store.set_active(1);
        store.select_relative(1);
        assert_eq!(store.active_index(), Some(2));
    }

    #[test]
    fn test_select_relative_on_empty_store() {
        let mut store = AnnotationStore::new();
        store.select_relative(1);
        assert_eq!(store.active_index(), None);
    }

    #[test]
    fn test_set_items_clears_selection() {
        let mut store = store_with(&["a"]);
        assert!(store.has_active());

        store.set_items(vec![bbox("x").into(), bbox("y").into()]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.active_index(), None);

        store.set_items(Vec::new());
        assert!(store.is_empty());
    }

    #[test]
    fn test_reset() {
        let mut store = store_with(&["a", "b"]);
        store.reset();
        assert!(store.is_empty());
        assert!(!store.has_active());
    }

    #[test]
    fn test_edits_without_active_item_report_false() {
        let mut store = AnnotationStore::new();
        assert!(!store.set_active_classname("cart"));
        assert!(!store.translate_active(Vector3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_invariant_over_operation_sequence() {
        let mut store = AnnotationStore::new();
        let check = |store: &AnnotationStore| {
            if let Some(index) = store.active_index() {
                assert!(index < store.len());
            }
        };

        for i in 0..5 {
            store.add(bbox(&format!("b{i}")));
            check(&store);
        }
        for step in [3, -1, -9, 4] {
            store.select_relative(step);
            check(&store);
        }
        while !store.is_empty() {
            store.delete_active();
            check(&store);
        }
        check(&store);
    }
}
