//! In-memory host
//!
//! A [`HeadlessDocument`] stands in for a real element tree: elements are
//! vertical boxes with a label, the viewport can be scrolled and resized, and
//! every accepted property write is recorded. Tests and the CLI drive the
//! engine against it.

use std::cell::RefCell;

use rustc_hash::FxHashMap;

use crate::error::{AnimationError, Result};
use crate::host::{ElementBounds, ElementRef, Host, Property, ViewportMetrics};

/// One accepted property write
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WriteRecord {
    pub element: ElementRef,
    pub property: Property,
    pub value: f32,
}

#[derive(Debug)]
struct Element {
    label: String,
    bounds: ElementBounds,
    attached: bool,
    properties: FxHashMap<Property, f32>,
}

#[derive(Debug)]
struct DocumentState {
    metrics: ViewportMetrics,
    elements: FxHashMap<ElementRef, Element>,
    /// Insertion order, for listing
    order: Vec<ElementRef>,
    next_id: u64,
    writes: Vec<WriteRecord>,
}

/// Headless layout tree and property sink
#[derive(Debug)]
pub struct HeadlessDocument {
    state: RefCell<DocumentState>,
}

impl HeadlessDocument {
    pub fn new(viewport_height: f32, document_height: f32) -> Self {
        Self {
            state: RefCell::new(DocumentState {
                metrics: ViewportMetrics::new(0.0, viewport_height, document_height),
                elements: FxHashMap::default(),
                order: Vec::new(),
                next_id: 1,
                writes: Vec::new(),
            }),
        }
    }

    /// Add a laid-out element
    pub fn insert(&self, label: impl Into<String>, top: f32, height: f32) -> ElementRef {
        let mut state = self.state.borrow_mut();
        let id = ElementRef::from_raw(state.next_id);
        state.next_id += 1;
        state.elements.insert(
            id,
            Element {
                label: label.into(),
                bounds: ElementBounds::new(top, height),
                attached: true,
                properties: FxHashMap::default(),
            },
        );
        state.order.push(id);
        id
    }

    /// Reserve a handle for an element that is not laid out yet
    pub fn reserve(&self, label: impl Into<String>) -> ElementRef {
        let id = self.insert(label, 0.0, 0.0);
        if let Some(el) = self.state.borrow_mut().elements.get_mut(&id) {
            el.attached = false;
        }
        id
    }

    /// Move or resize an element (also lays out a reserved element)
    pub fn set_bounds(&self, element: ElementRef, top: f32, height: f32) {
        if let Some(el) = self.state.borrow_mut().elements.get_mut(&element) {
            el.bounds = ElementBounds::new(top, height);
            el.attached = true;
        }
    }

    /// Remove an element from the layout; later writes to it fail
    pub fn detach(&self, element: ElementRef) {
        if let Some(el) = self.state.borrow_mut().elements.get_mut(&element) {
            el.attached = false;
        }
    }

    /// Set the scroll offset; not clamped, like a rubber-banding viewport
    pub fn scroll_to(&self, offset: f32) {
        self.state.borrow_mut().metrics.scroll_offset = offset;
    }

    pub fn resize(&self, viewport_height: f32) {
        self.state.borrow_mut().metrics.viewport_height = viewport_height;
    }

    pub fn set_document_height(&self, document_height: f32) {
        self.state.borrow_mut().metrics.document_height = document_height;
    }

    /// Last value written to a property
    pub fn value(&self, element: ElementRef, property: Property) -> Option<f32> {
        self.state
            .borrow()
            .elements
            .get(&element)
            .and_then(|el| el.properties.get(&property).copied())
    }

    pub fn label(&self, element: ElementRef) -> Option<String> {
        self.state
            .borrow()
            .elements
            .get(&element)
            .map(|el| el.label.clone())
    }

    /// Elements in insertion order
    pub fn elements(&self) -> Vec<ElementRef> {
        self.state.borrow().order.clone()
    }

    pub fn writes(&self) -> Vec<WriteRecord> {
        self.state.borrow().writes.clone()
    }

    pub fn write_count(&self) -> usize {
        self.state.borrow().writes.len()
    }

    pub fn clear_writes(&self) {
        self.state.borrow_mut().writes.clear();
    }
}

impl Host for HeadlessDocument {
    fn metrics(&self) -> ViewportMetrics {
        self.state.borrow().metrics
    }

    fn bounds(&self, element: ElementRef) -> Option<ElementBounds> {
        self.state
            .borrow()
            .elements
            .get(&element)
            .filter(|el| el.attached)
            .map(|el| el.bounds)
    }

    fn write(&self, element: ElementRef, property: Property, value: f32) -> Result<()> {
        let mut state = self.state.borrow_mut();
        match state.elements.get_mut(&element) {
            Some(el) if el.attached => {
                el.properties.insert(property, value);
            }
            _ => return Err(AnimationError::DetachedTarget(element)),
        }
        state.writes.push(WriteRecord {
            element,
            property,
            value,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_read_back() {
        let doc = HeadlessDocument::new(1000.0, 3000.0);
        let el = doc.insert("card", 100.0, 200.0);
        doc.write(el, Property::Opacity, 0.4).unwrap();
        assert_eq!(doc.value(el, Property::Opacity), Some(0.4));
        assert_eq!(doc.write_count(), 1);
        assert_eq!(doc.label(el).as_deref(), Some("card"));
    }

    #[test]
    fn test_detached_element() {
        let doc = HeadlessDocument::new(1000.0, 3000.0);
        let el = doc.insert("card", 100.0, 200.0);
        doc.detach(el);
        assert!(doc.bounds(el).is_none());
        assert_eq!(
            doc.write(el, Property::Opacity, 1.0),
            Err(AnimationError::DetachedTarget(el))
        );
        assert_eq!(doc.write_count(), 0);
    }

    #[test]
    fn test_reserved_element_lays_out_later() {
        let doc = HeadlessDocument::new(1000.0, 3000.0);
        let el = doc.reserve("late");
        assert!(doc.bounds(el).is_none());
        doc.set_bounds(el, 500.0, 100.0);
        assert_eq!(doc.bounds(el), Some(ElementBounds::new(500.0, 100.0)));
    }
}
