//! Scroll indicator visibility
//!
//! The indicator bar fades in once the reader has scrolled past the first
//! hundred pixels. It is a plain progress subscriber rather than a binding:
//! visibility flips between two states and only writes when it flips.

use std::cell::Cell;
use std::rc::Rc;

use folio_animation::{
    progress_in_range, ElementRef, Host, Property, ScrollEngine, ScrollProgress, Subscription,
    TriggerRange,
};

use crate::error::Result;

/// Offset the visibility window starts at
const START_OFFSET: f32 = 100.0;
/// Progress through the window past which the indicator shows
const SHOW_THRESHOLD: f32 = 0.05;
/// Slide distance while hidden
const HIDDEN_OFFSET: f32 = 20.0;

/// Tracks whether the indicator is currently shown
pub struct IndicatorVisibility {
    host: Rc<dyn Host>,
    element: ElementRef,
    visible: Cell<Option<bool>>,
}

impl IndicatorVisibility {
    pub fn new(host: Rc<dyn Host>, element: ElementRef) -> Rc<Self> {
        Rc::new(Self {
            host,
            element,
            visible: Cell::new(None),
        })
    }

    /// Subscribe to `engine`; dropping the subscription stops updates
    pub fn subscribe(self: &Rc<Self>, engine: &ScrollEngine) -> Result<Subscription> {
        let this = Rc::clone(self);
        Ok(engine.on_update(move |progress| this.update(progress))?)
    }

    /// `None` until the first progress update
    pub fn is_visible(&self) -> Option<bool> {
        self.visible.get()
    }

    pub fn update(&self, progress: &ScrollProgress) {
        let visible = TriggerRange::new(START_OFFSET, progress.max_offset)
            .is_some_and(|range| progress_in_range(progress.offset, &range) > SHOW_THRESHOLD);

        if self.visible.get() == Some(visible) {
            return;
        }
        self.visible.set(Some(visible));

        let (opacity, y) = if visible { (1.0, 0.0) } else { (0.0, HIDDEN_OFFSET) };
        for (property, value) in [(Property::Opacity, opacity), (Property::TranslateY, y)] {
            if let Err(e) = self.host.write(self.element, property, value) {
                tracing::warn!(element = %self.element, %property, "indicator write failed: {e}");
            }
        }
        tracing::debug!(visible, offset = progress.offset, "scroll indicator toggled");
    }
}

impl std::fmt::Debug for IndicatorVisibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndicatorVisibility")
            .field("element", &self.element)
            .field("visible", &self.visible.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_animation::HeadlessDocument;

    fn progress(offset: f32, max_offset: f32) -> ScrollProgress {
        ScrollProgress {
            offset,
            max_offset,
            normalized: offset / max_offset,
            frame: 0,
        }
    }

    #[test]
    fn test_hidden_at_top() {
        let doc = Rc::new(HeadlessDocument::new(1000.0, 5000.0));
        let bar = doc.insert("indicator", 0.0, 4.0);
        let indicator = IndicatorVisibility::new(doc.clone(), bar);

        indicator.update(&progress(0.0, 4000.0));
        assert_eq!(indicator.is_visible(), Some(false));
        assert_eq!(doc.value(bar, Property::Opacity), Some(0.0));
        assert_eq!(doc.value(bar, Property::TranslateY), Some(20.0));
    }

    #[test]
    fn test_shows_past_threshold_and_writes_once() {
        let doc = Rc::new(HeadlessDocument::new(1000.0, 5000.0));
        let bar = doc.insert("indicator", 0.0, 4.0);
        let indicator = IndicatorVisibility::new(doc.clone(), bar);

        // window is 100..4000, 5% of it is 195px in
        indicator.update(&progress(250.0, 4000.0));
        assert_eq!(indicator.is_visible(), Some(true));
        assert_eq!(doc.value(bar, Property::Opacity), Some(1.0));
        assert_eq!(doc.write_count(), 2);

        indicator.update(&progress(900.0, 4000.0));
        assert_eq!(doc.write_count(), 2);
    }

    #[test]
    fn test_short_document_stays_hidden() {
        let doc = Rc::new(HeadlessDocument::new(1000.0, 1050.0));
        let bar = doc.insert("indicator", 0.0, 4.0);
        let indicator = IndicatorVisibility::new(doc.clone(), bar);

        indicator.update(&progress(50.0, 50.0));
        assert_eq!(indicator.is_visible(), Some(false));
    }
}
