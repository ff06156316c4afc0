//! Navigation bar backdrop
//!
//! The fixed navigation bar is transparent at the top of the page and gains
//! its blurred backdrop once the page has scrolled past a small offset.

use std::cell::Cell;
use std::rc::Rc;

use folio_animation::{ElementRef, Host, Property, ScrollEngine, ScrollProgress, Subscription};

use crate::error::Result;

/// Offset past which the page counts as scrolled
const SCROLLED_OFFSET: f32 = 50.0;

/// Tracks whether the navigation backdrop is shown
pub struct NavBackdrop {
    host: Rc<dyn Host>,
    element: ElementRef,
    scrolled: Cell<Option<bool>>,
}

impl NavBackdrop {
    pub fn new(host: Rc<dyn Host>, element: ElementRef) -> Rc<Self> {
        Rc::new(Self {
            host,
            element,
            scrolled: Cell::new(None),
        })
    }

    /// Subscribe to `engine`; dropping the subscription stops updates
    pub fn subscribe(self: &Rc<Self>, engine: &ScrollEngine) -> Result<Subscription> {
        let this = Rc::clone(self);
        Ok(engine.on_update(move |progress| this.update(progress))?)
    }

    /// `None` until the first progress update
    pub fn is_scrolled(&self) -> Option<bool> {
        self.scrolled.get()
    }

    pub fn update(&self, progress: &ScrollProgress) {
        let scrolled = progress.offset > SCROLLED_OFFSET;
        if self.scrolled.get() == Some(scrolled) {
            return;
        }
        self.scrolled.set(Some(scrolled));

        let opacity = if scrolled { 1.0 } else { 0.0 };
        if let Err(e) = self.host.write(self.element, Property::Opacity, opacity) {
            tracing::warn!(element = %self.element, "nav backdrop write failed: {e}");
        }
        tracing::debug!(scrolled, offset = progress.offset, "nav backdrop toggled");
    }
}

impl std::fmt::Debug for NavBackdrop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavBackdrop")
            .field("element", &self.element)
            .field("scrolled", &self.scrolled.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_animation::HeadlessDocument;

    fn at(offset: f32) -> ScrollProgress {
        ScrollProgress {
            offset,
            max_offset: 4000.0,
            normalized: offset / 4000.0,
            frame: 0,
        }
    }

    #[test]
    fn test_transparent_at_top() {
        let doc = Rc::new(HeadlessDocument::new(1000.0, 5000.0));
        let nav = doc.insert("nav", 0.0, 64.0);
        let backdrop = NavBackdrop::new(doc.clone(), nav);

        backdrop.update(&at(0.0));
        assert_eq!(backdrop.is_scrolled(), Some(false));
        assert_eq!(doc.value(nav, Property::Opacity), Some(0.0));
    }

    #[test]
    fn test_threshold_is_strict() {
        let doc = Rc::new(HeadlessDocument::new(1000.0, 5000.0));
        let nav = doc.insert("nav", 0.0, 64.0);
        let backdrop = NavBackdrop::new(doc.clone(), nav);

        backdrop.update(&at(50.0));
        assert_eq!(backdrop.is_scrolled(), Some(false));

        backdrop.update(&at(51.0));
        assert_eq!(backdrop.is_scrolled(), Some(true));
        assert_eq!(doc.value(nav, Property::Opacity), Some(1.0));
        assert_eq!(doc.write_count(), 2);

        backdrop.update(&at(600.0));
        assert_eq!(doc.write_count(), 2);

        backdrop.update(&at(10.0));
        assert_eq!(doc.value(nav, Property::Opacity), Some(0.0));
    }
}
