//! Range resolver
//!
//! Turns symbolic [`TriggerSpec`]s into concrete [`TriggerRange`]s in document
//! pixels, and debounces the recomputation passes triggered by viewport
//! resizes and layout reflows.

use std::time::Duration;

use crate::anchor::Anchor;
use crate::error::{AnimationError, Result, UnresolvedReason};
use crate::host::{ElementBounds, ElementRef, ViewportMetrics};

// ============================================================================
// Trigger Range
// ============================================================================

/// Concrete scroll interval, `start < end`, both finite
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerRange {
    start: f32,
    end: f32,
}

impl TriggerRange {
    /// Build a range, rejecting empty, inverted and non-finite intervals
    pub fn new(start: f32, end: f32) -> Option<Self> {
        if start.is_finite() && end.is_finite() && start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    pub fn start(&self) -> f32 {
        self.start
    }

    pub fn end(&self) -> f32 {
        self.end
    }

    pub fn span(&self) -> f32 {
        self.end - self.start
    }

    pub fn contains(&self, offset: f32) -> bool {
        offset >= self.start && offset <= self.end
    }
}

// ============================================================================
// Trigger Spec
// ============================================================================

/// What the anchors of a trigger are measured against
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TriggerTarget {
    Element(ElementRef),
    /// The whole scrollable document
    Document,
}

/// Symbolic trigger definition
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TriggerSpec {
    Anchored {
        target: TriggerTarget,
        start: Anchor,
        end: Anchor,
    },
    /// Absolute document offsets
    Fixed { start: f32, end: f32 },
}

impl TriggerSpec {
    /// Trigger anchored to an element, e.g. `element(card, "top 80%", "bottom 20%")`
    pub fn element(element: ElementRef, start: &str, end: &str) -> Result<Self> {
        Ok(TriggerSpec::Anchored {
            target: TriggerTarget::Element(element),
            start: start.parse()?,
            end: end.parse()?,
        })
    }

    /// Trigger anchored to the whole document, e.g. `document("top top", "bottom bottom")`
    pub fn document(start: &str, end: &str) -> Result<Self> {
        Ok(TriggerSpec::Anchored {
            target: TriggerTarget::Document,
            start: start.parse()?,
            end: end.parse()?,
        })
    }

    pub fn fixed(start: f32, end: f32) -> Self {
        TriggerSpec::Fixed { start, end }
    }

    /// Element whose layout this trigger depends on, if any
    pub fn anchor_element(&self) -> Option<ElementRef> {
        match self {
            TriggerSpec::Anchored {
                target: TriggerTarget::Element(el),
                ..
            } => Some(*el),
            _ => None,
        }
    }
}

/// Resolve a trigger against current metrics
///
/// `bounds` is the host's layout query. Missing elements and zero-height
/// targets are reported as [`AnimationError::UnresolvedRange`] so the caller
/// can retry on a later pass.
pub fn resolve_trigger<F>(
    spec: &TriggerSpec,
    metrics: &ViewportMetrics,
    bounds: F,
) -> Result<TriggerRange>
where
    F: Fn(ElementRef) -> Option<ElementBounds>,
{
    let unresolved = |reason| AnimationError::UnresolvedRange {
        element: spec.anchor_element(),
        reason,
    };

    let (start, end) = match spec {
        TriggerSpec::Fixed { start, end } => (*start, *end),
        TriggerSpec::Anchored { target, start, end } => {
            let trigger = match target {
                TriggerTarget::Element(el) => {
                    bounds(*el).ok_or_else(|| unresolved(UnresolvedReason::MissingElement))?
                }
                TriggerTarget::Document => ElementBounds::new(0.0, metrics.document_height),
            };
            if !(trigger.height > 0.0) {
                return Err(unresolved(UnresolvedReason::ZeroExtent));
            }
            (
                start.resolve(trigger, metrics),
                end.resolve(trigger, metrics),
            )
        }
    };

    TriggerRange::new(start, end).ok_or_else(|| unresolved(UnresolvedReason::EmptyRange))
}

// ============================================================================
// Recompute Scheduling
// ============================================================================

/// Trailing-edge debounce for recomputation passes
///
/// Every `request` pushes the deadline out; the pass runs once the signals have
/// been quiet for the whole window.
#[derive(Debug)]
pub struct RecomputeScheduler {
    debounce: Duration,
    deadline: Option<Duration>,
    forced: bool,
}

impl RecomputeScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            deadline: None,
            forced: false,
        }
    }

    /// Record a resize/reflow signal at time `now`
    pub fn request(&mut self, now: Duration) {
        self.deadline = Some(now + self.debounce);
    }

    /// Run a pass on the next frame regardless of the debounce window
    pub fn force(&mut self) {
        self.forced = true;
    }

    pub fn is_pending(&self) -> bool {
        self.forced || self.deadline.is_some()
    }

    /// Consume the pending pass if it is due at `now`
    pub fn take_due(&mut self, now: Duration) -> bool {
        let due = self.forced || self.deadline.is_some_and(|d| now >= d);
        if due {
            self.forced = false;
            self.deadline = None;
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(vh: f32) -> ViewportMetrics {
        ViewportMetrics::new(0.0, vh, 5000.0)
    }

    #[test]
    fn test_range_rejects_degenerate() {
        assert!(TriggerRange::new(100.0, 100.0).is_none());
        assert!(TriggerRange::new(200.0, 100.0).is_none());
        assert!(TriggerRange::new(f32::NAN, 100.0).is_none());
        assert!(TriggerRange::new(0.0, f32::INFINITY).is_none());
        let r = TriggerRange::new(500.0, 1500.0).unwrap();
        assert_eq!(r.span(), 1000.0);
        assert!(r.contains(500.0) && r.contains(1500.0) && !r.contains(1501.0));
    }

    #[test]
    fn test_resolve_element_trigger() {
        let el = ElementRef::from_raw(1);
        let spec = TriggerSpec::element(el, "top 80%", "bottom 20%").unwrap();
        let range = resolve_trigger(&spec, &metrics(1000.0), |_| {
            Some(ElementBounds::new(2000.0, 500.0))
        })
        .unwrap();
        assert_eq!(range.start(), 1200.0);
        assert_eq!(range.end(), 2300.0);
    }

    #[test]
    fn test_resolve_document_trigger() {
        let spec = TriggerSpec::document("top top", "bottom bottom").unwrap();
        let range = resolve_trigger(&spec, &metrics(1000.0), |_| None).unwrap();
        assert_eq!(range.start(), 0.0);
        assert_eq!(range.end(), 4000.0);
    }

    #[test]
    fn test_missing_element_is_unresolved() {
        let el = ElementRef::from_raw(9);
        let spec = TriggerSpec::element(el, "top 80%", "bottom 20%").unwrap();
        let err = resolve_trigger(&spec, &metrics(1000.0), |_| None).unwrap_err();
        assert_eq!(
            err,
            AnimationError::UnresolvedRange {
                element: Some(el),
                reason: UnresolvedReason::MissingElement,
            }
        );
    }

    #[test]
    fn test_zero_height_is_unresolved() {
        let el = ElementRef::from_raw(2);
        let spec = TriggerSpec::element(el, "top bottom", "bottom top").unwrap();
        let err = resolve_trigger(&spec, &metrics(1000.0), |_| {
            Some(ElementBounds::new(300.0, 0.0))
        })
        .unwrap_err();
        assert!(matches!(
            err,
            AnimationError::UnresolvedRange {
                reason: UnresolvedReason::ZeroExtent,
                ..
            }
        ));
    }

    #[test]
    fn test_inverted_anchors_are_unresolved() {
        let spec = TriggerSpec::fixed(900.0, 100.0);
        let err = resolve_trigger(&spec, &metrics(1000.0), |_| None).unwrap_err();
        assert!(matches!(
            err,
            AnimationError::UnresolvedRange {
                element: None,
                reason: UnresolvedReason::EmptyRange,
            }
        ));
    }

    #[test]
    fn test_debounce_collapses_storm() {
        let mut s = RecomputeScheduler::new(Duration::from_millis(200));
        assert!(!s.is_pending());

        for ms in [0, 50, 100, 150] {
            s.request(Duration::from_millis(ms));
        }
        assert!(!s.take_due(Duration::from_millis(300)));
        assert!(s.take_due(Duration::from_millis(350)));
        assert!(!s.is_pending());
        assert!(!s.take_due(Duration::from_millis(1000)));
    }

    #[test]
    fn test_force_skips_window() {
        let mut s = RecomputeScheduler::new(Duration::from_millis(200));
        s.request(Duration::from_millis(0));
        s.force();
        assert!(s.take_due(Duration::from_millis(1)));
        assert!(!s.is_pending());
    }
}
