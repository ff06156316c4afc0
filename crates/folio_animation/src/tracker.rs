//! Scroll position tracker
//!
//! The single source of truth for document scroll progress. Raw scroll events
//! only mark the tracker dirty; progress is computed when the engine polls it,
//! and at most once per frame.

use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

use crate::host::ViewportMetrics;
use crate::lifecycle::AttachmentId;

new_key_type! {
    /// Handle to a tracker subscription
    pub struct SubscriptionId;
}

/// Published scroll state for one frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollProgress {
    /// Scroll offset in document pixels
    pub offset: f32,
    /// Largest reachable offset (0 for a document that cannot scroll)
    pub max_offset: f32,
    /// `offset / max_offset`, clamped to [0, 1]
    pub normalized: f32,
    /// Frame number this progress was computed on
    pub frame: u64,
}

/// Callback invoked with fresh progress once per frame
pub type ProgressCallback = Rc<dyn Fn(&ScrollProgress)>;

/// Who is listening to the tracker
#[derive(Clone)]
pub enum Subscriber {
    /// User callback registered through `ScrollEngine::on_update`
    Callback(ProgressCallback),
    /// An attached view; its bindings are evaluated by the engine directly
    Attachment(AttachmentId),
}

/// Normalized document progress; 0 when the document cannot scroll
pub fn normalized_progress(metrics: &ViewportMetrics) -> f32 {
    let max = metrics.max_offset();
    if max <= 0.0 || !metrics.scroll_offset.is_finite() {
        return 0.0;
    }
    (metrics.scroll_offset / max).clamp(0.0, 1.0)
}

/// Coalesces scroll events into one progress update per frame
pub struct ScrollTracker {
    subscribers: SlotMap<SubscriptionId, Subscriber>,
    current: Option<ScrollProgress>,
    dirty: bool,
    /// Raw events received since the last poll
    pending_events: u32,
    last_polled_frame: Option<u64>,
}

impl Default for ScrollTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollTracker {
    pub fn new() -> Self {
        Self {
            subscribers: SlotMap::with_key(),
            current: None,
            dirty: true,
            pending_events: 0,
            last_polled_frame: None,
        }
    }

    /// Record a raw scroll event
    pub fn notify_scroll(&mut self) {
        self.pending_events = self.pending_events.saturating_add(1);
        self.dirty = true;
    }

    /// Force a republish on the next poll even if the offset is unchanged
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Raw events waiting to be coalesced into the next poll
    pub fn pending_events(&self) -> u32 {
        self.pending_events
    }

    /// Compute progress for `frame`
    ///
    /// Returns the new progress when it changed, when scroll events arrived,
    /// or on the very first poll. A second poll on the same frame returns
    /// `None`.
    pub fn poll(&mut self, metrics: &ViewportMetrics, frame: u64) -> Option<ScrollProgress> {
        if self.last_polled_frame == Some(frame) {
            return None;
        }
        self.last_polled_frame = Some(frame);

        let offset = if metrics.scroll_offset.is_finite() {
            metrics.scroll_offset
        } else {
            0.0
        };
        let next = ScrollProgress {
            offset,
            max_offset: metrics.max_offset(),
            normalized: normalized_progress(metrics),
            frame,
        };

        let changed = match self.current {
            Some(prev) => {
                prev.offset != next.offset
                    || prev.max_offset != next.max_offset
                    || prev.normalized != next.normalized
            }
            None => true,
        };

        let publish = changed || self.dirty;
        self.dirty = false;
        self.pending_events = 0;
        self.current = Some(next);

        publish.then_some(next)
    }

    /// Most recently published progress
    pub fn current(&self) -> Option<ScrollProgress> {
        self.current
    }

    pub fn subscribe(&mut self, subscriber: Subscriber) -> SubscriptionId {
        self.subscribers.insert(subscriber)
    }

    /// Remove a subscription; returns false if it was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id).is_some()
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.subscribers.contains_key(id)
    }

    pub fn has_subscribers(&self) -> bool {
        !self.subscribers.is_empty()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Snapshot of user callbacks, so they can run without the tracker borrowed
    pub fn callbacks(&self) -> Vec<(SubscriptionId, ProgressCallback)> {
        self.subscribers
            .iter()
            .filter_map(|(id, sub)| match sub {
                Subscriber::Callback(cb) => Some((id, Rc::clone(cb))),
                Subscriber::Attachment(_) => None,
            })
            .collect()
    }

    /// Drop every subscriber
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}
